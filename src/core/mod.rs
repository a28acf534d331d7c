//! Core business logic module
//!
//! This module contains the record reconciliation components:
//! - `traits` - The `CostStore` abstraction over the database
//! - `delta` - Key validation and update delta computation
//! - `reconciler` - Per-record lookup, eligibility check and update
//! - `store` - Postgres and in-memory `CostStore` implementations

pub mod delta;
pub mod reconciler;
pub mod store;
pub mod traits;

pub use reconciler::Reconciler;
pub use store::{InMemoryCostStore, PgCostStore};
pub use traits::CostStore;
