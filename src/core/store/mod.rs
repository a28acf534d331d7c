//! Cost store implementations
//!
//! - `postgres` - production store over a shared `sqlx` connection pool
//! - `memory` - `DashMap`-backed store with call counters

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCostStore;
pub use postgres::PgCostStore;
