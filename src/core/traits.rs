//! Core trait for the shipment cost store
//!
//! The reconciler only talks to the database through [`CostStore`], so the
//! Postgres implementation and the in-memory one used by tests are
//! interchangeable.

use crate::types::{CostDelta, CostSnapshot, KeyColumn, ReconcileError};
use async_trait::async_trait;

/// Read and conditionally update shipment cost records
#[async_trait]
pub trait CostStore: Send + Sync {
    /// Find the shipment whose `key` column equals `value`, joined with its cost record
    ///
    /// Returns `Ok(None)` when nothing matches and an error when more than one
    /// shipment does.
    async fn find_cost(
        &self,
        key: KeyColumn,
        value: &str,
    ) -> Result<Option<CostSnapshot>, ReconcileError>;

    /// Apply `delta` to the cost record of the shipment matching `key`
    ///
    /// The update only matches records whose status is still `OPEN` and whose
    /// delta columns are all still null, so it never replaces a value.
    /// Returns the number of cost records written.
    async fn apply_delta(
        &self,
        key: KeyColumn,
        value: &str,
        delta: &CostDelta,
    ) -> Result<u64, ReconcileError>;
}
