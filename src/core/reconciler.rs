//! Record reconciliation
//!
//! Takes one normalized record through
//! `LOOKUP → ELIGIBILITY_CHECK → DELTA_COMPUTE → UPDATE`, leaving early with a
//! [`SkipReason`] at the first stage that fails. Every outcome is logged with
//! the file identifier and key so a run can be audited from its logs.
//!
//! Nothing is retried. A failed statement skips the record and the caller
//! moves on to the next one.

use crate::core::delta::{compute_delta, lookup_key};
use crate::core::traits::CostStore;
use crate::types::{FileMapping, NormalizedRecord, RecordOutcome, SkipReason};
use std::sync::Arc;
use tracing::{info, warn};

/// Applies normalized records to a cost store
#[derive(Debug)]
pub struct Reconciler<S: CostStore + ?Sized> {
    store: Arc<S>,
}

impl<S: CostStore + ?Sized> Clone for Reconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CostStore + ?Sized> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reconcile one record of the file described by `mapping`
    pub async fn reconcile(
        &self,
        mapping: &FileMapping,
        record: &NormalizedRecord,
    ) -> RecordOutcome {
        let file_id = mapping.id;
        let key = mapping.key;

        let Some(key_value) = lookup_key(record, key.field()) else {
            let rejected = record.nulled_cell(key.field());
            warn!(
                %file_id,
                %key,
                key_value = ?rejected,
                "skipping record: {}",
                SkipReason::InvalidKey
            );
            return RecordOutcome::Skipped(SkipReason::InvalidKey);
        };

        let outcome = self.apply(mapping, record, key_value).await;
        match &outcome {
            RecordOutcome::Updated { fields } => {
                let columns: Vec<&str> = fields.iter().map(|f| f.column()).collect();
                info!(
                    %file_id,
                    %key,
                    key_value,
                    columns = %columns.join(","),
                    "updated shipment cost"
                );
            }
            RecordOutcome::Skipped(
                reason @ (SkipReason::LookupFailed(_) | SkipReason::UpdateFailed(_)),
            ) => {
                warn!(%file_id, %key, key_value, %reason, "skipping record");
            }
            RecordOutcome::Skipped(reason) => {
                info!(%file_id, %key, key_value, %reason, "skipping record");
            }
        }
        outcome
    }

    async fn apply(
        &self,
        mapping: &FileMapping,
        record: &NormalizedRecord,
        key_value: &str,
    ) -> RecordOutcome {
        let existing = match self.store.find_cost(mapping.key, key_value).await {
            Ok(Some(existing)) => existing,
            Ok(None) => return RecordOutcome::Skipped(SkipReason::NotFound),
            Err(e) => return RecordOutcome::Skipped(SkipReason::LookupFailed(e.to_string())),
        };

        if !existing.is_open() {
            return RecordOutcome::Skipped(SkipReason::NotOpen(existing.status));
        }

        let delta = match compute_delta(record, &existing) {
            Ok(delta) if delta.is_empty() => {
                return RecordOutcome::Skipped(SkipReason::NothingToUpdate)
            }
            Ok(delta) => delta,
            Err(reason) => return RecordOutcome::Skipped(reason),
        };

        match self.store.apply_delta(mapping.key, key_value, &delta).await {
            Ok(0) => RecordOutcome::Skipped(SkipReason::Superseded),
            Ok(_) => RecordOutcome::Updated {
                fields: delta.fields(),
            },
            Err(e) => RecordOutcome::Skipped(SkipReason::UpdateFailed(e.to_string())),
        }
    }
}
