//! In-memory cost store
//!
//! Mirrors the semantics of the Postgres store (single-match lookup, an
//! update matching only `OPEN` rows whose written columns are all null) on
//! top of a `DashMap`, and counts every call so callers can assert how much
//! database traffic a run would have caused.

use crate::core::traits::CostStore;
use crate::types::{CostDelta, CostSnapshot, Field, KeyColumn, ReconcileError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Thread-safe shipment cost table for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryCostStore {
    rows: DashMap<u64, CostSnapshot>,
    next_id: AtomicU64,
    lookups: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemoryCostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shipment with its cost record, returning its row id
    pub fn insert(&self, snapshot: CostSnapshot) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(id, snapshot);
        id
    }

    /// Current state of a row
    pub fn get(&self, id: u64) -> Option<CostSnapshot> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    /// Change the status of a row
    pub fn set_status(&self, id: u64, status: &str) {
        if let Some(mut row) = self.rows.get_mut(&id) {
            row.status = Some(status.to_string());
        }
    }

    /// Set a cost column directly, as another writer would
    pub fn fill(&self, id: u64, field: Field, value: &str) {
        if let Some(mut row) = self.rows.get_mut(&id) {
            row.costs.insert(field, value.to_string());
        }
    }

    /// Number of `find_cost` calls so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `apply_delta` calls so far
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Total store calls so far
    pub fn call_count(&self) -> usize {
        self.lookup_count() + self.update_count()
    }

    fn matching_ids(&self, key: KeyColumn, value: &str) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .rows
            .iter()
            .filter(|row| {
                let stored = match key.field() {
                    Field::ShippingInvoiceNumber => &row.value().shipping_invoice_number,
                    _ => &row.value().tracking_code,
                };
                stored.as_deref() == Some(value)
            })
            .map(|row| *row.key())
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl CostStore for InMemoryCostStore {
    async fn find_cost(
        &self,
        key: KeyColumn,
        value: &str,
    ) -> Result<Option<CostSnapshot>, ReconcileError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        match self.matching_ids(key, value).as_slice() {
            [] => Ok(None),
            [id] => Ok(self.get(*id)),
            _ => Err(ReconcileError::DatabaseError {
                message: format!("more than one shipment has {} = {}", key, value),
            }),
        }
    }

    async fn apply_delta(
        &self,
        key: KeyColumn,
        value: &str,
        delta: &CostDelta,
    ) -> Result<u64, ReconcileError> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut affected = 0;
        for id in self.matching_ids(key, value) {
            if let Some(mut row) = self.rows.get_mut(&id) {
                let untouched = delta.iter().all(|(field, _)| row.cost(*field).is_none());
                if !row.is_open() || !untouched {
                    continue;
                }
                for (field, change) in delta.iter() {
                    row.costs.insert(*field, change.to_string());
                }
                affected += 1;
            }
        }

        Ok(affected)
    }
}
