//! Record-level types
//!
//! A [`NormalizedRecord`] is what one CSV row becomes after projection through
//! a file mapping. A [`CostSnapshot`] is what the database currently holds for
//! the matching shipment. The reconciler turns the two into a [`CostDelta`] or
//! a [`SkipReason`].

use crate::types::Field;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder vendors use for "no value"
pub const EMPTY_SENTINEL: &str = "-";

/// Status a cost record must have to be updated
pub const OPEN_STATUS: &str = "OPEN";

/// Returns `None` for sentinel values (`-`, empty, whitespace only)
pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == EMPTY_SENTINEL {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One CSV row projected onto the mapped fields, in mapping order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    values: Vec<(Field, Option<String>)>,
    /// Original text of cells that normalized to null
    nulled: Vec<(Field, String)>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value
    pub fn insert(&mut self, field: Field, value: Option<String>) {
        self.nulled.retain(|(f, _)| *f != field);
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }

    /// Set a field from a CSV cell, keeping the raw text when it normalizes to null
    pub fn insert_cell(&mut self, field: Field, raw: &str, value: Option<String>) {
        let nulled = value.is_none();
        self.insert(field, value);
        if nulled {
            self.nulled.push((field, raw.to_string()));
        }
    }

    /// Raw cell text of a field that normalized to null (`-`, blank, ...)
    pub fn nulled_cell(&self, field: Field) -> Option<&str> {
        self.nulled
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, raw)| raw.as_str())
    }

    /// Value of a field; `None` when unmapped or null
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Whether the field is part of this record at all
    pub fn contains(&self, field: Field) -> bool {
        self.values.iter().any(|(f, _)| *f == field)
    }

    /// Fields and values in mapping order
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> {
        self.values.iter().map(|(f, v)| (*f, v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Field, Option<String>)> for NormalizedRecord {
    fn from_iter<T: IntoIterator<Item = (Field, Option<String>)>>(iter: T) -> Self {
        let mut record = NormalizedRecord::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// Current database state of a shipment and its cost record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostSnapshot {
    pub tracking_code: Option<String>,
    pub shipping_invoice_number: Option<String>,
    pub status: Option<String>,
    /// Non-null cost columns, rendered as text
    pub costs: BTreeMap<Field, String>,
}

impl CostSnapshot {
    /// Existing value of a cost field; `None` means the column is null
    pub fn cost(&self, field: Field) -> Option<&str> {
        self.costs.get(&field).map(String::as_str)
    }

    /// Whether the cost record may still be updated
    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some(OPEN_STATUS)
    }
}

/// A value to be written to a cost column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostValue {
    /// Free text (currency codes)
    Text(String),
    /// Monetary amount
    Amount(Decimal),
}

impl fmt::Display for CostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostValue::Text(text) => f.write_str(text),
            CostValue::Amount(amount) => write!(f, "{}", amount),
        }
    }
}

/// The columns an update will set, in mapping order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostDelta {
    changes: Vec<(Field, CostValue)>,
}

impl CostDelta {
    pub fn push(&mut self, field: Field, value: CostValue) {
        self.changes.push((field, value));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.changes.iter().map(|(field, _)| *field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Field, CostValue)> {
        self.changes.iter()
    }

    pub fn get(&self, field: Field) -> Option<&CostValue> {
        self.changes
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }
}

/// Why a record was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Key field is null, empty or `-`
    InvalidKey,
    /// No shipment matches the key
    NotFound,
    /// Lookup query failed or matched more than one row
    LookupFailed(String),
    /// Cost record status is not `OPEN`
    NotOpen(Option<String>),
    /// A mapped amount is not a number
    InvalidAmount { field: Field, value: String },
    /// Every mapped cost field is null in the record or already set in the database
    NothingToUpdate,
    /// The row was closed or filled between lookup and update
    Superseded,
    /// Update statement failed
    UpdateFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidKey => write!(f, "invalid key value"),
            SkipReason::NotFound => write!(f, "shipment cost not found"),
            SkipReason::LookupFailed(message) => write!(f, "lookup failed: {}", message),
            SkipReason::NotOpen(Some(status)) => write!(f, "status is {}, not OPEN", status),
            SkipReason::NotOpen(None) => write!(f, "status is null, not OPEN"),
            SkipReason::InvalidAmount { field, value } => {
                write!(f, "invalid amount '{}' for {}", value, field)
            }
            SkipReason::NothingToUpdate => write!(f, "no columns to update"),
            SkipReason::Superseded => write!(f, "row changed before update"),
            SkipReason::UpdateFailed(message) => write!(f, "update failed: {}", message),
        }
    }
}

/// Final state of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Updated { fields: Vec<Field> },
    Skipped(SkipReason),
}

impl RecordOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RecordOutcome::Updated { .. })
    }
}
