//! Update delta computation
//!
//! Pure functions deciding what a record is allowed to write, given what the
//! database already holds.

use crate::types::{CostDelta, CostSnapshot, CostValue, Field, NormalizedRecord, SkipReason};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Value of the record's key field, if usable for a lookup
///
/// Records are normalized, so null here covers `-`, empty and missing cells.
pub fn lookup_key(record: &NormalizedRecord, key: Field) -> Option<&str> {
    record.get(key).filter(|value| !value.trim().is_empty())
}

/// Cost fields to write: present in the record and still null in the database
///
/// Fields are returned in record (mapping) order. `status` and `Shipments`
/// fields are never part of a delta.
///
/// # Errors
///
/// Returns `SkipReason::InvalidAmount` if a field that would be written holds
/// something that is not a decimal number.
pub fn compute_delta(
    record: &NormalizedRecord,
    existing: &CostSnapshot,
) -> Result<CostDelta, SkipReason> {
    let mut delta = CostDelta::default();

    for (field, value) in record.iter() {
        let Some(value) = value else { continue };
        if !field.is_cost() || existing.cost(field).is_some() {
            continue;
        }
        delta.push(field, cost_value(field, value)?);
    }

    Ok(delta)
}

fn cost_value(field: Field, value: &str) -> Result<CostValue, SkipReason> {
    if !field.is_amount() {
        return Ok(CostValue::Text(value.to_string()));
    }

    Decimal::from_str(value)
        .map(CostValue::Amount)
        .map_err(|_| SkipReason::InvalidAmount {
            field,
            value: value.to_string(),
        })
}
