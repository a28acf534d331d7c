//! Shipment Cost Sync Library
//! # Overview
//!
//! This library reconciles shipment cost data from vendor CSV exports into a
//! Postgres database holding `Shipments` and their `ShipmentCosts`.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (file ids, fields, records, reports, errors)
//! - [`config`] - Layered settings and the per-file column mapping table
//! - [`cli`] - CLI arguments parsing
//! - [`io`] - CSV reading, row projection, mapping discovery and report output
//! - [`core`] - Business logic components:
//!   - [`core::delta`] - Key validation and update delta computation
//!   - [`core::reconciler`] - Per-record lookup, eligibility check and update
//!   - [`core::store`] - Postgres and in-memory cost stores
//! - [`pipeline`] - Single-file and all-files orchestration
//!
//! # Update Policy
//!
//! A record is applied only when:
//!
//! - its key (tracking code, or invoice number for some exports) is present
//! - exactly one shipment matches the key
//! - the shipment's cost record has status `OPEN`
//! - at least one mapped cost field is present in the row and still null in the database
//!
//! Populated cost columns are never overwritten, so re-running an export is a
//! no-op.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

pub use config::{AppConfig, MappingTable};
pub use core::{CostStore, InMemoryCostStore, PgCostStore, Reconciler};
pub use io::write_report_csv;
pub use pipeline::{Pipeline, Target};
pub use types::{
    CostDelta, CostSnapshot, Field, FileId, FileMapping, FileReport, FileStatus, KeyColumn,
    NormalizedRecord, ReconcileError, RecordOutcome, SkipReason,
};
