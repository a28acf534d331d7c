//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `mapping`: File identifiers, destination fields and column mappings
//! - `record`: Normalized CSV records, database snapshots and update deltas
//! - `report`: Per-file run summaries
//! - `error`: Error types for the reconciler

pub mod error;
pub mod mapping;
pub mod record;
pub mod report;

pub use error::ReconcileError;
pub use mapping::{Field, FileId, FileMapping, KeyColumn, MappingEntry, SourceKind, Table};
pub use record::{
    normalize_value, CostDelta, CostSnapshot, CostValue, NormalizedRecord, RecordOutcome,
    SkipReason, EMPTY_SENTINEL, OPEN_STATUS,
};
pub use report::{FileReport, FileStatus};
