//! I/O module
//!
//! Handles vendor CSV parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row projection, numeric stripping, report serialization)
//! - `async_reader` - Asynchronous CSV reader producing normalized records
//! - `discovery` - Mapping table discovery from `main.csv`

pub mod async_reader;
pub mod csv_format;
pub mod discovery;

pub use async_reader::{read_mapped_file, RowReader};
pub use csv_format::{strip_numeric, write_report_csv, RowProjector};
pub use discovery::{discover_file, discover_mappings};
