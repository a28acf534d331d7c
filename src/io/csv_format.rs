//! CSV format handling for vendor exports and the run report
//!
//! This module centralizes all CSV format concerns, providing:
//! - Header resolution against a file mapping
//! - Projection of a raw row into a [`NormalizedRecord`]
//! - Numeric stripping for amount columns
//! - Run report serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    normalize_value, FileMapping, FileReport, FileStatus, NormalizedRecord, ReconcileError,
    SourceKind,
};
use csv_async::StringRecord;
use std::io::Write;

/// Keep only digits, `.` and `-` (drops currency symbols and thousands separators)
pub fn strip_numeric(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Projects raw rows of one export through its mapping
///
/// Column positions are resolved once from the header, so projecting a row
/// is a handful of indexed lookups.
#[derive(Debug)]
pub struct RowProjector<'a> {
    mapping: &'a FileMapping,
    /// Header position per mapping entry; `None` for constants
    positions: Vec<Option<usize>>,
}

impl<'a> RowProjector<'a> {
    /// Resolve every mapped source column against the CSV header
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if a mapped column is absent from the header.
    pub fn new(mapping: &'a FileMapping, headers: &StringRecord) -> Result<Self, ReconcileError> {
        let positions = mapping
            .entries
            .iter()
            .map(|entry| match entry.kind {
                SourceKind::Constant => Ok(None),
                SourceKind::Column => headers
                    .iter()
                    .position(|header| header == entry.file)
                    .map(Some)
                    .ok_or_else(|| ReconcileError::missing_column(mapping.id, &entry.file)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { mapping, positions })
    }

    /// Project one row into a normalized record
    ///
    /// Cells missing from short rows, `-` and empty values all become null.
    pub fn project(&self, row: &StringRecord) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();

        for (entry, position) in self.mapping.entries.iter().zip(&self.positions) {
            match position.map(|index| row.get(index)) {
                None => record.insert(entry.key, normalize_value(&entry.file)),
                Some(None) => record.insert(entry.key, None),
                Some(Some(cell)) => {
                    let value = if self.mapping.strips(entry.key) {
                        normalize_value(&strip_numeric(cell))
                    } else {
                        normalize_value(cell)
                    };
                    record.insert_cell(entry.key, cell, value);
                }
            }
        }

        record
    }
}

/// Write per-file reports in CSV format
///
/// Columns: file_id, status, rows, updated, skipped, error. Reports are sorted
/// by file identifier for deterministic output.
pub fn write_report_csv(
    reports: &[FileReport],
    output: &mut dyn Write,
) -> Result<(), ReconcileError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["file_id", "status", "rows", "updated", "skipped", "error"])?;

    let mut sorted = reports.to_vec();
    sorted.sort_by_key(|report| report.file_id);

    for report in sorted {
        let error = match &report.status {
            FileStatus::Failed(message) => message.as_str(),
            _ => "",
        };
        writer.write_record([
            report.file_id.to_string(),
            report.status.to_string(),
            report.rows.to_string(),
            report.updated.to_string(),
            report.skipped.to_string(),
            error.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
