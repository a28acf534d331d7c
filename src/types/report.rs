//! Per-file run summaries

use crate::types::{FileId, RecordOutcome};
use std::fmt;

/// How a file's pipeline ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Every record was read and reconciled (updated or skipped)
    Completed,
    /// The file identifier is blocked; nothing was read
    Blocked,
    /// The file could not be read; no record was reconciled
    Failed(String),
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Completed => write!(f, "completed"),
            FileStatus::Blocked => write!(f, "blocked"),
            FileStatus::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Outcome counters for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_id: FileId,
    pub status: FileStatus,
    /// Records read from the CSV
    pub rows: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl FileReport {
    pub fn new(file_id: FileId, status: FileStatus) -> Self {
        Self {
            file_id,
            status,
            rows: 0,
            updated: 0,
            skipped: 0,
        }
    }

    /// Count one reconciled record
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.rows += 1;
        if outcome.is_updated() {
            self.updated += 1;
        } else {
            self.skipped += 1;
        }
    }
}
