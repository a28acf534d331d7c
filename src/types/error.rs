//! Error types for the shipment cost reconciler
//!
//! This module defines all fatal and file-level errors that can occur while
//! loading configuration, reading vendor exports, or talking to the database.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Configuration Errors**: unreadable config, invalid mapping table
//! - **File I/O Errors**: CSV export missing or unreadable
//! - **CSV Parsing Errors**: malformed rows, missing mapped columns
//! - **Database Errors**: connection failures, failed statements
//!
//! Per-record problems (bad key, lookup miss, locked status, ...) are not
//! errors: they are reported as [`SkipReason`](crate::types::SkipReason)s and
//! processing continues with the next record.

use crate::types::FileId;
use thiserror::Error;

/// Main error type for the reconciler
///
/// Each variant carries enough context to diagnose the problem from a log
/// line alone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    /// CSV export not found at the expected path
    ///
    /// Aborts the pipeline of the affected file only.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// A single malformed row aborts the whole file; records already read
    /// are discarded.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A column named by the mapping is absent from the CSV header
    #[error("Column '{column}' required by file {file_id} is missing from the CSV header")]
    MissingColumn {
        /// File identifier being processed
        file_id: FileId,
        /// Source column named by the mapping
        column: String,
    },

    /// The mapping table failed validation
    #[error("Invalid mapping for file {file_id}: {message}")]
    InvalidMapping {
        /// File identifier as written in the mapping source
        file_id: String,
        /// What is wrong with it
        message: String,
    },

    /// A file identifier has no entry in the mapping table
    #[error("No column mapping configured for file {file_id}")]
    UnknownFileId {
        /// The requested file identifier
        file_id: FileId,
    },

    /// A string could not be parsed as a file identifier
    #[error("Invalid file identifier '{value}': expected an integer between {min} and {max}")]
    InvalidFileId {
        /// The rejected input
        value: String,
        /// Lowest accepted identifier
        min: u8,
        /// Highest accepted identifier
        max: u8,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// A database operation failed
    #[error("Database error: {message}")]
    DatabaseError {
        /// Description of the database error
        message: String,
    },
}

// Conversion from io::Error to ReconcileError
impl From<std::io::Error> for ReconcileError {
    fn from(error: std::io::Error) -> Self {
        ReconcileError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to ReconcileError
impl From<csv::Error> for ReconcileError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        ReconcileError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for ReconcileError {
    fn from(error: csv_async::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ReconcileError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<sqlx::Error> for ReconcileError {
    fn from(error: sqlx::Error) -> Self {
        ReconcileError::DatabaseError {
            message: error.to_string(),
        }
    }
}

impl From<figment::Error> for ReconcileError {
    fn from(error: figment::Error) -> Self {
        ReconcileError::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ReconcileError {
    fn from(error: toml::de::Error) -> Self {
        ReconcileError::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ReconcileError {
    fn from(error: toml::ser::Error) -> Self {
        ReconcileError::ConfigError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl ReconcileError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: &std::path::Path) -> Self {
        ReconcileError::FileNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create an InvalidMapping error
    pub fn invalid_mapping(file_id: impl ToString, message: impl Into<String>) -> Self {
        ReconcileError::InvalidMapping {
            file_id: file_id.to_string(),
            message: message.into(),
        }
    }

    /// Create a MissingColumn error
    pub fn missing_column(file_id: FileId, column: &str) -> Self {
        ReconcileError::MissingColumn {
            file_id,
            column: column.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn file(id: u8) -> FileId {
        FileId::new(id).unwrap()
    }

    #[rstest]
    #[case::file_not_found(
        ReconcileError::FileNotFound { path: "csvFiles/3.csv".to_string() },
        "File not found: csvFiles/3.csv"
    )]
    #[case::io_error(
        ReconcileError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::parse_error_with_line(
        ReconcileError::ParseError {
            line: Some(42),
            message: "found record with 3 fields".to_string(),
        },
        "CSV parse error at line 42: found record with 3 fields"
    )]
    #[case::parse_error_without_line(
        ReconcileError::ParseError { line: None, message: "bad quote".to_string() },
        "CSV parse error: bad quote"
    )]
    #[case::missing_column(
        ReconcileError::MissingColumn { file_id: file(7), column: "Tracking No".to_string() },
        "Column 'Tracking No' required by file 7 is missing from the CSV header"
    )]
    #[case::invalid_mapping(
        ReconcileError::InvalidMapping {
            file_id: "40".to_string(),
            message: "out of range".to_string(),
        },
        "Invalid mapping for file 40: out of range"
    )]
    #[case::unknown_file_id(
        ReconcileError::UnknownFileId { file_id: file(12) },
        "No column mapping configured for file 12"
    )]
    #[case::invalid_file_id(
        ReconcileError::InvalidFileId { value: "abc".to_string(), min: 1, max: 39 },
        "Invalid file identifier 'abc': expected an integer between 1 and 39"
    )]
    #[case::database_error(
        ReconcileError::DatabaseError { message: "connection refused".to_string() },
        "Database error: connection refused"
    )]
    fn test_error_display(#[case] error: ReconcileError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_mapping(
        ReconcileError::invalid_mapping(3, "duplicate field"),
        ReconcileError::InvalidMapping {
            file_id: "3".to_string(),
            message: "duplicate field".to_string(),
        }
    )]
    #[case::missing_column(
        ReconcileError::missing_column(file(2), "Total"),
        ReconcileError::MissingColumn { file_id: file(2), column: "Total".to_string() }
    )]
    #[case::file_not_found(
        ReconcileError::file_not_found(std::path::Path::new("csvFiles/9.csv")),
        ReconcileError::FileNotFound { path: "csvFiles/9.csv".to_string() }
    )]
    fn test_helper_functions(#[case] result: ReconcileError, #[case] expected: ReconcileError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: ReconcileError = io_error.into();
        assert!(matches!(error, ReconcileError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse_error = toml::from_str::<toml::Table>("files = [").unwrap_err();
        let error: ReconcileError = parse_error.into();
        assert!(matches!(error, ReconcileError::ConfigError { .. }));
    }
}
