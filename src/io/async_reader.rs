//! Asynchronous CSV reader for vendor exports
//!
//! Provides a record-at-a-time interface over a vendor export, projecting
//! each row through the file's mapping as it is read.
//!
//! # Design
//!
//! The RowReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async file access (through the tokio-util compat layer)
//! - csv_format for header resolution and row projection
//!
//! # Architecture
//!
//! ```text
//! <csv_dir>/<id>.csv → RowReader → NormalizedRecords
//!                          ↓
//!                   csv_format module
//!                   (RowProjector)
//! ```

use crate::io::csv_format::RowProjector;
use crate::types::{FileMapping, NormalizedRecord, ReconcileError};
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::io::AsyncRead;
use std::path::Path;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// Asynchronous reader of normalized records
///
/// The sequence is consumed as it is read; reprocessing a file needs a new
/// reader.
pub struct RowReader<'a, R: AsyncRead + Unpin + Send> {
    csv_reader: csv_async::AsyncReader<R>,
    projector: RowProjector<'a>,
    row: StringRecord,
}

impl<'a, R: AsyncRead + Unpin + Send> RowReader<'a, R> {
    /// Create a RowReader, reading and resolving the header row
    ///
    /// # Errors
    ///
    /// Fails if the header cannot be parsed or a mapped column is missing.
    pub async fn new(reader: R, mapping: &'a FileMapping) -> Result<Self, ReconcileError> {
        let mut csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_reader(reader);

        let headers = csv_reader.headers().await?.clone();
        let projector = RowProjector::new(mapping, &headers)?;

        Ok(Self {
            csv_reader,
            projector,
            row: StringRecord::new(),
        })
    }

    /// Read and project the next row
    ///
    /// Returns `Ok(None)` at the end of the file.
    pub async fn next_record(&mut self) -> Result<Option<NormalizedRecord>, ReconcileError> {
        if self.csv_reader.read_record(&mut self.row).await? {
            Ok(Some(self.projector.project(&self.row)))
        } else {
            Ok(None)
        }
    }

    /// Read every remaining row
    ///
    /// Any parse error aborts the read and drops the records collected so far.
    pub async fn read_all(mut self) -> Result<Vec<NormalizedRecord>, ReconcileError> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Open a CSV file for async reading
pub async fn open_csv(path: &Path) -> Result<Compat<tokio::fs::File>, ReconcileError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReconcileError::file_not_found(path),
            _ => e.into(),
        })?;

    // Wrap tokio file in a compatibility layer for csv-async
    Ok(file.compat())
}

/// Read a whole vendor export through its mapping
///
/// The file is read completely before anything is returned: if it cannot be
/// opened or any row fails to parse, the error is returned and no record is.
pub async fn read_mapped_file(
    path: &Path,
    mapping: &FileMapping,
) -> Result<Vec<NormalizedRecord>, ReconcileError> {
    let file = open_csv(path).await?;
    RowReader::new(file, mapping).await?.read_all().await
}
