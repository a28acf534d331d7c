//! Single-file pipeline
//!
//! Reads one export completely, then reconciles its records one after the
//! other. A file that cannot be read is reported as failed without touching
//! the store; blocked files are not even opened.

use super::Pipeline;
use crate::core::CostStore;
use crate::io::read_mapped_file;
use crate::types::{FileId, FileReport, FileStatus, ReconcileError};
use tracing::{error, info, warn};

impl<S: CostStore + ?Sized + 'static> Pipeline<S> {
    /// Process one file identifier and report what happened
    pub async fn process_file(&self, file_id: FileId) -> FileReport {
        let Some(mapping) = self.mappings.get(file_id) else {
            let err = ReconcileError::UnknownFileId { file_id };
            error!(%file_id, error = %err, "cannot process file");
            return FileReport::new(file_id, FileStatus::Failed(err.to_string()));
        };

        if mapping.blocked {
            warn!(%file_id, "file not allowed, skipping");
            return FileReport::new(file_id, FileStatus::Blocked);
        }

        let path = self.config.csv_path(file_id);
        let records = match read_mapped_file(&path, mapping).await {
            Ok(records) => records,
            Err(e) => {
                error!(%file_id, path = %path.display(), error = %e, "failed to read CSV file");
                return FileReport::new(file_id, FileStatus::Failed(e.to_string()));
            }
        };
        info!(%file_id, rows = records.len(), key = %mapping.key, "CSV file read");

        let mut report = FileReport::new(file_id, FileStatus::Completed);
        for record in &records {
            let outcome = self.reconciler.reconcile(mapping, record).await;
            report.record(&outcome);
        }

        info!(
            %file_id,
            rows = report.rows,
            updated = report.updated,
            skipped = report.skipped,
            "file processed"
        );
        report
    }
}
