//! All-files run
//!
//! Spawns one task per configured file identifier, all at once, and waits
//! for every one of them. There is no limit on how many run together; the
//! connection pool is the only thing they share.

use super::Pipeline;
use crate::core::CostStore;
use crate::types::{FileReport, FileStatus};
use futures::future::join_all;
use tracing::{error, info};

impl<S: CostStore + ?Sized + 'static> Pipeline<S> {
    /// Process every configured file concurrently
    ///
    /// Reports are returned in file identifier order.
    pub async fn process_all(&self) -> Vec<FileReport> {
        let file_ids = self.mappings.file_ids();
        info!(files = file_ids.len(), "processing all files");

        let handles = file_ids.iter().map(|&file_id| {
            let pipeline = self.clone();
            tokio::spawn(async move { pipeline.process_file(file_id).await })
        });
        let results = join_all(handles).await;

        file_ids
            .into_iter()
            .zip(results)
            .map(|(file_id, result)| {
                result.unwrap_or_else(|e| {
                    error!(%file_id, error = %e, "file task did not complete");
                    FileReport::new(file_id, FileStatus::Failed(e.to_string()))
                })
            })
            .collect()
    }
}
