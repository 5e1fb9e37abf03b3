//! Progress listener that reports transfers through the log.

use blobsync_core::{ProgressListener, RemotePath};

/// Logs transfer start and completion at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressListener for LogProgress {
    fn started(&self, path: &RemotePath, total: Option<u64>) {
        match total {
            Some(total) => tracing::debug!("transfer {path}: {total} bytes"),
            None => tracing::debug!("transfer {path}: size unknown"),
        }
    }

    fn progressed(&self, path: &RemotePath, transferred: u64, total: Option<u64>) {
        tracing::trace!("transfer {path}: {transferred}/{total:?}");
    }

    fn finished(&self, path: &RemotePath, transferred: u64) {
        tracing::debug!("transfer {path}: done, {transferred} bytes");
    }
}
