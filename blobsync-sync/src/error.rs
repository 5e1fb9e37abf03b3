//! Error types for blobsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use blobsync_core::RemoteError;

/// All errors that can abort a push run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote operation failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the upload archive for an artifact failed.
    #[error("failed to package {path}: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest JSON serialization/deserialization error.
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
