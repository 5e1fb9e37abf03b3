//! Error types for blobsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration load / save.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// `config.yaml` is missing.
    #[error("store config not found at {path}; run `blobsync init` first")]
    ConfigNotFound { path: PathBuf },

    /// No `remotes/<name>.yaml` for the requested remote.
    #[error("remote '{name}' not configured (expected {path}); run `blobsync remote add {name} --root <dir>`")]
    RemoteNotFound { name: String, path: PathBuf },

    /// A remote name that cannot be used as a file name.
    #[error("invalid remote name '{0}'")]
    InvalidRemoteName(String),
}

/// Errors surfaced by a [`crate::remote::RemoteStorage`] implementation.
///
/// The variants are kept apart so callers can log a missing blob differently
/// from an unreachable or misconfigured remote.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The addressed blob or folder does not exist.
    #[error("remote path not found: {0}")]
    NotFound(String),

    /// The remote refused access to the path.
    #[error("permission denied for remote path {path}: {source}")]
    PermissionDenied {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Local or remote I/O failure while transferring `path`.
    #[error("I/O error for remote path {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Network, quota or authentication failure reported by a backend.
    #[error("transport error: {0}")]
    Transport(String),
}

impl RemoteError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => RemoteError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => RemoteError::PermissionDenied { path, source },
            _ => RemoteError::Io { path, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}
