//! Remote manifest fetcher.
//!
//! Downloads `<root>/<manifest_filename>`. Any failure degrades to an empty
//! manifest so the run pushes everything rather than skipping something new.

use blobsync_core::{Manifest, ProgressListener, RemoteError, RemoteStorage};

/// How the remote manifest download went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteManifestStatus {
    /// Downloaded and parsed.
    Fetched,
    /// The remote has no manifest blob yet.
    NotFound,
    /// The remote refused to serve the manifest.
    PermissionDenied(String),
    /// Network or backend failure.
    Unreachable(String),
    /// Downloaded, but not a valid manifest.
    Corrupt(String),
}

/// Result of [`fetch`]: the manifest to plan against plus its provenance.
#[derive(Debug, Clone)]
pub struct FetchedManifest<M> {
    pub manifest: M,
    pub status: RemoteManifestStatus,
}

/// Fetch the remote manifest for `M::KIND`, never failing.
pub fn fetch<M: Manifest>(
    storage: &dyn RemoteStorage,
    progress: &dyn ProgressListener,
) -> FetchedManifest<M> {
    let kind = M::KIND;
    let path = kind.remote_manifest_path();
    let label = kind.items_label().to_uppercase();

    let mut buf = Vec::new();
    let status = match storage.download(&path, &mut buf, progress) {
        Ok(_) => match serde_json::from_slice::<M>(&buf) {
            Ok(manifest) => {
                tracing::info!("fetched remote manifest {path} ({} entries)", manifest.len());
                return FetchedManifest {
                    manifest,
                    status: RemoteManifestStatus::Fetched,
                };
            }
            Err(err) => {
                tracing::warn!("remote manifest {path} is corrupt ({err}); ALL {label} WILL BE PUSHED");
                RemoteManifestStatus::Corrupt(err.to_string())
            }
        },
        Err(RemoteError::NotFound(_)) => {
            tracing::warn!("remote manifest {path} not found; ALL {label} WILL BE PUSHED");
            RemoteManifestStatus::NotFound
        }
        Err(err @ RemoteError::PermissionDenied { .. }) => {
            tracing::warn!("permission denied reading remote manifest ({err}); ALL {label} WILL BE PUSHED");
            RemoteManifestStatus::PermissionDenied(err.to_string())
        }
        Err(err) => {
            tracing::warn!("failed to get remote manifest ({err}); ALL {label} WILL BE PUSHED");
            RemoteManifestStatus::Unreachable(err.to_string())
        }
    };

    FetchedManifest {
        manifest: M::default(),
        status,
    }
}
