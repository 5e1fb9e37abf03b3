//! Manifest store: the local cached copy of a remote manifest.
//!
//! Lives next to the artifact root / source cache root as
//! `build_manifest.json` / `source_manifest.json`. Loading never fails the
//! caller: any read or parse problem yields an empty manifest plus a warning.
//! Writes use the `.tmp` + rename pattern.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blobsync_core::Manifest;

use crate::error::{io_err, SyncError};

/// Why a cached manifest could not be used.
#[derive(Debug)]
pub enum LoadFailure {
    Missing,
    PermissionDenied(std::io::Error),
    Unreadable(std::io::Error),
    Corrupt(serde_json::Error),
}

/// Load the manifest at `path`, reporting exactly why it is unusable.
pub fn try_load<M: Manifest>(path: &Path) -> Result<M, LoadFailure> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(LoadFailure::Missing),
        Err(err) if err.kind() == ErrorKind::PermissionDenied => {
            return Err(LoadFailure::PermissionDenied(err))
        }
        Err(err) => return Err(LoadFailure::Unreadable(err)),
    };
    serde_json::from_slice(&bytes).map_err(LoadFailure::Corrupt)
}

/// Load the manifest at `path`, falling back to an empty manifest.
pub fn load<M: Manifest>(path: &Path) -> M {
    match try_load(path) {
        Ok(manifest) => manifest,
        Err(failure) => {
            let name = M::KIND.manifest_filename();
            match failure {
                LoadFailure::Missing => tracing::warn!(
                    "using an empty local manifest because {} does not exist",
                    path.display()
                ),
                LoadFailure::PermissionDenied(err) => tracing::warn!(
                    "using an empty local manifest because {} is not readable: {err}",
                    path.display()
                ),
                LoadFailure::Unreadable(err) => tracing::warn!(
                    "using an empty local manifest because {name} could not be read: {err}"
                ),
                LoadFailure::Corrupt(err) => tracing::warn!(
                    "using an empty local manifest because {} is corrupt: {err}",
                    path.display()
                ),
            }
            M::default()
        }
    }
}

/// Serialize a manifest exactly as it is stored locally and remotely.
pub fn to_bytes<M: Manifest>(manifest: &M) -> Result<Vec<u8>, SyncError> {
    let mut bytes = serde_json::to_vec_pretty(manifest)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Save `manifest` to `path` atomically.
pub fn save<M: Manifest>(path: &Path, manifest: &M) -> Result<(), SyncError> {
    write_bytes(path, &to_bytes(manifest)?)
}

/// Write already-serialized manifest bytes to `path` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobsync_core::{BuildManifest, CollectionKey, DigestEntry, ItemName, SourceManifest};
    use tempfile::TempDir;

    fn sample() -> BuildManifest {
        let mut manifest = BuildManifest::new();
        manifest.record(
            &CollectionKey::from("pkgA"),
            DigestEntry {
                name: ItemName::from("art1"),
                digest: "deadbeef".to_string(),
            },
        );
        manifest
    }

    #[test]
    fn empty_manifest_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build_manifest.json");
        assert!(matches!(
            try_load::<BuildManifest>(&path),
            Err(LoadFailure::Missing)
        ));
        assert!(load::<BuildManifest>(&path).is_empty());
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build_manifest.json");
        save(&path, &sample()).unwrap();
        assert_eq!(load::<BuildManifest>(&path), sample());
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("source_manifest.json");
        save(&path, &SourceManifest::new()).unwrap();
        assert!(!tmp_path(&path).exists(), "tmp file should be removed after rename");
    }

    #[test]
    fn corrupt_manifest_falls_back_to_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build_manifest.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            try_load::<BuildManifest>(&path),
            Err(LoadFailure::Corrupt(_))
        ));
        assert!(load::<BuildManifest>(&path).is_empty());
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("source_manifest.json");
        std::fs::write(&path, br#"{"packs/zip":{"a.zip":"x"}}"#).unwrap();
        assert!(matches!(
            try_load::<SourceManifest>(&path),
            Err(LoadFailure::Corrupt(_))
        ));
    }

    #[test]
    fn directory_in_place_of_file_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build_manifest.json");
        std::fs::create_dir(&path).unwrap();
        assert!(load::<BuildManifest>(&path).is_empty());
    }

    #[test]
    fn bytes_match_what_save_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build_manifest.json");
        save(&path, &sample()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), to_bytes(&sample()).unwrap());
    }
}
