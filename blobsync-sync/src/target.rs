//! Push targets: the two object classes and how each is inventoried,
//! packaged and recorded.

use std::path::{Path, PathBuf};

use blobsync_core::{
    BuildManifest, CollectionKey, DigestEntry, Inventory, ItemName, Manifest, NameEntry,
    SourceManifest,
};

use crate::error::SyncError;
use crate::{inventory, packager};

/// An upload-ready blob for one planned item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedItem {
    /// Local file to upload.
    pub path: PathBuf,
    /// Name of the blob inside its remote collection folder.
    pub blob_name: String,
    /// SHA-256 hex of the blob.
    pub digest: String,
    /// Whether `path` was created for this upload and must be removed after.
    pub transient: bool,
}

/// One object class: where its items live and how they become blobs.
pub trait PushTarget {
    type Manifest: Manifest;

    /// Root directory of the local items; the manifest cache is its sibling.
    fn root(&self) -> &Path;

    /// Enumerate local items.
    fn inventory(&self) -> Result<Inventory, SyncError>;

    /// Turn one item into an upload-ready blob.
    fn package(&self, key: &CollectionKey, item: &ItemName) -> Result<PackagedItem, SyncError>;

    /// Manifest entry recording a pushed item.
    fn entry(
        &self,
        item: &ItemName,
        packaged: &PackagedItem,
    ) -> <Self::Manifest as Manifest>::Entry;

    /// Closing hint for the dry-run report.
    fn force_hint(&self) -> &'static str;

    /// `<root>/../<manifest_filename>`
    fn local_manifest_path(&self) -> PathBuf {
        <Self::Manifest as Manifest>::KIND.local_manifest_path(self.root())
    }
}

// ---------------------------------------------------------------------------
// Build artifacts
// ---------------------------------------------------------------------------

/// Build artifacts under `<artifact_root>/<package>/<artifact>/`.
#[derive(Debug, Clone)]
pub struct BuildStore {
    artifact_root: PathBuf,
}

impl BuildStore {
    pub fn new(artifact_root: impl Into<PathBuf>) -> Self {
        Self {
            artifact_root: artifact_root.into(),
        }
    }

    /// Where archives are staged before upload: beside the artifact root,
    /// never inside it, so a crash cannot pollute the inventory.
    pub fn staging_dir(&self) -> PathBuf {
        self.local_manifest_path()
            .with_file_name(".blobsync-staging")
    }
}

impl PushTarget for BuildStore {
    type Manifest = BuildManifest;

    fn root(&self) -> &Path {
        &self.artifact_root
    }

    fn inventory(&self) -> Result<Inventory, SyncError> {
        inventory::build_inventory(&self.artifact_root)
    }

    fn package(&self, key: &CollectionKey, item: &ItemName) -> Result<PackagedItem, SyncError> {
        let path =
            packager::archive_artifact(&self.artifact_root, &key.0, &item.0, &self.staging_dir())?;
        let digest = match packager::digest_file(&path) {
            Ok(digest) => digest,
            Err(err) => {
                let _ = std::fs::remove_file(&path);
                return Err(err);
            }
        };
        Ok(PackagedItem {
            path,
            blob_name: packager::archive_name(&item.0),
            digest,
            transient: true,
        })
    }

    fn entry(&self, item: &ItemName, packaged: &PackagedItem) -> DigestEntry {
        DigestEntry {
            name: item.clone(),
            digest: packaged.digest.clone(),
        }
    }

    fn force_hint(&self) -> &'static str {
        "Use --force to push all artifacts"
    }
}

// ---------------------------------------------------------------------------
// Source packs
// ---------------------------------------------------------------------------

/// Source packs under `<cache_path>/packs/<type>/`.
#[derive(Debug, Clone)]
pub struct SourceCache {
    cache_path: PathBuf,
}

impl SourceCache {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
        }
    }
}

impl PushTarget for SourceCache {
    type Manifest = SourceManifest;

    fn root(&self) -> &Path {
        &self.cache_path
    }

    fn inventory(&self) -> Result<Inventory, SyncError> {
        inventory::source_inventory(&self.cache_path)
    }

    /// Packs are already archives: the file itself is the blob.
    fn package(&self, key: &CollectionKey, item: &ItemName) -> Result<PackagedItem, SyncError> {
        let path = key
            .0
            .split('/')
            .fold(self.cache_path.clone(), |acc, segment| acc.join(segment))
            .join(&item.0);
        let digest = packager::digest_file(&path)?;
        Ok(PackagedItem {
            path,
            blob_name: item.0.clone(),
            digest,
            transient: false,
        })
    }

    fn entry(&self, item: &ItemName, _packaged: &PackagedItem) -> NameEntry {
        NameEntry { name: item.clone() }
    }

    fn force_hint(&self) -> &'static str {
        "Use --force to push skipped source packs"
    }
}
