//! Pusher: executes a push plan one item at a time.
//!
//! ## Per-item protocol
//!
//! 1. Package the item into an upload-ready blob.
//! 2. Hash the blob and record the entry in a working copy of the manifest.
//! 3. Create the remote collection folder (idempotent).
//! 4. Upload the blob to `<root>/<key>/<blob>`.
//! 5. Remove the transient archive, if any.
//! 6. Upload the whole manifest to `<root>/<manifest_filename>`, then write
//!    the same bytes to the local manifest cache.
//!
//! Step 6 runs after every item and only then does the working copy replace
//! the caller's manifest. Any failure aborts the run; items whose step 6
//! completed stay recorded and are skipped next time.

use std::path::Path;

use blobsync_core::{
    ByteSource, CollectionKey, ItemName, Manifest, ManifestEntry, ProgressListener, PushPlan,
    RemotePath, RemoteStorage,
};

use crate::error::SyncError;
use crate::manifest_store;
use crate::target::{PackagedItem, PushTarget};

/// Content type used for manifest blobs.
pub const MANIFEST_CONTENT_TYPE: &str = "text/plain";

/// One item that reached the remote and was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedItem {
    pub key: CollectionKey,
    pub item: ItemName,
    pub remote_path: RemotePath,
    /// What was recorded in the manifest for this item.
    pub entry: ManifestEntry,
}

/// Uploads planned items through an explicit storage handle.
pub struct Pusher<'a> {
    storage: &'a dyn RemoteStorage,
    progress: &'a dyn ProgressListener,
}

impl<'a> Pusher<'a> {
    pub fn new(storage: &'a dyn RemoteStorage, progress: &'a dyn ProgressListener) -> Self {
        Self { storage, progress }
    }

    /// Push every item of `plan`, persisting `manifest` after each one.
    ///
    /// `manifest` ends up holding every item pushed so far, also when an
    /// error is returned part-way.
    pub fn push<T: PushTarget>(
        &self,
        target: &T,
        plan: &PushPlan,
        manifest: &mut T::Manifest,
    ) -> Result<Vec<PushedItem>, SyncError> {
        let local_manifest = target.local_manifest_path();
        let mut pushed = Vec::with_capacity(plan.len());
        for (key, item) in plan.pairs() {
            let done = self.push_item(target, key, item, manifest, &local_manifest)?;
            pushed.push(done);
        }
        Ok(pushed)
    }

    fn push_item<T: PushTarget>(
        &self,
        target: &T,
        key: &CollectionKey,
        item: &ItemName,
        manifest: &mut T::Manifest,
        local_manifest: &Path,
    ) -> Result<PushedItem, SyncError> {
        tracing::info!("packing and hashing {key}/{item}");
        let packaged = target.package(key, item)?;
        let entry = target.entry(item, &packaged);
        let mut updated = manifest.clone();
        updated.record(key, entry.clone());

        let folder = <T::Manifest as Manifest>::KIND.remote_root().join(&key.0);
        let remote_path = folder.join(&packaged.blob_name);
        tracing::info!("pushing {} to {remote_path}", packaged.path.display());
        let uploaded = self.upload_blob(&folder, &remote_path, &packaged);
        cleanup(&packaged);
        uploaded?;

        tracing::info!("cleaning up and syncing manifest");
        self.persist(&updated, local_manifest)?;
        *manifest = updated;

        Ok(PushedItem {
            key: key.clone(),
            item: item.clone(),
            remote_path,
            entry: entry.into(),
        })
    }

    fn upload_blob(
        &self,
        folder: &RemotePath,
        remote_path: &RemotePath,
        packaged: &PackagedItem,
    ) -> Result<(), SyncError> {
        self.storage.create_folder(folder)?;
        self.storage.upload(
            remote_path,
            ByteSource::File(&packaged.path),
            self.progress,
            None,
        )?;
        Ok(())
    }

    /// Remote first, then the local cache, with identical bytes.
    fn persist<M: Manifest>(&self, manifest: &M, local_manifest: &Path) -> Result<(), SyncError> {
        let bytes = manifest_store::to_bytes(manifest)?;
        self.storage.upload(
            &M::KIND.remote_manifest_path(),
            ByteSource::Memory(&bytes),
            self.progress,
            Some(MANIFEST_CONTENT_TYPE),
        )?;
        manifest_store::write_bytes(local_manifest, &bytes)
    }
}

fn cleanup(packaged: &PackagedItem) {
    if !packaged.transient {
        return;
    }
    if let Err(err) = std::fs::remove_file(&packaged.path) {
        tracing::warn!(
            "could not remove transient archive {}: {err}",
            packaged.path.display()
        );
        return;
    }
    // Fails while other archives of the package are still staged.
    if let Some(dir) = packaged.path.parent() {
        let _ = std::fs::remove_dir(dir);
    }
}
