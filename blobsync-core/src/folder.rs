//! Directory-backed [`RemoteStorage`].
//!
//! Maps `/bld/pkg/a.tar.gz` onto `<root>/bld/pkg/a.tar.gz`. Useful for a
//! mounted network share, a synced folder, or tests.
//!
//! Uploads write `<blob>.upload.tmp` in the target folder then rename, so a
//! reader never observes a half-written blob.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::RemoteError;
use crate::remote::{copy_with_progress, ByteSource, ProgressListener, RemoteStorage};
use crate::types::RemotePath;

/// A remote namespace rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FolderStorage {
    root: PathBuf,
}

impl FolderStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local filesystem path for a remote path. Pure, no I/O.
    pub fn local_path(&self, path: &RemotePath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl RemoteStorage for FolderStorage {
    fn create_folder(&self, path: &RemotePath) -> Result<(), RemoteError> {
        let dir = self.local_path(path);
        fs::create_dir_all(&dir).map_err(|e| RemoteError::from_io(path.as_str(), e))
    }

    fn upload(
        &self,
        path: &RemotePath,
        source: ByteSource<'_>,
        progress: &dyn ProgressListener,
        _content_type: Option<&str>,
    ) -> Result<(), RemoteError> {
        let target = self.local_path(path);
        let Some(parent) = target.parent() else {
            return Err(RemoteError::Transport(format!("cannot upload to {path}")));
        };
        // Parent folders must exist, as with a real provider.
        if !parent.is_dir() {
            return Err(RemoteError::NotFound(path.as_str().to_string()));
        }

        let file_name = path.file_name().unwrap_or("blob");
        let tmp = parent.join(format!("{file_name}.upload.tmp"));
        let (mut reader, total) = source.open().map_err(|e| RemoteError::Io {
            path: path.as_str().to_string(),
            source: e,
        })?;

        let result = File::create(&tmp).and_then(|mut out| {
            copy_with_progress(path, &mut reader, &mut out, Some(total), progress)?;
            out.sync_all()
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(RemoteError::from_io(path.as_str(), e));
        }
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(RemoteError::from_io(path.as_str(), e));
        }
        Ok(())
    }

    fn download(
        &self,
        path: &RemotePath,
        sink: &mut dyn Write,
        progress: &dyn ProgressListener,
    ) -> Result<u64, RemoteError> {
        let source = self.local_path(path);
        if source.is_dir() {
            return Err(RemoteError::NotFound(path.as_str().to_string()));
        }
        let mut file = File::open(&source).map_err(|e| RemoteError::from_io(path.as_str(), e))?;
        let total = file.metadata().ok().map(|m| m.len());
        copy_with_progress(path, &mut file, sink, total, progress)
            .map_err(|e| RemoteError::from_io(path.as_str(), e))
    }
}
