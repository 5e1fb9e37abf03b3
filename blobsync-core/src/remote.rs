//! Storage capability consumed by the pusher and the manifest fetcher.
//!
//! A backend exposes three operations over a hierarchical namespace:
//! folder creation, blob upload and blob download. Transfers report progress
//! through a [`ProgressListener`].

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::RemoteError;
use crate::types::RemotePath;

/// Where upload bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum ByteSource<'a> {
    /// Stream from a local file.
    File(&'a Path),
    /// Upload an in-memory buffer.
    Memory(&'a [u8]),
}

impl<'a> ByteSource<'a> {
    /// Open the source, returning a reader and the total length in bytes.
    pub fn open(&self) -> io::Result<(Box<dyn Read + 'a>, u64)> {
        match *self {
            ByteSource::File(path) => {
                let file = File::open(path)?;
                let len = file.metadata()?.len();
                Ok((Box::new(file), len))
            }
            ByteSource::Memory(bytes) => Ok((Box::new(bytes), bytes.len() as u64)),
        }
    }
}

/// Receives transfer progress for a single blob.
pub trait ProgressListener {
    /// Called before the first byte moves.
    fn started(&self, _path: &RemotePath, _total: Option<u64>) {}

    /// Called as bytes move; `transferred` is cumulative.
    fn progressed(&self, path: &RemotePath, transferred: u64, total: Option<u64>);

    /// Called once the transfer completed successfully.
    fn finished(&self, _path: &RemotePath, _transferred: u64) {}
}

/// Discards all progress events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressListener for SilentProgress {
    fn progressed(&self, _path: &RemotePath, _transferred: u64, _total: Option<u64>) {}
}

/// A remote namespace with folder semantics.
///
/// Implementations own their own timeouts; callers never retry.
pub trait RemoteStorage {
    /// Create `path` and any missing parents. Succeeds if it already exists.
    fn create_folder(&self, path: &RemotePath) -> Result<(), RemoteError>;

    /// Upload `source` to `path`, replacing any existing blob.
    fn upload(
        &self,
        path: &RemotePath,
        source: ByteSource<'_>,
        progress: &dyn ProgressListener,
        content_type: Option<&str>,
    ) -> Result<(), RemoteError>;

    /// Download the blob at `path` into `sink`, returning the byte count.
    fn download(
        &self,
        path: &RemotePath,
        sink: &mut dyn Write,
        progress: &dyn ProgressListener,
    ) -> Result<u64, RemoteError>;
}

const CHUNK: usize = 64 * 1024;

/// Copy `reader` into `writer` in chunks, reporting progress for `path`.
///
/// Shared by backends that move bytes through `std::io`.
pub fn copy_with_progress(
    path: &RemotePath,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    total: Option<u64>,
    progress: &dyn ProgressListener,
) -> io::Result<u64> {
    progress.started(path, total);
    let mut buf = vec![0u8; CHUNK];
    let mut transferred = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        transferred += n as u64;
        progress.progressed(path, transferred, total);
    }
    writer.flush()?;
    progress.finished(path, transferred);
    Ok(transferred)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<(u64, Option<u64>)>>,
        finished: RefCell<Option<u64>>,
    }

    impl ProgressListener for Recorder {
        fn progressed(&self, _path: &RemotePath, transferred: u64, total: Option<u64>) {
            self.events.borrow_mut().push((transferred, total));
        }

        fn finished(&self, _path: &RemotePath, transferred: u64) {
            *self.finished.borrow_mut() = Some(transferred);
        }
    }

    #[test]
    fn copy_reports_cumulative_progress() {
        let data = vec![7u8; CHUNK + 10];
        let (mut reader, len) = ByteSource::Memory(&data).open().unwrap();
        let mut out = Vec::new();
        let recorder = Recorder::default();
        let path = RemotePath::new("/bld/pkg/a.tar.gz");

        let n = copy_with_progress(&path, &mut reader, &mut out, Some(len), &recorder).unwrap();

        assert_eq!(n, data.len() as u64);
        assert_eq!(out, data);
        let events = recorder.events.borrow();
        assert_eq!(events.last(), Some(&(data.len() as u64, Some(len))));
        assert_eq!(*recorder.finished.borrow(), Some(data.len() as u64));
    }

    #[test]
    fn file_source_reports_length() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("blob");
        std::fs::write(&file, b"hello").unwrap();
        let (_, len) = ByteSource::File(&file).open().unwrap();
        assert_eq!(len, 5);
    }
}
