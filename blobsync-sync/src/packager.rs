//! Packaging and hashing of upload blobs.
//!
//! Build artifacts are archived as `<artifact>.tar.gz` with entries rooted
//! at `<package>/<artifact>/`. Digests are SHA-256 hex of the blob bytes.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// File name of the archive for an artifact.
pub fn archive_name(artifact: &str) -> String {
    format!("{artifact}.tar.gz")
}

/// Archive `<artifact_root>/<package>/<artifact>/` into
/// `<staging_dir>/<package>/<artifact>.tar.gz` and return the archive path.
///
/// A partially written archive is removed before the error is returned.
pub fn archive_artifact(
    artifact_root: &Path,
    package: &str,
    artifact: &str,
    staging_dir: &Path,
) -> Result<PathBuf, SyncError> {
    let source = artifact_root.join(package).join(artifact);
    let out_dir = staging_dir.join(package);
    std::fs::create_dir_all(&out_dir).map_err(|e| io_err(&out_dir, e))?;
    let archive = out_dir.join(archive_name(artifact));

    let result = write_tar_gz(&source, &format!("{package}/{artifact}"), &archive);
    if let Err(source_err) = result {
        let _ = std::fs::remove_file(&archive);
        return Err(SyncError::Package {
            path: source,
            source: source_err,
        });
    }
    Ok(archive)
}

fn write_tar_gz(dir: &Path, prefix: &str, archive: &Path) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        ));
    }
    let file = File::create(archive)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(prefix, dir)?;
    let encoder = builder.into_inner()?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .sync_all()
}

/// SHA-256 hex digest of the file at `path`, streamed.
pub fn digest_file(path: &Path) -> Result<String, SyncError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn artifact_tree(root: &Path) {
        let dir = root.join("pkgA").join("art1");
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("bin").join("tool"), b"#!/bin/sh\necho hi\n").unwrap();
        fs::write(dir.join("artifact.json"), b"{}").unwrap();
    }

    #[test]
    fn archive_contains_prefixed_entries() {
        let root = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        artifact_tree(root.path());

        let archive = archive_artifact(root.path(), "pkgA", "art1", staging.path()).unwrap();
        assert_eq!(archive, staging.path().join("pkgA").join("art1.tar.gz"));

        let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
        let names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n == "pkgA/art1/artifact.json"), "{names:?}");
        assert!(names.iter().any(|n| n == "pkgA/art1/bin/tool"), "{names:?}");
    }

    #[test]
    fn missing_artifact_is_a_packaging_error() {
        let root = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let err = archive_artifact(root.path(), "pkgA", "ghost", staging.path()).unwrap_err();
        assert!(matches!(err, SyncError::Package { .. }), "got: {err}");
        assert!(!staging.path().join("pkgA").join("ghost.tar.gz").exists());
    }

    #[test]
    fn digest_is_sha256_hex() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            digest_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
