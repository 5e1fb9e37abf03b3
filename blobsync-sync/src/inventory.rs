//! Local inventory: what exists on disk right now.
//!
//! Build artifacts are `<artifact_root>/<package>/<artifact>/` directories.
//! Source packs are files under `<cache>/packs/{tar.bz2,tar.gz,zip}/`.

use std::io::ErrorKind;
use std::path::Path;

use blobsync_core::Inventory;

use crate::error::{io_err, SyncError};

/// Pack-type subdirectories of the source cache, in listing order.
pub const PACK_TYPES: [&str; 3] = ["tar.bz2", "tar.gz", "zip"];

/// Collection key for a pack type: `packs/<type>`.
pub fn pack_subdir(pack_type: &str) -> String {
    format!("packs/{pack_type}")
}

/// Every `(package, artifact)` directory pair under `artifact_root`.
///
/// Packages with no artifacts still appear as empty collections. Plain files
/// at either level are ignored.
pub fn build_inventory(artifact_root: &Path) -> Result<Inventory, SyncError> {
    let mut inventory = Inventory::new();
    for package in list_names(artifact_root, EntryKind::Dir)? {
        let package_dir = artifact_root.join(&package);
        let artifacts = list_names(&package_dir, EntryKind::Dir)?;
        inventory.add_collection(package.as_str());
        for artifact in artifacts {
            inventory.insert(package.as_str(), artifact);
        }
    }
    Ok(inventory)
}

/// Every pack file under the three pack-type subdirectories of `cache_path`.
///
/// A missing pack-type subdirectory is treated as empty.
pub fn source_inventory(cache_path: &Path) -> Result<Inventory, SyncError> {
    let mut inventory = Inventory::new();
    for pack_type in PACK_TYPES {
        let subdir = pack_subdir(pack_type);
        let dir = cache_path.join("packs").join(pack_type);
        inventory.add_collection(subdir.as_str());
        let packs = match list_names(&dir, EntryKind::File) {
            Ok(packs) => packs,
            Err(SyncError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!("no {} directory; treating as empty", dir.display());
                continue;
            }
            Err(err) => return Err(err),
        };
        for pack in packs {
            inventory.insert(subdir.as_str(), pack);
        }
    }
    Ok(inventory)
}

#[derive(Clone, Copy)]
enum EntryKind {
    Dir,
    File,
}

/// Sorted names of the directory entries of one kind. Symlinks are
/// followed; a dangling link matches neither kind.
fn list_names(dir: &Path, kind: EntryKind) -> Result<Vec<String>, SyncError> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| {
            std::fs::metadata(e.path())
                .map(|m| match kind {
                    EntryKind::Dir => m.is_dir(),
                    EntryKind::File => m.is_file(),
                })
                .unwrap_or(false)
        })
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn build_inventory_lists_artifact_directories() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("pkgA/art2")).unwrap();
        fs::create_dir_all(root.path().join("pkgA/art1")).unwrap();
        fs::create_dir_all(root.path().join("pkgB")).unwrap();
        fs::write(root.path().join("pkgA/art1.tar.gz"), b"stray").unwrap();
        fs::write(root.path().join("README"), b"not a package").unwrap();

        let inventory = build_inventory(root.path()).unwrap();
        let items: Vec<_> = inventory
            .items("pkgA")
            .unwrap()
            .iter()
            .map(|i| i.0.as_str())
            .collect();
        assert_eq!(items, vec!["art1", "art2"]);
        assert!(inventory.items("pkgB").unwrap().is_empty());
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn missing_artifact_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let err = build_inventory(&root.path().join("nope")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn source_inventory_covers_all_pack_types() {
        let cache = TempDir::new().unwrap();
        fs::create_dir_all(cache.path().join("packs/tar.gz")).unwrap();
        fs::write(cache.path().join("packs/tar.gz/x.tar.gz"), b"x").unwrap();
        fs::create_dir_all(cache.path().join("packs/zip")).unwrap();

        let inventory = source_inventory(cache.path()).unwrap();
        assert!(inventory.contains("packs/tar.gz", "x.tar.gz"));
        assert_eq!(inventory.len(), 1);
        let keys: Vec<_> = inventory.keys().map(|k| k.0.as_str()).collect();
        assert_eq!(keys, vec!["packs/tar.bz2", "packs/tar.gz", "packs/zip"]);
    }

    #[test]
    fn dotted_and_tmp_names_are_listed() {
        let cache = TempDir::new().unwrap();
        let zips = cache.path().join("packs/zip");
        fs::create_dir_all(&zips).unwrap();
        fs::write(zips.join(".hidden.zip"), b"x").unwrap();
        fs::write(zips.join("data.tmp"), b"x").unwrap();

        let inventory = source_inventory(cache.path()).unwrap();
        assert!(inventory.contains("packs/zip", ".hidden.zip"));
        assert!(inventory.contains("packs/zip", "data.tmp"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_packs_and_artifacts_are_listed() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let elsewhere = tmp.path().join("elsewhere");
        fs::create_dir_all(elsewhere.join("art-real")).unwrap();
        fs::write(elsewhere.join("lib-2.0.tar.gz"), b"pack").unwrap();

        let cache = tmp.path().join("src");
        fs::create_dir_all(cache.join("packs/tar.gz")).unwrap();
        symlink(
            elsewhere.join("lib-2.0.tar.gz"),
            cache.join("packs/tar.gz/lib-2.0.tar.gz"),
        )
        .unwrap();
        symlink(tmp.path().join("missing"), cache.join("packs/tar.gz/dangling.tar.gz")).unwrap();

        let root = tmp.path().join("bld");
        fs::create_dir_all(root.join("pkgA")).unwrap();
        symlink(elsewhere.join("art-real"), root.join("pkgA/art1")).unwrap();

        let sources = source_inventory(&cache).unwrap();
        assert!(sources.contains("packs/tar.gz", "lib-2.0.tar.gz"));
        assert!(!sources.contains("packs/tar.gz", "dangling.tar.gz"));

        let builds = build_inventory(&root).unwrap();
        assert!(builds.contains("pkgA", "art1"));
    }
}
