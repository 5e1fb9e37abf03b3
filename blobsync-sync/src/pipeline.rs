//! Push pipeline entrypoints used by the CLI.
//!
//! Remote fetch → plan → local cache refresh → push (persisting after every
//! item). Dry-run plans against the local cache and stops there.

use blobsync_core::config::StoreConfig;
use blobsync_core::{Manifest, ManifestKind, ProgressListener, PushPlan, RemoteStorage};

use crate::fetch::{self, RemoteManifestStatus};
use crate::pusher::{PushedItem, Pusher};
use crate::report::DryRunReport;
use crate::target::{BuildStore, PushTarget, SourceCache};
use crate::{manifest_store, planner, SyncError};

/// Which object classes a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushScope {
    Build,
    Source,
    #[default]
    BuildAndSource,
}

impl PushScope {
    pub fn includes(self, kind: ManifestKind) -> bool {
        matches!(
            (self, kind),
            (PushScope::BuildAndSource, _)
                | (PushScope::Build, ManifestKind::Build)
                | (PushScope::Source, ManifestKind::Source)
        )
    }
}

/// Flags shared by real and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Push items even when the manifest already records them.
    pub force: bool,
}

/// Outcome of a completed push for one object class.
#[derive(Debug)]
pub struct PushOutcome {
    pub kind: ManifestKind,
    pub remote_status: RemoteManifestStatus,
    pub plan: PushPlan,
    pub pushed: Vec<PushedItem>,
    /// Items present locally but already recorded remotely.
    pub skipped: usize,
}

/// Fetch the remote manifest, plan against it and push one object class.
///
/// The local manifest cache is overwritten with the remote view before the
/// first upload; it is only read back by [`dry_run`].
pub fn push<T: PushTarget>(
    target: &T,
    storage: &dyn RemoteStorage,
    progress: &dyn ProgressListener,
    options: PushOptions,
) -> Result<PushOutcome, SyncError> {
    let kind = <T::Manifest as Manifest>::KIND;
    let local_path = target.local_manifest_path();

    tracing::info!("getting remote {kind} manifest");
    let fetched = fetch::fetch::<T::Manifest>(storage, progress);
    let remote_status = fetched.status.clone();
    let mut manifest = fetched.manifest;

    tracing::info!("calculating which {} to push", kind.items_label());
    let inventory = target.inventory()?;
    let plan = planner::plan(&inventory, &mut manifest, options.force);
    let skipped = inventory.len() - plan.len();

    // The local cache mirrors the remote just read; entries it held from
    // other remotes or earlier runs are dropped.
    tracing::info!("writing local copy of remote manifest");
    manifest_store::save(&local_path, &manifest)?;

    let pushed = Pusher::new(storage, progress).push(target, &plan, &mut manifest)?;
    tracing::info!("pushed {} {}", pushed.len(), kind.items_label());

    Ok(PushOutcome {
        kind,
        remote_status,
        plan,
        pushed,
        skipped,
    })
}

/// Compare local items to the last local copy of the remote manifest.
pub fn dry_run<T: PushTarget>(target: &T, options: PushOptions) -> Result<DryRunReport, SyncError> {
    let kind = <T::Manifest as Manifest>::KIND;
    tracing::info!("comparing {kind} store to last local copy of remote manifest");
    let local: T::Manifest = manifest_store::load(&target.local_manifest_path());
    let inventory = target.inventory()?;
    Ok(DryRunReport::build(
        &inventory,
        &local,
        options.force,
        target.force_hint(),
    ))
}

/// Push build artifacts from the configured artifact root.
pub fn push_build(
    config: &StoreConfig,
    storage: &dyn RemoteStorage,
    progress: &dyn ProgressListener,
    options: PushOptions,
) -> Result<PushOutcome, SyncError> {
    push(&BuildStore::new(&config.artifact_root), storage, progress, options)
}

/// Push source packs from the configured source cache.
pub fn push_source(
    config: &StoreConfig,
    storage: &dyn RemoteStorage,
    progress: &dyn ProgressListener,
    options: PushOptions,
) -> Result<PushOutcome, SyncError> {
    push(&SourceCache::new(&config.source_cache), storage, progress, options)
}

/// Run a real push for every object class in `scope`, build first.
pub fn run(
    config: &StoreConfig,
    scope: PushScope,
    storage: &dyn RemoteStorage,
    progress: &dyn ProgressListener,
    options: PushOptions,
) -> Result<Vec<PushOutcome>, SyncError> {
    let mut outcomes = Vec::new();
    if scope.includes(ManifestKind::Build) {
        outcomes.push(push_build(config, storage, progress, options)?);
    }
    if scope.includes(ManifestKind::Source) {
        outcomes.push(push_source(config, storage, progress, options)?);
    }
    Ok(outcomes)
}

/// Dry-run every object class in `scope`, build first. Needs no storage.
pub fn run_dry(
    config: &StoreConfig,
    scope: PushScope,
    options: PushOptions,
) -> Result<Vec<DryRunReport>, SyncError> {
    let mut reports = Vec::new();
    if scope.includes(ManifestKind::Build) {
        reports.push(dry_run(&BuildStore::new(&config.artifact_root), options)?);
    }
    if scope.includes(ManifestKind::Source) {
        reports.push(dry_run(&SourceCache::new(&config.source_cache), options)?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use blobsync_core::{BuildManifest, FolderStorage, SilentProgress};
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> StoreConfig {
        StoreConfig {
            artifact_root: tmp.path().join("bld"),
            source_cache: tmp.path().join("src"),
        }
    }

    #[test]
    fn scope_selection() {
        assert!(PushScope::Build.includes(ManifestKind::Build));
        assert!(!PushScope::Build.includes(ManifestKind::Source));
        assert!(PushScope::BuildAndSource.includes(ManifestKind::Source));
        assert_eq!(PushScope::default(), PushScope::BuildAndSource);
    }

    #[test]
    fn run_with_empty_stores_pushes_nothing() {
        let tmp = TempDir::new().unwrap();
        let remote = TempDir::new().unwrap();
        let config = config(&tmp);
        fs::create_dir_all(&config.artifact_root).unwrap();
        fs::create_dir_all(&config.source_cache).unwrap();

        let storage = FolderStorage::new(remote.path());
        let outcomes = run(
            &config,
            PushScope::BuildAndSource,
            &storage,
            &SilentProgress,
            PushOptions::default(),
        )
        .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.pushed.is_empty()));
        assert!(tmp.path().join("build_manifest.json").is_file());
        assert!(tmp.path().join("source_manifest.json").is_file());
    }

    #[test]
    fn dry_run_does_not_write_manifest_cache() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        fs::create_dir_all(config.artifact_root.join("pkgA/art1")).unwrap();

        let reports = run_dry(&config, PushScope::Build, PushOptions::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].pushing.contains("pkgA", "art1"));
        assert!(!tmp.path().join("build_manifest.json").exists());
    }

    #[test]
    fn local_cache_is_replaced_by_remote_view() {
        let tmp = TempDir::new().unwrap();
        let remote = TempDir::new().unwrap();
        let config = config(&tmp);
        fs::create_dir_all(config.artifact_root.join("pkgNew")).unwrap();
        fs::write(
            tmp.path().join("build_manifest.json"),
            r#"{"pkgOld":{"gone":"cafe"}}"#,
        )
        .unwrap();

        let storage = FolderStorage::new(remote.path());
        push_build(&config, &storage, &SilentProgress, PushOptions::default()).unwrap();

        let cached: BuildManifest = manifest_store::load(&tmp.path().join("build_manifest.json"));
        assert_eq!(cached.digest("pkgOld", "gone"), None);
        assert_eq!(
            serde_json::to_string(&cached).unwrap(),
            r#"{"pkgNew":{}}"#
        );
    }
}
