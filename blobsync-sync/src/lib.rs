//! # blobsync-sync
//!
//! Push orchestration for build artifacts and source packs.
//!
//! Call [`pipeline::push`] with a [`target::PushTarget`] to reconcile the
//! manifests, plan the delta and upload it item by item, or
//! [`pipeline::dry_run`] to preview the same decision from the local manifest
//! cache alone. [`pipeline::run`] and [`pipeline::run_dry`] drive both object
//! classes from a [`blobsync_core::config::StoreConfig`].

pub mod error;
pub mod fetch;
pub mod inventory;
pub mod manifest_store;
pub mod packager;
pub mod pipeline;
pub mod planner;
pub mod progress;
pub mod pusher;
pub mod report;
pub mod target;

pub use error::SyncError;
pub use fetch::{FetchedManifest, RemoteManifestStatus};
pub use pipeline::{PushOptions, PushOutcome, PushScope};
pub use progress::LogProgress;
pub use pusher::{PushedItem, Pusher};
pub use report::DryRunReport;
pub use target::{BuildStore, PackagedItem, PushTarget, SourceCache};
