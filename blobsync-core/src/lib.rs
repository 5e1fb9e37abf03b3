//! blobsync core library: domain types, manifests, storage capability, config.
//!
//! - [`types`]: newtypes, [`ManifestKind`], [`RemotePath`], inventory / plan sets
//! - [`manifest`]: [`BuildManifest`] and [`SourceManifest`]
//! - [`remote`]: the [`RemoteStorage`] capability and progress reporting
//! - [`folder`]: directory-backed storage
//! - [`config`]: store roots and named remotes

pub mod config;
pub mod error;
pub mod folder;
pub mod manifest;
pub mod remote;
pub mod types;

pub use error::{CoreError, RemoteError};
pub use folder::FolderStorage;
pub use manifest::{BuildManifest, DigestEntry, Manifest, ManifestEntry, NameEntry, SourceManifest};
pub use remote::{ByteSource, ProgressListener, RemoteStorage, SilentProgress};
pub use types::{CollectionKey, Inventory, ItemName, ItemSet, ManifestKind, PushPlan, RemotePath};
