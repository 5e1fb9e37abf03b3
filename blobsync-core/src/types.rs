//! Domain types shared by the planner, pusher and storage layers.
//!
//! Collection keys and item names are newtypes over `String`; both borrow as
//! `str` so maps keyed by them can be queried with plain string slices.

use std::borrow::Borrow;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A manifest collection key: a package name for build artifacts, a
/// pack-type subdirectory (`packs/tar.gz`) for source packs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionKey(pub String);

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CollectionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CollectionKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for CollectionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The name of a single item inside a collection: an artifact directory name
/// or a source pack filename.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemName(pub String);

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ItemName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for ItemName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Manifest kind
// ---------------------------------------------------------------------------

/// The two independent object classes synchronized to a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// Packaged build artifacts under `/bld`.
    Build,
    /// Verbatim source packs under `/src`.
    Source,
}

impl ManifestKind {
    /// Remote namespace root for this object class.
    pub fn remote_root(self) -> RemotePath {
        match self {
            ManifestKind::Build => RemotePath::new("/bld"),
            ManifestKind::Source => RemotePath::new("/src"),
        }
    }

    /// File name of the manifest blob, both remotely and in the local cache.
    pub fn manifest_filename(self) -> &'static str {
        match self {
            ManifestKind::Build => "build_manifest.json",
            ManifestKind::Source => "source_manifest.json",
        }
    }

    /// Remote path of the manifest blob: `<root>/<manifest_filename>`.
    pub fn remote_manifest_path(self) -> RemotePath {
        self.remote_root().join(self.manifest_filename())
    }

    /// Local manifest cache: a sibling of the artifact root / source cache root.
    pub fn local_manifest_path(self, root: &Path) -> PathBuf {
        match root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.join(self.manifest_filename())
            }
            _ => root.join("..").join(self.manifest_filename()),
        }
    }

    /// Plural noun used in log and report lines.
    pub fn items_label(self) -> &'static str {
        match self {
            ManifestKind::Build => "artifacts",
            ManifestKind::Source => "source packs",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestKind::Build => write!(f, "build"),
            ManifestKind::Source => write!(f, "source"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote paths
// ---------------------------------------------------------------------------

/// An absolute, `/`-separated path in the remote namespace.
///
/// Always starts with `/`, never ends with `/` (except the bare root), and
/// contains no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// Build a normalized path from any `/`-separated string.
    pub fn new(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        Self(format!("/{}", segments.join("/")))
    }

    /// Append one or more `/`-separated segments.
    pub fn join(&self, tail: &str) -> Self {
        Self::new(&format!("{}/{}", self.0, tail))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments without the leading root marker.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Item sets: inventory and push plan
// ---------------------------------------------------------------------------

/// Items grouped by collection key, sorted on both levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSet {
    collections: BTreeMap<CollectionKey, BTreeSet<ItemName>>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection even when it has no items yet.
    pub fn add_collection(&mut self, key: impl Into<CollectionKey>) {
        self.collections.entry(key.into()).or_default();
    }

    pub fn insert(&mut self, key: impl Into<CollectionKey>, item: impl Into<ItemName>) {
        self.collections
            .entry(key.into())
            .or_default()
            .insert(item.into());
    }

    pub fn contains(&self, key: &str, item: &str) -> bool {
        self.collections
            .get(key)
            .is_some_and(|items| items.contains(item))
    }

    pub fn items(&self, key: &str) -> Option<&BTreeSet<ItemName>> {
        self.collections.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CollectionKey> {
        self.collections.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, CollectionKey, BTreeSet<ItemName>> {
        self.collections.iter()
    }

    /// Every `(key, item)` pair, in sorted order.
    pub fn pairs(&self) -> impl Iterator<Item = (&CollectionKey, &ItemName)> {
        self.collections
            .iter()
            .flat_map(|(key, items)| items.iter().map(move |item| (key, item)))
    }

    /// Total number of items across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = (&'a CollectionKey, &'a BTreeSet<ItemName>);
    type IntoIter = btree_map::Iter<'a, CollectionKey, BTreeSet<ItemName>>;

    fn into_iter(self) -> Self::IntoIter {
        self.collections.iter()
    }
}

/// Read-only view of what exists locally. Collections may be empty.
pub type Inventory = ItemSet;

/// Items selected for upload in one run. Only non-empty collections appear.
pub type PushPlan = ItemSet;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
