//! Manifests: the authoritative record of what already exists remotely.
//!
//! ```text
//! build_manifest.json   { "<package>": { "<artifact>": "<sha256 hex>" } }
//! source_manifest.json  { "<packs/type>": ["<pack filename>", ...] }
//! ```
//!
//! Both shapes implement [`Manifest`]. Entries are only ever inserted or
//! overwritten; there is no removal API.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{CollectionKey, ItemName, ManifestKind};

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A build artifact recorded together with the digest of its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub name: ItemName,
    pub digest: String,
}

/// A source pack recorded by membership only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub name: ItemName,
}

/// Either entry shape, for code that reports on both object classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    Digest(DigestEntry),
    Name(NameEntry),
}

impl ManifestEntry {
    pub fn name(&self) -> &ItemName {
        match self {
            ManifestEntry::Digest(entry) => &entry.name,
            ManifestEntry::Name(entry) => &entry.name,
        }
    }

    pub fn digest(&self) -> Option<&str> {
        match self {
            ManifestEntry::Digest(entry) => Some(&entry.digest),
            ManifestEntry::Name(_) => None,
        }
    }
}

impl From<DigestEntry> for ManifestEntry {
    fn from(entry: DigestEntry) -> Self {
        ManifestEntry::Digest(entry)
    }
}

impl From<NameEntry> for ManifestEntry {
    fn from(entry: NameEntry) -> Self {
        ManifestEntry::Name(entry)
    }
}

// ---------------------------------------------------------------------------
// Manifest trait
// ---------------------------------------------------------------------------

/// Behaviour shared by the build and source manifests.
pub trait Manifest: Clone + Default + Serialize + DeserializeOwned {
    /// The entry shape this manifest records.
    type Entry: Clone + Into<ManifestEntry>;

    /// Which object class this manifest describes.
    const KIND: ManifestKind;

    /// Whether `item` is recorded under `key`, regardless of digest.
    fn contains(&self, key: &str, item: &str) -> bool;

    /// Create an empty collection for `key` if absent.
    fn ensure_collection(&mut self, key: &CollectionKey);

    /// Record `entry` under `key`, overwriting a previous entry of that name.
    fn record(&mut self, key: &CollectionKey, entry: Self::Entry);

    /// Number of recorded `(key, item)` pairs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Build manifest
// ---------------------------------------------------------------------------

/// `{ package: { artifact: digest } }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildManifest {
    packages: BTreeMap<CollectionKey, BTreeMap<ItemName, String>>,
}

impl BuildManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded digest for `package/artifact`, if any.
    pub fn digest(&self, package: &str, artifact: &str) -> Option<&str> {
        self.packages
            .get(package)
            .and_then(|artifacts| artifacts.get(artifact))
            .map(String::as_str)
    }
}

impl Manifest for BuildManifest {
    type Entry = DigestEntry;
    const KIND: ManifestKind = ManifestKind::Build;

    fn contains(&self, key: &str, item: &str) -> bool {
        self.packages
            .get(key)
            .is_some_and(|artifacts| artifacts.contains_key(item))
    }

    fn ensure_collection(&mut self, key: &CollectionKey) {
        self.packages.entry(key.clone()).or_default();
    }

    fn record(&mut self, key: &CollectionKey, entry: DigestEntry) {
        self.packages
            .entry(key.clone())
            .or_default()
            .insert(entry.name, entry.digest);
    }

    fn len(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Source manifest
// ---------------------------------------------------------------------------

/// `{ subdir: [pack, ...] }`, serialized sorted and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceManifest {
    subdirs: BTreeMap<CollectionKey, BTreeSet<ItemName>>,
}

impl SourceManifest {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Manifest for SourceManifest {
    type Entry = NameEntry;
    const KIND: ManifestKind = ManifestKind::Source;

    fn contains(&self, key: &str, item: &str) -> bool {
        self.subdirs
            .get(key)
            .is_some_and(|packs| packs.contains(item))
    }

    fn ensure_collection(&mut self, key: &CollectionKey) {
        self.subdirs.entry(key.clone()).or_default();
    }

    fn record(&mut self, key: &CollectionKey, entry: NameEntry) {
        self.subdirs
            .entry(key.clone())
            .or_default()
            .insert(entry.name);
    }

    fn len(&self) -> usize {
        self.subdirs.values().map(BTreeSet::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
