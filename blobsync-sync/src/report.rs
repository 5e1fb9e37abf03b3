//! Dry-run reporter: what a push would skip and what it would upload.
//!
//! Pure rendering over [`planner::classify`]; touches neither the remote nor
//! the manifest cache.

use std::fmt::Write as _;

use blobsync_core::{ItemSet, Manifest, ManifestKind};

use crate::planner;

/// Items a push would skip and push, plus the closing `--force` hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunReport {
    pub kind: ManifestKind,
    pub skipping: ItemSet,
    pub pushing: ItemSet,
    pub hint: &'static str,
}

impl DryRunReport {
    /// Classify `inventory` against the cached `manifest`.
    pub fn build<M: Manifest>(
        inventory: &ItemSet,
        manifest: &M,
        force: bool,
        hint: &'static str,
    ) -> Self {
        let split = planner::classify(inventory, manifest, force);
        Self {
            kind: M::KIND,
            skipping: split.skip,
            pushing: split.push,
            hint,
        }
    }

    /// `<key>/<item> Skipping` lines, then `<key>/<item> Pushing` lines,
    /// each grouped by collection key, then the hint.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, item) in self.skipping.pairs() {
            let _ = writeln!(out, "{key}/{item} Skipping");
        }
        for (key, item) in self.pushing.pairs() {
            let _ = writeln!(out, "{key}/{item} Pushing");
        }
        let _ = writeln!(out, "{}", self.hint);
        out
    }
}
