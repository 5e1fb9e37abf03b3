//! Delta planner: which local items must be pushed.
//!
//! An item is skipped only when the manifest already records it under the
//! same collection key and `force` is off. Digests are never compared: a
//! recorded artifact whose content changed locally still needs `force`.

use blobsync_core::{Inventory, ItemSet, Manifest, PushPlan};

/// Inventory split into items to push and items already on the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub push: PushPlan,
    pub skip: ItemSet,
}

/// Pure split of `inventory` against `manifest`. No logging, no mutation.
pub fn classify<M: Manifest>(inventory: &Inventory, manifest: &M, force: bool) -> Classification {
    let mut result = Classification::default();
    for (key, item) in inventory.pairs() {
        if !force && manifest.contains(&key.0, &item.0) {
            result.skip.insert(key.clone(), item.clone());
        } else {
            result.push.insert(key.clone(), item.clone());
        }
    }
    result
}

/// Compute the push plan for a real run.
///
/// Collections present locally but unknown to `manifest` are added to it as
/// empty entries, so the next persisted manifest lists them.
pub fn plan<M: Manifest>(inventory: &Inventory, manifest: &mut M, force: bool) -> PushPlan {
    for key in inventory.keys() {
        manifest.ensure_collection(key);
    }

    let Classification { push, skip } = classify(inventory, manifest, force);
    for (key, item) in skip.pairs() {
        tracing::info!("{key}/{item} already on remote");
    }
    tracing::info!(
        "{} {} to push, {} already on remote",
        push.len(),
        M::KIND.items_label(),
        skip.len()
    );
    push
}
