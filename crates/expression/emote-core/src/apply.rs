//! Diff/apply engine.
//!
//! Applying a snapshot always lands on a full, deterministic pose: every
//! target first returns to its baseline value with `is_contains = false`,
//! then only the targets named in the snapshot are overlaid and marked
//! included. No residue of a previously applied snapshot survives.
//!
//! Matching is by morph-target name only; entry paths are ignored. Two
//! meshes exposing the same target name both receive the value. This weak
//! matching is relied upon when replaying poses across characters and must
//! not be narrowed to path + name.

use log::debug;

use crate::inventory::Inventory;
use crate::scene::Scene;
use crate::snapshot::{capture_all, PoseSnapshotEntry};

/// Reset every target to `baseline`, then overlay `snapshot`.
/// Entries naming targets absent from every mesh are dropped.
pub fn apply(
    scene: &mut Scene,
    inventory: &mut Inventory,
    baseline: &[PoseSnapshotEntry],
    snapshot: &[PoseSnapshotEntry],
) {
    let mut matched = vec![false; snapshot.len()];

    for mesh in inventory.iter_mut() {
        let writes: Vec<(usize, f32, bool)> = {
            let by_name = mesh.name_index();
            let mut writes: Vec<(usize, f32, bool)> = baseline
                .iter()
                .filter_map(|e| by_name.get(e.target_name.as_str()).map(|&i| (i, e.value, false)))
                .collect();
            for (i, entry) in snapshot.iter().enumerate() {
                if let Some(&index) = by_name.get(entry.target_name.as_str()) {
                    writes.push((index, entry.value, true));
                    matched[i] = true;
                }
            }
            writes
        };
        // Reset writes precede overlay writes.
        for (index, value, contains) in writes {
            scene.set_weight(mesh.node, index, value);
            mesh.targets[index].is_contains = contains;
        }
    }

    let dropped = matched.iter().filter(|m| !**m).count();
    if dropped > 0 {
        debug!("apply: {dropped} snapshot entries matched no morph target");
    }
}

/// Show the baseline as a fully authored pose (`is_contains` true for every
/// target named in the baseline).
pub fn reset_to_default(
    scene: &mut Scene,
    inventory: &mut Inventory,
    baseline: &[PoseSnapshotEntry],
) {
    apply(scene, inventory, baseline, baseline);
}

/// Promote the current live pose to the new baseline and apply it. Returns
/// the new baseline.
pub fn set_to_default(scene: &mut Scene, inventory: &mut Inventory) -> Vec<PoseSnapshotEntry> {
    let baseline = capture_all(scene, inventory);
    reset_to_default(scene, inventory, &baseline);
    baseline
}

/// Drive every included target to its minimum frame weight.
pub fn reset_all_values(scene: &mut Scene, inventory: &Inventory) {
    for mesh in inventory.iter() {
        for target in mesh.targets.iter().filter(|t| t.is_contains) {
            scene.set_min_value(mesh.node, target.id);
        }
    }
}
