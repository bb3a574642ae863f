//! Pose snapshots: flat, order-preserving lists of (path, target, value).
//!
//! Three provenances share one shape:
//! - baseline ([`capture_all`]): every target of every mesh, empty path
//! - selective ([`capture_selected`]): authored targets only, root-relative path
//! - loaded ([`extract_snapshot`]): blend-shape curves of a keyframe clip

use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::ids::NodeId;
use crate::inventory::Inventory;
use crate::path::resolve_path;
use crate::scene::Scene;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshotEntry {
    /// Root-relative node path; may be empty.
    pub path: String,
    pub target_name: String,
    pub value: f32,
    /// Loader-side pick flag. Defaults to selected.
    pub selected: bool,
}

impl PoseSnapshotEntry {
    pub fn new(path: impl Into<String>, target_name: impl Into<String>, value: f32) -> Self {
        Self {
            path: path.into(),
            target_name: target_name.into(),
            value,
            selected: true,
        }
    }
}

/// Baseline capture: one entry per morph target across every mesh, in scan
/// order, regardless of inclusion or exclusion.
pub fn capture_all(scene: &Scene, inventory: &Inventory) -> Vec<PoseSnapshotEntry> {
    let mut out = Vec::with_capacity(inventory.target_count());
    for mesh in inventory.iter() {
        for target in &mesh.targets {
            let weight = scene.weight(mesh.node, target.id).unwrap_or(0.0);
            out.push(PoseSnapshotEntry::new("", target.name.clone(), weight));
        }
    }
    out
}

/// Capture only included, non-excluded targets, addressed relative to `root`.
pub fn capture_selected(
    scene: &Scene,
    inventory: &Inventory,
    root: NodeId,
) -> Vec<PoseSnapshotEntry> {
    let mut out = Vec::new();
    for mesh in inventory.iter() {
        let path = resolve_path(scene, root, mesh.node);
        for target in mesh.targets.iter().filter(|t| t.is_authored()) {
            let weight = scene.weight(mesh.node, target.id).unwrap_or(0.0);
            out.push(PoseSnapshotEntry::new(path.clone(), target.name.clone(), weight));
        }
    }
    out
}

/// Read a pose out of a keyframe clip. Only blend-shape bindings are kept;
/// the value is the curve sampled at time 0. Other bindings are ignored.
pub fn extract_snapshot(clip: &Clip) -> Vec<PoseSnapshotEntry> {
    clip.entries()
        .iter()
        .filter_map(|entry| {
            let name = entry.binding.blend_shape_name()?;
            let value = entry.curve.evaluate(0.0)?;
            Some(PoseSnapshotEntry::new(entry.binding.path.clone(), name, value))
        })
        .collect()
}

/// Entries the caller left selected.
pub fn selected_entries(entries: &[PoseSnapshotEntry]) -> Vec<PoseSnapshotEntry> {
    entries.iter().filter(|e| e.selected).cloned().collect()
}
