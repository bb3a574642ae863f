//! Clip synthesis: turns the authored part of the live pose into a keyframe
//! clip of held curves.

use emote_api_core::{Curve, CurveBinding};
use log::info;

use crate::clip::{Clip, CLIP_EXTENSION, HELD_POSE_DURATION};
use crate::error::Result;
use crate::ids::{AssetPath, NodeId};
use crate::inventory::Inventory;
use crate::path::resolve_path;
use crate::scene::Scene;
use crate::storage::{Asset, AssetStore};

/// Base name used when the caller leaves the clip name empty.
pub const DEFAULT_CLIP_NAME: &str = "face_emotion";

/// One held curve (keys at 0 and one frame later) per included, non-excluded
/// target, bound to `blendShape.<name>` on the mesh's root-relative path.
/// Unselected and excluded targets contribute nothing.
pub fn build_clip(name: &str, scene: &Scene, inventory: &Inventory, root: NodeId) -> Clip {
    let mut clip = Clip::new(name);
    for mesh in inventory.iter() {
        let path = resolve_path(scene, root, mesh.node);
        for target in mesh.targets.iter().filter(|t| t.is_authored()) {
            let weight = scene.weight(mesh.node, target.id).unwrap_or(0.0);
            clip.set_curve(
                CurveBinding::blend_shape(path.clone(), &target.name),
                Curve::held(weight, HELD_POSE_DURATION),
            );
        }
    }
    clip
}

/// Build the clip and persist it as `<folder>/<name>.anim`, suffixed when
/// that path is taken. Saves and refreshes the store before returning the
/// actual path.
pub fn synthesize<S: AssetStore + ?Sized>(
    store: &mut S,
    name: &str,
    folder: &str,
    scene: &Scene,
    inventory: &Inventory,
    root: NodeId,
) -> Result<(AssetPath, Clip)> {
    let name = if name.is_empty() { DEFAULT_CLIP_NAME } else { name };
    let desired = AssetPath::in_folder(folder, &format!("{name}{CLIP_EXTENSION}"));
    let path = store.unique_path(&desired);

    let clip = build_clip(path.file_stem(), scene, inventory, root);

    let path = store.create_asset(&path, Asset::Clip(clip.clone()))?;
    store.save()?;
    store.refresh()?;
    info!("synthesized clip {path} with {} curves", clip.len());
    Ok((path, clip))
}
