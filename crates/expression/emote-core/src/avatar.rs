//! Character model: one scan of a character root inside the shared scene.
//!
//! An [`Avatar`] never owns scene state. It holds a clone of the session's
//! [`SceneHandle`], so two models built on the same handle always observe
//! the same live weights and the same descriptor.

use log::{debug, warn};

use crate::apply;
use crate::clip::Clip;
use crate::config::Config;
use crate::controller::{target_layer_index, AnimatorController, StateMachine};
use crate::descriptor::{AnimationSet, EyelidBlendShape, EyelidType, LipSyncStyle, VISEMES};
use crate::error::{EmoteError, Result};
use crate::exclusion::{reclassify, ExclusionList};
use crate::ids::{AssetPath, NodeId};
use crate::inventory::{scan, Inventory};
use crate::path::find_by_path;
use crate::scene::{Scene, SceneHandle};
use crate::snapshot::{capture_all, PoseSnapshotEntry};
use crate::storage::AssetStore;

/// Scan-derived facts shown alongside the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvatarMetadata {
    pub triangle_count: usize,
    pub triangle_count_inactive: usize,
    /// Distinct material names in scan order.
    pub materials: Vec<String>,
    pub lip_sync_style: LipSyncStyle,
    /// Viseme shape keys, only for viseme blend-shape lip sync on a face mesh.
    pub lip_sync_shape_key_names: Option<Vec<String>>,
    pub eye_position: [f32; 3],
    pub animation_set: AnimationSet,
    pub avatar_id: String,
}

#[derive(Debug, Clone)]
pub struct Avatar {
    scene: SceneHandle,
    root: NodeId,
    has_descriptor: bool,
    pub fx_controller: Option<AssetPath>,
    pub gesture_controller: Option<AssetPath>,
    /// Layer of the FX controller that authoring targets.
    pub target_fx_layer_index: usize,
    pub face_mesh: Option<NodeId>,
    pub inventory: Inventory,
    pub baseline: Vec<PoseSnapshotEntry>,
    pub metadata: AvatarMetadata,
    /// Indexed by [`EyelidBlendShape::slot`].
    pub eyelid_blend_shape_names: [Option<String>; 3],
    pub eyelid_mesh: Option<NodeId>,
    /// Folder baked clips are written to.
    pub anim_saved_folder: String,
}

impl Avatar {
    /// Full scan of `root`. A root without a descriptor yields an empty model.
    /// A descriptor pointing at a missing controller asset is treated as unbound.
    pub fn load<S: AssetStore + ?Sized>(
        scene: SceneHandle,
        root: NodeId,
        store: &S,
        config: &Config,
    ) -> Result<Self> {
        let mut avatar = Self {
            scene,
            root,
            has_descriptor: false,
            fx_controller: None,
            gesture_controller: None,
            target_fx_layer_index: 0,
            face_mesh: None,
            inventory: Inventory::default(),
            baseline: Vec::new(),
            metadata: AvatarMetadata::default(),
            eyelid_blend_shape_names: Default::default(),
            eyelid_mesh: None,
            anim_saved_folder: config.default_save_folder.clone(),
        };
        avatar.populate(store, &config.exclusions)?;
        Ok(avatar)
    }

    /// Rebuild every derived field from the current scene. Nothing carries
    /// over from the previous scan except the scene handle and root.
    pub fn reload<S: AssetStore + ?Sized>(&mut self, store: &S, config: &Config) -> Result<()> {
        *self = Self::load(self.scene.clone(), self.root, store, config)?;
        Ok(())
    }

    fn populate<S: AssetStore + ?Sized>(
        &mut self,
        store: &S,
        exclusions: &ExclusionList,
    ) -> Result<()> {
        let scene = self.scene.clone();
        let scene = scene.borrow();
        let Some(descriptor) = scene.descriptor(self.root) else {
            debug!("node {:?} has no avatar descriptor", self.root);
            return Ok(());
        };
        self.has_descriptor = true;

        self.metadata.eye_position = descriptor.view_position;
        self.metadata.animation_set = descriptor.animation_set;
        self.metadata.avatar_id = descriptor.blueprint_id.clone();
        self.metadata.lip_sync_style = descriptor.lip_sync;

        let fx = descriptor.fx_controller();
        if let (Some(path), Some(controller)) = (fx, bound_controller(store, fx, "fx")?) {
            self.target_fx_layer_index = target_layer_index(&controller.layer_names());
            self.anim_saved_folder = path.folder().to_string();
            self.fx_controller = Some(path.clone());
        }
        if bound_controller(store, descriptor.gesture_controller(), "gesture")?.is_some() {
            self.gesture_controller = descriptor.gesture_controller().cloned();
        }

        let eyelids = &descriptor.eyelids;
        self.eyelid_mesh = eyelids.skinned_mesh;
        if let (Some(mesh), EyelidType::Blendshapes) = (eyelids.skinned_mesh, eyelids.eyelid_type) {
            if let Some(shared) = scene.shared_mesh(mesh) {
                for slot in EyelidBlendShape::ALL {
                    let index = eyelids.blend_shape_indices[slot.slot()];
                    if index < 0 {
                        continue;
                    }
                    self.eyelid_blend_shape_names[slot.slot()] =
                        shared.blend_shape_name(index as usize).map(str::to_string);
                }
            }
        }

        self.face_mesh = descriptor.viseme_skinned_mesh;
        if self.face_mesh.is_some() && descriptor.lip_sync == LipSyncStyle::VisemeBlendShape {
            self.metadata.lip_sync_shape_key_names = Some(descriptor.viseme_blend_shapes.clone());
        }

        self.collect_render_stats(&scene);

        self.inventory = scan(&scene, self.root, self.face_mesh);
        reclassify(&mut self.inventory, exclusions);
        self.baseline = capture_all(&scene, &self.inventory);
        Ok(())
    }

    fn collect_render_stats(&mut self, scene: &Scene) {
        for id in scene.descendants(self.root) {
            let Some(renderer) = scene.renderer(id) else {
                continue;
            };
            for material in &renderer.materials {
                if !self.metadata.materials.contains(material) {
                    self.metadata.materials.push(material.clone());
                }
            }
            let Some(mesh) = renderer.shared_mesh.as_ref() else {
                continue;
            };
            if scene.is_active_in_hierarchy(id) {
                self.metadata.triangle_count += mesh.triangle_count as usize;
            } else {
                self.metadata.triangle_count_inactive += mesh.triangle_count as usize;
            }
        }
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn has_descriptor(&self) -> bool {
        self.has_descriptor
    }

    /// Reset to baseline, then overlay `snapshot`.
    pub fn apply(&mut self, snapshot: &[PoseSnapshotEntry]) {
        let mut scene = self.scene.borrow_mut();
        apply::apply(&mut scene, &mut self.inventory, &self.baseline, snapshot);
    }

    pub fn reset_to_default(&mut self) {
        let mut scene = self.scene.borrow_mut();
        apply::reset_to_default(&mut scene, &mut self.inventory, &self.baseline);
    }

    /// Promote the live pose to this model's baseline. Returns the new baseline.
    pub fn set_to_default(&mut self) -> Vec<PoseSnapshotEntry> {
        let mut scene = self.scene.borrow_mut();
        self.baseline = apply::set_to_default(&mut scene, &mut self.inventory);
        self.baseline.clone()
    }

    pub fn reset_all_values(&mut self) {
        let mut scene = self.scene.borrow_mut();
        apply::reset_all_values(&mut scene, &self.inventory);
    }

    /// Live weight of target `target` on inventory mesh `mesh`.
    pub fn weight(&self, mesh: usize, target: usize) -> Option<f32> {
        let node = self.inventory.mesh(mesh)?.node;
        self.scene.borrow().weight(node, target)
    }

    pub fn set_weight(&mut self, mesh: usize, target: usize, weight: f32) -> bool {
        let Some(node) = self.inventory.mesh(mesh).map(|m| m.node) else {
            return false;
        };
        self.scene.borrow_mut().set_weight(node, target, weight)
    }

    pub fn set_min_value(&mut self, mesh: usize, target: usize) -> bool {
        let Some(node) = self.inventory.mesh(mesh).map(|m| m.node) else {
            return false;
        };
        self.scene.borrow_mut().set_min_value(node, target)
    }

    pub fn set_max_value(&mut self, mesh: usize, target: usize) -> bool {
        let Some(node) = self.inventory.mesh(mesh).map(|m| m.node) else {
            return false;
        };
        self.scene.borrow_mut().set_max_value(node, target)
    }

    /// Bindings of `clip` whose path names no node under the root.
    pub fn missing_paths(&self, clip: &Clip) -> Vec<String> {
        let scene = self.scene.borrow();
        let mut missing: Vec<String> = Vec::new();
        for binding in clip.bindings() {
            if find_by_path(&scene, self.root, &binding.path).is_none()
                && !missing.contains(&binding.path)
            {
                missing.push(binding.path.clone());
            }
        }
        missing
    }

    /// Switch lip sync to viseme blend shapes and auto-map every viseme slot
    /// whose conventional shape key (`vrc.v_<slot>`, else `VRC.v_<slot>`)
    /// exists on the face mesh. Unmatched slots keep their previous value.
    /// Picks the first skinned renderer under the root when no face mesh is set.
    pub fn set_lip_sync_to_viseme(&mut self) {
        if !self.has_descriptor {
            return;
        }
        let mut scene = self.scene.borrow_mut();
        self.metadata.lip_sync_style = LipSyncStyle::VisemeBlendShape;

        if self.face_mesh.is_none() {
            self.face_mesh = scene
                .descendants(self.root)
                .into_iter()
                .find(|id| scene.renderer(*id).is_some_and(|r| r.is_skinned()));
        }
        let face_mesh = self.face_mesh;
        let names: Vec<Option<String>> = match face_mesh.and_then(|id| scene.shared_mesh(id)) {
            Some(mesh) => VISEMES
                .iter()
                .map(|slot| {
                    [format!("vrc.v_{slot}"), format!("VRC.v_{slot}")]
                        .into_iter()
                        .find(|n| mesh.blend_shape_index(n).is_some())
                })
                .collect(),
            None => Vec::new(),
        };

        let Some(descriptor) = scene.descriptor_mut(self.root) else {
            return;
        };
        descriptor.lip_sync = LipSyncStyle::VisemeBlendShape;
        descriptor.viseme_skinned_mesh = face_mesh;
        if descriptor.viseme_blend_shapes.len() < VISEMES.len() {
            descriptor.viseme_blend_shapes.resize(VISEMES.len(), String::new());
        }
        for (slot, name) in names.into_iter().enumerate() {
            if let Some(name) = name {
                descriptor.viseme_blend_shapes[slot] = name;
            }
        }
        if face_mesh.is_some() {
            self.metadata.lip_sync_shape_key_names = Some(descriptor.viseme_blend_shapes.clone());
        }
    }

    /// Copy the persisted references (controller bindings, layer, save
    /// folder) from `other`.
    pub fn copy_persisted_refs(&mut self, other: &Avatar) {
        self.fx_controller = other.fx_controller.clone();
        self.gesture_controller = other.gesture_controller.clone();
        self.target_fx_layer_index = other.target_fx_layer_index;
        self.anim_saved_folder = other.anim_saved_folder.clone();
    }
}

/// Controller bound in a descriptor slot. A reference to a missing asset
/// reads as unbound.
fn bound_controller<S: AssetStore + ?Sized>(
    store: &S,
    path: Option<&AssetPath>,
    slot: &str,
) -> Result<Option<AnimatorController>> {
    let Some(path) = path else {
        return Ok(None);
    };
    match store.load_controller(path) {
        Ok(controller) => Ok(Some(controller)),
        Err(EmoteError::AssetNotFound(_)) => {
            warn!("{slot} controller {path} is missing; treating it as unbound");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
