//! Editing session over one character.
//!
//! The session owns a committed and a working [`Avatar`], both scanned from
//! the same [`SceneHandle`]. Pose edits go through the working model; commit
//! copies its persisted references into the committed model and rescans both.

use log::{debug, info, warn};

use crate::avatar::Avatar;
use crate::config::{Config, SortType};
use crate::controller::{
    is_proxy_clip, opposite_hand_layer, AnimatorController, Motion, StateMachine,
    CONTROLLER_EXTENSION,
};
use crate::descriptor::{FX_LAYER_SLOT, GESTURE_LAYER_SLOT};
use crate::error::Result;
use crate::exclusion::{reclassify, ExclusionList};
use crate::ids::{AssetPath, NodeId};
use crate::inventory::MorphTargetEntry;
use crate::scene::SceneHandle;
use crate::snapshot::{extract_snapshot, selected_entries, PoseSnapshotEntry};
use crate::storage::{Asset, AssetStore};
use crate::synth::synthesize;

/// Partial configuration the caller should surface to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advisory {
    NoDescriptor,
    NoFxController,
    NoGestureController,
    /// Bake creates the clip but binds it nowhere.
    NoStatesInLayer,
    /// The gesture controller has no state matching the selected FX state.
    HandStateNotFound,
}

/// Action a caller can offer to resolve an [`Advisory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remediation {
    CreateFxController,
    CreateGestureController,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::NoDescriptor => "No avatar descriptor on the selected root",
            Advisory::NoFxController => "No FX layer controller",
            Advisory::NoGestureController => "No gesture layer controller",
            Advisory::NoStatesInLayer => {
                "Create only: the target layer has no states to bind the clip to"
            }
            Advisory::HandStateNotFound => {
                "Hand pose can't be changed: target layer or state not found"
            }
        }
    }

    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Advisory::NoFxController => Some(Remediation::CreateFxController),
            Advisory::NoGestureController => Some(Remediation::CreateGestureController),
            _ => None,
        }
    }
}

pub struct Session {
    scene: SceneHandle,
    root: NodeId,
    committed: Avatar,
    working: Avatar,
    config: Config,
    clip_name: String,
    selected_state: usize,
    /// Folder picked by the user; survives rescans.
    save_folder: Option<String>,
}

impl Session {
    pub fn open<S: AssetStore + ?Sized>(
        scene: SceneHandle,
        root: NodeId,
        store: &S,
        config: Config,
    ) -> Result<Self> {
        let committed = Avatar::load(scene.clone(), root, store, &config)?;
        let working = Avatar::load(scene.clone(), root, store, &config)?;
        let clip_name = config.session_clip_name.clone();
        let session = Self {
            scene,
            root,
            committed,
            working,
            config,
            clip_name,
            selected_state: 0,
            save_folder: None,
        };
        for advisory in session.advisories(store)? {
            warn!("{}", advisory.message());
        }
        Ok(session)
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn committed(&self) -> &Avatar {
        &self.committed
    }

    pub fn working(&self) -> &Avatar {
        &self.working
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_left_and_right(&mut self, value: bool) {
        self.config.set_left_and_right = value;
    }

    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    pub fn set_clip_name(&mut self, name: impl Into<String>) {
        self.clip_name = name.into();
    }

    pub fn save_folder(&self) -> &str {
        &self.committed.anim_saved_folder
    }

    /// Pin the folder baked clips go to. An empty folder drops the choice and
    /// falls back to the FX controller's folder, else the default.
    pub fn set_save_folder(&mut self, folder: impl Into<String>) {
        let folder = folder.into();
        self.save_folder = (!folder.is_empty()).then_some(folder);
        self.sync_save_folder();
    }

    fn sync_save_folder(&mut self) {
        let folder = match &self.save_folder {
            Some(folder) => folder.clone(),
            None => self
                .working
                .fx_controller
                .as_ref()
                .map(|p| p.folder().to_string())
                .unwrap_or_else(|| self.config.default_save_folder.clone()),
        };
        self.committed.anim_saved_folder = folder.clone();
        self.working.anim_saved_folder = folder;
    }

    pub fn selected_state(&self) -> usize {
        self.selected_state
    }

    pub fn select_state(&mut self, index: usize) {
        self.selected_state = index;
    }

    fn authoring_reset(&mut self, clip_name: &str, state: usize) {
        self.clip_name = clip_name.to_string();
        self.selected_state = state;
    }

    fn fx_controller<S: AssetStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<(AssetPath, AnimatorController)>> {
        match &self.working.fx_controller {
            Some(path) => Ok(Some((path.clone(), store.load_controller(path)?))),
            None => Ok(None),
        }
    }

    fn gesture_controller<S: AssetStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<(AssetPath, AnimatorController)>> {
        match &self.working.gesture_controller {
            Some(path) => Ok(Some((path.clone(), store.load_controller(path)?))),
            None => Ok(None),
        }
    }

    /// Layer names of the FX controller.
    pub fn layer_names<S: AssetStore + ?Sized>(&self, store: &S) -> Result<Vec<String>> {
        Ok(self
            .fx_controller(store)?
            .map(|(_, c)| c.layer_names())
            .unwrap_or_default())
    }

    /// Target a different FX layer on both models.
    pub fn set_target_layer(&mut self, index: usize) {
        self.working.target_fx_layer_index = index;
        self.committed.target_fx_layer_index = index;
        self.selected_state = 0;
    }

    /// Authorable states of the target FX layer, sorted by name.
    pub fn state_names<S: AssetStore + ?Sized>(&self, store: &S) -> Result<Vec<String>> {
        Ok(self
            .fx_controller(store)?
            .map(|(_, c)| c.state_names(self.working.target_fx_layer_index))
            .unwrap_or_default())
    }

    fn selected_state_name<S: AssetStore + ?Sized>(&self, store: &S) -> Result<Option<String>> {
        Ok(self.state_names(store)?.get(self.selected_state).cloned())
    }

    /// Gesture state that carries the hand pose of the selected FX state: same
    /// name, same layer index in the gesture controller.
    fn hand_state<S: AssetStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<(AssetPath, AnimatorController, String)>> {
        let Some(state) = self.selected_state_name(store)? else {
            return Ok(None);
        };
        let Some((path, gesture)) = self.gesture_controller(store)? else {
            return Ok(None);
        };
        let layer = self.working.target_fx_layer_index;
        if !gesture.state_names(layer).contains(&state) {
            return Ok(None);
        }
        Ok(Some((path, gesture, state)))
    }

    pub fn advisories<S: AssetStore + ?Sized>(&self, store: &S) -> Result<Vec<Advisory>> {
        if !self.working.has_descriptor() {
            return Ok(vec![Advisory::NoDescriptor]);
        }
        if self.working.fx_controller.is_none() {
            return Ok(vec![Advisory::NoFxController]);
        }
        let mut out = Vec::new();
        if self.state_names(store)?.is_empty() {
            out.push(Advisory::NoStatesInLayer);
        }
        if self.working.gesture_controller.is_none() {
            out.push(Advisory::NoGestureController);
        } else if self.hand_state(store)?.is_none() {
            out.push(Advisory::HandStateNotFound);
        }
        Ok(out)
    }

    /// Hand-pose clip bound to the gesture state matching the selected state.
    pub fn hand_pose<S: AssetStore + ?Sized>(&self, store: &S) -> Result<Option<AssetPath>> {
        let Some((_, gesture, state)) = self.hand_state(store)? else {
            return Ok(None);
        };
        let layer = self.working.target_fx_layer_index;
        Ok(gesture.motion(layer, &state).and_then(|m| m.clip().cloned()))
    }

    /// Rebind the hand pose of the selected state. Returns `false` when the
    /// gesture controller or the matching state is missing.
    pub fn set_hand_pose<S: AssetStore + ?Sized>(
        &mut self,
        store: &mut S,
        clip: Option<AssetPath>,
    ) -> Result<bool> {
        let Some((path, mut gesture, state)) = self.hand_state(&*store)? else {
            debug!("no gesture state for the selected state; hand pose unchanged");
            return Ok(false);
        };
        let motion = clip.map_or(Motion::None, Motion::Clip);
        gesture.set_motion(self.working.target_fx_layer_index, &state, motion);
        store.write_asset(&path, Asset::Controller(gesture))?;
        store.save()?;
        Ok(true)
    }

    pub fn create_fx_controller<S: AssetStore + ?Sized>(
        &mut self,
        store: &mut S,
        template: &AssetPath,
    ) -> Result<AssetPath> {
        self.create_layer_controller(store, template, FX_LAYER_SLOT, "fx")
    }

    pub fn create_gesture_controller<S: AssetStore + ?Sized>(
        &mut self,
        store: &mut S,
        template: &AssetPath,
    ) -> Result<AssetPath> {
        self.create_layer_controller(store, template, GESTURE_LAYER_SLOT, "gesture")
    }

    /// Copy `template` next to the save folder, bind it to `slot` and rescan.
    fn create_layer_controller<S: AssetStore + ?Sized>(
        &mut self,
        store: &mut S,
        template: &AssetPath,
        slot: usize,
        suffix: &str,
    ) -> Result<AssetPath> {
        let root_name = self
            .scene
            .borrow()
            .name(self.root)
            .unwrap_or_default()
            .to_string();
        let desired = AssetPath::in_folder(
            self.save_folder(),
            &format!("{root_name}_{suffix}{CONTROLLER_EXTENSION}"),
        );
        let path = store.copy_asset(template, &desired)?;
        store.save()?;
        store.refresh()?;
        if let Some(descriptor) = self.scene.borrow_mut().descriptor_mut(self.root) {
            descriptor.set_layer_controller(slot, Some(path.clone()));
        }
        info!("created {suffix} controller {path}");
        self.reload(&*store)?;
        Ok(path)
    }

    /// Auto-map viseme shape keys on the descriptor, then rescan both models.
    pub fn set_lip_sync_to_viseme<S: AssetStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.working.set_lip_sync_to_viseme();
        self.reload(store)
    }

    /// Parse the blend-shape pose stored in a clip asset.
    pub fn load_snapshot<S: AssetStore + ?Sized>(
        &self,
        store: &S,
        path: &AssetPath,
    ) -> Result<Vec<PoseSnapshotEntry>> {
        let clip = store.load_clip(path)?;
        Ok(extract_snapshot(&clip))
    }

    /// Apply the selected entries of a loaded snapshot to the working model.
    pub fn apply_loaded(&mut self, entries: &[PoseSnapshotEntry]) {
        self.working.apply(&selected_entries(entries));
        self.authoring_reset("", 0);
    }

    /// Load the clip bound to state `index` of the target layer into the
    /// working model. Empty slots and proxy clips are skipped and return `false`.
    pub fn edit_state<S: AssetStore + ?Sized>(&mut self, store: &S, index: usize) -> Result<bool> {
        let Some((_, controller)) = self.fx_controller(store)? else {
            return Ok(false);
        };
        let layer = self.working.target_fx_layer_index;
        let Some(state) = controller.state_names(layer).get(index).cloned() else {
            return Ok(false);
        };
        let clip_path = controller
            .motion(layer, &state)
            .and_then(|m| m.clip().cloned());
        let Some(clip_path) = clip_path else {
            debug!("state {state} has no clip");
            return Ok(false);
        };
        if is_proxy_clip(&clip_path) {
            debug!("state {state} plays proxy clip {clip_path}; not editable");
            return Ok(false);
        }
        let clip = store.load_clip(&clip_path)?;
        self.working.apply(&extract_snapshot(&clip));
        self.authoring_reset(clip_path.file_stem(), index);
        Ok(true)
    }

    pub fn reset_to_default(&mut self) {
        self.working.reset_to_default();
        self.authoring_reset("", 0);
    }

    /// Promote the live pose to the baseline of both models.
    pub fn set_to_default(&mut self) {
        let baseline = self.working.set_to_default();
        self.committed.baseline = baseline;
        self.committed.reset_to_default();
    }

    pub fn set_exclusions(&mut self, patterns: Vec<String>) {
        self.config.exclusions = ExclusionList::new(patterns);
        self.reclassify_models();
    }

    pub fn add_exclusion(&mut self, pattern: impl Into<String>) {
        self.config.exclusions.add(pattern);
        self.reclassify_models();
    }

    pub fn remove_exclusion(&mut self, index: usize) -> Option<String> {
        let removed = self.config.exclusions.remove(index);
        self.reclassify_models();
        removed
    }

    pub fn edit_exclusion(&mut self, index: usize, pattern: impl Into<String>) -> bool {
        let edited = self.config.exclusions.edit(index, pattern);
        self.reclassify_models();
        edited
    }

    fn reclassify_models(&mut self) {
        reclassify(&mut self.working.inventory, &self.config.exclusions);
        reclassify(&mut self.committed.inventory, &self.config.exclusions);
    }

    /// Targets of inventory mesh `mesh` in the configured display order.
    pub fn visible_targets(&self, mesh: usize) -> Vec<&MorphTargetEntry> {
        self.working
            .inventory
            .mesh(mesh)
            .map(|m| m.visible_targets(self.config.sort_type))
            .unwrap_or_default()
    }

    pub fn set_sort_type(&mut self, sort: SortType) {
        self.config.sort_type = sort;
    }

    pub fn set_contains(&mut self, mesh: usize, target: usize, value: bool) -> bool {
        match self
            .working
            .inventory
            .mesh_mut(mesh)
            .and_then(|m| m.target_mut(target))
        {
            Some(t) => {
                t.is_contains = value;
                true
            }
            None => false,
        }
    }

    pub fn set_contains_all(&mut self, mesh: usize, value: bool) -> bool {
        match self.working.inventory.mesh_mut(mesh) {
            Some(m) => {
                m.set_contains_all(value);
                true
            }
            None => false,
        }
    }

    pub fn set_weight(&mut self, mesh: usize, target: usize, weight: f32) -> bool {
        self.working.set_weight(mesh, target, weight)
    }

    pub fn set_min_value(&mut self, mesh: usize, target: usize) -> bool {
        self.working.set_min_value(mesh, target)
    }

    pub fn set_max_value(&mut self, mesh: usize, target: usize) -> bool {
        self.working.set_max_value(mesh, target)
    }

    pub fn reset_all_values(&mut self) {
        self.working.reset_all_values();
    }

    /// Synthesize the authored pose into the save folder, bind it to the
    /// selected state (and the mirrored hand layer when enabled), restore the
    /// baseline pose and commit. Without an FX controller, or with an empty
    /// layer, the clip is only created.
    ///
    /// Storage failures propagate; nothing already written is rolled back and
    /// the live pose is left as it was.
    pub fn bake<S: AssetStore + ?Sized>(&mut self, store: &mut S) -> Result<AssetPath> {
        let (clip_path, _) = {
            let scene = self.scene.borrow();
            synthesize(
                store,
                &self.clip_name,
                &self.committed.anim_saved_folder,
                &scene,
                &self.working.inventory,
                self.root,
            )?
        };

        match self.fx_controller(&*store)? {
            Some((controller_path, mut controller)) => {
                let layer = self.working.target_fx_layer_index;
                let states = controller.state_names(layer);
                match states.get(self.selected_state) {
                    Some(state) => {
                        controller.set_motion(layer, state, Motion::Clip(clip_path.clone()));
                        if self.config.set_left_and_right {
                            bind_mirrored(&mut controller, layer, state, &clip_path);
                        }
                        store.write_asset(&controller_path, Asset::Controller(controller))?;
                        store.save()?;
                    }
                    None if states.is_empty() => {
                        info!("layer {layer} has no states; clip {clip_path} created only");
                    }
                    None => {
                        debug!(
                            "selected state {} is out of range; clip {clip_path} created only",
                            self.selected_state
                        );
                    }
                }
            }
            None => warn!("no fx controller bound; clip {clip_path} created only"),
        }

        self.working.reset_to_default();
        self.commit(&*store)?;
        Ok(clip_path)
    }

    /// Copy the working model's persisted references into the committed
    /// model, then rescan both.
    pub fn commit<S: AssetStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.committed.copy_persisted_refs(&self.working);
        self.reload(store)
    }

    fn reload<S: AssetStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.committed.reload(store, &self.config)?;
        self.working.reload(store, &self.config)?;
        self.sync_save_folder();
        Ok(())
    }

    /// Leave the scene at the baseline pose.
    pub fn dispose(mut self) {
        self.reset_to_default();
    }
}

/// Bind `clip` to the same-named state of the opposite hand layer, if any.
fn bind_mirrored(controller: &mut AnimatorController, layer: usize, state: &str, clip: &AssetPath) {
    let names = controller.layer_names();
    let Some(mirror) = names.get(layer).and_then(|n| opposite_hand_layer(n)) else {
        return;
    };
    let Some(mirror_index) = controller.layer_index(mirror) else {
        return;
    };
    if !controller.set_motion(mirror_index, state, Motion::Clip(clip.clone())) {
        debug!("{mirror} has no state {state}; mirror skipped");
    }
}
