//! Avatar descriptor: the persisted, platform-facing component on a
//! character's root node.

use serde::{Deserialize, Serialize};

use crate::ids::{AssetPath, NodeId};

/// Base animation layer slot holding the gesture controller.
pub const GESTURE_LAYER_SLOT: usize = 2;
/// Base animation layer slot holding the face/FX controller.
pub const FX_LAYER_SLOT: usize = 4;
pub const BASE_LAYER_SLOT_COUNT: usize = 5;

/// Viseme slots in declaration order.
pub const VISEMES: [&str; 15] = [
    "sil", "PP", "FF", "TH", "DD", "kk", "CH", "SS", "nn", "RR", "aa", "E", "ih", "oh", "ou",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LipSyncStyle {
    #[default]
    Default,
    JawFlapBone,
    JawFlapBlendShape,
    VisemeBlendShape,
    VisemeParameterOnly,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationSet {
    Male,
    Female,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyelidType {
    #[default]
    None,
    Bones,
    Blendshapes,
}

/// Eyelid blend-shape slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EyelidBlendShape {
    Blink = 0,
    LookingUp = 1,
    LookingDown = 2,
}

impl EyelidBlendShape {
    pub const ALL: [EyelidBlendShape; 3] = [Self::Blink, Self::LookingUp, Self::LookingDown];

    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelidSettings {
    pub eyelid_type: EyelidType,
    pub skinned_mesh: Option<NodeId>,
    /// Morph-target index per [`EyelidBlendShape`] slot; `-1` when unset.
    pub blend_shape_indices: [i32; 3],
}

impl Default for EyelidSettings {
    fn default() -> Self {
        Self {
            eyelid_type: EyelidType::None,
            skinned_mesh: None,
            blend_shape_indices: [-1; 3],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarDescriptor {
    /// Controller asset bound to each base animation layer slot.
    pub base_animation_layers: Vec<Option<AssetPath>>,
    pub viseme_skinned_mesh: Option<NodeId>,
    pub lip_sync: LipSyncStyle,
    pub viseme_blend_shapes: Vec<String>,
    pub eyelids: EyelidSettings,
    pub view_position: [f32; 3],
    pub animation_set: AnimationSet,
    /// Upload identifier; empty for a character that was never uploaded.
    pub blueprint_id: String,
}

impl Default for AvatarDescriptor {
    fn default() -> Self {
        Self {
            base_animation_layers: vec![None; BASE_LAYER_SLOT_COUNT],
            viseme_skinned_mesh: None,
            lip_sync: LipSyncStyle::Default,
            viseme_blend_shapes: vec![String::new(); VISEMES.len()],
            eyelids: EyelidSettings::default(),
            view_position: [0.0; 3],
            animation_set: AnimationSet::None,
            blueprint_id: String::new(),
        }
    }
}

impl AvatarDescriptor {
    pub fn layer_controller(&self, slot: usize) -> Option<&AssetPath> {
        self.base_animation_layers.get(slot).and_then(Option::as_ref)
    }

    pub fn set_layer_controller(&mut self, slot: usize, controller: Option<AssetPath>) {
        if self.base_animation_layers.len() <= slot {
            self.base_animation_layers.resize(slot + 1, None);
        }
        self.base_animation_layers[slot] = controller;
    }

    pub fn fx_controller(&self) -> Option<&AssetPath> {
        self.layer_controller(FX_LAYER_SLOT)
    }

    pub fn gesture_controller(&self) -> Option<&AssetPath> {
        self.layer_controller(GESTURE_LAYER_SLOT)
    }
}
