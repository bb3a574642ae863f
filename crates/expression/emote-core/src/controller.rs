//! Animation state-machine collaborator.
//!
//! The core never edits layers, states or transitions. It only reads which
//! motion a state slot plays and rebinds that slot to a clip.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::AssetPath;

pub const LEFT_HAND_LAYER: &str = "Left Hand";
pub const RIGHT_HAND_LAYER: &str = "Right Hand";
/// Extension of persisted controllers.
pub const CONTROLLER_EXTENSION: &str = ".controller";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "clip", rename_all = "snake_case")]
pub enum Motion {
    #[default]
    None,
    Clip(AssetPath),
    /// Blend composite; never offered as an authoring slot.
    BlendTree,
}

impl Motion {
    pub fn clip(&self) -> Option<&AssetPath> {
        match self {
            Motion::Clip(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_blend_tree(&self) -> bool {
        matches!(self, Motion::BlendTree)
    }
}

/// Read/write surface of an animation state machine.
pub trait StateMachine {
    /// Layer names in layer order.
    fn layer_names(&self) -> Vec<String>;

    /// States of `layer` offered for authoring: sorted by name, blend
    /// composites excluded. Empty for an unknown layer.
    fn state_names(&self, layer: usize) -> Vec<String>;

    fn motion(&self, layer: usize, state: &str) -> Option<Motion>;

    /// Returns `false` when the layer or state does not exist.
    fn set_motion(&mut self, layer: usize, state: &str, motion: Motion) -> bool;

    fn layer_index(&self, name: &str) -> Option<usize> {
        self.layer_names().iter().position(|n| n == name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorState {
    pub name: String,
    #[serde(default)]
    pub motion: Motion,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorLayer {
    pub name: String,
    #[serde(default)]
    pub states: Vec<AnimatorState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimatorController {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<AnimatorLayer>,
}

impl AnimatorController {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    fn state_mut(&mut self, layer: usize, state: &str) -> Option<&mut AnimatorState> {
        self.layers
            .get_mut(layer)?
            .states
            .iter_mut()
            .find(|s| s.name == state)
    }
}

impl StateMachine for AnimatorController {
    fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    fn state_names(&self, layer: usize) -> Vec<String> {
        let Some(layer) = self.layers.get(layer) else {
            return Vec::new();
        };
        let mut names: Vec<String> = layer
            .states
            .iter()
            .filter(|s| !s.motion.is_blend_tree())
            .map(|s| s.name.clone())
            .collect();
        names.sort();
        names
    }

    fn motion(&self, layer: usize, state: &str) -> Option<Motion> {
        self.layers
            .get(layer)?
            .states
            .iter()
            .find(|s| s.name == state)
            .map(|s| s.motion.clone())
    }

    fn set_motion(&mut self, layer: usize, state: &str, motion: Motion) -> bool {
        match self.state_mut(layer, state) {
            Some(s) => {
                s.motion = motion;
                true
            }
            None => false,
        }
    }
}

/// Layer edited by default: "Left Hand", else "Right Hand", else the first.
pub fn target_layer_index(layer_names: &[String]) -> usize {
    layer_names
        .iter()
        .position(|n| n == LEFT_HAND_LAYER)
        .or_else(|| layer_names.iter().position(|n| n == RIGHT_HAND_LAYER))
        .unwrap_or(0)
}

/// The other hand's layer name, if `layer_name` is a hand layer.
pub fn opposite_hand_layer(layer_name: &str) -> Option<&'static str> {
    match layer_name {
        LEFT_HAND_LAYER => Some(RIGHT_HAND_LAYER),
        RIGHT_HAND_LAYER => Some(LEFT_HAND_LAYER),
        _ => None,
    }
}

/// Shared placeholder clips ("proxy_*") are not editable in place.
pub fn is_proxy_clip(clip: &AssetPath) -> bool {
    clip.file_stem().starts_with("proxy_")
}
