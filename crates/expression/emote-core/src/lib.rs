//! Emote Core (engine-agnostic)
//!
//! Facial-expression authoring for rigged characters: indexes every
//! deformable mesh and morph target under a character root, captures and
//! applies poses against a baseline, filters targets through exclusion
//! patterns, and bakes the authored pose into a keyframe clip bound to an
//! animation state machine.
//!
//! Scene state lives in one shared arena ([`SceneHandle`]). Storage and the
//! state machine are collaborators behind the [`AssetStore`] and
//! [`StateMachine`] traits.

pub mod apply;
pub mod avatar;
pub mod clip;
pub mod config;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod exclusion;
pub mod ids;
pub mod inventory;
pub mod path;
pub mod scene;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod synth;
pub mod transplant;

// Re-exports for hosts
pub use apply::{apply, reset_all_values, reset_to_default, set_to_default};
pub use avatar::{Avatar, AvatarMetadata};
pub use clip::{Clip, CurveEntry, CLIP_EXTENSION, HELD_POSE_DURATION, SAMPLE_RATE};
pub use config::{Config, SortType};
pub use controller::{
    is_proxy_clip, opposite_hand_layer, target_layer_index, AnimatorController, AnimatorLayer,
    AnimatorState, Motion, StateMachine, LEFT_HAND_LAYER, RIGHT_HAND_LAYER,
};
pub use descriptor::{AvatarDescriptor, EyelidBlendShape, LipSyncStyle, VISEMES};
pub use error::{EmoteError, Result};
pub use exclusion::{reclassify, ExclusionList, DEFAULT_EXCLUSIONS};
pub use ids::{AssetPath, NodeId};
pub use inventory::{scan, DeformableMeshEntry, Inventory, MorphTargetEntry};
pub use path::{find_by_path, resolve_path};
pub use scene::{MeshData, Renderer, Scene, SceneHandle};
pub use session::{Advisory, Remediation, Session};
pub use snapshot::{capture_all, capture_selected, extract_snapshot, PoseSnapshotEntry};
pub use storage::{generate_unique_path, Asset, AssetStore, FsAssetStore, MemoryAssetStore};
pub use synth::{build_clip, synthesize, DEFAULT_CLIP_NAME};
pub use transplant::copy_bindings;
pub use emote_api_core::{Curve, CurveBinding, Keyframe};
