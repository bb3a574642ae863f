//! Session settings for the expression editor.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exclusion::ExclusionList;

/// Display order of morph targets inside a mesh panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[default]
    UnSort,
    AToZ,
}

/// Persisted editor settings. Every field falls back to its default when
/// absent from the serialized form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name-prefix patterns that keep morph targets out of authored clips.
    pub exclusions: ExclusionList,
    /// Initial clip name offered by a new session.
    pub session_clip_name: String,
    pub sort_type: SortType,
    /// Bind baked clips to the mirrored hand layer as well.
    pub set_left_and_right: bool,
    /// Folder used for baked clips when the character has no FX controller.
    pub default_save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclusions: ExclusionList::default(),
            session_clip_name: "faceAnim".to_string(),
            sort_type: SortType::UnSort,
            set_left_and_right: true,
            default_save_folder: "Assets/".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
