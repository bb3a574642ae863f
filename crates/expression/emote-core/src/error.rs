//! Error type for the emote core.
//!
//! Only persistence and parse failures are errors. Lookups that find nothing
//! (unknown morph target, missing mesh, empty state list) are skipped by the
//! operations themselves and never surface here.

use crate::ids::AssetPath;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmoteError {
    #[error("asset not found: {0}")]
    AssetNotFound(AssetPath),

    #[error("asset at {path} is not a {expected}")]
    WrongAssetKind {
        path: AssetPath,
        expected: &'static str,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("scene error: {0}")]
    Scene(String),
}

impl EmoteError {
    /// True for failures raised while writing or reading persisted assets.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::AssetNotFound(_) | Self::WrongAssetKind { .. } | Self::Storage(_) | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EmoteError>;
