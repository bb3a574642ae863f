//! Identifiers for scene nodes and persisted assets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index of a node inside a [`Scene`](crate::scene::Scene).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic allocator for NodeId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_node: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }
}

/// Slash-separated, store-relative asset path (e.g. `Assets/Face/smile.anim`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// `file_name` placed inside `folder`; an empty folder means the store root.
    pub fn in_folder(folder: &str, file_name: &str) -> Self {
        if folder.is_empty() || folder.ends_with('/') || folder.ends_with('\\') {
            Self(format!("{folder}{file_name}"))
        } else {
            Self(format!("{folder}/{file_name}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything up to and including the last separator (empty at the root).
    pub fn folder(&self) -> &str {
        match self.0.rfind(['/', '\\']) {
            Some(idx) => &self.0[..=idx],
            None => "",
        }
    }

    pub fn file_name(&self) -> &str {
        &self.0[self.folder().len()..]
    }

    /// File name without its final extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Final extension including the dot, or an empty string.
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(idx) => &name[idx..],
        }
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
