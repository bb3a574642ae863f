//! Exclusion classifier: name-prefix patterns that keep morph targets out of
//! authored poses.
//!
//! Matching is a case-sensitive literal prefix test. `"mmd"` excludes
//! `"mmd_smile"` but not `"x_mmd"` or `"MMD_smile"`. An empty pattern is a
//! prefix of every name and therefore excludes everything.

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;

/// Patterns installed in a fresh configuration.
pub const DEFAULT_EXCLUSIONS: [&str; 5] = [
    "vrc.v_",
    "vrc.blink_",
    "vrc.lowerlid_",
    "vrc.owerlid_",
    "mmd",
];

/// Ordered pattern list. Insertion order is kept; duplicates are allowed and
/// change nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList {
    patterns: Vec<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS.iter().map(|p| p.to_string()).collect())
    }
}

impl ExclusionList {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn add(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.patterns.len()).then(|| self.patterns.remove(index))
    }

    /// Replace the pattern at `index`. Returns `false` if out of range.
    pub fn edit(&mut self, index: usize, pattern: impl Into<String>) -> bool {
        match self.patterns.get_mut(index) {
            Some(slot) => {
                *slot = pattern.into();
                true
            }
            None => false,
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        is_excluded(name, &self.patterns)
    }
}

#[inline]
pub fn is_excluded(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| name.starts_with(p.as_str()))
}

/// Recompute `is_exclusion` for every morph target. `is_contains` is left
/// untouched.
pub fn reclassify(inventory: &mut Inventory, patterns: &ExclusionList) {
    for mesh in inventory.iter_mut() {
        for target in &mut mesh.targets {
            target.is_exclusion = patterns.is_excluded(&target.name);
        }
    }
}
