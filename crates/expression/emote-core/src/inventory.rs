//! Morph-target inventory: every deformable mesh under a character root and
//! the authoring flags of its morph targets.

use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SortType;
use crate::ids::NodeId;
use crate::scene::Scene;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphTargetEntry {
    /// Mesh-local target index, stable for the session.
    pub id: usize,
    pub name: String,
    /// Derived from the exclusion patterns; never set directly.
    pub is_exclusion: bool,
    /// Authoring toggle: include this target in the next synthesized clip.
    pub is_contains: bool,
}

impl MorphTargetEntry {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_exclusion: false,
            is_contains: false,
        }
    }

    /// Included and not excluded.
    #[inline]
    pub fn is_authored(&self) -> bool {
        self.is_contains && !self.is_exclusion
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeformableMeshEntry {
    pub node: NodeId,
    /// Name of the owning scene node.
    pub name: String,
    /// Targets in the mesh's declared order; `targets[i].id == i`.
    pub targets: Vec<MorphTargetEntry>,
    /// Panel expansion state. UI only.
    pub is_open: bool,
    /// The character's designated face mesh.
    pub is_face: bool,
}

impl DeformableMeshEntry {
    /// Name to mesh-local index. A name declared twice maps to its first index.
    pub fn name_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.targets.len());
        for t in &self.targets {
            index.entry(t.name.as_str()).or_insert(t.id);
        }
        index
    }

    pub fn target(&self, id: usize) -> Option<&MorphTargetEntry> {
        self.targets.get(id)
    }

    pub fn target_mut(&mut self, id: usize) -> Option<&mut MorphTargetEntry> {
        self.targets.get_mut(id)
    }

    /// Set `is_contains` on every target of this mesh.
    pub fn set_contains_all(&mut self, value: bool) {
        for t in &mut self.targets {
            t.is_contains = value;
        }
    }

    /// Every non-excluded target is included.
    pub fn all_contained(&self) -> bool {
        self.targets
            .iter()
            .filter(|t| !t.is_exclusion)
            .all(|t| t.is_contains)
    }

    /// Non-excluded targets in display order. Stored order and ids are
    /// never changed.
    pub fn visible_targets(&self, sort: SortType) -> Vec<&MorphTargetEntry> {
        let mut out: Vec<&MorphTargetEntry> =
            self.targets.iter().filter(|t| !t.is_exclusion).collect();
        if sort == SortType::AToZ {
            out.sort_by(|a, b| a.name.cmp(&b.name));
        }
        out
    }
}

/// All deformable meshes of one character, in scan order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub meshes: Vec<DeformableMeshEntry>,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeformableMeshEntry> {
        self.meshes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DeformableMeshEntry> {
        self.meshes.iter_mut()
    }

    pub fn mesh(&self, index: usize) -> Option<&DeformableMeshEntry> {
        self.meshes.get(index)
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut DeformableMeshEntry> {
        self.meshes.get_mut(index)
    }

    pub fn find_mesh(&self, node: NodeId) -> Option<&DeformableMeshEntry> {
        self.meshes.iter().find(|m| m.node == node)
    }

    pub fn target_count(&self) -> usize {
        self.meshes.iter().map(|m| m.targets.len()).sum()
    }
}

/// Walk every skinned renderer under `root` (pre-order, `root` included) and
/// index those whose shared mesh declares at least one morph target.
/// Renderers without shared geometry are skipped.
pub fn scan(scene: &Scene, root: NodeId, face_mesh: Option<NodeId>) -> Inventory {
    let mut meshes = Vec::new();
    for id in scene.descendants(root) {
        let Some(renderer) = scene.renderer(id) else {
            continue;
        };
        if !renderer.is_skinned() {
            continue;
        }
        let Some(mesh) = renderer.shared_mesh.as_ref() else {
            debug!("skipping renderer {id:?} without shared mesh");
            continue;
        };
        if mesh.blend_shape_count() == 0 {
            continue;
        }
        let is_face = face_mesh == Some(id);
        meshes.push(DeformableMeshEntry {
            node: id,
            name: scene.name(id).unwrap_or_default().to_string(),
            targets: mesh
                .morph_targets
                .iter()
                .enumerate()
                .map(|(i, t)| MorphTargetEntry::new(i, t.name.clone()))
                .collect(),
            is_open: is_face,
            is_face,
        });
    }
    Inventory { meshes }
}
