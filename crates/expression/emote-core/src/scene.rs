//! Scene arena: the live node hierarchy and morph-target weight table that
//! every character model observes.
//!
//! Nodes are addressed by dense [`NodeId`]s. A [`SceneHandle`] is the shared,
//! single-threaded owner of one arena; the committed and working character
//! models each hold a clone of the same handle, so live weights can never
//! diverge between them.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::descriptor::AvatarDescriptor;
use crate::error::{EmoteError, Result};
use crate::ids::{IdAllocator, NodeId};

pub type SceneHandle = Rc<RefCell<Scene>>;

fn default_frame_weights() -> Vec<f32> {
    vec![100.0]
}

fn default_true() -> bool {
    true
}

/// One named deformation channel declared by a mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphTargetDef {
    pub name: String,
    /// Weight of every authored frame of this target.
    #[serde(default = "default_frame_weights")]
    pub frame_weights: Vec<f32>,
}

impl MorphTargetDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_weights: default_frame_weights(),
        }
    }
}

/// Shared geometry resource referenced by a renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    #[serde(default)]
    pub triangle_count: u32,
    #[serde(default)]
    pub morph_targets: Vec<MorphTargetDef>,
}

impl MeshData {
    pub fn with_targets(name: impl Into<String>, targets: &[&str]) -> Self {
        Self {
            name: name.into(),
            triangle_count: 0,
            morph_targets: targets.iter().map(|t| MorphTargetDef::new(*t)).collect(),
        }
    }

    pub fn blend_shape_count(&self) -> usize {
        self.morph_targets.len()
    }

    /// Index of the first morph target named `name`.
    pub fn blend_shape_index(&self, name: &str) -> Option<usize> {
        self.morph_targets.iter().position(|t| t.name == name)
    }

    pub fn blend_shape_name(&self, index: usize) -> Option<&str> {
        self.morph_targets.get(index).map(|t| t.name.as_str())
    }

    /// `min(0, frame weights…)` for target `index`.
    pub fn min_weight(&self, index: usize) -> Option<f32> {
        let t = self.morph_targets.get(index)?;
        Some(t.frame_weights.iter().copied().fold(0.0, f32::min))
    }

    /// `max(0, frame weights…)` for target `index`.
    pub fn max_weight(&self, index: usize) -> Option<f32> {
        let t = self.morph_targets.get(index)?;
        Some(t.frame_weights.iter().copied().fold(0.0, f32::max))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    #[default]
    Skinned,
    Static,
}

/// Mesh renderer component. Only skinned renderers carry live weights.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Renderer {
    #[serde(default)]
    pub kind: RendererKind,
    #[serde(default)]
    pub shared_mesh: Option<MeshData>,
    /// Live weight per morph target (0..100). Missing entries read as 0.
    #[serde(default)]
    pub weights: Vec<f32>,
    #[serde(default)]
    pub materials: Vec<String>,
}

impl Renderer {
    pub fn skinned(mesh: MeshData) -> Self {
        let weights = vec![0.0; mesh.blend_shape_count()];
        Self {
            kind: RendererKind::Skinned,
            shared_mesh: Some(mesh),
            weights,
            materials: Vec::new(),
        }
    }

    pub fn is_skinned(&self) -> bool {
        self.kind == RendererKind::Skinned
    }

    pub fn blend_shape_count(&self) -> usize {
        self.shared_mesh
            .as_ref()
            .map_or(0, MeshData::blend_shape_count)
    }

    pub fn weight(&self, index: usize) -> Option<f32> {
        (index < self.blend_shape_count()).then(|| self.weights.get(index).copied().unwrap_or(0.0))
    }

    /// Returns `false` (and changes nothing) for an out-of-range index.
    pub fn set_weight(&mut self, index: usize, weight: f32) -> bool {
        let count = self.blend_shape_count();
        if index >= count {
            return false;
        }
        if self.weights.len() < count {
            self.weights.resize(count, 0.0);
        }
        self.weights[index] = weight;
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub active: bool,
    pub renderer: Option<Renderer>,
    pub descriptor: Option<AvatarDescriptor>,
}

/// Serialized node tree used to build a scene from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub renderer: Option<Renderer>,
    #[serde(default)]
    pub descriptor: Option<AvatarDescriptor>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Default)]
pub struct Scene {
    ids: IdAllocator,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from a node tree. Ids are assigned in pre-order, so the
    /// tree root is `NodeId(0)`.
    pub fn from_spec(spec: &NodeSpec) -> (Self, NodeId) {
        let mut scene = Self::new();
        let root = scene.insert_spec(spec, None);
        (scene, root)
    }

    pub fn from_json(s: &str) -> Result<(Self, NodeId)> {
        let spec: NodeSpec = serde_json::from_str(s)?;
        Ok(Self::from_spec(&spec))
    }

    fn insert_spec(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = self.push_node(&spec.name, parent);
        let node = &mut self.nodes[id.index()];
        node.active = spec.active;
        node.renderer = spec.renderer.clone();
        node.descriptor = spec.descriptor.clone();
        for child in &spec.children {
            self.insert_spec(child, Some(id));
        }
        id
    }

    fn push_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = self.ids.alloc_node();
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            active: true,
            renderer: None,
            descriptor: None,
        });
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        id
    }

    /// Append a node under `parent` (or as a new root).
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(p) = parent {
            if self.node(p).is_none() {
                return Err(EmoteError::Scene(format!(
                    "parent {p:?} does not exist for node '{name}'"
                )));
            }
        }
        Ok(self.push_node(name, parent))
    }

    pub fn into_handle(self) -> SceneHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// First node named `name` in id order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// `root` followed by all of its descendants, depth-first pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(root).is_none() {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// A node is active in the hierarchy when it and all its ancestors are.
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            match self.node(c) {
                Some(n) if n.active => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn renderer(&self, id: NodeId) -> Option<&Renderer> {
        self.node(id).and_then(|n| n.renderer.as_ref())
    }

    pub fn renderer_mut(&mut self, id: NodeId) -> Option<&mut Renderer> {
        self.node_mut(id).and_then(|n| n.renderer.as_mut())
    }

    pub fn set_renderer(&mut self, id: NodeId, renderer: Renderer) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.renderer = Some(renderer);
                true
            }
            None => false,
        }
    }

    pub fn shared_mesh(&self, id: NodeId) -> Option<&MeshData> {
        self.renderer(id).and_then(|r| r.shared_mesh.as_ref())
    }

    pub fn descriptor(&self, id: NodeId) -> Option<&AvatarDescriptor> {
        self.node(id).and_then(|n| n.descriptor.as_ref())
    }

    pub fn descriptor_mut(&mut self, id: NodeId) -> Option<&mut AvatarDescriptor> {
        self.node_mut(id).and_then(|n| n.descriptor.as_mut())
    }

    pub fn set_descriptor(&mut self, id: NodeId, descriptor: AvatarDescriptor) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.descriptor = Some(descriptor);
                true
            }
            None => false,
        }
    }

    pub fn blend_shape_index(&self, id: NodeId, name: &str) -> Option<usize> {
        self.shared_mesh(id).and_then(|m| m.blend_shape_index(name))
    }

    pub fn weight(&self, id: NodeId, index: usize) -> Option<f32> {
        self.renderer(id).and_then(|r| r.weight(index))
    }

    /// Missing nodes, renderers, meshes or indices are a silent no-op.
    pub fn set_weight(&mut self, id: NodeId, index: usize, weight: f32) -> bool {
        self.renderer_mut(id)
            .map_or(false, |r| r.set_weight(index, weight))
    }

    /// Drive target `index` to its lowest frame weight (never above 0).
    pub fn set_min_value(&mut self, id: NodeId, index: usize) -> bool {
        let Some(min) = self.shared_mesh(id).and_then(|m| m.min_weight(index)) else {
            return false;
        };
        self.set_weight(id, index, min)
    }

    /// Drive target `index` to its highest frame weight (never below 0).
    pub fn set_max_value(&mut self, id: NodeId, index: usize) -> bool {
        let Some(max) = self.shared_mesh(id).and_then(|m| m.max_weight(index)) else {
            return false;
        };
        self.set_weight(id, index, max)
    }
}
