//! Hierarchy path resolver.

use crate::ids::NodeId;
use crate::scene::Scene;

/// Slash-delimited path of `target` relative to `root`, leaf last.
///
/// Walks up from `target`, prepending ancestor names, and stops (without
/// adding that ancestor) at `root` or at an ancestor that has no parent. A
/// node directly under `root` yields its own name. Unknown nodes yield an
/// empty string.
pub fn resolve_path(scene: &Scene, root: NodeId, target: NodeId) -> String {
    let Some(node) = scene.node(target) else {
        return String::new();
    };
    let mut segments = vec![node.name.as_str()];
    let mut cursor = node.parent;
    while let Some(id) = cursor {
        let Some(ancestor) = scene.node(id) else {
            break;
        };
        if id == root || ancestor.parent.is_none() {
            break;
        }
        segments.push(ancestor.name.as_str());
        cursor = ancestor.parent;
    }
    segments.reverse();
    segments.join("/")
}

/// Inverse of [`resolve_path`]: follows each segment through the children of
/// the previous node (first match by name). The empty path addresses `root`.
pub fn find_by_path(scene: &Scene, root: NodeId, path: &str) -> Option<NodeId> {
    scene.node(root)?;
    if path.is_empty() {
        return Some(root);
    }
    let mut cursor = root;
    for segment in path.split('/') {
        cursor = scene
            .node(cursor)?
            .children
            .iter()
            .copied()
            .find(|c| scene.name(*c) == Some(segment))?;
    }
    Some(cursor)
}
