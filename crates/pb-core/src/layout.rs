//! Frame resolver.
//!
//! Converts parent-relative frames into absolute canvas frames by summing
//! ancestor origins top-down. Width and height pass through unchanged.
//! Recomputed from scratch after every change; projects hold hundreds of
//! nodes, not millions.

use crate::id::NodeId;
use crate::model::{Frame, Project};
use indexmap::IndexMap;

/// Absolute frames keyed by node id, in depth-first document order
/// (root first, children in paint order).
pub type AbsoluteFrames = IndexMap<NodeId, Frame>;

/// Resolve every reachable node's absolute frame.
///
/// Dangling child references are skipped. A node reached twice (only
/// possible in a malformed, cyclic project) keeps its first frame.
pub fn resolve_frames(project: &Project) -> AbsoluteFrames {
    let mut frames = AbsoluteFrames::with_capacity(project.len());
    resolve_subtree(project, project.root_node_id, 0.0, 0.0, &mut frames);
    frames
}

fn resolve_subtree(
    project: &Project,
    id: NodeId,
    origin_x: f32,
    origin_y: f32,
    frames: &mut AbsoluteFrames,
) {
    let Some(node) = project.get(id) else {
        return;
    };
    if frames.contains_key(&id) {
        return;
    }

    let abs = Frame {
        x: origin_x + node.frame.x,
        y: origin_y + node.frame.y,
        ..node.frame
    };
    frames.insert(id, abs);

    for &child in &node.children {
        resolve_subtree(project, child, abs.x, abs.y, frames);
    }
}

/// Absolute frame of a single node, by walking its ancestor chain.
///
/// Agrees with [`resolve_frames`] for every reachable node; used where a
/// full resolve would be wasted (reparenting, node creation).
pub fn absolute_frame(project: &Project, id: NodeId) -> Option<Frame> {
    let node = project.get(id)?;
    let mut abs = node.frame;
    for ancestor in project.ancestors(id) {
        if let Some(a) = project.get(ancestor) {
            abs.x += a.frame.x;
            abs.y += a.frame.y;
        }
    }
    Some(abs)
}

/// Convert an absolute point into `parent`'s coordinate space.
pub fn to_parent_space(project: &Project, parent: NodeId, x: f32, y: f32) -> (f32, f32) {
    match absolute_frame(project, parent) {
        Some(p) => (x - p.x, y - p.y),
        None => (x, y),
    }
}
