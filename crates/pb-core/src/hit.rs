//! Hit testing: point → node lookup.
//!
//! Three queries over the resolved absolute frames:
//! - [`resolve_container`]: the tightest container under a point (drop
//!   targets and reparenting),
//! - [`hit_test`]: the topmost node under a point (selection),
//! - [`pick_handle`]: which resize handle of a frame a point grabs.

use crate::id::NodeId;
use crate::layout::AbsoluteFrames;
use crate::model::{Frame, Project};
use crate::snap::ResizeHandle;

/// Distance (screen pixels) within which a pointer grabs a resize handle.
/// Callers divide by the zoom to get canvas units.
pub const HANDLE_RADIUS: f32 = 6.0;

/// How far below a dragged node's top edge its drop anchor sits.
pub const DROP_ANCHOR_DEPTH: f32 = 8.0;

/// Find the most specific container whose bounds contain `(px, py)`.
///
/// Skips the root and, when given, `exclude` with its whole subtree (the
/// node being dragged cannot contain itself). Among the remaining
/// container-eligible nodes the smallest area wins; equal areas keep the
/// first in document order. Falls back to the root.
pub fn resolve_container(
    project: &Project,
    frames: &AbsoluteFrames,
    px: f32,
    py: f32,
    exclude: Option<NodeId>,
) -> NodeId {
    let mut best: Option<(NodeId, f32)> = None;

    for (&id, frame) in frames {
        if id == project.root_node_id {
            continue;
        }
        if let Some(ex) = exclude
            && (id == ex || project.is_ancestor_of(ex, id))
        {
            continue;
        }
        let Some(node) = project.get(id) else {
            continue;
        };
        if !node.node_type.is_container() || !frame.contains(px, py) {
            continue;
        }
        let area = frame.area();
        if best.is_none_or(|(_, a)| area < a) {
            best = Some((id, area));
        }
    }

    best.map(|(id, _)| id).unwrap_or(project.root_node_id)
}

/// The point under a dragged frame used for drop-target lookup: its top
/// edge center, pushed down into the frame and clamped to its height.
pub fn drop_anchor(frame: &Frame) -> (f32, f32) {
    let depth = DROP_ANCHOR_DEPTH.min(frame.height / 2.0).max(0.0);
    (frame.x + frame.width / 2.0, frame.y + depth)
}

/// Find the topmost non-root node at `(px, py)`.
/// Returns `None` if no node is hit (background).
pub fn hit_test(project: &Project, frames: &AbsoluteFrames, px: f32, py: f32) -> Option<NodeId> {
    hit_test_node(project, project.root_node_id, frames, px, py, 0)
}

fn hit_test_node(
    project: &Project,
    id: NodeId,
    frames: &AbsoluteFrames,
    px: f32,
    py: f32,
    depth: usize,
) -> Option<NodeId> {
    if depth > project.len() {
        return None;
    }

    // Check children in reverse (topmost first)
    for &child in project.children_of(id).iter().rev() {
        if let Some(hit) = hit_test_node(project, child, frames, px, py, depth + 1) {
            return Some(hit);
        }
    }

    if id == project.root_node_id {
        return None;
    }

    match frames.get(&id) {
        Some(f) if f.contains(px, py) => Some(id),
        _ => None,
    }
}

/// Which handle of `frame` (if any) lies within `radius` canvas units of
/// the point. Corners are tested before edge midpoints.
pub fn pick_handle(frame: &Frame, px: f32, py: f32, radius: f32) -> Option<ResizeHandle> {
    ResizeHandle::ALL.into_iter().find(|h| {
        let (hx, hy) = h.anchor(frame);
        (px - hx).abs() <= radius && (py - hy).abs() <= radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::resolve_frames;
    use crate::model::{Node, NodeType};

    fn add(project: &mut Project, parent: NodeId, name: &str, ty: NodeType, frame: Frame) -> NodeId {
        let id = NodeId::intern(name);
        let mut node = Node::new(id, ty, frame);
        node.parent_id = Some(parent);
        project.nodes_by_id.insert(id, node);
        project.get_mut(parent).unwrap().children.push(id);
        id
    }

    /// root
    /// ├── h_section (0,0 600x400)
    /// │   ├── h_card (50,50 200x200)
    /// │   │   └── h_button (10,10 100x40)
    /// │   └── h_image (300,50 200x200)
    /// └── h_form (700,0 300x300)
    fn fixture() -> (Project, [NodeId; 5]) {
        let mut p = Project::new();
        let root = p.root_node_id;
        let section = add(
            &mut p,
            root,
            "h_section",
            NodeType::Section,
            Frame::new(0.0, 0.0, 600.0, 400.0),
        );
        let card = add(
            &mut p,
            section,
            "h_card",
            NodeType::Card,
            Frame::new(50.0, 50.0, 200.0, 200.0),
        );
        let button = add(
            &mut p,
            card,
            "h_button",
            NodeType::Button,
            Frame::new(10.0, 10.0, 100.0, 40.0),
        );
        let image = add(
            &mut p,
            section,
            "h_image",
            NodeType::Image,
            Frame::new(300.0, 50.0, 200.0, 200.0),
        );
        let form = add(
            &mut p,
            root,
            "h_form",
            NodeType::Form,
            Frame::new(700.0, 0.0, 300.0, 300.0),
        );
        (p, [section, card, button, image, form])
    }

    #[test]
    fn innermost_container_wins() {
        let (p, [section, card, ..]) = fixture();
        let frames = resolve_frames(&p);
        assert_eq!(resolve_container(&p, &frames, 100.0, 100.0, None), card);
        assert_eq!(resolve_container(&p, &frames, 20.0, 20.0, None), section);
    }

    #[test]
    fn leaves_are_not_containers() {
        let (p, [section, ..]) = fixture();
        let frames = resolve_frames(&p);
        // Inside the image, which is a leaf: falls through to the section.
        assert_eq!(resolve_container(&p, &frames, 350.0, 100.0, None), section);
    }

    #[test]
    fn falls_back_to_root() {
        let (p, _) = fixture();
        let frames = resolve_frames(&p);
        assert_eq!(
            resolve_container(&p, &frames, 650.0, 500.0, None),
            p.root_node_id
        );
    }

    #[test]
    fn excluded_subtree_is_skipped() {
        let (p, [section, card, ..]) = fixture();
        let frames = resolve_frames(&p);
        assert_eq!(
            resolve_container(&p, &frames, 100.0, 100.0, Some(card)),
            section
        );
        assert_eq!(
            resolve_container(&p, &frames, 100.0, 100.0, Some(section)),
            p.root_node_id
        );
    }

    #[test]
    fn topmost_hit() {
        let (p, [section, _, button, image, form]) = fixture();
        let frames = resolve_frames(&p);
        assert_eq!(hit_test(&p, &frames, 70.0, 70.0), Some(button));
        assert_eq!(hit_test(&p, &frames, 310.0, 60.0), Some(image));
        assert_eq!(hit_test(&p, &frames, 5.0, 395.0), Some(section));
        assert_eq!(hit_test(&p, &frames, 800.0, 100.0), Some(form));
        assert_eq!(hit_test(&p, &frames, 1200.0, 700.0), None);
    }

    #[test]
    fn drop_anchor_is_clamped_inside_frame() {
        assert_eq!(drop_anchor(&Frame::new(0.0, 0.0, 100.0, 100.0)), (50.0, 8.0));
        assert_eq!(drop_anchor(&Frame::new(0.0, 0.0, 100.0, 10.0)), (50.0, 5.0));
    }

    #[test]
    fn handles_are_picked_near_anchors() {
        let f = Frame::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(pick_handle(&f, 302.0, 203.0, HANDLE_RADIUS), Some(ResizeHandle::Se));
        assert_eq!(pick_handle(&f, 200.0, 97.0, HANDLE_RADIUS), Some(ResizeHandle::N));
        assert_eq!(pick_handle(&f, 200.0, 150.0, HANDLE_RADIUS), None);
    }

    #[test]
    fn handle_reach_follows_radius() {
        let f = Frame::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(pick_handle(&f, 305.0, 200.0, 1.0), None);
        assert_eq!(pick_handle(&f, 305.0, 200.0, 6.0), Some(ResizeHandle::Se));
        assert_eq!(pick_handle(&f, 330.0, 200.0, 60.0), Some(ResizeHandle::Se));
    }
}
