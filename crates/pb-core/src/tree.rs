//! Tree builder and structural mutators.
//!
//! Every function here takes the project by `&mut` and either applies its
//! change completely or returns an error having touched nothing, so the
//! model invariants hold between calls.

use crate::catalog::TemplateCatalog;
use crate::error::TreeError;
use crate::id::NodeId;
use crate::layout::{absolute_frame, to_parent_space};
use crate::model::{Content, Frame, Node, NodeType, Project, Settings, Style, StylePatch};
use std::collections::HashMap;

/// How far a duplicate is shifted right and down from its original.
pub const DUPLICATE_OFFSET: f32 = 16.0;

fn node_mut(project: &mut Project, id: NodeId) -> Result<&mut Node, TreeError> {
    project.get_mut(id).ok_or(TreeError::NodeNotFound(id))
}

fn require(project: &Project, id: NodeId) -> Result<&Node, TreeError> {
    project.get(id).ok_or(TreeError::NodeNotFound(id))
}

// ─── Creation ────────────────────────────────────────────────────────────

/// Create a node from its template with its top-left at the absolute point
/// `(x, y)`, appended as the last child of `parent`.
pub fn create_node(
    project: &mut Project,
    catalog: &dyn TemplateCatalog,
    node_type: NodeType,
    parent: NodeId,
    x: f32,
    y: f32,
) -> Result<NodeId, TreeError> {
    let template = catalog
        .template(node_type)
        .ok_or_else(|| TreeError::UnknownTemplate(node_type.as_str().to_string()))?;
    if !require(project, parent)?.node_type.is_container() {
        return Err(TreeError::NotAContainer(parent));
    }

    let (rx, ry) = to_parent_space(project, parent, x, y);
    let id = NodeId::fresh(node_type.as_str());
    let mut node = Node::new(
        id,
        node_type,
        Frame::new(rx, ry, template.width, template.height).clamped(),
    );
    node.name = template.name.clone();
    node.parent_id = Some(parent);
    node.style = Style::from_patch(&template.style);
    node.content = template.content.clone();

    project.nodes_by_id.insert(id, node);
    node_mut(project, parent)?.children.push(id);
    log::debug!("created {id} ({}) under {parent}", node_type.as_str());
    Ok(id)
}

/// Parse a drag-start payload into a node type known to `catalog`.
pub fn template_type(catalog: &dyn TemplateCatalog, payload: &str) -> Result<NodeType, TreeError> {
    NodeType::parse(payload)
        .filter(|ty| catalog.template(*ty).is_some())
        .ok_or_else(|| TreeError::UnknownTemplate(payload.trim().to_string()))
}

// ─── Removal / duplication ───────────────────────────────────────────────

/// Remove `id` and its whole subtree. Returns the removed ids.
pub fn remove_node(project: &mut Project, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
    if id == project.root_node_id {
        return Err(TreeError::RootImmutable("removed"));
    }
    let parent = require(project, id)?.parent_id;

    let removed = project.subtree(id);
    for gone in &removed {
        project.nodes_by_id.remove(gone);
    }
    if let Some(parent) = parent
        && let Some(p) = project.get_mut(parent)
    {
        p.children.retain(|c| *c != id);
    }
    log::debug!("removed {id} ({} nodes)", removed.len());
    Ok(removed)
}

/// Deep-copy `id`'s subtree with fresh ids. The copy is inserted right
/// after the original and shifted by [`DUPLICATE_OFFSET`].
pub fn duplicate_node(project: &mut Project, id: NodeId) -> Result<NodeId, TreeError> {
    if id == project.root_node_id {
        return Err(TreeError::RootImmutable("duplicated"));
    }
    let parent = require(project, id)?
        .parent_id
        .ok_or(TreeError::NodeNotFound(id))?;

    let originals = project.subtree(id);
    let mapping: HashMap<NodeId, NodeId> = originals
        .iter()
        .map(|&old| {
            let prefix = project
                .get(old)
                .map(|n| n.node_type.as_str())
                .unwrap_or("node");
            (old, NodeId::fresh(prefix))
        })
        .collect();

    let mut copies = Vec::with_capacity(originals.len());
    for old in &originals {
        let Some(src) = project.get(*old) else {
            continue;
        };
        let mut copy = src.clone();
        copy.id = mapping[old];
        copy.parent_id = copy.parent_id.map(|p| mapping.get(&p).copied().unwrap_or(p));
        copy.children = copy
            .children
            .iter()
            .filter_map(|c| mapping.get(c).copied())
            .collect();
        copies.push(copy);
    }

    let new_id = mapping[&id];
    for mut copy in copies {
        if copy.id == new_id {
            copy.frame.x += DUPLICATE_OFFSET;
            copy.frame.y += DUPLICATE_OFFSET;
        }
        project.nodes_by_id.insert(copy.id, copy);
    }

    let siblings = &mut node_mut(project, parent)?.children;
    let at = siblings
        .iter()
        .position(|c| *c == id)
        .map_or(siblings.len(), |i| i + 1);
    siblings.insert(at, new_id);
    log::debug!("duplicated {id} as {new_id}");
    Ok(new_id)
}

// ─── Field edits ─────────────────────────────────────────────────────────

pub fn rename_node(project: &mut Project, id: NodeId, name: &str) -> Result<(), TreeError> {
    node_mut(project, id)?.name = name.to_string();
    Ok(())
}

/// Merge a style patch into the node's style.
pub fn set_style(project: &mut Project, id: NodeId, patch: &StylePatch) -> Result<(), TreeError> {
    node_mut(project, id)?.style.apply(patch);
    Ok(())
}

pub fn set_content(project: &mut Project, id: NodeId, content: Content) -> Result<(), TreeError> {
    node_mut(project, id)?.content = content;
    Ok(())
}

/// Replace the node's parent-relative frame, raised to the size floor.
pub fn set_frame(project: &mut Project, id: NodeId, frame: Frame) -> Result<(), TreeError> {
    node_mut(project, id)?.frame = frame.clamped();
    Ok(())
}

/// Set the node's frame from an absolute canvas frame.
pub fn set_absolute_frame(project: &mut Project, id: NodeId, abs: Frame) -> Result<(), TreeError> {
    let parent = require(project, id)?.parent_id;
    let (x, y) = match parent {
        Some(p) => to_parent_space(project, p, abs.x, abs.y),
        None => (abs.x, abs.y),
    };
    set_frame(project, id, abs.with_origin(x, y))
}

/// Replace the settings block. The page root follows the canvas size.
pub fn update_settings(project: &mut Project, settings: Settings) {
    project.settings = settings;
    let root = project.root_node_id;
    if let Some(page) = project.get_mut(root) {
        page.frame.width = settings.canvas_width;
        page.frame.height = settings.canvas_height;
        page.frame = page.frame.clamped();
    }
}

// ─── Z-order ─────────────────────────────────────────────────────────────

/// Move `id` within its parent's children from its current index to the
/// one `target` picks. Returns true if the order changed.
fn restack(
    project: &mut Project,
    id: NodeId,
    target: fn(pos: usize, last: usize) -> usize,
) -> Result<bool, TreeError> {
    if id == project.root_node_id {
        return Err(TreeError::RootImmutable("reordered"));
    }
    let parent = require(project, id)?
        .parent_id
        .ok_or(TreeError::NodeNotFound(id))?;
    let siblings = &mut node_mut(project, parent)?.children;
    let Some(pos) = siblings.iter().position(|c| *c == id) else {
        return Ok(false);
    };
    let to = target(pos, siblings.len() - 1);
    if to == pos {
        return Ok(false);
    }
    let moved = siblings.remove(pos);
    siblings.insert(to, moved);
    Ok(true)
}

/// One step toward the front (later in paint order).
pub fn bring_forward(project: &mut Project, id: NodeId) -> Result<bool, TreeError> {
    restack(project, id, |pos, last| (pos + 1).min(last))
}

/// One step toward the back.
pub fn send_backward(project: &mut Project, id: NodeId) -> Result<bool, TreeError> {
    restack(project, id, |pos, _| pos.saturating_sub(1))
}

pub fn bring_to_front(project: &mut Project, id: NodeId) -> Result<bool, TreeError> {
    restack(project, id, |_, last| last)
}

pub fn send_to_back(project: &mut Project, id: NodeId) -> Result<bool, TreeError> {
    restack(project, id, |_, _| 0)
}

// ─── Reparenting ─────────────────────────────────────────────────────────

/// Check whether `id` may move under `new_parent` without changing
/// anything.
pub fn check_reparent(project: &Project, id: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
    require(project, id)?;
    let target = require(project, new_parent)?;
    if id == new_parent {
        return Err(TreeError::SelfReparent(id));
    }
    if id == project.root_node_id {
        return Err(TreeError::RootImmutable("reparented"));
    }
    if !target.node_type.is_container() {
        return Err(TreeError::NotAContainer(new_parent));
    }
    if project.ancestors(new_parent).contains(&id) {
        return Err(TreeError::Cycle {
            node: id,
            target: new_parent,
        });
    }
    Ok(())
}

/// Move `id` under `new_parent` as its last child, keeping its absolute
/// position. Returns false (and changes nothing) if it is already there.
pub fn reparent(project: &mut Project, id: NodeId, new_parent: NodeId) -> Result<bool, TreeError> {
    check_reparent(project, id, new_parent)?;
    let old_parent = project.parent_of(id);
    if old_parent == Some(new_parent) {
        return Ok(false);
    }

    let abs = absolute_frame(project, id).ok_or(TreeError::NodeNotFound(id))?;
    let (rx, ry) = to_parent_space(project, new_parent, abs.x, abs.y);

    if let Some(old) = old_parent
        && let Some(p) = project.get_mut(old)
    {
        p.children.retain(|c| *c != id);
    }
    node_mut(project, new_parent)?.children.push(id);
    let node = node_mut(project, id)?;
    node.parent_id = Some(new_parent);
    node.frame = node.frame.with_origin(rx, ry);

    log::debug!("reparented {id} under {new_parent}");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinCatalog;
    use pretty_assertions::assert_eq;

    fn build() -> (Project, NodeId, NodeId, NodeId) {
        let catalog = BuiltinCatalog::new();
        let mut p = Project::new();
        let root = p.root_node_id;
        let section = create_node(&mut p, &catalog, NodeType::Section, root, 0.0, 100.0).unwrap();
        let card = create_node(&mut p, &catalog, NodeType::Card, section, 40.0, 140.0).unwrap();
        let button = create_node(&mut p, &catalog, NodeType::Button, card, 60.0, 180.0).unwrap();
        (p, section, card, button)
    }

    #[test]
    fn create_places_at_absolute_point() {
        let (p, section, card, button) = build();
        assert_eq!(p.get(card).unwrap().frame.x, 40.0);
        assert_eq!(p.get(card).unwrap().frame.y, 40.0);
        assert_eq!(p.get(button).unwrap().frame.x, 20.0);
        assert_eq!(p.get(button).unwrap().frame.y, 40.0);
        assert_eq!(p.children_of(section), &[card]);
        assert_eq!(p.get(button).unwrap().content.text.as_deref(), Some("Click me"));
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn create_rejects_leaf_parent_and_page_type() {
        let catalog = BuiltinCatalog::new();
        let (mut p, _, _, button) = build();
        let before = p.clone();
        assert_eq!(
            create_node(&mut p, &catalog, NodeType::Text, button, 0.0, 0.0),
            Err(TreeError::NotAContainer(button))
        );
        let root = p.root_node_id;
        assert_eq!(
            create_node(&mut p, &catalog, NodeType::Page, root, 0.0, 0.0),
            Err(TreeError::UnknownTemplate("page".into()))
        );
        assert_eq!(p, before);
    }

    #[test]
    fn payload_must_name_a_catalog_type() {
        let catalog = BuiltinCatalog::new();
        assert_eq!(template_type(&catalog, "image"), Ok(NodeType::Image));
        assert_eq!(
            template_type(&catalog, "carousel"),
            Err(TreeError::UnknownTemplate("carousel".into()))
        );
    }

    #[test]
    fn remove_takes_subtree() {
        let (mut p, section, card, button) = build();
        let removed = remove_node(&mut p, card).unwrap();
        assert_eq!(removed, vec![card, button]);
        assert!(p.children_of(section).is_empty());
        assert_eq!(p.len(), 2);
        assert_eq!(p.validate(), Ok(()));

        let root = p.root_node_id;
        assert_eq!(
            remove_node(&mut p, root),
            Err(TreeError::RootImmutable("removed"))
        );
    }

    #[test]
    fn duplicate_copies_subtree_after_original() {
        let (mut p, section, card, _) = build();
        let copy = duplicate_node(&mut p, card).unwrap();
        assert_eq!(p.children_of(section), &[card, copy]);
        assert_eq!(p.len(), 6);

        let f = p.get(copy).unwrap().frame;
        assert_eq!((f.x, f.y), (40.0 + DUPLICATE_OFFSET, 40.0 + DUPLICATE_OFFSET));
        let inner = p.children_of(copy)[0];
        assert_eq!(p.parent_of(inner), Some(copy));
        assert_eq!(p.get(inner).unwrap().node_type, NodeType::Button);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn z_order_moves() {
        let catalog = BuiltinCatalog::new();
        let mut p = Project::new();
        let root = p.root_node_id;
        let a = create_node(&mut p, &catalog, NodeType::Text, root, 0.0, 0.0).unwrap();
        let b = create_node(&mut p, &catalog, NodeType::Text, root, 0.0, 0.0).unwrap();
        let c = create_node(&mut p, &catalog, NodeType::Text, root, 0.0, 0.0).unwrap();

        assert_eq!(bring_forward(&mut p, a), Ok(true));
        assert_eq!(p.children_of(root), &[b, a, c]);
        assert_eq!(bring_to_front(&mut p, b), Ok(true));
        assert_eq!(p.children_of(root), &[a, c, b]);
        assert_eq!(bring_to_front(&mut p, b), Ok(false));
        assert_eq!(send_to_back(&mut p, c), Ok(true));
        assert_eq!(p.children_of(root), &[c, a, b]);
        assert_eq!(send_backward(&mut p, c), Ok(false));
    }

    #[test]
    fn set_frame_clamps() {
        let (mut p, _, _, button) = build();
        set_frame(&mut p, button, Frame::new(0.0, 0.0, 2.0, 300.0)).unwrap();
        assert_eq!(p.get(button).unwrap().frame, Frame::new(0.0, 0.0, 24.0, 300.0));
    }

    #[test]
    fn reparent_keeps_absolute_position() {
        let (mut p, section, card, button) = build();
        let before = absolute_frame(&p, button).unwrap();
        assert_eq!(reparent(&mut p, button, section), Ok(true));
        assert_eq!(absolute_frame(&p, button), Some(before));
        assert_eq!(p.parent_of(button), Some(section));
        assert!(p.children_of(card).is_empty());
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn reparent_rejections_leave_tree_unchanged() {
        let (mut p, section, card, button) = build();
        let before = p.clone();
        assert_eq!(
            reparent(&mut p, card, card),
            Err(TreeError::SelfReparent(card))
        );
        assert_eq!(
            reparent(&mut p, card, button),
            Err(TreeError::NotAContainer(button))
        );
        assert_eq!(
            reparent(&mut p, section, card),
            Err(TreeError::Cycle {
                node: section,
                target: card
            })
        );
        assert_eq!(reparent(&mut p, card, section), Ok(false));
        assert_eq!(p, before);
    }
}
