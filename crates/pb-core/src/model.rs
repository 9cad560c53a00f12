//! Core node-tree data model for page-builder projects.
//!
//! A project is an arena: every node lives in `nodes_by_id` and links to its
//! parent and children by id, never by reference. Geometry lives only in
//! each node's `frame`, expressed relative to the parent's origin. Style and
//! content are opaque to the layout engine and only read by the exporters.

use crate::error::ModelError;
use crate::id::NodeId;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Size floor enforced by every mutator, not just the UI.
pub const MIN_NODE_SIZE: f32 = 24.0;

/// Slack for floating-point comparisons against the size floor.
const SIZE_EPSILON: f32 = 1e-3;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A rectangle `{x, y, width, height}`.
///
/// Stored on nodes it is parent-relative; produced by the frame resolver it
/// is in absolute canvas coordinates.
/// Missing fields deserialize as zero; loading then raises the size to
/// the floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Same frame moved to a new origin.
    pub fn with_origin(self, x: f32, y: f32) -> Self {
        Self { x, y, ..self }
    }

    /// Same origin with width/height raised to the size floor.
    /// NaN dimensions are treated as zero.
    pub fn clamped(self) -> Self {
        Self {
            width: clamp_size(self.width),
            height: clamp_size(self.height),
            ..self
        }
    }

    /// Same size, origin shifted by `d`.
    pub fn translated(self, d: kurbo::Vec2) -> Self {
        self.with_origin(self.x + d.x as f32, self.y + d.y as f32)
    }
}

fn clamp_size(v: f32) -> f32 {
    if v.is_nan() {
        MIN_NODE_SIZE
    } else {
        v.max(MIN_NODE_SIZE)
    }
}

// ─── Node types ──────────────────────────────────────────────────────────

/// The closed set of node types. Determines drop-container eligibility and
/// the markup each node exports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// The document root (canvas-sized page).
    Page,
    Section,
    Container,
    Grid,
    Card,
    Form,
    Heading,
    Paragraph,
    Text,
    Link,
    Button,
    Input,
    Textarea,
    Select,
    Checkbox,
    Image,
    Video,
    Divider,
}

impl NodeType {
    /// Every type, in library listing order.
    pub const ALL: [NodeType; 18] = [
        NodeType::Page,
        NodeType::Section,
        NodeType::Container,
        NodeType::Grid,
        NodeType::Card,
        NodeType::Form,
        NodeType::Heading,
        NodeType::Paragraph,
        NodeType::Text,
        NodeType::Link,
        NodeType::Button,
        NodeType::Input,
        NodeType::Textarea,
        NodeType::Select,
        NodeType::Checkbox,
        NodeType::Image,
        NodeType::Video,
        NodeType::Divider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Page => "page",
            NodeType::Section => "section",
            NodeType::Container => "container",
            NodeType::Grid => "grid",
            NodeType::Card => "card",
            NodeType::Form => "form",
            NodeType::Heading => "heading",
            NodeType::Paragraph => "paragraph",
            NodeType::Text => "text",
            NodeType::Link => "link",
            NodeType::Button => "button",
            NodeType::Input => "input",
            NodeType::Textarea => "textarea",
            NodeType::Select => "select",
            NodeType::Checkbox => "checkbox",
            NodeType::Image => "image",
            NodeType::Video => "video",
            NodeType::Divider => "divider",
        }
    }

    /// Parse a type tag (e.g. a drag-start payload). Case-insensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(tag))
    }

    /// Whether nodes of this type may receive children and act as drop targets.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Page
                | NodeType::Section
                | NodeType::Container
                | NodeType::Grid
                | NodeType::Card
                | NodeType::Form
        )
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

/// Main/cross axis distribution for flex layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexAlign {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    Stretch,
}

/// How a container arranges its children in exported output.
///
/// The editor positions everything by frame; this is carried through to
/// the exporters as presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Block,
    Flex {
        #[serde(default)]
        direction: FlexDirection,
        #[serde(default)]
        justify: FlexAlign,
        #[serde(default)]
        align: FlexAlign,
    },
    Grid {
        #[serde(default = "default_grid_columns")]
        columns: u32,
    },
}

fn default_grid_columns() -> u32 {
    2
}

/// Flat record of presentation attributes.
///
/// Every field has an engine default, so persisted styles with missing
/// fields deserialize by merging over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    pub background_color: String,
    /// Percentage, 0..=100.
    pub background_opacity: f32,
    pub text_color: String,
    pub text_opacity: f32,
    pub border_color: String,
    pub border_opacity: f32,
    pub border_width: f32,
    pub border_radius: f32,
    pub padding: f32,
    pub gap: f32,
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub layout: LayoutMode,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: "transparent".into(),
            background_opacity: 100.0,
            text_color: "#111827".into(),
            text_opacity: 100.0,
            border_color: "#d1d5db".into(),
            border_opacity: 100.0,
            border_width: 0.0,
            border_radius: 0.0,
            padding: 0.0,
            gap: 0.0,
            font_family: "Inter, system-ui, sans-serif".into(),
            font_size: 16.0,
            font_weight: 400,
            line_height: 1.5,
            text_align: TextAlign::Left,
            layout: LayoutMode::Block,
        }
    }
}

/// Partial style edit. `Some` fields overwrite, `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StylePatch {
    pub background_color: Option<String>,
    pub background_opacity: Option<f32>,
    pub text_color: Option<String>,
    pub text_opacity: Option<f32>,
    pub border_color: Option<String>,
    pub border_opacity: Option<f32>,
    pub border_width: Option<f32>,
    pub border_radius: Option<f32>,
    pub padding: Option<f32>,
    pub gap: Option<f32>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub line_height: Option<f32>,
    pub text_align: Option<TextAlign>,
    pub layout: Option<LayoutMode>,
}

impl Style {
    /// Merge `patch` into this style, overwriting only `Some` fields.
    /// Opacities are clamped to 0..=100.
    pub fn apply(&mut self, patch: &StylePatch) {
        if let Some(c) = &patch.background_color {
            self.background_color = c.clone();
        }
        if let Some(o) = patch.background_opacity {
            self.background_opacity = o.clamp(0.0, 100.0);
        }
        if let Some(c) = &patch.text_color {
            self.text_color = c.clone();
        }
        if let Some(o) = patch.text_opacity {
            self.text_opacity = o.clamp(0.0, 100.0);
        }
        if let Some(c) = &patch.border_color {
            self.border_color = c.clone();
        }
        if let Some(o) = patch.border_opacity {
            self.border_opacity = o.clamp(0.0, 100.0);
        }
        if let Some(w) = patch.border_width {
            self.border_width = w.max(0.0);
        }
        if let Some(r) = patch.border_radius {
            self.border_radius = r.max(0.0);
        }
        if let Some(p) = patch.padding {
            self.padding = p.max(0.0);
        }
        if let Some(g) = patch.gap {
            self.gap = g.max(0.0);
        }
        if let Some(f) = &patch.font_family {
            self.font_family = f.clone();
        }
        if let Some(s) = patch.font_size {
            self.font_size = s;
        }
        if let Some(w) = patch.font_weight {
            self.font_weight = w;
        }
        if let Some(h) = patch.line_height {
            self.line_height = h;
        }
        if let Some(a) = patch.text_align {
            self.text_align = a;
        }
        if let Some(l) = patch.layout {
            self.layout = l;
        }
    }

    /// Engine defaults with `patch` merged on top.
    pub fn from_patch(patch: &StylePatch) -> Self {
        let mut style = Self::default();
        style.apply(patch);
        style
    }
}

// ─── Content ─────────────────────────────────────────────────────────────

/// Node-specific payload. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Content {
    pub text: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub placeholder: Option<String>,
    pub href: Option<String>,
    pub options: Vec<String>,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A single positioned element in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    /// Display name shown in the layers panel.
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Owning node; `None` only for the root.
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// Paint / z-order, back to front.
    #[serde(default)]
    pub children: SmallVec<[NodeId; 4]>,

    /// Parent-relative geometry.
    #[serde(default)]
    pub frame: Frame,

    #[serde(default)]
    pub style: Style,

    #[serde(default)]
    pub content: Content,
}

impl Node {
    pub fn new(id: NodeId, node_type: NodeType, frame: Frame) -> Self {
        Self {
            id,
            name: String::new(),
            node_type,
            parent_id: None,
            children: SmallVec::new(),
            frame,
            style: Style::default(),
            content: Content::default(),
        }
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

/// Editor-wide configuration carried with the project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub grid_size: f32,
    pub snap_to_grid: bool,
    /// Enables sibling-edge snapping and its guide lines.
    pub show_guides: bool,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: 8.0,
            snap_to_grid: true,
            show_guides: true,
            canvas_width: 1280.0,
            canvas_height: 800.0,
        }
    }
}

/// The aggregate root: an arena of nodes plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub root_node_id: NodeId,
    pub nodes_by_id: HashMap<NodeId, Node>,
    #[serde(default)]
    pub settings: Settings,
}

impl Project {
    /// A fresh empty project: a single canvas-sized page root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let root_id = NodeId::root();
        let mut root = Node::new(
            root_id,
            NodeType::Page,
            Frame::new(0.0, 0.0, settings.canvas_width, settings.canvas_height).clamped(),
        );
        root.name = "Page".into();

        let mut nodes_by_id = HashMap::new();
        nodes_by_id.insert(root_id, root);

        Self {
            root_node_id: root_id,
            nodes_by_id,
            settings,
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes_by_id.get(&self.root_node_id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes_by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes_by_id.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes_by_id.is_empty()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent_id)
    }

    /// Children in paint order; empty for unknown ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    ///
    /// Bounded by the node count so a malformed (cyclic) chain terminates.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(p) = current {
            if out.len() > self.nodes_by_id.len() {
                break;
            }
            out.push(p);
            current = self.parent_of(p);
        }
        out
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        ancestor != descendant && self.ancestors(descendant).contains(&ancestor)
    }

    /// `id` and all of its descendants in depth-first pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if out.contains(&current) {
                continue;
            }
            out.push(current);
            for &child in self.children_of(current).iter().rev() {
                if self.contains(child) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Check the structural invariants: single root, consistent
    /// parent/child links, no dangling ids, acyclic, size floor.
    pub fn validate(&self) -> Result<(), ModelError> {
        let root_id = self.root_node_id;
        let root = self
            .nodes_by_id
            .get(&root_id)
            .ok_or(ModelError::MissingRoot(root_id))?;
        if root.parent_id.is_some() {
            return Err(ModelError::RootHasParent(root_id));
        }

        let mut graph: DiGraphMap<NodeId, ()> = DiGraphMap::with_capacity(self.len(), self.len());
        for (&key, node) in &self.nodes_by_id {
            if node.id != key {
                return Err(ModelError::KeyMismatch { key, id: node.id });
            }
            graph.add_node(key);

            match node.parent_id {
                None if key != root_id => return Err(ModelError::Orphan(key)),
                None => {}
                Some(parent_id) => {
                    let parent =
                        self.get(parent_id)
                            .ok_or(ModelError::DanglingReference {
                                node: key,
                                missing: parent_id,
                            })?;
                    if !parent.children.contains(&key) {
                        return Err(ModelError::LinkMismatch {
                            parent: parent_id,
                            child: key,
                        });
                    }
                }
            }

            for (i, &child_id) in node.children.iter().enumerate() {
                let child = self
                    .get(child_id)
                    .ok_or(ModelError::DanglingReference {
                        node: key,
                        missing: child_id,
                    })?;
                if child.parent_id != Some(key) {
                    return Err(ModelError::LinkMismatch {
                        parent: key,
                        child: child_id,
                    });
                }
                if node.children[..i].contains(&child_id) {
                    return Err(ModelError::DuplicateChild {
                        parent: key,
                        child: child_id,
                    });
                }
                graph.add_edge(key, child_id, ());
            }

            let f = node.frame;
            if !(f.width + SIZE_EPSILON >= MIN_NODE_SIZE && f.height + SIZE_EPSILON >= MIN_NODE_SIZE)
            {
                return Err(ModelError::Undersized(key));
            }
        }

        if is_cyclic_directed(&graph) {
            return Err(ModelError::Cycle);
        }

        let mut reached = 0usize;
        let mut dfs = Dfs::new(&graph, root_id);
        while dfs.next(&graph).is_some() {
            reached += 1;
        }
        if reached != self.len() {
            let unreached = self
                .nodes_by_id
                .keys()
                .copied()
                .find(|&id| id != root_id && !self.ancestors(id).contains(&root_id));
            return Err(ModelError::Unreachable(unreached.unwrap_or(root_id)));
        }

        Ok(())
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attach(project: &mut Project, parent: NodeId, mut node: Node) -> NodeId {
        let id = node.id;
        node.parent_id = Some(parent);
        project.nodes_by_id.insert(id, node);
        project.get_mut(parent).unwrap().children.push(id);
        id
    }

    fn sample() -> (Project, NodeId, NodeId) {
        let mut p = Project::new();
        let root = p.root_node_id;
        let section = attach(
            &mut p,
            root,
            Node::new(
                NodeId::intern("m_section"),
                NodeType::Section,
                Frame::new(0.0, 0.0, 400.0, 300.0),
            ),
        );
        let button = attach(
            &mut p,
            section,
            Node::new(
                NodeId::intern("m_button"),
                NodeType::Button,
                Frame::new(10.0, 10.0, 120.0, 40.0),
            ),
        );
        (p, section, button)
    }

    #[test]
    fn new_project_is_valid() {
        let p = Project::new();
        assert_eq!(p.len(), 1);
        assert_eq!(p.validate(), Ok(()));
        let root = p.root().unwrap();
        assert_eq!(root.node_type, NodeType::Page);
        assert_eq!(root.frame.width, 1280.0);
    }

    #[test]
    fn ancestors_and_subtree() {
        let (p, section, button) = sample();
        assert_eq!(p.ancestors(button), vec![section, p.root_node_id]);
        assert!(p.is_ancestor_of(section, button));
        assert!(!p.is_ancestor_of(button, section));
        assert!(!p.is_ancestor_of(section, section));
        assert_eq!(p.subtree(section), vec![section, button]);
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn validate_detects_link_mismatch() {
        let (mut p, section, button) = sample();
        p.get_mut(section).unwrap().children.clear();
        assert_eq!(
            p.validate(),
            Err(ModelError::LinkMismatch {
                parent: section,
                child: button
            })
        );
    }

    #[test]
    fn validate_detects_cycle() {
        let (mut p, section, button) = sample();
        // section <-> button, detached from root
        let root = p.root_node_id;
        p.get_mut(root).unwrap().children.clear();
        p.get_mut(section).unwrap().parent_id = Some(button);
        p.get_mut(button).unwrap().children.push(section);
        assert_eq!(p.validate(), Err(ModelError::Cycle));
    }

    #[test]
    fn validate_detects_undersized_frame() {
        let (mut p, _, button) = sample();
        p.get_mut(button).unwrap().frame.height = 4.0;
        assert_eq!(p.validate(), Err(ModelError::Undersized(button)));
    }

    #[test]
    fn frame_clamp_enforces_floor() {
        let f = Frame::new(5.0, 5.0, -10.0, f32::NAN).clamped();
        assert_eq!(f.width, MIN_NODE_SIZE);
        assert_eq!(f.height, MIN_NODE_SIZE);
        assert_eq!((f.x, f.y), (5.0, 5.0));
    }

    #[test]
    fn translated_keeps_size() {
        let f = Frame::new(10.0, 20.0, 100.0, 40.0).translated(kurbo::Vec2::new(5.0, -20.0));
        assert_eq!(f, Frame::new(15.0, 0.0, 100.0, 40.0));
    }

    #[test]
    fn missing_frame_fields_deserialize_as_zero() {
        let f: Frame = serde_json::from_str(r#"{"x": 10, "width": 100}"#).unwrap();
        assert_eq!(f, Frame::new(10.0, 0.0, 100.0, 0.0));
    }

    #[test]
    fn node_type_parse_and_containers() {
        assert_eq!(NodeType::parse("Button"), Some(NodeType::Button));
        assert_eq!(NodeType::parse(" grid "), Some(NodeType::Grid));
        assert_eq!(NodeType::parse("carousel"), None);
        assert!(NodeType::Section.is_container());
        assert!(!NodeType::Image.is_container());
    }

    #[test]
    fn style_patch_merges_only_some_fields() {
        let mut style = Style::default();
        style.apply(&StylePatch {
            background_color: Some("#2563eb".into()),
            background_opacity: Some(140.0),
            ..Default::default()
        });
        assert_eq!(style.background_color, "#2563eb");
        assert_eq!(style.background_opacity, 100.0);
        assert_eq!(style.font_size, Style::default().font_size);
    }

    #[test]
    fn style_missing_fields_take_defaults() {
        let style: Style = serde_json::from_str(r##"{"textColor":"#ff0000"}"##).unwrap();
        assert_eq!(style.text_color, "#ff0000");
        assert_eq!(style.font_weight, 400);
        assert_eq!(style.layout, LayoutMode::Block);
    }
}
