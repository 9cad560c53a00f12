//! Style declarations shared by both exporters.
//!
//! A node's style and resolved frame become an ordered list of
//! declarations; the markup exporter prints them as CSS rules and the
//! component exporter as inline style objects.

use pb_core::color::composite;
use pb_core::id::NodeId;
use pb_core::model::{
    FlexAlign, FlexDirection, Frame, LayoutMode, Node, NodeType, Settings, Style, TextAlign,
};

/// A declaration value, kept typed so each exporter can print it natively.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Pixel length.
    Px(f32),
    /// Unitless number.
    Num(f32),
    Text(String),
}

impl Value {
    /// CSS text form (`12px`, `1.5`, `#fff`).
    pub fn to_css(&self) -> String {
        match self {
            Value::Px(n) if *n == 0.0 => "0".to_string(),
            Value::Px(n) => format!("{}px", format_num(*n)),
            Value::Num(n) => format_num(*n),
            Value::Text(s) => s.clone(),
        }
    }
}

pub type Decl = (&'static str, Value);

pub fn format_num(n: f32) -> String {
    if n == n.floor() && n.abs() < i32::MAX as f32 {
        format!("{}", n as i32)
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Class name for a node. Characters outside `[A-Za-z0-9_-]` become `-`.
pub fn class_name(id: NodeId) -> String {
    let mut name = String::from("pb-");
    name.extend(id.as_str().chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c
        } else {
            '-'
        }
    }));
    name
}

/// Escape text for an HTML text node.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for a double-quoted HTML attribute.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Whether the node's type carries text and needs typography.
fn has_text(node_type: NodeType) -> bool {
    !matches!(
        node_type,
        NodeType::Image | NodeType::Video | NodeType::Divider
    )
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn flex_align(a: FlexAlign) -> &'static str {
    match a {
        FlexAlign::Start => "flex-start",
        FlexAlign::Center => "center",
        FlexAlign::End => "flex-end",
        FlexAlign::SpaceBetween => "space-between",
        FlexAlign::Stretch => "stretch",
    }
}

/// Declarations for the page wrapper: canvas-sized, relatively positioned.
pub fn page_declarations(root: &Node, settings: &Settings) -> Vec<Decl> {
    let mut decls = vec![
        ("position", text("relative")),
        ("width", Value::Px(settings.canvas_width)),
        ("height", Value::Px(settings.canvas_height)),
        ("overflow", text("hidden")),
    ];
    paint(&mut decls, &root.style);
    typography(&mut decls, &root.style);
    decls
}

/// Declarations for a node placed at `frame` (relative to its parent).
pub fn node_declarations(node: &Node, frame: Frame) -> Vec<Decl> {
    let style = &node.style;
    let mut decls = vec![
        ("position", text("absolute")),
        ("left", Value::Px(frame.x)),
        ("top", Value::Px(frame.y)),
        ("width", Value::Px(frame.width)),
        ("height", Value::Px(frame.height)),
    ];
    paint(&mut decls, style);

    if style.padding > 0.0 {
        decls.push(("padding", Value::Px(style.padding)));
    }
    match style.layout {
        LayoutMode::Block => {}
        LayoutMode::Flex {
            direction,
            justify,
            align,
        } => {
            decls.push(("display", text("flex")));
            let direction = match direction {
                FlexDirection::Row => "row",
                FlexDirection::Column => "column",
            };
            decls.push(("flex-direction", text(direction)));
            decls.push(("justify-content", text(flex_align(justify))));
            decls.push(("align-items", text(flex_align(align))));
        }
        LayoutMode::Grid { columns } => {
            decls.push(("display", text("grid")));
            decls.push((
                "grid-template-columns",
                Value::Text(format!("repeat({}, 1fr)", columns.max(1))),
            ));
        }
    }
    if style.gap > 0.0 && style.layout != LayoutMode::Block {
        decls.push(("gap", Value::Px(style.gap)));
    }

    match node.node_type {
        NodeType::Image | NodeType::Video => decls.push(("object-fit", text("cover"))),
        NodeType::Divider => {
            let line = composite(&style.border_color, style.border_opacity);
            decls.push(("border-top", Value::Text(format!("1px solid {line}"))));
        }
        ty if has_text(ty) => typography(&mut decls, style),
        _ => {}
    }
    decls
}

fn paint(decls: &mut Vec<Decl>, style: &Style) {
    let background = composite(&style.background_color, style.background_opacity);
    if background != "transparent" {
        decls.push(("background-color", Value::Text(background)));
    }
    if style.border_width > 0.0 {
        decls.push((
            "border",
            Value::Text(format!(
                "{}px solid {}",
                format_num(style.border_width),
                composite(&style.border_color, style.border_opacity)
            )),
        ));
    } else {
        decls.push(("border", text("none")));
    }
    if style.border_radius > 0.0 {
        decls.push(("border-radius", Value::Px(style.border_radius)));
    }
}

fn typography(decls: &mut Vec<Decl>, style: &Style) {
    decls.push((
        "color",
        Value::Text(composite(&style.text_color, style.text_opacity)),
    ));
    decls.push(("font-family", Value::Text(style.font_family.clone())));
    decls.push(("font-size", Value::Px(style.font_size)));
    decls.push(("font-weight", Value::Num(f32::from(style.font_weight))));
    decls.push(("line-height", Value::Num(style.line_height)));
    let align = match style.text_align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    };
    decls.push(("text-align", text(align)));
}
