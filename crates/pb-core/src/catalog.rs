//! Component templates: the default size, style and content each node type
//! starts with when dropped from the library.

use crate::model::{Content, FlexAlign, FlexDirection, LayoutMode, NodeType, StylePatch, TextAlign};
use std::collections::HashMap;

/// A named preset for one node type.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub node_type: NodeType,
    /// Display name given to new nodes.
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Merged over the engine style defaults.
    pub style: StylePatch,
    pub content: Content,
}

/// Lookup from node type to its template.
///
/// Implemented by the built-in catalog below and by hosts that ship their
/// own component library.
pub trait TemplateCatalog {
    fn template(&self, ty: NodeType) -> Option<&Template>;
}

/// The stock component library. Covers every droppable type (everything
/// except the page root).
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    templates: HashMap<NodeType, Template>,
}

impl TemplateCatalog for BuiltinCatalog {
    fn template(&self, ty: NodeType) -> Option<&Template> {
        self.templates.get(&ty)
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn text(s: &str) -> Content {
    Content {
        text: Some(s.into()),
        ..Default::default()
    }
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        let mut put = |node_type: NodeType,
                       name: &str,
                       (width, height): (f32, f32),
                       style: StylePatch,
                       content: Content| {
            templates.insert(
                node_type,
                Template {
                    node_type,
                    name: name.into(),
                    width,
                    height,
                    style,
                    content,
                },
            );
        };

        put(
            NodeType::Section,
            "Section",
            (1280.0, 400.0),
            StylePatch {
                background_color: Some("#ffffff".into()),
                padding: Some(48.0),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Container,
            "Container",
            (480.0, 240.0),
            StylePatch {
                padding: Some(16.0),
                layout: Some(LayoutMode::Flex {
                    direction: FlexDirection::Column,
                    justify: FlexAlign::Start,
                    align: FlexAlign::Stretch,
                }),
                gap: Some(12.0),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Grid,
            "Grid",
            (640.0, 320.0),
            StylePatch {
                layout: Some(LayoutMode::Grid { columns: 3 }),
                gap: Some(16.0),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Card,
            "Card",
            (300.0, 360.0),
            StylePatch {
                background_color: Some("#ffffff".into()),
                border_color: Some("#e5e7eb".into()),
                border_width: Some(1.0),
                border_radius: Some(12.0),
                padding: Some(24.0),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Form,
            "Form",
            (400.0, 320.0),
            StylePatch {
                padding: Some(24.0),
                gap: Some(12.0),
                layout: Some(LayoutMode::Flex {
                    direction: FlexDirection::Column,
                    justify: FlexAlign::Start,
                    align: FlexAlign::Stretch,
                }),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Heading,
            "Heading",
            (480.0, 56.0),
            StylePatch {
                font_size: Some(36.0),
                font_weight: Some(700),
                line_height: Some(1.2),
                ..Default::default()
            },
            text("Your headline here"),
        );
        put(
            NodeType::Paragraph,
            "Paragraph",
            (480.0, 96.0),
            StylePatch {
                text_color: Some("#4b5563".into()),
                ..Default::default()
            },
            text("Write a short description of your product or service."),
        );
        put(
            NodeType::Text,
            "Text",
            (200.0, 24.0),
            StylePatch::default(),
            text("Text"),
        );
        put(
            NodeType::Link,
            "Link",
            (120.0, 24.0),
            StylePatch {
                text_color: Some("#2563eb".into()),
                ..Default::default()
            },
            Content {
                text: Some("Learn more".into()),
                href: Some("#".into()),
                ..Default::default()
            },
        );
        put(
            NodeType::Button,
            "Button",
            (140.0, 44.0),
            StylePatch {
                background_color: Some("#2563eb".into()),
                text_color: Some("#ffffff".into()),
                border_radius: Some(8.0),
                font_weight: Some(600),
                text_align: Some(TextAlign::Center),
                ..Default::default()
            },
            text("Click me"),
        );
        put(
            NodeType::Input,
            "Input",
            (280.0, 40.0),
            StylePatch {
                background_color: Some("#ffffff".into()),
                border_width: Some(1.0),
                border_radius: Some(6.0),
                padding: Some(8.0),
                ..Default::default()
            },
            Content {
                placeholder: Some("Enter text".into()),
                ..Default::default()
            },
        );
        put(
            NodeType::Textarea,
            "Text area",
            (280.0, 120.0),
            StylePatch {
                background_color: Some("#ffffff".into()),
                border_width: Some(1.0),
                border_radius: Some(6.0),
                padding: Some(8.0),
                ..Default::default()
            },
            Content {
                placeholder: Some("Your message".into()),
                ..Default::default()
            },
        );
        put(
            NodeType::Select,
            "Select",
            (280.0, 40.0),
            StylePatch {
                background_color: Some("#ffffff".into()),
                border_width: Some(1.0),
                border_radius: Some(6.0),
                padding: Some(8.0),
                ..Default::default()
            },
            Content {
                options: vec!["Option 1".into(), "Option 2".into(), "Option 3".into()],
                ..Default::default()
            },
        );
        put(
            NodeType::Checkbox,
            "Checkbox",
            (200.0, 24.0),
            StylePatch::default(),
            text("I agree to the terms"),
        );
        put(
            NodeType::Image,
            "Image",
            (320.0, 200.0),
            StylePatch {
                background_color: Some("#e5e7eb".into()),
                ..Default::default()
            },
            Content {
                src: Some("https://placehold.co/320x200".into()),
                alt: Some("Placeholder image".into()),
                ..Default::default()
            },
        );
        put(
            NodeType::Video,
            "Video",
            (480.0, 270.0),
            StylePatch {
                background_color: Some("#000000".into()),
                ..Default::default()
            },
            Content::default(),
        );
        put(
            NodeType::Divider,
            "Divider",
            (480.0, 24.0),
            StylePatch {
                border_color: Some("#e5e7eb".into()),
                border_width: Some(1.0),
                ..Default::default()
            },
            Content::default(),
        );

        Self { templates }
    }
}
