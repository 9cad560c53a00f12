//! Component export: Project → React function component source.
//!
//! Same geometry and styling as the markup export, written as inline
//! style objects. Lengths become bare numbers (React appends `px`).

use crate::css::{Decl, Value, format_num, node_declarations, page_declarations};
use crate::relative_frame;
use pb_core::id::NodeId;
use pb_core::layout::{AbsoluteFrames, resolve_frames};
use pb_core::model::{NodeType, Project};
use std::fmt::Write;

/// Export a project as a default-exported function component named
/// `name` (sanitized to a valid identifier).
#[must_use]
pub fn export_component(project: &Project, name: &str) -> String {
    let frames = resolve_frames(project);
    let mut out = String::with_capacity(4096);

    let _ = writeln!(out, "export default function {}() {{", component_name(name));
    out.push_str("  return (\n");
    let page_style = project
        .root()
        .map(|root| style_object(&page_declarations(root, &project.settings)))
        .unwrap_or_else(|| "{}".to_string());
    let _ = writeln!(out, "    <div style={{{page_style}}}>");
    for &child in project.children_of(project.root_node_id) {
        emit_element(&mut out, project, &frames, child, 3);
    }
    out.push_str("    </div>\n  );\n}\n");
    out
}

/// PascalCase identifier from free text. Falls back to `Page`.
pub fn component_name(name: &str) -> String {
    let mut ident = String::new();
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            ident.push(first.to_ascii_uppercase());
            ident.extend(chars);
        }
    }
    match ident.chars().next() {
        None => "Page".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Page{ident}"),
        Some(_) => ident,
    }
}

/// `font-size` → `fontSize`.
fn camel_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for c in property.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Double-quoted JS string literal.
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn style_object(decls: &[Decl]) -> String {
    let fields: Vec<String> = decls
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Px(n) | Value::Num(n) => format_num(*n),
                Value::Text(s) => js_string(s),
            };
            format!("{}: {value}", camel_case(name))
        })
        .collect();
    format!("{{ {} }}", fields.join(", "))
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_element(
    out: &mut String,
    project: &Project,
    frames: &AbsoluteFrames,
    id: NodeId,
    depth: usize,
) {
    let Some(node) = project.get(id) else {
        return;
    };
    let style = style_object(&node_declarations(node, relative_frame(project, frames, id)));
    let content = &node.content;
    let text = js_string(content.text.as_deref().unwrap_or_default());
    let placeholder = js_string(content.placeholder.as_deref().unwrap_or_default());

    indent(out, depth);
    match node.node_type {
        NodeType::Page
        | NodeType::Section
        | NodeType::Container
        | NodeType::Grid
        | NodeType::Card
        | NodeType::Form => {
            let tag = match node.node_type {
                NodeType::Section => "section",
                NodeType::Form => "form",
                _ => "div",
            };
            let _ = writeln!(out, "<{tag} style={{{style}}}>");
            for &child in &node.children {
                emit_element(out, project, frames, child, depth + 1);
            }
            indent(out, depth);
            let _ = writeln!(out, "</{tag}>");
        }
        NodeType::Heading => {
            let _ = writeln!(out, "<h2 style={{{style}}}>{{{text}}}</h2>");
        }
        NodeType::Paragraph => {
            let _ = writeln!(out, "<p style={{{style}}}>{{{text}}}</p>");
        }
        NodeType::Text => {
            let _ = writeln!(out, "<span style={{{style}}}>{{{text}}}</span>");
        }
        NodeType::Link => {
            let href = js_string(content.href.as_deref().unwrap_or("#"));
            let _ = writeln!(out, "<a style={{{style}}} href={{{href}}}>{{{text}}}</a>");
        }
        NodeType::Button => {
            let _ = writeln!(
                out,
                "<button type=\"button\" style={{{style}}}>{{{text}}}</button>"
            );
        }
        NodeType::Input => {
            let _ = writeln!(
                out,
                "<input type=\"text\" placeholder={{{placeholder}}} style={{{style}}} />"
            );
        }
        NodeType::Textarea => {
            let _ = writeln!(
                out,
                "<textarea placeholder={{{placeholder}}} defaultValue={{{text}}} style={{{style}}} />"
            );
        }
        NodeType::Select => {
            let _ = writeln!(out, "<select style={{{style}}}>");
            for option in &content.options {
                indent(out, depth + 1);
                let option = js_string(option);
                let _ = writeln!(out, "<option value={{{option}}}>{{{option}}}</option>");
            }
            indent(out, depth);
            out.push_str("</select>\n");
        }
        NodeType::Checkbox => {
            let _ = writeln!(
                out,
                "<label style={{{style}}}><input type=\"checkbox\" /> {{{text}}}</label>"
            );
        }
        NodeType::Image => {
            let src = js_string(content.src.as_deref().unwrap_or_default());
            let alt = js_string(content.alt.as_deref().unwrap_or_default());
            let _ = writeln!(out, "<img src={{{src}}} alt={{{alt}}} style={{{style}}} />");
        }
        NodeType::Video => {
            let src = js_string(content.src.as_deref().unwrap_or_default());
            let _ = writeln!(out, "<video src={{{src}}} controls style={{{style}}} />");
        }
        NodeType::Divider => {
            let _ = writeln!(out, "<hr style={{{style}}} />");
        }
    }
}
