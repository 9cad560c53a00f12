//! Markup export: Project → standalone HTML document.
//!
//! One `.pb-<id>` rule per node in a single `<style>` block. Elements
//! nest like the tree and are positioned absolutely inside their parent,
//! with offsets taken from the resolved absolute frames.

use crate::css::{
    Decl, class_name, escape_attr, escape_text, node_declarations, page_declarations,
};
use crate::relative_frame;
use pb_core::id::NodeId;
use pb_core::layout::{AbsoluteFrames, resolve_frames};
use pb_core::model::{NodeType, Project};
use std::fmt::Write;

const PAGE_CLASS: &str = "pb-page";

/// Export a project as a complete HTML document.
#[must_use]
pub fn export_html(project: &Project) -> String {
    let frames = resolve_frames(project);
    let mut out = String::with_capacity(4096);
    let title = project
        .root()
        .map(|r| r.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("Page");

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "  <title>{}</title>", escape_text(title));
    out.push_str("  <style>\n");
    out.push_str("    * { box-sizing: border-box; margin: 0; }\n");
    if let Some(root) = project.root() {
        emit_rule(&mut out, PAGE_CLASS, &page_declarations(root, &project.settings));
    }
    for &child in project.children_of(project.root_node_id) {
        emit_rules(&mut out, project, &frames, child);
    }
    out.push_str("  </style>\n</head>\n<body>\n");

    let _ = writeln!(out, "  <div class=\"{PAGE_CLASS}\">");
    for &child in project.children_of(project.root_node_id) {
        emit_element(&mut out, project, &frames, child, 2);
    }
    out.push_str("  </div>\n</body>\n</html>\n");
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_rule(out: &mut String, class: &str, decls: &[Decl]) {
    let _ = writeln!(out, "    .{class} {{");
    for (name, value) in decls {
        let _ = writeln!(out, "      {name}: {};", value.to_css());
    }
    out.push_str("    }\n");
}

fn emit_rules(out: &mut String, project: &Project, frames: &AbsoluteFrames, id: NodeId) {
    let Some(node) = project.get(id) else {
        return;
    };
    let frame = relative_frame(project, frames, id);
    emit_rule(out, &class_name(id), &node_declarations(node, frame));
    for &child in &node.children {
        emit_rules(out, project, frames, child);
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
    let class = class_name(id);
    let content = &node.content;
    let text = escape_text(content.text.as_deref().unwrap_or_default());
    let placeholder = escape_attr(content.placeholder.as_deref().unwrap_or_default());

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
            let _ = writeln!(out, "<{tag} class=\"{class}\">");
            for &child in &node.children {
                emit_element(out, project, frames, child, depth + 1);
            }
            indent(out, depth);
            let _ = writeln!(out, "</{tag}>");
        }
        NodeType::Heading => {
            let _ = writeln!(out, "<h2 class=\"{class}\">{text}</h2>");
        }
        NodeType::Paragraph => {
            let _ = writeln!(out, "<p class=\"{class}\">{text}</p>");
        }
        NodeType::Text => {
            let _ = writeln!(out, "<span class=\"{class}\">{text}</span>");
        }
        NodeType::Link => {
            let href = escape_attr(content.href.as_deref().unwrap_or("#"));
            let _ = writeln!(out, "<a class=\"{class}\" href=\"{href}\">{text}</a>");
        }
        NodeType::Button => {
            let _ = writeln!(out, "<button class=\"{class}\" type=\"button\">{text}</button>");
        }
        NodeType::Input => {
            let _ = writeln!(
                out,
                "<input class=\"{class}\" type=\"text\" placeholder=\"{placeholder}\">"
            );
        }
        NodeType::Textarea => {
            let _ = writeln!(
                out,
                "<textarea class=\"{class}\" placeholder=\"{placeholder}\">{text}</textarea>"
            );
        }
        NodeType::Select => {
            let _ = writeln!(out, "<select class=\"{class}\">");
            for option in &content.options {
                indent(out, depth + 1);
                let _ = writeln!(out, "<option>{}</option>", escape_text(option));
            }
            indent(out, depth);
            out.push_str("</select>\n");
        }
        NodeType::Checkbox => {
            let _ = writeln!(
                out,
                "<label class=\"{class}\"><input type=\"checkbox\"> {text}</label>"
            );
        }
        NodeType::Image => {
            let src = escape_attr(content.src.as_deref().unwrap_or_default());
            let alt = escape_attr(content.alt.as_deref().unwrap_or_default());
            let _ = writeln!(out, "<img class=\"{class}\" src=\"{src}\" alt=\"{alt}\">");
        }
        NodeType::Video => {
            let src = escape_attr(content.src.as_deref().unwrap_or_default());
            let _ = writeln!(out, "<video class=\"{class}\" src=\"{src}\" controls></video>");
        }
        NodeType::Divider => {
            let _ = writeln!(out, "<hr class=\"{class}\">");
        }
    }
}
