//! Export pipeline: turns a project into pasteable source text.
//!
//! Both outputs are read-only passes over the tree, positioned from the
//! same resolved absolute frames the editor draws with.

pub mod component;
pub mod css;
pub mod html;

pub use component::export_component;
pub use html::export_html;

use pb_core::id::NodeId;
use pb_core::layout::AbsoluteFrames;
use pb_core::model::{Frame, Project};

/// Both export artifacts for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub html: String,
    pub component: String,
}

/// Produce the markup document and the component source together.
#[must_use]
pub fn export(project: &Project, component_name: &str) -> Exported {
    log::debug!("exporting {} nodes", project.len());
    Exported {
        html: export_html(project),
        component: export_component(project, component_name),
    }
}

/// A node's frame relative to its parent, derived from absolute frames.
/// Falls back to the stored frame when either side is unresolved.
pub(crate) fn relative_frame(project: &Project, frames: &AbsoluteFrames, id: NodeId) -> Frame {
    let Some(node) = project.get(id) else {
        return Frame::default();
    };
    let own = frames.get(&id);
    let parent = node.parent_id.and_then(|p| frames.get(&p));
    match (own, parent) {
        (Some(own), Some(parent)) => own.with_origin(own.x - parent.x, own.y - parent.y),
        _ => node.frame,
    }
}
