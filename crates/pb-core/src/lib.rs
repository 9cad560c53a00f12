pub mod catalog;
pub mod color;
pub mod error;
pub mod hit;
pub mod id;
pub mod layout;
pub mod model;
pub mod persist;
pub mod snap;
pub mod tree;

pub use catalog::{BuiltinCatalog, Template, TemplateCatalog};
pub use color::Color;
pub use error::{ModelError, StoreError, TreeError};
pub use hit::{hit_test, pick_handle, resolve_container};
pub use id::NodeId;
pub use layout::{AbsoluteFrames, absolute_frame, resolve_frames};
pub use model::*;
pub use persist::{MemoryStore, ProjectStore, load_project, save_project};
pub use snap::{Guide, Orientation, ResizeHandle, SnapOutcome};

// Geometry types used at the pointer boundary.
pub use kurbo::{Point, Vec2};
