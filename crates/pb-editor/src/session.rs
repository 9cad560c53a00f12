//! The editing session.
//!
//! Owns the live project together with its resolved frames, the history,
//! the interaction controller, the selection and the viewport. Every
//! explicit edit goes through [`History::commit`]; pointer gestures apply
//! transient updates and close with a single history entry.

use crate::history::{DEFAULT_HISTORY_DEPTH, History};
use crate::input::{InputEvent, Viewport};
use crate::interaction::{Controller, Interaction, Release};
use kurbo::{Point, Vec2};
use pb_core::catalog::{BuiltinCatalog, TemplateCatalog};
use pb_core::error::{StoreError, TreeError};
use pb_core::hit::{HANDLE_RADIUS, hit_test, pick_handle, resolve_container};
use pb_core::id::NodeId;
use pb_core::layout::{AbsoluteFrames, resolve_frames};
use pb_core::model::{Content, Frame, NodeType, Project, Settings, StylePatch};
use pb_core::persist::ProjectStore;
use pb_core::snap::Guide;
use pb_core::tree;
use std::convert::Infallible;
use std::sync::Arc;

pub struct Session {
    project: Arc<Project>,
    /// Absolute frames of `project`, refreshed after every change.
    frames: AbsoluteFrames,
    history: History,
    controller: Controller,
    selection: Option<NodeId>,
    viewport: Viewport,
    catalog: Box<dyn TemplateCatalog>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Project::new())
    }
}

impl Session {
    pub fn new(project: Project) -> Self {
        Self::with_history_depth(project, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_history_depth(project: Project, depth: usize) -> Self {
        let frames = resolve_frames(&project);
        Self {
            project: Arc::new(project),
            frames,
            history: History::new(depth),
            controller: Controller::new(),
            selection: None,
            viewport: Viewport::default(),
            catalog: Box::new(BuiltinCatalog::new()),
        }
    }

    /// Replace the component library used by `create_node` / `drop_template`.
    pub fn with_catalog(mut self, catalog: Box<dyn TemplateCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Open a stored project in a fresh session.
    pub fn open(store: &dyn ProjectStore, id: &str) -> Result<Self, StoreError> {
        Ok(Self::new(store.open(id)?))
    }

    /// Write the current project to `store` under `id`.
    pub fn save(&mut self, store: &mut dyn ProjectStore, id: &str) -> Result<(), StoreError> {
        self.finish_gesture();
        store.save(id, &self.project)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Shared handle to the current project (cheap; snapshots share it).
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.project)
    }

    pub fn frames(&self) -> &AbsoluteFrames {
        &self.frames
    }

    pub fn frame_of(&self, id: NodeId) -> Option<Frame> {
        self.frames.get(&id).copied()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interaction(&self) -> &Interaction {
        self.controller.state()
    }

    /// Alignment guides to draw for the current move.
    pub fn guides(&self) -> &[Guide] {
        self.controller.guides()
    }

    /// Container highlighted as the drop target of the current move.
    pub fn drop_target(&self) -> Option<NodeId> {
        self.controller.drop_target()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    /// Select a node. Unknown ids and the root clear the selection.
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selection =
            id.filter(|id| *id != self.project.root_node_id && self.project.contains(*id));
    }

    fn refresh(&mut self) {
        self.frames = resolve_frames(&self.project);
        if let Some(id) = self.selection
            && !self.project.contains(id)
        {
            self.selection = None;
        }
        debug_assert_eq!(self.project.validate(), Ok(()));
    }

    /// Run `mutator` as one history entry, after closing any gesture.
    fn commit<T>(
        &mut self,
        description: &str,
        mutator: impl FnOnce(&mut Project) -> Result<T, TreeError>,
    ) -> Result<T, TreeError> {
        self.finish_gesture();
        let result = self.history.commit(&mut self.project, description, mutator);
        self.refresh();
        result
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Create a node from the catalog with its top-left at the absolute
    /// canvas point `at`.
    pub fn create_node(
        &mut self,
        node_type: NodeType,
        parent: NodeId,
        at: Point,
    ) -> Result<NodeId, TreeError> {
        self.finish_gesture();
        let catalog = &*self.catalog;
        let result = self.history.commit(&mut self.project, "Add node", |p| {
            tree::create_node(p, catalog, node_type, parent, at.x as f32, at.y as f32)
        });
        self.refresh();
        result
    }

    /// Drop a library item (drag payload) at a screen point. The parent is
    /// the container under the point.
    pub fn drop_template(&mut self, payload: &str, screen: Point) -> Result<NodeId, TreeError> {
        let node_type = tree::template_type(&*self.catalog, payload)?;
        let at = self.viewport.to_canvas(screen);
        let parent = resolve_container(
            &self.project,
            &self.frames,
            at.x as f32,
            at.y as f32,
            None,
        );
        self.create_node(node_type, parent, at)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.commit("Delete", |p| tree::remove_node(p, id).map(|_| ()))
    }

    pub fn duplicate_node(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        self.commit("Duplicate", |p| tree::duplicate_node(p, id))
    }

    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<(), TreeError> {
        self.commit("Rename", |p| tree::rename_node(p, id, name))
    }

    pub fn set_style(&mut self, id: NodeId, patch: &StylePatch) -> Result<(), TreeError> {
        self.commit("Edit style", |p| tree::set_style(p, id, patch))
    }

    pub fn set_content(&mut self, id: NodeId, content: Content) -> Result<(), TreeError> {
        self.commit("Edit content", |p| tree::set_content(p, id, content))
    }

    /// Set a node's parent-relative frame (clamped to the size floor).
    pub fn set_frame(&mut self, id: NodeId, frame: Frame) -> Result<(), TreeError> {
        self.commit("Edit frame", |p| tree::set_frame(p, id, frame))
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.finish_gesture();
        let Ok(()) = self.history.commit(&mut self.project, "Settings", |p| {
            tree::update_settings(p, settings);
            Ok::<_, Infallible>(())
        });
        self.refresh();
    }

    pub fn bring_forward(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.commit("Bring forward", |p| tree::bring_forward(p, id))
    }

    pub fn send_backward(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.commit("Send backward", |p| tree::send_backward(p, id))
    }

    pub fn bring_to_front(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.commit("Bring to front", |p| tree::bring_to_front(p, id))
    }

    pub fn send_to_back(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.commit("Send to back", |p| tree::send_to_back(p, id))
    }

    /// Move a node under a new parent, keeping its on-screen position.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<bool, TreeError> {
        self.commit("Move into", |p| tree::reparent(p, id, new_parent))
    }

    pub fn undo(&mut self) -> Option<String> {
        self.finish_gesture();
        let desc = self.history.undo(&mut self.project)?;
        self.selection = None;
        self.refresh();
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.finish_gesture();
        let desc = self.history.redo(&mut self.project)?;
        self.selection = None;
        self.refresh();
        Some(desc)
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Dispatch a normalized input event. Returns true if the project or
    /// the view changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(x, y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(x, y)),
            InputEvent::PointerCancel => self.pointer_cancel(),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Zoom { factor, x, y } => {
                self.viewport.zoom_at(factor, Point::new(x, y));
                true
            }
            InputEvent::Pan { dx, dy } => {
                self.viewport.pan_by(Vec2::new(dx, dy));
                true
            }
        }
    }

    /// Press at a screen point: grab a handle of the selected node, else
    /// select and start moving the topmost node, else clear the selection.
    pub fn pointer_down(&mut self, screen: Point) -> bool {
        if !self.controller.is_idle() {
            return false;
        }
        let at = self.viewport.to_canvas(screen);
        let (x, y) = (at.x as f32, at.y as f32);
        let radius = (f64::from(HANDLE_RADIUS) / self.viewport.zoom()) as f32;

        if let Some(selected) = self.selection
            && let Some(frame) = self.frame_of(selected)
            && let Some(handle) = pick_handle(&frame, x, y, radius)
        {
            self.controller.begin_resize(selected, handle, screen, frame);
            return true;
        }

        match hit_test(&self.project, &self.frames, x, y) {
            Some(id) => {
                self.selection = Some(id);
                if let Some(frame) = self.frame_of(id) {
                    self.controller.begin_move(id, screen, frame);
                }
                true
            }
            None => self.selection.take().is_some(),
        }
    }

    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let Some(update) =
            self.controller
                .drag(&self.project, &self.frames, screen, &self.viewport)
        else {
            return false;
        };
        self.history.begin_gesture(&self.project);
        let project = Arc::make_mut(&mut self.project);
        if let Err(e) = tree::set_absolute_frame(project, update.id, update.frame) {
            log::debug!("transient update dropped: {e}");
        }
        self.refresh();
        true
    }

    pub fn pointer_up(&mut self, _screen: Point) -> bool {
        self.finish_gesture()
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.finish_gesture()
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.finish_gesture()
    }

    /// Return the controller to Idle, committing whatever the gesture did.
    /// Returns true if a history entry was pushed.
    fn finish_gesture(&mut self) -> bool {
        let description = match self.controller.release() {
            None => {
                // A sub-threshold click; nothing was applied.
                return self.history.end_gesture(&self.project, "Move");
            }
            Some(Release::Moved {
                id, drop_target, ..
            }) => {
                if tree::check_reparent(&self.project, id, drop_target).is_ok() {
                    let project = Arc::make_mut(&mut self.project);
                    if let Err(e) = tree::reparent(project, id, drop_target) {
                        log::debug!("drop rejected: {e}");
                    }
                } else {
                    log::debug!("drop of {id} onto {drop_target} rejected");
                }
                "Move"
            }
            Some(Release::Resized { .. }) => "Resize",
        };
        let pushed = self.history.end_gesture(&self.project, description);
        self.refresh();
        pushed
    }
}
