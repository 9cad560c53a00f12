//! Pointer interaction state machine.
//!
//! One active interaction at a time: `Idle`, `Moving` a node body, or
//! `Resizing` through one of its handles. The controller only computes;
//! the session applies each [`Update`] as a transient (non-history)
//! change and turns the final [`Release`] into one history entry.
//!
//! ## Move threshold
//!
//! A move only counts once the pointer has travelled more than
//! [`MOVE_THRESHOLD`] screen units from where it went down. Below that the
//! gesture is a plain click: no frame change, no drop target, no reparent.

use crate::input::Viewport;
use kurbo::Point;
use pb_core::hit::{drop_anchor, resolve_container};
use pb_core::id::NodeId;
use pb_core::layout::AbsoluteFrames;
use pb_core::model::{Frame, Project};
use pb_core::snap::{Guide, ResizeHandle, resize_frame, snap_move, snap_targets};
use smallvec::SmallVec;

/// Screen distance a pointer must travel before a press becomes a move.
pub const MOVE_THRESHOLD: f64 = 4.0;

/// The current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Moving {
        id: NodeId,
        /// Screen position at pointer-down.
        start_pointer: Point,
        /// Absolute frame at pointer-down.
        start_frame: Frame,
        /// Whether the pointer has left the threshold radius.
        crossed: bool,
    },
    Resizing {
        id: NodeId,
        handle: ResizeHandle,
        start_pointer: Point,
        start_frame: Frame,
    },
}

/// A transient frame to apply (absolute canvas coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Update {
    pub id: NodeId,
    pub frame: Frame,
}

/// How a finished gesture should be committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// A move that crossed the threshold; reparent under `drop_target`.
    Moved {
        id: NodeId,
        frame: Frame,
        drop_target: NodeId,
    },
    Resized { id: NodeId, frame: Frame },
}

#[derive(Debug, Default)]
pub struct Controller {
    state: Interaction,
    /// Guides from the latest move step.
    guides: SmallVec<[Guide; 2]>,
    /// Container under the drop anchor during a move.
    drop_target: Option<NodeId>,
    /// Latest frame handed out as an update.
    last_frame: Option<Frame>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Interaction {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == Interaction::Idle
    }

    /// Node targeted by the active gesture.
    pub fn active_node(&self) -> Option<NodeId> {
        match self.state {
            Interaction::Idle => None,
            Interaction::Moving { id, .. } | Interaction::Resizing { id, .. } => Some(id),
        }
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn drop_target(&self) -> Option<NodeId> {
        self.drop_target
    }

    /// Idle → Moving. Ignored while another gesture is active.
    pub fn begin_move(&mut self, id: NodeId, pointer: Point, start_frame: Frame) {
        if !self.is_idle() {
            return;
        }
        self.state = Interaction::Moving {
            id,
            start_pointer: pointer,
            start_frame,
            crossed: false,
        };
    }

    /// Idle → Resizing. Ignored while another gesture is active.
    pub fn begin_resize(
        &mut self,
        id: NodeId,
        handle: ResizeHandle,
        pointer: Point,
        start_frame: Frame,
    ) {
        if !self.is_idle() {
            return;
        }
        log::trace!("resize {id} from {handle:?}");
        self.state = Interaction::Resizing {
            id,
            handle,
            start_pointer: pointer,
            start_frame,
        };
    }

    /// Advance the gesture to the screen point `pointer`.
    ///
    /// `frames` are the current absolute frames; `viewport` maps screen
    /// deltas into canvas units. Returns the frame to apply, if any.
    pub fn drag(
        &mut self,
        project: &Project,
        frames: &AbsoluteFrames,
        pointer: Point,
        viewport: &Viewport,
    ) -> Option<Update> {
        match &mut self.state {
            Interaction::Idle => None,
            Interaction::Moving {
                id,
                start_pointer,
                start_frame,
                crossed,
            } => {
                let screen_delta = pointer - *start_pointer;
                if !*crossed {
                    if screen_delta.hypot() <= MOVE_THRESHOLD {
                        return None;
                    }
                    *crossed = true;
                    log::trace!("move {id}: threshold crossed");
                }
                let id = *id;
                let candidate = start_frame.translated(viewport.canvas_delta(screen_delta));

                let outcome = snap_move(
                    candidate,
                    snap_targets(project, frames, id),
                    &project.settings,
                );
                let frame = outcome.apply_to(candidate);
                self.guides = outcome.guides;

                let (ax, ay) = drop_anchor(&frame);
                let target = resolve_container(project, frames, ax, ay, Some(id));
                if self.drop_target != Some(target) {
                    log::trace!("move {id}: drop target {target}");
                    self.drop_target = Some(target);
                }

                self.last_frame = Some(frame);
                Some(Update { id, frame })
            }
            Interaction::Resizing {
                id,
                handle,
                start_pointer,
                start_frame,
            } => {
                let d = viewport.canvas_delta(pointer - *start_pointer);
                let frame = resize_frame(
                    *start_frame,
                    *handle,
                    d.x as f32,
                    d.y as f32,
                    &project.settings,
                );
                self.last_frame = Some(frame);
                Some(Update { id: *id, frame })
            }
        }
    }

    /// End the gesture (pointer-up, cancel or leave) and return to Idle.
    ///
    /// `None` for a click that never crossed the move threshold.
    pub fn release(&mut self) -> Option<Release> {
        let prev = std::mem::replace(&mut self.state, Interaction::Idle);
        self.guides.clear();
        let drop_target = self.drop_target.take();
        let last_frame = self.last_frame.take();

        match prev {
            Interaction::Idle => None,
            Interaction::Moving { crossed: false, .. } => None,
            Interaction::Moving {
                id, start_frame, ..
            } => Some(Release::Moved {
                id,
                frame: last_frame.unwrap_or(start_frame),
                drop_target: drop_target?,
            }),
            Interaction::Resizing {
                id, start_frame, ..
            } => Some(Release::Resized {
                id,
                frame: last_frame.unwrap_or(start_frame),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::layout::resolve_frames;
    use kurbo::Vec2;
    use pb_core::model::{Node, NodeType, Settings};

    fn zoom(z: f64) -> Viewport {
        Viewport::new(z, Vec2::ZERO)
    }

    fn project_with(nodes: &[(&str, NodeType, Frame)]) -> Project {
        let mut p = Project::with_settings(Settings {
            snap_to_grid: false,
            show_guides: false,
            ..Settings::default()
        });
        let root = p.root_node_id;
        for (name, ty, frame) in nodes {
            let id = NodeId::intern(name);
            let mut node = Node::new(id, *ty, *frame);
            node.parent_id = Some(root);
            p.nodes_by_id.insert(id, node);
            p.get_mut(root).unwrap().children.push(id);
        }
        p
    }

    #[test]
    fn jitter_below_threshold_is_a_click() {
        let p = project_with(&[("i_box", NodeType::Text, Frame::new(0.0, 0.0, 100.0, 40.0))]);
        let frames = resolve_frames(&p);
        let id = NodeId::intern("i_box");

        let mut c = Controller::new();
        c.begin_move(id, Point::new(10.0, 10.0), frames[&id]);
        assert_eq!(c.drag(&p, &frames, Point::new(12.0, 13.0), &zoom(1.0)), None);
        assert_eq!(c.release(), None);
        assert!(c.is_idle());
    }

    #[test]
    fn move_applies_zoom_scaled_delta() {
        let p = project_with(&[("i_box2", NodeType::Text, Frame::new(0.0, 0.0, 100.0, 40.0))]);
        let frames = resolve_frames(&p);
        let id = NodeId::intern("i_box2");

        let mut c = Controller::new();
        c.begin_move(id, Point::new(0.0, 0.0), frames[&id]);
        let update = c.drag(&p, &frames, Point::new(100.0, 50.0), &zoom(2.0)).unwrap();
        assert_eq!(update.frame, Frame::new(50.0, 25.0, 100.0, 40.0));

        // Once crossed, returning near the start still moves.
        let update = c.drag(&p, &frames, Point::new(2.0, 0.0), &zoom(2.0)).unwrap();
        assert_eq!(update.frame, Frame::new(1.0, 0.0, 100.0, 40.0));

        assert_eq!(
            c.release(),
            Some(Release::Moved {
                id,
                frame: Frame::new(1.0, 0.0, 100.0, 40.0),
                drop_target: p.root_node_id,
            })
        );
    }

    #[test]
    fn drop_target_tracks_anchor() {
        let p = project_with(&[
            ("i_section", NodeType::Section, Frame::new(0.0, 200.0, 600.0, 300.0)),
            ("i_text", NodeType::Text, Frame::new(0.0, 0.0, 100.0, 40.0)),
        ]);
        let frames = resolve_frames(&p);
        let id = NodeId::intern("i_text");

        let mut c = Controller::new();
        c.begin_move(id, Point::new(0.0, 0.0), frames[&id]);
        c.drag(&p, &frames, Point::new(50.0, 250.0), &zoom(1.0));
        assert_eq!(c.drop_target(), Some(NodeId::intern("i_section")));
        c.drag(&p, &frames, Point::new(700.0, 0.0), &zoom(1.0));
        assert_eq!(c.drop_target(), Some(p.root_node_id));
    }

    #[test]
    fn resize_ignores_siblings_and_clamps() {
        let p = project_with(&[("i_card", NodeType::Card, Frame::new(0.0, 0.0, 40.0, 40.0))]);
        let frames = resolve_frames(&p);
        let id = NodeId::intern("i_card");

        let mut c = Controller::new();
        c.begin_resize(id, ResizeHandle::Se, Point::new(40.0, 40.0), frames[&id]);
        let update = c.drag(&p, &frames, Point::new(-10.0, -10.0), &zoom(1.0)).unwrap();
        assert_eq!(update.frame, Frame::new(0.0, 0.0, 24.0, 24.0));
        assert_eq!(
            c.release(),
            Some(Release::Resized {
                id,
                frame: Frame::new(0.0, 0.0, 24.0, 24.0)
            })
        );
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let a = NodeId::intern("i_a");
        let b = NodeId::intern("i_b");
        let mut c = Controller::new();
        c.begin_move(a, Point::ZERO, Frame::new(0.0, 0.0, 30.0, 30.0));
        c.begin_resize(b, ResizeHandle::N, Point::ZERO, Frame::new(0.0, 0.0, 30.0, 30.0));
        assert_eq!(c.active_node(), Some(a));
    }
}
