//! Alignment and snap engine.
//!
//! Moves: grid rounding first, then sibling-edge snapping per axis with a
//! guide line for every axis that snapped. Resizes: handle-directed edge
//! movement, size floor, then grid rounding of the moved edges only.

use crate::id::NodeId;
use crate::layout::AbsoluteFrames;
use crate::model::{Frame, MIN_NODE_SIZE, Project, Settings};
use smallvec::SmallVec;

/// Maximum distance (canvas units) at which two edges snap together.
pub const SNAP_THRESHOLD: f32 = 6.0;

/// Round `v` to the nearest multiple of `grid`. A non-positive grid is a no-op.
pub fn round_to_grid(v: f32, grid: f32) -> f32 {
    if grid > 0.0 { (v / grid).round() * grid } else { v }
}

// ─── Guides ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// A line of constant x (drawn for x-axis snaps).
    Vertical,
    /// A line of constant y (drawn for y-axis snaps).
    Horizontal,
}

/// A transient alignment line to draw while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub orientation: Orientation,
    /// x for vertical guides, y for horizontal ones.
    pub position: f32,
    /// Extent along the line, covering both aligned nodes.
    pub start: f32,
    pub end: f32,
}

/// Corrected origin plus the guides to render. At most one guide per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    pub x: f32,
    pub y: f32,
    pub guides: SmallVec<[Guide; 2]>,
}

impl SnapOutcome {
    pub fn apply_to(&self, frame: Frame) -> Frame {
        frame.with_origin(self.x, self.y)
    }
}

/// Leading edge, center, trailing edge.
fn x_edges(f: &Frame) -> [f32; 3] {
    [f.x, f.x + f.width / 2.0, f.right()]
}

fn y_edges(f: &Frame) -> [f32; 3] {
    [f.y, f.y + f.height / 2.0, f.bottom()]
}

/// First target whose edge lies within the threshold of one of `moving`'s
/// edges, with the matched target edge and the shift onto it. Targets are
/// tried in order, then moving edges (leading, center, trailing), then
/// target edges in the same order.
fn first_match<'a>(
    moving: [f32; 3],
    targets: &[&'a Frame],
    edges: fn(&Frame) -> [f32; 3],
) -> Option<(&'a Frame, f32, f32)> {
    for &target in targets {
        let target_edges = edges(target);
        for m in moving {
            for t in target_edges {
                let shift = t - m;
                if shift.abs() <= SNAP_THRESHOLD {
                    return Some((target, t, shift));
                }
            }
        }
    }
    None
}

/// Snap a candidate absolute frame for a moving node.
///
/// `targets` are the absolute frames of every node the mover may align
/// with, in natural document order (see [`snap_targets`]).
pub fn snap_move<'a>(
    candidate: Frame,
    targets: impl IntoIterator<Item = &'a Frame>,
    settings: &Settings,
) -> SnapOutcome {
    let mut x = candidate.x;
    let mut y = candidate.y;

    if settings.snap_to_grid {
        x = round_to_grid(x, settings.grid_size);
        y = round_to_grid(y, settings.grid_size);
    }

    let mut guides = SmallVec::new();
    if !settings.show_guides {
        return SnapOutcome { x, y, guides };
    }

    let targets: Vec<&Frame> = targets.into_iter().collect();
    let gridded = candidate.with_origin(x, y);

    let x_hit = first_match(x_edges(&gridded), &targets, x_edges);
    if let Some((_, _, shift)) = x_hit {
        log::trace!("snap x by {shift}");
        x += shift;
    }
    let y_hit = first_match(y_edges(&gridded), &targets, y_edges);
    if let Some((_, _, shift)) = y_hit {
        log::trace!("snap y by {shift}");
        y += shift;
    }

    let moved = candidate.with_origin(x, y);
    if let Some((target, edge, _)) = x_hit {
        guides.push(Guide {
            orientation: Orientation::Vertical,
            position: edge,
            start: moved.y.min(target.y),
            end: moved.bottom().max(target.bottom()),
        });
    }
    if let Some((target, edge, _)) = y_hit {
        guides.push(Guide {
            orientation: Orientation::Horizontal,
            position: edge,
            start: moved.x.min(target.x),
            end: moved.right().max(target.right()),
        });
    }

    SnapOutcome { x, y, guides }
}

/// Frames a moving node may snap to: everything except the root, the
/// node itself and its descendants (which travel with it).
pub fn snap_targets<'a>(
    project: &Project,
    frames: &'a AbsoluteFrames,
    moving: NodeId,
) -> Vec<&'a Frame> {
    frames
        .iter()
        .filter(|(id, _)| {
            **id != project.root_node_id && **id != moving && !project.is_ancestor_of(moving, **id)
        })
        .map(|(_, f)| f)
        .collect()
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// The eight resize handles around a selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    /// Every handle, corners before edge midpoints.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::Ne,
        ResizeHandle::Se,
        ResizeHandle::Sw,
        ResizeHandle::N,
        ResizeHandle::E,
        ResizeHandle::S,
        ResizeHandle::W,
    ];

    pub fn moves_left(&self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Where this handle sits on `frame`.
    pub fn anchor(&self, frame: &Frame) -> (f32, f32) {
        let (cx, cy) = frame.center();
        let x = if self.moves_left() {
            frame.x
        } else if self.moves_right() {
            frame.right()
        } else {
            cx
        };
        let y = if self.moves_top() {
            frame.y
        } else if self.moves_bottom() {
            frame.bottom()
        } else {
            cy
        };
        (x, y)
    }
}

/// Edges of a frame being resized; the unmoved ones stay pinned.
struct Edges {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Edges {
    fn clamp(&mut self, handle: ResizeHandle) {
        if handle.moves_left() {
            self.left = self.left.min(self.right - MIN_NODE_SIZE);
        } else if handle.moves_right() {
            self.right = self.right.max(self.left + MIN_NODE_SIZE);
        }
        if handle.moves_top() {
            self.top = self.top.min(self.bottom - MIN_NODE_SIZE);
        } else if handle.moves_bottom() {
            self.bottom = self.bottom.max(self.top + MIN_NODE_SIZE);
        }
    }
}

/// Derive the resized absolute frame from the frame at gesture start and
/// the canvas-space pointer delta.
pub fn resize_frame(
    start: Frame,
    handle: ResizeHandle,
    dx: f32,
    dy: f32,
    settings: &Settings,
) -> Frame {
    let mut e = Edges {
        left: start.x,
        top: start.y,
        right: start.right(),
        bottom: start.bottom(),
    };

    if handle.moves_left() {
        e.left += dx;
    }
    if handle.moves_right() {
        e.right += dx;
    }
    if handle.moves_top() {
        e.top += dy;
    }
    if handle.moves_bottom() {
        e.bottom += dy;
    }
    e.clamp(handle);

    if settings.snap_to_grid {
        let g = settings.grid_size;
        if handle.moves_left() {
            e.left = round_to_grid(e.left, g);
        }
        if handle.moves_right() {
            e.right = round_to_grid(e.right, g);
        }
        if handle.moves_top() {
            e.top = round_to_grid(e.top, g);
        }
        if handle.moves_bottom() {
            e.bottom = round_to_grid(e.bottom, g);
        }
        // Rounding may pull an edge back under the floor.
        e.clamp(handle);
    }

    Frame::new(e.left, e.top, e.right - e.left, e.bottom - e.top)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_only() -> Settings {
        Settings {
            grid_size: 8.0,
            snap_to_grid: true,
            show_guides: false,
            ..Settings::default()
        }
    }

    fn guides_only() -> Settings {
        Settings {
            snap_to_grid: false,
            show_guides: true,
            ..Settings::default()
        }
    }

    #[test]
    fn grid_rounds_to_nearest_multiple() {
        let out = snap_move(Frame::new(101.0, 59.0, 100.0, 50.0), Vec::<&Frame>::new(), &grid_only());
        assert_eq!((out.x, out.y), (104.0, 56.0));
        assert!(out.guides.is_empty());
    }

    #[test]
    fn left_edge_snaps_to_sibling_right_edge() {
        let sibling = Frame::new(200.0, 100.0, 100.0, 80.0); // right edge at 300
        let candidate = Frame::new(304.0, 400.0, 60.0, 40.0);
        let out = snap_move(candidate, [&sibling], &guides_only());

        assert_eq!(out.x, 300.0);
        assert_eq!(out.y, 400.0);
        assert_eq!(out.guides.len(), 1);
        let g = out.guides[0];
        assert_eq!(g.orientation, Orientation::Vertical);
        assert_eq!(g.position, 300.0);
        assert_eq!(g.start, 100.0);
        assert_eq!(g.end, 440.0);
    }

    #[test]
    fn snapping_is_idempotent() {
        let sibling = Frame::new(200.0, 100.0, 100.0, 80.0);
        let aligned = Frame::new(300.0, 100.0, 60.0, 40.0);
        let out = snap_move(aligned, [&sibling], &guides_only());
        assert_eq!(out.apply_to(aligned), aligned);
    }

    #[test]
    fn beyond_threshold_no_snap() {
        let sibling = Frame::new(200.0, 100.0, 100.0, 80.0);
        let candidate = Frame::new(307.0, 500.0, 60.0, 40.0);
        let out = snap_move(candidate, [&sibling], &guides_only());
        assert_eq!((out.x, out.y), (307.0, 500.0));
        assert!(out.guides.is_empty());
    }

    #[test]
    fn one_adjustment_per_axis_first_target_wins() {
        let a = Frame::new(0.0, 0.0, 100.0, 30.0); // right edge 100
        let b = Frame::new(0.0, 300.0, 103.0, 30.0); // right edge 103
        let candidate = Frame::new(101.0, 600.0, 40.0, 40.0);
        let out = snap_move(candidate, [&a, &b], &guides_only());
        assert_eq!(out.x, 100.0);
        assert_eq!(out.guides.len(), 1);
    }

    #[test]
    fn both_axes_can_snap() {
        let sibling = Frame::new(100.0, 100.0, 100.0, 100.0);
        let candidate = Frame::new(203.0, 98.0, 50.0, 50.0);
        let out = snap_move(candidate, [&sibling], &guides_only());
        assert_eq!((out.x, out.y), (200.0, 100.0));
        assert_eq!(out.guides.len(), 2);
        assert_eq!(out.guides[1].orientation, Orientation::Horizontal);
    }

    #[test]
    fn se_resize_clamps_to_floor() {
        let start = Frame::new(0.0, 0.0, 40.0, 40.0);
        for settings in [grid_only(), guides_only()] {
            let f = resize_frame(start, ResizeHandle::Se, -50.0, -50.0, &settings);
            assert_eq!(f, Frame::new(0.0, 0.0, MIN_NODE_SIZE, MIN_NODE_SIZE));
        }
    }

    #[test]
    fn nw_resize_pins_opposite_corner() {
        let start = Frame::new(100.0, 100.0, 80.0, 60.0);
        let f = resize_frame(start, ResizeHandle::Nw, 20.0, -10.0, &guides_only());
        assert_eq!(f, Frame::new(120.0, 90.0, 60.0, 70.0));
        assert_eq!(f.right(), start.right());
        assert_eq!(f.bottom(), start.bottom());
    }

    #[test]
    fn edge_handles_move_one_axis() {
        let start = Frame::new(0.0, 0.0, 100.0, 100.0);
        let f = resize_frame(start, ResizeHandle::E, 30.0, 500.0, &guides_only());
        assert_eq!(f, Frame::new(0.0, 0.0, 130.0, 100.0));
        let f = resize_frame(start, ResizeHandle::N, 500.0, 30.0, &guides_only());
        assert_eq!(f, Frame::new(0.0, 30.0, 100.0, 70.0));
    }

    #[test]
    fn resize_grid_rounds_moved_edges_only() {
        let start = Frame::new(3.0, 5.0, 100.0, 100.0);
        let f = resize_frame(start, ResizeHandle::Se, 10.0, 10.0, &grid_only());
        // right 113 -> 112, bottom 115 -> 112; left/top stay pinned off-grid
        assert_eq!(f, Frame::new(3.0, 5.0, 109.0, 107.0));
    }

    #[test]
    fn handle_anchors() {
        let f = Frame::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(ResizeHandle::Se.anchor(&f), (100.0, 50.0));
        assert_eq!(ResizeHandle::N.anchor(&f), (50.0, 0.0));
        assert_eq!(ResizeHandle::W.anchor(&f), (0.0, 25.0));
    }
}
