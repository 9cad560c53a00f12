//! Input abstraction layer.
//!
//! Normalizes host pointer and wheel events into a unified `InputEvent`
//! enum, and maps screen coordinates to canvas coordinates through the
//! current `Viewport`.

use kurbo::{Point, Vec2};

/// A normalized input event. Coordinates are in screen space (CSS pixels
/// relative to the canvas element).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed (mouse down, touch start, pencil contact).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// The platform cancelled the pointer stream.
    PointerCancel,

    /// The pointer left the canvas.
    PointerLeave,

    /// Pinch or ctrl-wheel zoom around a screen point.
    Zoom {
        /// Multiplier (>1 zooms in).
        factor: f64,
        x: f64,
        y: f64,
    },

    /// Scroll-pan by a screen-space offset.
    Pan { dx: f64, dy: f64 },
}

impl InputEvent {
    /// Extract the position if this is a positioned pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Zoom { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 8.0;

/// Screen ↔ canvas mapping: `canvas = (screen - pan) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

impl Viewport {
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the canvas point under `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        let pinned = self.to_canvas(anchor);
        self.zoom = clamp_zoom(self.zoom * factor);
        self.pan = anchor.to_vec2() - pinned.to_vec2() * self.zoom;
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.pan) / self.zoom).to_point()
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        (canvas.to_vec2() * self.zoom + self.pan).to_point()
    }

    /// A screen-space drag distance in canvas units.
    pub fn canvas_delta(&self, screen_delta: Vec2) -> Vec2 {
        screen_delta / self.zoom
    }
}
