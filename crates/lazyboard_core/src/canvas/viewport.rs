//! Screen ↔ canvas transform operations.
//!
//! View state only. Nothing here is persisted.

use crate::model::board::{Position, Size, Viewport};

/// Pixel size of the host drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn from_rect(position: Position, size: Size) -> Self {
        Self {
            min: position,
            max: Position::new(position.x + size.width, position.y + size.height),
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            min: Position::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Position::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Position) -> Position {
        Position::new(
            canvas.x * self.zoom + self.pan.x,
            canvas.y * self.zoom + self.pan.y,
        )
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Scales by `factor`, keeping the canvas point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Position, factor: f64, min_zoom: f64, max_zoom: f64) {
        let fixed = self.screen_to_canvas(anchor);
        self.zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        self.pan = Position::new(
            anchor.x - fixed.x * self.zoom,
            anchor.y - fixed.y * self.zoom,
        );
    }

    /// Centers `bounds` on `surface` at the largest zoom that fits.
    pub fn fit_to(
        &mut self,
        bounds: Bounds,
        surface: SurfaceSize,
        padding: f64,
        min_zoom: f64,
        max_zoom: f64,
    ) {
        let usable_width = (surface.width - 2.0 * padding).max(1.0);
        let usable_height = (surface.height - 2.0 * padding).max(1.0);
        let zoom_x = usable_width / bounds.width().max(1.0);
        let zoom_y = usable_height / bounds.height().max(1.0);
        self.zoom = zoom_x.min(zoom_y).clamp(min_zoom, max_zoom);

        let center = bounds.center();
        self.pan = Position::new(
            surface.width / 2.0 - center.x * self.zoom,
            surface.height / 2.0 - center.y * self.zoom,
        );
    }
}
