//! Grid snapping.
//!
//! Committed positions and sizes are multiples of the grid unit. Local render
//! state may hold raw values while a gesture is in flight.

use crate::model::board::{Position, Size};

/// Snapping granularity in board units.
pub const GRID_UNIT: f64 = 20.0;

/// Rounds `value` to the nearest multiple of `unit`.
pub fn snap(value: f64, unit: f64) -> f64 {
    if unit <= 0.0 {
        return value;
    }
    (value / unit).round() * unit
}

/// Rounds `value` up to the next multiple of `unit`.
pub fn snap_up(value: f64, unit: f64) -> f64 {
    if unit <= 0.0 {
        return value;
    }
    (value / unit).ceil() * unit
}

pub fn snap_position(position: Position, unit: f64) -> Position {
    Position::new(snap(position.x, unit), snap(position.y, unit))
}

/// Snaps a size, never below one grid unit per axis.
pub fn snap_size(size: Size, unit: f64) -> Size {
    Size::new(
        snap(size.width, unit).max(unit),
        snap(size.height, unit).max(unit),
    )
}

/// Whether `value` is a multiple of [`GRID_UNIT`].
pub fn is_grid_aligned(value: f64) -> bool {
    value % GRID_UNIT == 0.0
}
