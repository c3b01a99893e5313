//! Row-major grid auto-layout.
//!
//! # Invariants
//! - One pass in input order; output order matches input order.
//! - Every output position is grid-aligned and gaps are at least `padding`,
//!   because horizontal and row advances are rounded up to the grid.

use super::grid::{snap, snap_up, GRID_UNIT};
use crate::model::board::{NodeId, Position, Size};
use crate::registry::FALLBACK_NODE_SIZE;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoLayoutConfig {
    pub columns: usize,
    pub padding: f64,
    pub origin: Position,
    /// Size used for nodes that report none.
    pub fallback_size: Size,
    pub grid_unit: f64,
}

impl Default for AutoLayoutConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            padding: 40.0,
            origin: Position::new(40.0, 40.0),
            fallback_size: FALLBACK_NODE_SIZE,
            grid_unit: GRID_UNIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub node_id: NodeId,
    pub size: Option<Size>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPlacement {
    pub node_id: NodeId,
    pub position: Position,
    /// Size the placement was computed with.
    pub size: Size,
}

/// Places `items` left to right, wrapping after `columns` per row.
pub fn compute_layout(items: &[LayoutItem], config: &AutoLayoutConfig) -> Vec<LayoutPlacement> {
    let columns = config.columns.max(1);
    let unit = config.grid_unit;
    let origin = Position::new(snap(config.origin.x, unit), snap(config.origin.y, unit));

    let mut placements = Vec::with_capacity(items.len());
    let mut cursor = origin;
    let mut row_height: f64 = 0.0;

    for (index, item) in items.iter().enumerate() {
        if index > 0 && index % columns == 0 {
            cursor.x = origin.x;
            cursor.y += snap_up(row_height + config.padding, unit);
            row_height = 0.0;
        }

        let size = item.size.unwrap_or(config.fallback_size);
        placements.push(LayoutPlacement {
            node_id: item.node_id,
            position: cursor,
            size,
        });

        cursor.x += snap_up(size.width + config.padding, unit);
        row_height = row_height.max(size.height);
    }

    placements
}
