//! Pointer gesture state machine.
//!
//! # Responsibility
//! - Turn host pointer events into local render updates and persistence
//!   commands.
//!
//! # Invariants
//! - Exactly one gesture phase is active at a time, so at most one node is
//!   being dragged or resized.
//! - Pan and zoom change only the viewport and are never persisted.
//! - Committed geometry is grid-snapped; in-flight geometry is raw.

use super::grid::{snap_position, snap_size};
use super::sync::RenderModel;
use crate::model::board::{NodeId, Position, Size, Viewport};

/// What the host hit-tested under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Canvas,
    Node(NodeId),
    ResizeHandle(NodeId),
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { target: HitTarget, screen: Position },
    Move { screen: Position },
    Up { screen: Position },
    DoubleClick { target: HitTarget, screen: Position },
    Wheel { screen: Position, delta_y: f64 },
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Panning {
        last_screen: Position,
    },
    Dragging {
        node_id: NodeId,
        origin: Position,
        /// Pointer minus node position, in canvas units.
        grab_offset: Position,
        moved: bool,
    },
    Resizing {
        node_id: NodeId,
        start_size: Size,
        start_pointer: Position,
        /// Persisted size when the gesture began.
        start_stored: Option<Size>,
        start_measured: Option<Size>,
    },
    CreateMenuOpen {
        spawn: Position,
    },
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasCommand {
    CommitMove { node_id: NodeId, position: Position },
    ScheduleResize { node_id: NodeId, size: Size },
    /// A cancelled resize; `stored` is the persisted size it started from.
    RevertResize { node_id: NodeId, stored: Option<Size> },
    OpenCreateMenu { spawn: Position },
    CloseCreateMenu,
    /// Wheel input belongs to the selected node's content.
    WheelPassedToNode { node_id: NodeId, delta_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub grid_unit: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_zoom_step: f64,
}

pub struct InteractionController {
    phase: GesturePhase,
    viewport: Viewport,
    settings: InteractionSettings,
}

impl InteractionController {
    pub fn new(viewport: Viewport, settings: InteractionSettings) -> Self {
        Self {
            phase: GesturePhase::Idle,
            viewport,
            settings,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Node whose local geometry must not be overwritten by a rebuild.
    pub fn gesture_node(&self) -> Option<NodeId> {
        match self.phase {
            GesturePhase::Dragging { node_id, .. } | GesturePhase::Resizing { node_id, .. } => {
                Some(node_id)
            }
            _ => None,
        }
    }

    pub fn menu_spawn(&self) -> Option<Position> {
        match self.phase {
            GesturePhase::CreateMenuOpen { spawn } => Some(spawn),
            _ => None,
        }
    }

    pub fn close_menu(&mut self) -> bool {
        if self.menu_spawn().is_some() {
            self.phase = GesturePhase::Idle;
            return true;
        }
        false
    }

    /// Drops a gesture whose node disappeared.
    pub fn forget_node(&mut self, node_id: NodeId) {
        if self.gesture_node() == Some(node_id) {
            self.phase = GesturePhase::Idle;
        }
    }

    pub fn handle(&mut self, event: PointerEvent, model: &mut RenderModel) -> Vec<CanvasCommand> {
        match event {
            PointerEvent::Down { target, screen } => self.pointer_down(target, screen, model),
            PointerEvent::Move { screen } => self.pointer_move(screen, model),
            PointerEvent::Up { screen } => self.pointer_up(screen, model),
            PointerEvent::DoubleClick { target, screen } => self.double_click(target, screen),
            PointerEvent::Wheel { screen, delta_y } => self.wheel(screen, delta_y, model),
            PointerEvent::Escape => self.escape(model),
        }
    }

    fn pointer_down(
        &mut self,
        target: HitTarget,
        screen: Position,
        model: &mut RenderModel,
    ) -> Vec<CanvasCommand> {
        let mut commands = Vec::new();
        match self.phase {
            GesturePhase::Idle => {}
            GesturePhase::CreateMenuOpen { .. } => {
                self.phase = GesturePhase::Idle;
                commands.push(CanvasCommand::CloseCreateMenu);
            }
            _ => return commands,
        }

        let pointer = self.viewport.screen_to_canvas(screen);
        match target {
            HitTarget::Canvas => {
                model.select(None);
                self.phase = GesturePhase::Panning {
                    last_screen: screen,
                };
            }
            HitTarget::Node(node_id) => {
                let Some(node) = model.node(node_id) else {
                    return commands;
                };
                let origin = node.position;
                model.select(Some(node_id));
                self.phase = GesturePhase::Dragging {
                    node_id,
                    origin,
                    grab_offset: Position::new(pointer.x - origin.x, pointer.y - origin.y),
                    moved: false,
                };
            }
            HitTarget::ResizeHandle(node_id) => {
                let Some(node) = model.node(node_id) else {
                    return commands;
                };
                let (start_size, start_stored, start_measured) =
                    (node.effective_size(), node.size, node.measured_size);
                model.select(Some(node_id));
                self.phase = GesturePhase::Resizing {
                    node_id,
                    start_size,
                    start_pointer: pointer,
                    start_stored,
                    start_measured,
                };
            }
        }
        commands
    }

    fn pointer_move(&mut self, screen: Position, model: &mut RenderModel) -> Vec<CanvasCommand> {
        let pointer = self.viewport.screen_to_canvas(screen);
        match &mut self.phase {
            GesturePhase::Panning { last_screen } => {
                let (dx, dy) = (screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
                self.viewport.pan_by(dx, dy);
                Vec::new()
            }
            GesturePhase::Dragging {
                node_id,
                grab_offset,
                moved,
                ..
            } => {
                if let Some(node) = model.node_mut(*node_id) {
                    node.position =
                        Position::new(pointer.x - grab_offset.x, pointer.y - grab_offset.y);
                    *moved = true;
                }
                Vec::new()
            }
            GesturePhase::Resizing {
                node_id,
                start_size,
                start_pointer,
                ..
            } => {
                let raw = Size::new(
                    start_size.width + pointer.x - start_pointer.x,
                    start_size.height + pointer.y - start_pointer.y,
                );
                let node_id = *node_id;
                self.apply_resize(node_id, raw, model)
            }
            GesturePhase::Idle | GesturePhase::CreateMenuOpen { .. } => Vec::new(),
        }
    }

    fn pointer_up(&mut self, screen: Position, model: &mut RenderModel) -> Vec<CanvasCommand> {
        let commands = self.pointer_move(screen, model);
        let pointer = self.viewport.screen_to_canvas(screen);
        let phase = self.phase;
        match phase {
            GesturePhase::Panning { .. } => {
                self.phase = GesturePhase::Idle;
                commands
            }
            GesturePhase::Dragging {
                node_id,
                origin,
                grab_offset,
                moved,
            } => {
                self.phase = GesturePhase::Idle;
                let raw = Position::new(pointer.x - grab_offset.x, pointer.y - grab_offset.y);
                let position = snap_position(raw, self.settings.grid_unit);
                if let Some(node) = model.node_mut(node_id) {
                    node.position = position;
                }
                if moved && position != origin {
                    vec![CanvasCommand::CommitMove { node_id, position }]
                } else {
                    Vec::new()
                }
            }
            GesturePhase::Resizing { .. } => {
                self.phase = GesturePhase::Idle;
                commands
            }
            GesturePhase::Idle | GesturePhase::CreateMenuOpen { .. } => commands,
        }
    }

    fn double_click(&mut self, target: HitTarget, screen: Position) -> Vec<CanvasCommand> {
        let idle = matches!(
            self.phase,
            GesturePhase::Idle | GesturePhase::CreateMenuOpen { .. }
        );
        if target != HitTarget::Canvas || !idle {
            return Vec::new();
        }
        let spawn = snap_position(
            self.viewport.screen_to_canvas(screen),
            self.settings.grid_unit,
        );
        self.phase = GesturePhase::CreateMenuOpen { spawn };
        vec![CanvasCommand::OpenCreateMenu { spawn }]
    }

    fn wheel(&mut self, screen: Position, delta_y: f64, model: &RenderModel) -> Vec<CanvasCommand> {
        if let Some(node_id) = model.selected() {
            return vec![CanvasCommand::WheelPassedToNode { node_id, delta_y }];
        }
        if delta_y == 0.0 {
            return Vec::new();
        }
        let step = self.settings.wheel_zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.viewport.zoom_at(
            screen,
            factor,
            self.settings.min_zoom,
            self.settings.max_zoom,
        );
        Vec::new()
    }

    fn escape(&mut self, model: &mut RenderModel) -> Vec<CanvasCommand> {
        let phase = std::mem::replace(&mut self.phase, GesturePhase::Idle);
        match phase {
            GesturePhase::Dragging { node_id, origin, .. } => {
                if let Some(node) = model.node_mut(node_id) {
                    node.position = origin;
                }
                Vec::new()
            }
            GesturePhase::Resizing {
                node_id,
                start_stored,
                start_measured,
                ..
            } => {
                if let Some(node) = model.node_mut(node_id) {
                    node.measured_size = start_measured;
                }
                vec![CanvasCommand::RevertResize {
                    node_id,
                    stored: start_stored,
                }]
            }
            GesturePhase::CreateMenuOpen { .. } => vec![CanvasCommand::CloseCreateMenu],
            GesturePhase::Idle | GesturePhase::Panning { .. } => Vec::new(),
        }
    }

    fn apply_resize(
        &self,
        node_id: NodeId,
        raw: Size,
        model: &mut RenderModel,
    ) -> Vec<CanvasCommand> {
        let unit = self.settings.grid_unit;
        let Some(node) = model.node_mut(node_id) else {
            return Vec::new();
        };
        let local = Size::new(raw.width.max(unit), raw.height.max(unit));
        node.measured_size = Some(local);
        vec![CanvasCommand::ScheduleResize {
            node_id,
            size: snap_size(local, unit),
        }]
    }
}
