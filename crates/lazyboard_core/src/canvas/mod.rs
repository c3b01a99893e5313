//! Interactive board canvas.
//!
//! # Responsibility
//! - Compose the synchronizer, gesture controller, resize debouncer and
//!   auto-layout into one host-facing facade.
//! - Route controller commands to persistence: moves commit at once, resizes
//!   go through the debouncer.
//!
//! # Invariants
//! - Store failures never escape the facade; they are logged and recorded.
//! - Pending resizes are flushed when the canvas is dropped unless the host
//!   discards them first. Until written, their local sizes win over storage.
//! - A cancelled resize writes only to undo a write that already landed.

pub mod clock;
pub mod config;
pub mod controller;
pub mod grid;
pub mod layout;
pub mod scheduler;
pub mod sync;
pub mod viewport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CanvasConfig, ConfigError};
pub use controller::{CanvasCommand, GesturePhase, HitTarget, PointerEvent};
pub use layout::{compute_layout, AutoLayoutConfig, LayoutItem, LayoutPlacement};
pub use scheduler::DebouncedScheduler;
pub use sync::{
    BoardSynchronizer, RenderModel, RenderNode, WriteFailure, WriteOp, MAX_RECORDED_FAILURES,
};
pub use viewport::{Bounds, SurfaceSize};

use crate::model::atom::Atom;
use crate::model::board::{
    BoardId, EdgeId, EdgeStyle, NewNode, NodeId, Position, Size, Viewport,
};
use crate::registry::renderers::NodeView;
use crate::registry::NodeTypeDefinition;
use crate::repo::board_repo::BoardStore;
use crate::service::board_service::{BoardResult, BoardService};
use crate::service::template_service::{ResetReport, TemplateService};
use controller::{InteractionController, InteractionSettings};
use log::{info, warn};
use serde_json::Value;
use std::collections::VecDeque;

/// One open board view.
pub struct BoardCanvas<S: BoardStore> {
    sync: BoardSynchronizer<S>,
    controller: InteractionController,
    resizes: DebouncedScheduler<NodeId, Size>,
    clock: Box<dyn Clock>,
    config: CanvasConfig,
    surface: SurfaceSize,
}

impl<S: BoardStore> BoardCanvas<S> {
    /// Subscribes to `board_id` and starts from its stored viewport.
    pub fn open(
        service: BoardService<S>,
        board_id: BoardId,
        config: CanvasConfig,
        clock: Box<dyn Clock>,
    ) -> BoardResult<Self> {
        let service = service.with_grid_unit(config.grid_unit);
        let sync = BoardSynchronizer::subscribe(service, board_id)?;
        let controller = InteractionController::new(
            sync.model().board().viewport,
            InteractionSettings {
                grid_unit: config.grid_unit,
                min_zoom: config.min_zoom,
                max_zoom: config.max_zoom,
                wheel_zoom_step: config.wheel_zoom_step,
            },
        );
        info!(
            "event=canvas_open module=canvas status=ok board_id={board_id} nodes={}",
            sync.model().nodes().len()
        );
        Ok(Self {
            resizes: DebouncedScheduler::new(config.quiet_period_ms),
            sync,
            controller,
            clock,
            config,
            surface: SurfaceSize::default(),
        })
    }

    pub fn board_id(&self) -> BoardId {
        self.sync.board_id()
    }

    pub fn model(&self) -> &RenderModel {
        self.sync.model()
    }

    pub fn service(&self) -> &BoardService<S> {
        self.sync.service()
    }

    pub fn service_mut(&mut self) -> &mut BoardService<S> {
        self.sync.service_mut()
    }

    pub fn viewport(&self) -> Viewport {
        self.controller.viewport()
    }

    pub fn phase(&self) -> GesturePhase {
        self.controller.phase()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn set_surface_size(&mut self, surface: SurfaceSize) {
        self.surface = surface;
    }

    /// Feeds one pointer event through the controller.
    ///
    /// Returns the controller's commands so hosts can react to menu and
    /// wheel pass-through requests.
    pub fn handle_event(&mut self, event: PointerEvent) -> Vec<CanvasCommand> {
        let commands = self.controller.handle(event, self.sync.model_mut());
        self.sync.pin(self.controller.gesture_node());
        for command in &commands {
            match *command {
                CanvasCommand::CommitMove { node_id, position } => {
                    self.sync.move_node(node_id, position);
                }
                CanvasCommand::ScheduleResize { node_id, size } => {
                    self.resizes.schedule(node_id, size, self.clock.now_ms());
                }
                CanvasCommand::RevertResize { node_id, stored } => {
                    self.revert_resize(node_id, stored);
                }
                CanvasCommand::OpenCreateMenu { .. }
                | CanvasCommand::CloseCreateMenu
                | CanvasCommand::WheelPassedToNode { .. } => {}
            }
        }
        commands
    }

    /// Fires due resizes, then polls storage. Returns whether the model was
    /// rebuilt.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        let sync = &mut self.sync;
        self.resizes
            .run_due(now, |node_id, size| sync.resize_node(node_id, size));
        self.hold_pending_sizes();
        self.sync.poll()
    }

    /// When the host should tick next for pending writes.
    pub fn next_deadline(&self) -> Option<u64> {
        self.resizes.next_deadline()
    }

    pub fn has_pending_writes(&self) -> bool {
        self.resizes.pending_len() > 0
    }

    /// Writes every pending resize now.
    pub fn flush_pending(&mut self) -> usize {
        let sync = &mut self.sync;
        self.resizes
            .flush_all(|node_id, size| sync.resize_node(node_id, size))
    }

    /// Drops every pending resize unwritten.
    pub fn discard_pending(&mut self) -> usize {
        self.resizes.cancel_all()
    }

    /// Records a host-measured size for an intrinsic node. Not persisted.
    pub fn report_measured_size(&mut self, node_id: NodeId, size: Size) {
        if let Some(node) = self.sync.model_mut().node_mut(node_id) {
            node.measured_size = Some(size);
        }
    }

    /// Types offered by the creation menu of this board's category.
    pub fn menu_options(&self) -> Vec<&'static NodeTypeDefinition> {
        self.sync
            .service()
            .registry()
            .templates_for(self.sync.model().board().category)
    }

    pub fn dismiss_menu(&mut self) -> bool {
        self.controller.close_menu()
    }

    /// Creates a node of `tag` at the open menu's spawn point.
    ///
    /// Returns `None` when no menu is open, the type is not offered on this
    /// board, or the write failed.
    pub fn choose_template(&mut self, tag: &str) -> Option<NodeId> {
        let spawn = self.controller.menu_spawn()?;
        let board = self.sync.model().board().clone();
        let definition = self
            .menu_options()
            .into_iter()
            .find(|definition| definition.tag() == tag);
        let Some(definition) = definition else {
            warn!(
                "event=node_create module=canvas status=skip board_id={} node_type={tag} reason=not_offered",
                board.id
            );
            return None;
        };

        let ctx = self
            .sync
            .service()
            .creation_context(board.id, &board.scope, board.category);
        let props = definition.build_props(&ctx);
        let node = NewNode::new(tag, spawn)
            .with_size(definition.default_size)
            .with_props(props.clone());
        self.controller.close_menu();

        let node_id = match definition.linked_item {
            Some(kind) => {
                let content = props
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(definition.label);
                self.sync.create_item_node(node, &Atom::new(kind, content))
            }
            None => self.sync.create_node(node),
        }?;
        self.sync.model_mut().select(Some(node_id));
        Some(node_id)
    }

    /// Deletes `node_id`; its pending resize and gesture survive a failed
    /// delete.
    pub fn delete_node(&mut self, node_id: NodeId) -> bool {
        if !self.sync.delete_node(node_id) {
            return false;
        }
        self.resizes.cancel(&node_id);
        self.controller.forget_node(node_id);
        self.sync.pin(self.controller.gesture_node());
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.sync.model().selected() {
            Some(node_id) => self.delete_node(node_id),
            None => false,
        }
    }

    pub fn connect(&mut self, source: NodeId, target: NodeId, style: EdgeStyle) -> Option<EdgeId> {
        self.sync.create_edge(source, target, style, None)
    }

    pub fn disconnect(&mut self, edge_id: EdgeId) {
        self.sync.delete_edge(edge_id);
    }

    /// Re-packs every node into rows, commits the positions and fits the view.
    ///
    /// Skipped while a gesture is in progress. Returns the number of nodes
    /// placed.
    pub fn auto_layout(&mut self) -> usize {
        if self.controller.phase() != GesturePhase::Idle {
            return 0;
        }
        let items: Vec<LayoutItem> = self
            .sync
            .model()
            .nodes()
            .iter()
            .map(|node| LayoutItem {
                node_id: node.id,
                size: Some(node.effective_size()),
            })
            .collect();
        let placements = compute_layout(&items, &self.config.layout);

        for placement in &placements {
            if let Some(node) = self.sync.model_mut().node_mut(placement.node_id) {
                node.position = placement.position;
            }
            self.sync.move_node(placement.node_id, placement.position);
        }
        info!(
            "event=auto_layout module=canvas status=ok board_id={} nodes={}",
            self.board_id(),
            placements.len()
        );
        self.fit_view();
        placements.len()
    }

    /// Frames all nodes on the current surface. Returns `false` when there is
    /// nothing to frame.
    pub fn fit_view(&mut self) -> bool {
        if self.surface.width <= 0.0 || self.surface.height <= 0.0 {
            return false;
        }
        let Some(bounds) = self.sync.model().content_bounds() else {
            return false;
        };
        let mut viewport = self.controller.viewport();
        viewport.fit_to(
            bounds,
            self.surface,
            self.config.fit_padding,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        self.controller.set_viewport(viewport);
        true
    }

    /// Polyline between the centres of an edge's endpoints.
    ///
    /// `dependency` edges route orthogonally with one elbow at mid-x.
    pub fn edge_path(&self, edge_id: EdgeId) -> Option<Vec<Position>> {
        let model = self.sync.model();
        let edge = model.edge(edge_id)?;
        let from = model.node(edge.source)?.bounds().center();
        let to = model.node(edge.target)?.bounds().center();
        Some(match edge.style {
            EdgeStyle::Default | EdgeStyle::Flow => vec![from, to],
            EdgeStyle::Dependency => {
                let mid_x = (from.x + to.x) / 2.0;
                vec![
                    from,
                    Position::new(mid_x, from.y),
                    Position::new(mid_x, to.y),
                    to,
                ]
            }
        })
    }

    /// Widget views in render order; unknown types are skipped.
    pub fn render(&self) -> Vec<NodeView> {
        let registry = self.sync.service().registry();
        self.sync
            .model()
            .nodes()
            .iter()
            .filter_map(|node| registry.resolve(&node.node_type).renderer.render(node))
            .collect()
    }

    /// Clears the board and re-expands its category template.
    pub fn reset(&mut self) -> Option<ResetReport> {
        self.resizes.cancel_all();
        self.hold_pending_sizes();
        self.controller.close_menu();
        let board_id = self.board_id();
        let result = TemplateService::new(self.sync.service()).reset_board(board_id);
        self.sync.refresh();
        match result {
            Ok(report) => Some(report),
            Err(err) => {
                warn!("event=board_reset module=canvas status=error board_id={board_id} error={err}");
                None
            }
        }
    }

    /// Recorded store failures, oldest first.
    pub fn write_failures(&self) -> &VecDeque<WriteFailure> {
        self.sync.write_failures()
    }

    pub fn take_write_failures(&mut self) -> Vec<WriteFailure> {
        self.sync.take_write_failures()
    }

    fn hold_pending_sizes(&mut self) {
        self.sync.hold_local_sizes(self.resizes.keys().copied());
    }

    fn revert_resize(&mut self, node_id: NodeId, stored: Option<Size>) {
        self.resizes.cancel(&node_id);
        let current = self.sync.model().node(node_id).and_then(|node| node.size);
        // Storage cannot clear a size, so an intrinsic node keeps one that was
        // already written.
        if let Some(size) = stored.filter(|size| current != Some(*size)) {
            self.resizes.schedule(node_id, size, self.clock.now_ms());
        }
    }
}

impl<S: BoardStore> Drop for BoardCanvas<S> {
    fn drop(&mut self) {
        let flushed = self.flush_pending();
        if flushed > 0 {
            info!(
                "event=canvas_close module=canvas status=ok board_id={} flushed={flushed}",
                self.board_id()
            );
        }
    }
}
