//! Core engine for LazyBoard canvases.
//! This crate is the single source of truth for board invariants.

pub mod canvas;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use canvas::{
    BoardCanvas, CanvasCommand, CanvasConfig, Clock, GesturePhase, HitTarget, ManualClock,
    PointerEvent, RenderModel, RenderNode, SurfaceSize, SystemClock, WriteFailure, WriteOp,
};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::atom::{Atom, AtomId, AtomType, TaskStatus};
pub use model::board::{
    Board, BoardCategory, BoardEdge, BoardId, BoardNode, BoardScope, BoardSnapshot, EdgeId,
    EdgeStyle, LinkedItemRef, NewNode, NodeId, Position, Size, Viewport,
};
pub use registry::{builtin_registry, NodeKind, NodeTypeRegistry};
pub use repo::board_repo::{BoardStore, SqliteBoardStore, StoreError, Upsert};
pub use repo::routine_repo::{MemoryRoutineStore, RoutineCompletionStore, SqliteRoutineStore};
pub use service::board_service::{BoardError, BoardService, Identity};
pub use service::project_service::ProjectService;
pub use service::routine_service::{RoutineError, RoutineService};
pub use service::template_service::TemplateService;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
