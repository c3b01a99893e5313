//! Board state synchronizer.
//!
//! # Responsibility
//! - Mirror one persisted board into a local render model.
//! - Forward node/edge writes to the board service without surfacing errors.
//!
//! # Invariants
//! - The model is rebuilt from a full snapshot whenever the board revision
//!   moves; selection survives rebuilds.
//! - The pinned node (active gesture) keeps its local geometry on rebuild.
//!   Nodes with an unwritten resize keep their local size.
//! - Write failures are logged and recorded, never returned. Only the most
//!   recent `MAX_RECORDED_FAILURES` are kept.

use super::viewport::Bounds;
use crate::model::atom::Atom;
use crate::model::board::{
    Board, BoardEdge, BoardId, BoardNode, BoardSnapshot, EdgeId, EdgeStyle, LinkedItemRef, NewNode,
    NodeId, Position, Size,
};
use crate::registry::builtin_registry;
use crate::repo::board_repo::BoardStore;
use crate::service::board_service::{BoardError, BoardResult, BoardService};
use log::{debug, warn};
use serde_json::Value;
use std::collections::{BTreeSet, VecDeque};
use uuid::Uuid;

pub const MAX_RECORDED_FAILURES: usize = 64;

/// Node as drawn, including local-only state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: NodeId,
    pub node_type: String,
    pub position: Position,
    /// Persisted size; `None` means intrinsic.
    pub size: Option<Size>,
    /// Size last measured by the host or set by a gesture.
    pub measured_size: Option<Size>,
    pub z_index: i64,
    pub linked_item: Option<LinkedItemRef>,
    pub props: Value,
    pub selected: bool,
}

impl RenderNode {
    pub fn from_persisted(node: &BoardNode) -> Self {
        Self {
            id: node.id,
            node_type: node.node_type.clone(),
            position: node.position,
            size: node.size,
            measured_size: node.size,
            z_index: node.z_index,
            linked_item: node.linked_item,
            props: node.props.clone(),
            selected: false,
        }
    }

    /// Measured size, then persisted size, then the type's default.
    pub fn effective_size(&self) -> Size {
        self.measured_size
            .or(self.size)
            .unwrap_or_else(|| builtin_registry().resolve(&self.node_type).default_size)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.position, self.effective_size())
    }
}

/// Local render state of one board.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    board: Board,
    nodes: Vec<RenderNode>,
    edges: Vec<BoardEdge>,
}

impl RenderModel {
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            nodes: snapshot.nodes.iter().map(RenderNode::from_persisted).collect(),
            edges: snapshot.edges,
            board: snapshot.board,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Nodes in render order.
    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[BoardEdge] {
        &self.edges
    }

    pub fn node(&self, node_id: NodeId) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.iter_mut().find(|node| node.id == node_id)
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&BoardEdge> {
        self.edges.iter().find(|edge| edge.id == edge_id)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.nodes.iter().find(|node| node.selected).map(|node| node.id)
    }

    /// Selects at most one node; `None` clears the selection.
    pub fn select(&mut self, node_id: Option<NodeId>) {
        for node in &mut self.nodes {
            node.selected = Some(node.id) == node_id;
        }
    }

    /// Union of all node rectangles.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(RenderNode::bounds)
            .reduce(Bounds::union)
    }

    fn rebuild(
        &mut self,
        snapshot: BoardSnapshot,
        pinned: Option<NodeId>,
        local_sizes: &BTreeSet<NodeId>,
    ) {
        let previous = std::mem::take(&mut self.nodes);
        let selected = previous.iter().find(|node| node.selected).map(|node| node.id);

        self.nodes = snapshot
            .nodes
            .iter()
            .map(|persisted| {
                let mut node = RenderNode::from_persisted(persisted);
                if let Some(old) = previous.iter().find(|old| old.id == node.id) {
                    if pinned == Some(node.id) {
                        node.position = old.position;
                        node.size = old.size;
                        node.measured_size = old.measured_size;
                    } else if local_sizes.contains(&node.id) || node.measured_size.is_none() {
                        node.measured_size = old.measured_size;
                    }
                }
                node.selected = selected == Some(node.id);
                node
            })
            .collect();
        self.edges = snapshot.edges;
        self.board = snapshot.board;
    }

    fn remove_node(&mut self, node_id: NodeId) {
        self.nodes.retain(|node| node.id != node_id);
        self.edges
            .retain(|edge| edge.source != node_id && edge.target != node_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    CreateNode,
    MoveNode,
    ResizeNode,
    DeleteNode,
    CreateEdge,
    DeleteEdge,
}

impl WriteOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateNode => "create_node",
            Self::MoveNode => "move_node",
            Self::ResizeNode => "resize_node",
            Self::DeleteNode => "delete_node",
            Self::CreateEdge => "create_edge",
            Self::DeleteEdge => "delete_edge",
        }
    }
}

/// Record of one swallowed write error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub op: WriteOp,
    pub target: Option<Uuid>,
    pub message: String,
}

/// Keeps a [`RenderModel`] in step with storage.
pub struct BoardSynchronizer<S: BoardStore> {
    service: BoardService<S>,
    model: RenderModel,
    revision: i64,
    pinned: Option<NodeId>,
    local_sizes: BTreeSet<NodeId>,
    failures: VecDeque<WriteFailure>,
}

impl<S: BoardStore> BoardSynchronizer<S> {
    /// Loads the first snapshot of `board_id`.
    ///
    /// # Errors
    /// - `BoardNotFound` when the board does not exist.
    pub fn subscribe(service: BoardService<S>, board_id: BoardId) -> BoardResult<Self> {
        let snapshot = service.snapshot(board_id)?;
        debug!(
            "event=board_subscribe module=canvas status=ok board_id={board_id} nodes={} edges={}",
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(Self {
            revision: snapshot.board.revision,
            model: RenderModel::from_snapshot(snapshot),
            service,
            pinned: None,
            local_sizes: BTreeSet::new(),
            failures: VecDeque::new(),
        })
    }

    pub fn board_id(&self) -> BoardId {
        self.model.board.id
    }

    pub fn service(&self) -> &BoardService<S> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut BoardService<S> {
        &mut self.service
    }

    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut RenderModel {
        &mut self.model
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Marks the node under an active gesture; `None` releases it.
    pub fn pin(&mut self, node_id: Option<NodeId>) {
        self.pinned = node_id;
    }

    /// Nodes whose local size is ahead of storage; replaces the previous set.
    pub fn hold_local_sizes(&mut self, node_ids: impl IntoIterator<Item = NodeId>) {
        self.local_sizes = node_ids.into_iter().collect();
    }

    /// Rebuilds when the stored revision moved. Returns whether it did.
    pub fn poll(&mut self) -> bool {
        let board_id = self.board_id();
        match self.service.revision(board_id) {
            Ok(revision) if revision == self.revision => false,
            Ok(_) => self.refresh(),
            Err(err) => {
                warn!("event=board_poll module=canvas status=error board_id={board_id} error={err}");
                false
            }
        }
    }

    /// Reloads the snapshot unconditionally.
    pub fn refresh(&mut self) -> bool {
        let board_id = self.board_id();
        match self.service.snapshot(board_id) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            Err(err) => {
                warn!(
                    "event=board_refresh module=canvas status=error board_id={board_id} error={err}"
                );
                false
            }
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        if snapshot.board.id != self.board_id() {
            warn!(
                "event=board_snapshot module=canvas status=skip board_id={} reason=foreign_board",
                snapshot.board.id
            );
            return;
        }
        self.revision = snapshot.board.revision;
        self.model.rebuild(snapshot, self.pinned, &self.local_sizes);
    }

    pub fn create_node(&mut self, node: NewNode) -> Option<NodeId> {
        let result = self.service.create_node(self.board_id(), node);
        let node_id = self.record(WriteOp::CreateNode, None, result)?;
        self.adopt_node(node_id);
        Some(node_id)
    }

    /// Creates `item` and a node owning it.
    pub fn create_item_node(&mut self, node: NewNode, item: &Atom) -> Option<NodeId> {
        let result = self.service.create_item_node(self.board_id(), node, item);
        let node_id = self.record(WriteOp::CreateNode, None, result)?;
        self.adopt_node(node_id);
        Some(node_id)
    }

    pub fn move_node(&mut self, node_id: NodeId, position: Position) {
        let result = self.service.move_node(node_id, position);
        if let Some(position) = self.record(WriteOp::MoveNode, Some(node_id), result) {
            if let Some(node) = self.model.node_mut(node_id) {
                node.position = position;
            }
        }
    }

    pub fn resize_node(&mut self, node_id: NodeId, size: Size) {
        let result = self.service.resize_node(node_id, size);
        if let Some(size) = self.record(WriteOp::ResizeNode, Some(node_id), result) {
            if let Some(node) = self.model.node_mut(node_id) {
                node.size = Some(size);
                node.measured_size = Some(size);
            }
        }
    }

    /// Deletes the node with its owned item and incident edges. Returns
    /// whether the delete went through.
    pub fn delete_node(&mut self, node_id: NodeId) -> bool {
        let result = self.service.delete_node(node_id);
        if self.record(WriteOp::DeleteNode, Some(node_id), result).is_none() {
            return false;
        }
        self.model.remove_node(node_id);
        if self.pinned == Some(node_id) {
            self.pinned = None;
        }
        true
    }

    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        style: EdgeStyle,
        relationship_id: Option<Uuid>,
    ) -> Option<EdgeId> {
        let board_id = self.board_id();
        let result = self
            .service
            .create_edge(board_id, source, target, style, relationship_id);
        let edge_id = self.record(WriteOp::CreateEdge, Some(source), result)?;
        self.model.edges.push(BoardEdge {
            id: edge_id,
            board_id,
            source,
            target,
            style,
            relationship_id,
        });
        Some(edge_id)
    }

    pub fn delete_edge(&mut self, edge_id: EdgeId) {
        let result = self.service.delete_edge(edge_id);
        if self.record(WriteOp::DeleteEdge, Some(edge_id), result).is_some() {
            self.model.edges.retain(|edge| edge.id != edge_id);
        }
    }

    /// Recorded failures, oldest first.
    pub fn write_failures(&self) -> &VecDeque<WriteFailure> {
        &self.failures
    }

    pub fn take_write_failures(&mut self) -> Vec<WriteFailure> {
        self.failures.drain(..).collect()
    }

    fn adopt_node(&mut self, node_id: NodeId) {
        match self.service.store().get_node(node_id) {
            Ok(Some(node)) => {
                self.model.nodes.push(RenderNode::from_persisted(&node));
                self.model.nodes.sort_by_key(|node| node.z_index);
            }
            Ok(None) => {}
            Err(err) => warn!(
                "event=node_adopt module=canvas status=error node_id={node_id} error={err}"
            ),
        }
    }

    fn record<T>(
        &mut self,
        op: WriteOp,
        target: Option<Uuid>,
        result: BoardResult<T>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log_failure(op, target, &err);
                if self.failures.len() == MAX_RECORDED_FAILURES {
                    self.failures.pop_front();
                }
                self.failures.push_back(WriteFailure {
                    op,
                    target,
                    message: err.to_string(),
                });
                None
            }
        }
    }
}

fn log_failure(op: WriteOp, target: Option<Uuid>, err: &BoardError) {
    let target = target.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    let status = if err.is_not_found() { "skip" } else { "error" };
    warn!(
        "event=canvas_write module=canvas status={status} op={} target={target} error={err}",
        op.as_str()
    );
}

#[cfg(test)]
mod tests {
    use super::{BoardSynchronizer, WriteOp, MAX_RECORDED_FAILURES};
    use crate::db::open_db_in_memory;
    use crate::model::board::{BoardCategory, BoardScope, NewNode, Position, Size};
    use crate::repo::board_repo::{BoardStore, SqliteBoardStore};
    use crate::service::board_service::{BoardService, Identity};
    use rusqlite::Connection;
    use uuid::Uuid;

    fn synchronizer(conn: &Connection) -> BoardSynchronizer<SqliteBoardStore<'_>> {
        let service = BoardService::new(SqliteBoardStore::try_new(conn).unwrap())
            .with_identity(Identity::new("user_1"));
        let board = service
            .create_board(
                &BoardScope::Owner("user_1".to_string()),
                BoardCategory::Personal,
                true,
            )
            .unwrap()
            .id;
        BoardSynchronizer::subscribe(service, board).unwrap()
    }

    #[test]
    fn poll_picks_up_foreign_writes() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        assert!(!sync.poll());

        let other = SqliteBoardStore::try_new(&conn).unwrap();
        other
            .create_node(sync.board_id(), &NewNode::new("note", Position::default()))
            .unwrap();
        assert!(sync.poll());
        assert_eq!(sync.model().nodes().len(), 1);
        assert!(!sync.poll());
    }

    #[test]
    fn selection_and_pinned_geometry_survive_rebuild() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        let a = sync
            .create_node(NewNode::new("note", Position::new(0.0, 0.0)))
            .unwrap();
        let b = sync
            .create_node(NewNode::new("stat", Position::new(400.0, 0.0)))
            .unwrap();

        sync.model_mut().select(Some(a));
        sync.pin(Some(b));
        sync.model_mut().node_mut(b).unwrap().position = Position::new(433.0, 17.0);

        assert!(sync.refresh());
        assert_eq!(sync.model().selected(), Some(a));
        assert_eq!(
            sync.model().node(b).unwrap().position,
            Position::new(433.0, 17.0)
        );

        sync.pin(None);
        sync.refresh();
        assert_eq!(
            sync.model().node(b).unwrap().position,
            Position::new(400.0, 0.0)
        );
    }

    #[test]
    fn failed_writes_are_recorded_not_returned() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        let node = sync
            .create_node(NewNode::new("note", Position::default()))
            .unwrap();
        sync.delete_node(node);
        sync.resize_node(node, Size::new(100.0, 100.0));
        assert!(sync.create_node(NewNode::new("spreadsheet", Position::default())).is_none());

        let ops: Vec<_> = sync.write_failures().iter().map(|failure| failure.op).collect();
        assert_eq!(ops, vec![WriteOp::ResizeNode, WriteOp::CreateNode]);
        assert_eq!(sync.take_write_failures().len(), 2);
        assert!(sync.write_failures().is_empty());
    }

    #[test]
    fn recorded_failures_keep_only_the_latest() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        sync.service_mut().set_identity(None);
        let missing: Vec<_> = (0..MAX_RECORDED_FAILURES + 5).map(|_| Uuid::new_v4()).collect();
        for node_id in &missing {
            sync.move_node(*node_id, Position::default());
        }

        let failures = sync.write_failures();
        assert_eq!(failures.len(), MAX_RECORDED_FAILURES);
        assert_eq!(failures[0].target, Some(missing[5]));
        assert_eq!(failures.back().unwrap().target, missing.last().copied());
    }

    #[test]
    fn held_local_size_survives_rebuild() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        let node = sync
            .create_node(
                NewNode::new("note", Position::default()).with_size(Size::new(200.0, 100.0)),
            )
            .unwrap();
        sync.model_mut().node_mut(node).unwrap().measured_size = Some(Size::new(312.0, 205.0));

        sync.hold_local_sizes([node]);
        assert!(sync.refresh());
        let held = sync.model().node(node).unwrap();
        assert_eq!(held.measured_size, Some(Size::new(312.0, 205.0)));
        assert_eq!(held.size, Some(Size::new(200.0, 100.0)));

        sync.hold_local_sizes(Vec::<Uuid>::new());
        sync.refresh();
        assert_eq!(
            sync.model().node(node).unwrap().measured_size,
            Some(Size::new(200.0, 100.0))
        );
    }

    #[test]
    fn unauthenticated_writes_leave_storage_untouched() {
        let conn = open_db_in_memory().unwrap();
        let mut sync = synchronizer(&conn);
        sync.service_mut().set_identity(None);
        assert!(sync.create_node(NewNode::new("note", Position::default())).is_none());
        sync.refresh();
        assert!(sync.model().nodes().is_empty());
        assert_eq!(sync.write_failures().len(), 1);
    }
}
