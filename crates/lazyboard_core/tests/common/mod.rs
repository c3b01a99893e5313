#![allow(dead_code)]

use lazyboard_core::model::atom::{Atom, AtomId};
use lazyboard_core::repo::board_repo::StoreResult;
use lazyboard_core::{
    Board, BoardCategory, BoardEdge, BoardId, BoardNode, BoardScope, BoardService,
    BoardSnapshot, BoardStore, EdgeId, EdgeStyle, Identity, NewNode, NodeId, Position, Size,
    SqliteBoardStore, StoreError, Upsert,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub const USER: &str = "user_1";

pub fn owner_scope() -> BoardScope {
    BoardScope::Owner(USER.to_string())
}

pub fn signed_in<S: BoardStore>(store: S) -> BoardService<S> {
    BoardService::new(store).with_identity(Identity::new(USER))
}

/// Wraps the SQLite store, counting calls and failing chosen operations.
pub struct RecordingStore<'conn> {
    inner: SqliteBoardStore<'conn>,
    calls: RefCell<BTreeMap<&'static str, usize>>,
    failing: RefCell<BTreeSet<&'static str>>,
    sizes: RefCell<Vec<(NodeId, Size)>>,
}

impl<'conn> RecordingStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteBoardStore::try_new(conn).unwrap(),
            calls: RefCell::new(BTreeMap::new()),
            failing: RefCell::new(BTreeSet::new()),
            sizes: RefCell::new(Vec::new()),
        }
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.borrow().get(op).copied().unwrap_or(0)
    }

    pub fn reset_counts(&self) {
        self.calls.borrow_mut().clear();
        self.sizes.borrow_mut().clear();
    }

    /// Sizes passed to `update_node_size`, in call order.
    pub fn size_writes(&self) -> Vec<(NodeId, Size)> {
        self.sizes.borrow().clone()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    fn hit(&self, op: &'static str) -> StoreResult<()> {
        *self.calls.borrow_mut().entry(op).or_insert(0) += 1;
        if self.failing.borrow().contains(op) {
            return Err(StoreError::InvalidData(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

impl BoardStore for RecordingStore<'_> {
    fn get_board(&self, board_id: BoardId) -> StoreResult<Option<BoardSnapshot>> {
        self.hit("get_board")?;
        self.inner.get_board(board_id)
    }

    fn board_revision(&self, board_id: BoardId) -> StoreResult<Option<i64>> {
        self.hit("board_revision")?;
        self.inner.board_revision(board_id)
    }

    fn find_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
    ) -> StoreResult<Option<Board>> {
        self.hit("find_board")?;
        self.inner.find_board(scope, category)
    }

    fn list_boards(&self, scope: &BoardScope) -> StoreResult<Vec<Board>> {
        self.hit("list_boards")?;
        self.inner.list_boards(scope)
    }

    fn create_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
        is_default: bool,
    ) -> StoreResult<Upsert<BoardId>> {
        self.hit("create_board")?;
        self.inner.create_board(scope, category, is_default)
    }

    fn mark_template_applied(&self, board_id: BoardId) -> StoreResult<()> {
        self.hit("mark_template_applied")?;
        self.inner.mark_template_applied(board_id)
    }

    fn get_node(&self, node_id: NodeId) -> StoreResult<Option<BoardNode>> {
        self.hit("get_node")?;
        self.inner.get_node(node_id)
    }

    fn create_node(&self, board_id: BoardId, node: &NewNode) -> StoreResult<NodeId> {
        self.hit("create_node")?;
        self.inner.create_node(board_id, node)
    }

    fn create_node_if_absent(
        &self,
        board_id: BoardId,
        node: &NewNode,
    ) -> StoreResult<Upsert<NodeId>> {
        self.hit("create_node_if_absent")?;
        self.inner.create_node_if_absent(board_id, node)
    }

    fn update_node_position(&self, node_id: NodeId, position: Position) -> StoreResult<()> {
        self.hit("update_node_position")?;
        self.inner.update_node_position(node_id, position)
    }

    fn update_node_size(&self, node_id: NodeId, size: Size) -> StoreResult<()> {
        self.hit("update_node_size")?;
        self.sizes.borrow_mut().push((node_id, size));
        self.inner.update_node_size(node_id, size)
    }

    fn delete_node(&self, node_id: NodeId) -> StoreResult<()> {
        self.hit("delete_node")?;
        self.inner.delete_node(node_id)
    }

    fn list_edges_for_node(&self, node_id: NodeId) -> StoreResult<Vec<BoardEdge>> {
        self.hit("list_edges_for_node")?;
        self.inner.list_edges_for_node(node_id)
    }

    fn create_edge(
        &self,
        board_id: BoardId,
        source: NodeId,
        target: NodeId,
        style: EdgeStyle,
        relationship_id: Option<Uuid>,
    ) -> StoreResult<EdgeId> {
        self.hit("create_edge")?;
        self.inner
            .create_edge(board_id, source, target, style, relationship_id)
    }

    fn delete_edge(&self, edge_id: EdgeId) -> StoreResult<()> {
        self.hit("delete_edge")?;
        self.inner.delete_edge(edge_id)
    }

    fn create_linked_item(&self, atom: &Atom) -> StoreResult<AtomId> {
        self.hit("create_linked_item")?;
        self.inner.create_linked_item(atom)
    }

    fn delete_linked_item(&self, item_id: AtomId) -> StoreResult<()> {
        self.hit("delete_linked_item")?;
        self.inner.delete_linked_item(item_id)
    }

    fn active_linked_items(&self, ids: &[AtomId]) -> StoreResult<Vec<AtomId>> {
        self.hit("active_linked_items")?;
        self.inner.active_linked_items(ids)
    }
}

/// Write operations counted by `RecordingStore`, excluding reads.
pub const WRITE_OPS: [&str; 11] = [
    "create_board",
    "mark_template_applied",
    "create_node",
    "create_node_if_absent",
    "update_node_position",
    "update_node_size",
    "delete_node",
    "create_edge",
    "delete_edge",
    "create_linked_item",
    "delete_linked_item",
];

pub fn total_writes(store: &RecordingStore<'_>) -> usize {
    WRITE_OPS.iter().map(|op| store.count(op)).sum()
}
