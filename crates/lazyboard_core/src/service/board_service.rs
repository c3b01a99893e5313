//! Board use-case service.
//!
//! # Responsibility
//! - Gate every board write on an authenticated identity.
//! - Snap geometry to the grid before it reaches storage.
//! - Own the node delete cascade (owned linked item, incident edges, node).
//!
//! # Invariants
//! - Without an identity no store write is issued.
//! - Node types must be registered; edges join two distinct nodes of the
//!   edge's own board.

use crate::canvas::grid::{snap_position, snap_size, GRID_UNIT};
use crate::model::atom::{Atom, AtomId};
use crate::model::board::{
    BoardCategory, BoardId, BoardScope, BoardSnapshot, EdgeId, EdgeStyle, LinkedItemRef, NewNode,
    NodeId, Position, Size,
};
use crate::registry::{builtin_registry, CreationContext, NodeTypeRegistry};
use crate::repo::board_repo::{BoardStore, StoreError, Upsert};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BoardResult<T> = Result<T, BoardError>;

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug)]
pub enum BoardError {
    /// Write attempted with no identity set.
    Unauthenticated,
    /// Node type tag missing from the registry.
    UnknownNodeType(String),
    /// Edge endpoints violate the same-board/distinct rule.
    InvalidEdge(&'static str),
    Store(StoreError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "board write requires an authenticated identity"),
            Self::UnknownNodeType(tag) => write!(f, "unknown node type: `{tag}`"),
            Self::InvalidEdge(reason) => write!(f, "invalid edge: {reason}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl BoardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_not_found())
    }
}

/// Downstream effects of one node delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub node_id: NodeId,
    pub edges_deleted: usize,
    pub item_deleted: Option<AtomId>,
}

/// Identity-checked board operations over a [`BoardStore`].
pub struct BoardService<S: BoardStore> {
    store: S,
    identity: Option<Identity>,
    registry: &'static NodeTypeRegistry,
    grid_unit: f64,
}

impl<S: BoardStore> BoardService<S> {
    /// Creates an unauthenticated service over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            identity: None,
            registry: builtin_registry(),
            grid_unit: GRID_UNIT,
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_grid_unit(mut self, grid_unit: f64) -> Self {
        self.grid_unit = grid_unit;
        self
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn registry(&self) -> &'static NodeTypeRegistry {
        self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn grid_unit(&self) -> f64 {
        self.grid_unit
    }

    /// Ambient ids for new nodes on `board_id`.
    pub fn creation_context(
        &self,
        board_id: BoardId,
        scope: &BoardScope,
        category: BoardCategory,
    ) -> CreationContext {
        let (owner_id, workspace_id) = match scope {
            BoardScope::Owner(owner) => (Some(owner.clone()), None),
            BoardScope::Workspace(id) => (
                self.identity.as_ref().map(|identity| identity.user_id.clone()),
                Some(*id),
            ),
        };
        CreationContext {
            board_id,
            category,
            owner_id,
            workspace_id,
        }
    }

    fn require_identity(&self) -> BoardResult<&Identity> {
        self.identity.as_ref().ok_or(BoardError::Unauthenticated)
    }

    pub fn snapshot(&self, board_id: BoardId) -> BoardResult<BoardSnapshot> {
        self.store
            .get_board(board_id)?
            .ok_or(BoardError::Store(StoreError::BoardNotFound(board_id)))
    }

    pub fn revision(&self, board_id: BoardId) -> BoardResult<i64> {
        self.store
            .board_revision(board_id)?
            .ok_or(BoardError::Store(StoreError::BoardNotFound(board_id)))
    }

    /// Idempotent per (scope, category).
    pub fn create_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
        is_default: bool,
    ) -> BoardResult<Upsert<BoardId>> {
        self.require_identity()?;
        let upsert = self.store.create_board(scope, category, is_default)?;
        info!(
            "event=board_create module=service status=ok board_id={} category={} created={}",
            upsert.id,
            category.as_str(),
            upsert.created
        );
        Ok(upsert)
    }

    pub fn mark_template_applied(&self, board_id: BoardId) -> BoardResult<()> {
        self.require_identity()?;
        Ok(self.store.mark_template_applied(board_id)?)
    }

    /// Creates a standalone content item (e.g. a project) not owned by a node.
    pub fn create_item(&self, item: &Atom) -> BoardResult<AtomId> {
        self.require_identity()?;
        Ok(self.store.create_linked_item(item)?)
    }

    pub fn create_node(&self, board_id: BoardId, node: NewNode) -> BoardResult<NodeId> {
        self.require_identity()?;
        let node = self.prepare_node(node)?;
        Ok(self.store.create_node(board_id, &node)?)
    }

    /// Creates a node unless one already exists for the same linked item.
    pub fn ensure_node(&self, board_id: BoardId, node: NewNode) -> BoardResult<Upsert<NodeId>> {
        self.require_identity()?;
        let node = self.prepare_node(node)?;
        Ok(self.store.create_node_if_absent(board_id, &node)?)
    }

    /// Creates `item`, then a node owning it.
    ///
    /// The item is soft-deleted again if the node insert fails.
    pub fn create_item_node(
        &self,
        board_id: BoardId,
        node: NewNode,
        item: &Atom,
    ) -> BoardResult<NodeId> {
        self.require_identity()?;
        let node = self.prepare_node(node)?;
        let item_id = self.store.create_linked_item(item)?;
        match self
            .store
            .create_node(board_id, &node.with_linked_item(LinkedItemRef::owned(item_id)))
        {
            Ok(node_id) => Ok(node_id),
            Err(err) => {
                if let Err(cleanup) = self.store.delete_linked_item(item_id) {
                    warn!(
                        "event=item_rollback module=service status=error item_id={item_id} error={cleanup}"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Persists a snapped position and returns it.
    pub fn move_node(&self, node_id: NodeId, position: Position) -> BoardResult<Position> {
        self.require_identity()?;
        let position = snap_position(position, self.grid_unit);
        self.store.update_node_position(node_id, position)?;
        Ok(position)
    }

    /// Persists a snapped size (one grid unit minimum) and returns it.
    pub fn resize_node(&self, node_id: NodeId, size: Size) -> BoardResult<Size> {
        self.require_identity()?;
        let size = snap_size(size, self.grid_unit);
        self.store.update_node_size(node_id, size)?;
        Ok(size)
    }

    /// Deletes every incident edge, the node, then its owned linked item.
    ///
    /// A failed item delete leaves an unreferenced item behind and is logged;
    /// the node delete still succeeds.
    pub fn delete_node(&self, node_id: NodeId) -> BoardResult<DeleteReport> {
        self.require_identity()?;
        let node = self
            .store
            .get_node(node_id)?
            .ok_or(BoardError::Store(StoreError::NodeNotFound(node_id)))?;

        let edges = self.store.list_edges_for_node(node_id)?;
        for edge in &edges {
            self.store.delete_edge(edge.id)?;
        }
        self.store.delete_node(node_id)?;

        let mut item_deleted = None;
        if let Some(linked) = node.linked_item.filter(|linked| linked.owned) {
            match self.store.delete_linked_item(linked.item_id) {
                Ok(()) => item_deleted = Some(linked.item_id),
                Err(StoreError::ItemNotFound(_)) => warn!(
                    "event=node_delete module=service status=skip node_id={node_id} reason=item_missing"
                ),
                Err(err) => warn!(
                    "event=node_delete module=service status=error node_id={node_id} item_id={} error={err}",
                    linked.item_id
                ),
            }
        }

        info!(
            "event=node_delete module=service status=ok node_id={node_id} edges={} item_deleted={}",
            edges.len(),
            item_deleted.is_some()
        );
        Ok(DeleteReport {
            node_id,
            edges_deleted: edges.len(),
            item_deleted,
        })
    }

    pub fn create_edge(
        &self,
        board_id: BoardId,
        source: NodeId,
        target: NodeId,
        style: EdgeStyle,
        relationship_id: Option<Uuid>,
    ) -> BoardResult<EdgeId> {
        self.require_identity()?;
        if source == target {
            return Err(BoardError::InvalidEdge("source and target are the same node"));
        }
        for endpoint in [source, target] {
            let node = self
                .store
                .get_node(endpoint)?
                .ok_or(BoardError::Store(StoreError::NodeNotFound(endpoint)))?;
            if node.board_id != board_id {
                return Err(BoardError::InvalidEdge("endpoint belongs to another board"));
            }
        }
        Ok(self
            .store
            .create_edge(board_id, source, target, style, relationship_id)?)
    }

    pub fn delete_edge(&self, edge_id: EdgeId) -> BoardResult<()> {
        self.require_identity()?;
        Ok(self.store.delete_edge(edge_id)?)
    }

    fn prepare_node(&self, mut node: NewNode) -> BoardResult<NewNode> {
        if !self.registry.contains(&node.node_type) {
            return Err(BoardError::UnknownNodeType(node.node_type));
        }
        node.position = snap_position(node.position, self.grid_unit);
        node.size = node.size.map(|size| snap_size(size, self.grid_unit));
        Ok(node)
    }
}
