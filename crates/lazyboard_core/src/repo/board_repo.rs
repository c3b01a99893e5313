//! Board storage collaborator contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist boards, nodes and edges, and serve the per-board snapshot the
//!   canvas live query rebuilds from.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Node listing is deterministic: `z_index ASC, rowid ASC`.
//! - Every node/edge write bumps `boards.revision` (schema triggers).
//! - Each method touches only the record it names. Cascades (linked item,
//!   incident edges) are the caller's responsibility.
//! - `create_board` and `create_node_if_absent` are idempotent and run their
//!   existence check and insert inside one immediate transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::atom::{Atom, AtomId};
use crate::model::board::{
    Board, BoardCategory, BoardEdge, BoardId, BoardNode, BoardScope, BoardSnapshot, EdgeId,
    EdgeStyle, LinkedItemRef, NewNode, NodeId, Position, Size, Viewport,
};
use crate::repo::atom_repo::{AtomRepository, RepoError, SqliteAtomRepository};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BOARD_SELECT_SQL: &str = "SELECT
    board_uuid,
    scope_kind,
    scope_id,
    category,
    is_default,
    template_applied,
    zoom,
    pan_x,
    pan_y,
    revision
FROM boards";

const NODE_SELECT_SQL: &str = "SELECT
    node_uuid,
    board_uuid,
    node_type,
    pos_x,
    pos_y,
    width,
    height,
    z_index,
    linked_item_uuid,
    owns_linked_item,
    props_json
FROM board_nodes";

const EDGE_SELECT_SQL: &str = "SELECT
    edge_uuid,
    board_uuid,
    source_uuid,
    target_uuid,
    style,
    relationship_uuid
FROM board_edges";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from board storage operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    BoardNotFound(BoardId),
    NodeNotFound(NodeId),
    EdgeNotFound(EdgeId),
    /// Linked content item missing or already deleted.
    ItemNotFound(AtomId),
    /// Linked content item write rejected by the atom repository.
    Item(RepoError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data or request cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::BoardNotFound(id) => write!(f, "board not found: {id}"),
            Self::NodeNotFound(id) => write!(f, "board node not found: {id}"),
            Self::EdgeNotFound(id) => write!(f, "board edge not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "linked item not found: {id}"),
            Self::Item(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Item(err) => Some(err),
            _ => None,
        }
    }
}

impl StoreError {
    /// Whether the error means the target record is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound(_)
                | Self::NodeNotFound(_)
                | Self::EdgeNotFound(_)
                | Self::ItemNotFound(_)
        )
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            other => Self::Item(other),
        }
    }
}

/// Outcome of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upsert<T> {
    pub id: T,
    /// `false` when an existing record was returned.
    pub created: bool,
}

/// Storage collaborator used by board services and the canvas.
pub trait BoardStore {
    /// Loads one board with its nodes and edges.
    fn get_board(&self, board_id: BoardId) -> StoreResult<Option<BoardSnapshot>>;
    /// Returns the board's change counter, `None` if the board is gone.
    fn board_revision(&self, board_id: BoardId) -> StoreResult<Option<i64>>;
    fn find_board(&self, scope: &BoardScope, category: BoardCategory)
        -> StoreResult<Option<Board>>;
    fn list_boards(&self, scope: &BoardScope) -> StoreResult<Vec<Board>>;
    /// Creates the (scope, category) board, or returns the existing one.
    ///
    /// `is_default` is dropped when the scope already has a default board.
    fn create_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
        is_default: bool,
    ) -> StoreResult<Upsert<BoardId>>;
    /// Records that the board's template expansion completed.
    fn mark_template_applied(&self, board_id: BoardId) -> StoreResult<()>;
    fn get_node(&self, node_id: NodeId) -> StoreResult<Option<BoardNode>>;
    fn create_node(&self, board_id: BoardId, node: &NewNode) -> StoreResult<NodeId>;
    /// Creates a node unless the board already has one for the same linked item.
    fn create_node_if_absent(
        &self,
        board_id: BoardId,
        node: &NewNode,
    ) -> StoreResult<Upsert<NodeId>>;
    fn update_node_position(&self, node_id: NodeId, position: Position) -> StoreResult<()>;
    fn update_node_size(&self, node_id: NodeId, size: Size) -> StoreResult<()>;
    fn delete_node(&self, node_id: NodeId) -> StoreResult<()>;
    /// Edges whose source or target is `node_id`.
    fn list_edges_for_node(&self, node_id: NodeId) -> StoreResult<Vec<BoardEdge>>;
    fn create_edge(
        &self,
        board_id: BoardId,
        source: NodeId,
        target: NodeId,
        style: EdgeStyle,
        relationship_id: Option<Uuid>,
    ) -> StoreResult<EdgeId>;
    fn delete_edge(&self, edge_id: EdgeId) -> StoreResult<()>;
    fn create_linked_item(&self, atom: &Atom) -> StoreResult<AtomId>;
    fn delete_linked_item(&self, item_id: AtomId) -> StoreResult<()>;
    /// Linked items among `ids` that are still live, in input order.
    fn active_linked_items(&self, ids: &[AtomId]) -> StoreResult<Vec<AtomId>>;
}

/// SQLite-backed board store.
pub struct SqliteBoardStore<'conn> {
    conn: &'conn Connection,
    atoms: SqliteAtomRepository<'conn>,
}

impl<'conn> SqliteBoardStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_board_connection_ready(conn)?;
        Ok(Self {
            conn,
            atoms: SqliteAtomRepository::try_new(conn)?,
        })
    }
}

impl BoardStore for SqliteBoardStore<'_> {
    fn get_board(&self, board_id: BoardId) -> StoreResult<Option<BoardSnapshot>> {
        let Some(board) = load_board(self.conn, board_id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(&format!(
            "{NODE_SELECT_SQL}
             WHERE board_uuid = ?1
             ORDER BY z_index ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(row)?);
        }

        let mut stmt = self.conn.prepare(&format!(
            "{EDGE_SELECT_SQL}
             WHERE board_uuid = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next()? {
            edges.push(parse_edge_row(row)?);
        }

        Ok(Some(BoardSnapshot {
            board,
            nodes,
            edges,
        }))
    }

    fn board_revision(&self, board_id: BoardId) -> StoreResult<Option<i64>> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM boards WHERE board_uuid = ?1;",
                [board_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision)
    }

    fn find_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
    ) -> StoreResult<Option<Board>> {
        find_board_by_scope(self.conn, scope, category)
    }

    fn list_boards(&self, scope: &BoardScope) -> StoreResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL}
             WHERE scope_kind = ?1
               AND scope_id = ?2
             ORDER BY is_default DESC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![scope.kind_str(), scope.id_string()])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn create_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
        is_default: bool,
    ) -> StoreResult<Upsert<BoardId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(existing) = find_board_by_scope(&tx, scope, category)? {
            tx.commit()?;
            return Ok(Upsert {
                id: existing.id,
                created: false,
            });
        }

        let default_taken: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM boards
                WHERE scope_kind = ?1
                  AND scope_id = ?2
                  AND is_default = 1
            );",
            params![scope.kind_str(), scope.id_string()],
            |row| row.get(0),
        )?;

        let board_id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO boards (
                board_uuid,
                scope_kind,
                scope_id,
                category,
                is_default
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                board_id.to_string(),
                scope.kind_str(),
                scope.id_string(),
                category.as_str(),
                i64::from(is_default && default_taken == 0),
            ],
        )?;
        tx.commit()?;

        Ok(Upsert {
            id: board_id,
            created: true,
        })
    }

    fn mark_template_applied(&self, board_id: BoardId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE boards SET template_applied = 1 WHERE board_uuid = ?1;",
            [board_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::BoardNotFound(board_id));
        }
        Ok(())
    }

    fn get_node(&self, node_id: NodeId) -> StoreResult<Option<BoardNode>> {
        load_node(self.conn, node_id)
    }

    fn create_node(&self, board_id: BoardId, node: &NewNode) -> StoreResult<NodeId> {
        insert_node(self.conn, board_id, node)
    }

    fn create_node_if_absent(
        &self,
        board_id: BoardId,
        node: &NewNode,
    ) -> StoreResult<Upsert<NodeId>> {
        let Some(linked_item) = node.linked_item else {
            return Err(StoreError::InvalidData(
                "idempotent node insert requires a linked item".to_string(),
            ));
        };

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT node_uuid
                 FROM board_nodes
                 WHERE board_uuid = ?1
                   AND node_type = ?2
                   AND linked_item_uuid = ?3
                 ORDER BY rowid ASC
                 LIMIT 1;",
                params![
                    board_id.to_string(),
                    node.node_type.as_str(),
                    linked_item.item_id.to_string(),
                ],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing) = existing {
            tx.commit()?;
            return Ok(Upsert {
                id: parse_uuid(&existing, "board_nodes.node_uuid")?,
                created: false,
            });
        }

        let node_id = insert_node(&tx, board_id, node)?;
        tx.commit()?;
        Ok(Upsert {
            id: node_id,
            created: true,
        })
    }

    fn update_node_position(&self, node_id: NodeId, position: Position) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE board_nodes
             SET pos_x = ?2,
                 pos_y = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE node_uuid = ?1;",
            params![node_id.to_string(), position.x, position.y],
        )?;
        if changed == 0 {
            return Err(StoreError::NodeNotFound(node_id));
        }
        Ok(())
    }

    fn update_node_size(&self, node_id: NodeId, size: Size) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE board_nodes
             SET width = ?2,
                 height = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE node_uuid = ?1;",
            params![node_id.to_string(), size.width, size.height],
        )?;
        if changed == 0 {
            return Err(StoreError::NodeNotFound(node_id));
        }
        Ok(())
    }

    fn delete_node(&self, node_id: NodeId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM board_nodes WHERE node_uuid = ?1;",
            [node_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NodeNotFound(node_id));
        }
        Ok(())
    }

    fn list_edges_for_node(&self, node_id: NodeId) -> StoreResult<Vec<BoardEdge>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EDGE_SELECT_SQL}
             WHERE source_uuid = ?1
                OR target_uuid = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([node_id.to_string()])?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next()? {
            edges.push(parse_edge_row(row)?);
        }
        Ok(edges)
    }

    fn create_edge(
        &self,
        board_id: BoardId,
        source: NodeId,
        target: NodeId,
        style: EdgeStyle,
        relationship_id: Option<Uuid>,
    ) -> StoreResult<EdgeId> {
        ensure_board_exists(self.conn, board_id)?;
        let edge_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO board_edges (
                edge_uuid,
                board_uuid,
                source_uuid,
                target_uuid,
                style,
                relationship_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                edge_id.to_string(),
                board_id.to_string(),
                source.to_string(),
                target.to_string(),
                style.as_str(),
                relationship_id.map(|value| value.to_string()),
            ],
        )?;
        Ok(edge_id)
    }

    fn delete_edge(&self, edge_id: EdgeId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM board_edges WHERE edge_uuid = ?1;",
            [edge_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::EdgeNotFound(edge_id));
        }
        Ok(())
    }

    fn create_linked_item(&self, atom: &Atom) -> StoreResult<AtomId> {
        Ok(self.atoms.create_atom(atom)?)
    }

    fn delete_linked_item(&self, item_id: AtomId) -> StoreResult<()> {
        Ok(self.atoms.soft_delete_atom(item_id)?)
    }

    fn active_linked_items(&self, ids: &[AtomId]) -> StoreResult<Vec<AtomId>> {
        Ok(self.atoms.filter_active(ids)?)
    }
}

fn insert_node(conn: &Connection, board_id: BoardId, node: &NewNode) -> StoreResult<NodeId> {
    ensure_board_exists(conn, board_id)?;
    let props_json = serde_json::to_string(&node.props)
        .map_err(|err| StoreError::InvalidData(format!("unserializable node props: {err}")))?;
    let z_index: i64 = conn.query_row(
        "SELECT COALESCE(MAX(z_index), -1) + 1
         FROM board_nodes
         WHERE board_uuid = ?1;",
        [board_id.to_string()],
        |row| row.get(0),
    )?;

    let node_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO board_nodes (
            node_uuid,
            board_uuid,
            node_type,
            pos_x,
            pos_y,
            width,
            height,
            z_index,
            linked_item_uuid,
            owns_linked_item,
            props_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
        params![
            node_id.to_string(),
            board_id.to_string(),
            node.node_type.as_str(),
            node.position.x,
            node.position.y,
            node.size.map(|size| size.width),
            node.size.map(|size| size.height),
            z_index,
            node.linked_item.map(|item| item.item_id.to_string()),
            i64::from(node.linked_item.is_some_and(|item| item.owned)),
            props_json,
        ],
    )?;
    Ok(node_id)
}

fn ensure_board_exists(conn: &Connection, board_id: BoardId) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM boards WHERE board_uuid = ?1);",
        [board_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(StoreError::BoardNotFound(board_id));
    }
    Ok(())
}

fn load_board(conn: &Connection, board_id: BoardId) -> StoreResult<Option<Board>> {
    let mut stmt = conn.prepare(&format!("{BOARD_SELECT_SQL} WHERE board_uuid = ?1;"))?;
    let mut rows = stmt.query([board_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_board_row(row)?));
    }
    Ok(None)
}

fn find_board_by_scope(
    conn: &Connection,
    scope: &BoardScope,
    category: BoardCategory,
) -> StoreResult<Option<Board>> {
    let mut stmt = conn.prepare(&format!(
        "{BOARD_SELECT_SQL}
         WHERE scope_kind = ?1
           AND scope_id = ?2
           AND category = ?3;"
    ))?;
    let mut rows = stmt.query(params![
        scope.kind_str(),
        scope.id_string(),
        category.as_str()
    ])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_board_row(row)?));
    }
    Ok(None)
}

fn load_node(conn: &Connection, node_id: NodeId) -> StoreResult<Option<BoardNode>> {
    let mut stmt = conn.prepare(&format!("{NODE_SELECT_SQL} WHERE node_uuid = ?1;"))?;
    let mut rows = stmt.query([node_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_node_row(row)?));
    }
    Ok(None)
}

fn parse_board_row(row: &Row<'_>) -> StoreResult<Board> {
    let id_text: String = row.get("board_uuid")?;
    let scope_kind: String = row.get("scope_kind")?;
    let scope_id: String = row.get("scope_id")?;
    let scope = match scope_kind.as_str() {
        "workspace" => BoardScope::Workspace(parse_uuid(&scope_id, "boards.scope_id")?),
        "owner" => BoardScope::Owner(scope_id),
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid scope kind `{other}` in boards.scope_kind"
            )));
        }
    };
    let category_text: String = row.get("category")?;
    let category = BoardCategory::parse(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in boards.category"
        ))
    })?;

    Ok(Board {
        id: parse_uuid(&id_text, "boards.board_uuid")?,
        scope,
        category,
        is_default: parse_flag(row.get("is_default")?, "boards.is_default")?,
        template_applied: parse_flag(row.get("template_applied")?, "boards.template_applied")?,
        viewport: Viewport {
            zoom: row.get("zoom")?,
            pan: Position::new(row.get("pan_x")?, row.get("pan_y")?),
        },
        revision: row.get("revision")?,
    })
}

fn parse_node_row(row: &Row<'_>) -> StoreResult<BoardNode> {
    let id_text: String = row.get("node_uuid")?;
    let board_text: String = row.get("board_uuid")?;

    let width: Option<f64> = row.get("width")?;
    let height: Option<f64> = row.get("height")?;
    let size = match (width, height) {
        (Some(width), Some(height)) => Some(Size::new(width, height)),
        (None, None) => None,
        _ => {
            return Err(StoreError::InvalidData(format!(
                "half-set size on node `{id_text}`"
            )));
        }
    };

    let owned = parse_flag(row.get("owns_linked_item")?, "board_nodes.owns_linked_item")?;
    let linked_item = row
        .get::<_, Option<String>>("linked_item_uuid")?
        .map(|value| parse_uuid(&value, "board_nodes.linked_item_uuid"))
        .transpose()?
        .map(|item_id| LinkedItemRef { item_id, owned });

    let props_text: String = row.get("props_json")?;
    let props = serde_json::from_str(&props_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid props_json on node `{id_text}`: {err}"))
    })?;

    Ok(BoardNode {
        id: parse_uuid(&id_text, "board_nodes.node_uuid")?,
        board_id: parse_uuid(&board_text, "board_nodes.board_uuid")?,
        node_type: row.get("node_type")?,
        position: Position::new(row.get("pos_x")?, row.get("pos_y")?),
        size,
        z_index: row.get("z_index")?,
        linked_item,
        props,
    })
}

fn parse_edge_row(row: &Row<'_>) -> StoreResult<BoardEdge> {
    let id_text: String = row.get("edge_uuid")?;
    let board_text: String = row.get("board_uuid")?;
    let source_text: String = row.get("source_uuid")?;
    let target_text: String = row.get("target_uuid")?;
    let style_text: String = row.get("style")?;
    let style = EdgeStyle::parse(&style_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid edge style `{style_text}` in board_edges.style"))
    })?;

    Ok(BoardEdge {
        id: parse_uuid(&id_text, "board_edges.edge_uuid")?,
        board_id: parse_uuid(&board_text, "board_edges.board_uuid")?,
        source: parse_uuid(&source_text, "board_edges.source_uuid")?,
        target: parse_uuid(&target_text, "board_edges.target_uuid")?,
        style,
        relationship_id: row
            .get::<_, Option<String>>("relationship_uuid")?
            .map(|value| parse_uuid(&value, "board_edges.relationship_uuid"))
            .transpose()?,
    })
}

fn parse_flag(value: i64, column: &'static str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_board_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["boards", "board_nodes", "board_edges", "atoms"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
