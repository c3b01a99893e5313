//! Board, node and edge records.
//!
//! # Responsibility
//! - Define the persisted shape of one board canvas and its contents.
//! - Provide the geometry primitives shared by layout and interaction code.
//!
//! # Invariants
//! - A node's `board_id` references an existing board.
//! - An edge's endpoints are distinct nodes on the edge's own board.
//! - Committed positions and sizes are multiples of the grid unit.

use crate::model::atom::AtomId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BoardId = Uuid;
pub type NodeId = Uuid;
pub type EdgeId = Uuid;

/// Point in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in board units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pan/zoom transform of a board view.
///
/// `screen = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Position,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Position::default(),
        }
    }
}

/// Owner of a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BoardScope {
    /// Shared team workspace.
    Workspace(Uuid),
    /// Individual user.
    Owner(String),
}

impl BoardScope {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Workspace(_) => "workspace",
            Self::Owner(_) => "owner",
        }
    }

    pub fn id_string(&self) -> String {
        match self {
            Self::Workspace(id) => id.to_string(),
            Self::Owner(id) => id.clone(),
        }
    }
}

/// Board purpose tag. Controls offered node types and the default template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardCategory {
    Personal,
    Team,
    Project,
    Daily,
    Calendar,
    Analytics,
    /// Collection board holding one card per project.
    Projects,
}

impl BoardCategory {
    pub const ALL: [BoardCategory; 7] = [
        Self::Personal,
        Self::Team,
        Self::Project,
        Self::Daily,
        Self::Calendar,
        Self::Analytics,
        Self::Projects,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Team => "team",
            Self::Project => "project",
            Self::Daily => "daily",
            Self::Calendar => "calendar",
            Self::Analytics => "analytics",
            Self::Projects => "projects",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

/// Persisted board record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub scope: BoardScope,
    pub category: BoardCategory,
    pub is_default: bool,
    /// Set once the category template has been fully expanded.
    pub template_applied: bool,
    pub viewport: Viewport,
    /// Bumped by every node/edge write on this board.
    pub revision: i64,
}

/// Reference from a node to the content item it displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedItemRef {
    pub item_id: AtomId,
    /// `true` when the node created the item and deleting the node deletes it.
    pub owned: bool,
}

impl LinkedItemRef {
    pub fn owned(item_id: AtomId) -> Self {
        Self {
            item_id,
            owned: true,
        }
    }

    pub fn borrowed(item_id: AtomId) -> Self {
        Self {
            item_id,
            owned: false,
        }
    }
}

/// Persisted node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardNode {
    pub id: NodeId,
    pub board_id: BoardId,
    /// Registry type tag.
    pub node_type: String,
    pub position: Position,
    /// `None` means intrinsic size.
    pub size: Option<Size>,
    pub z_index: i64,
    pub linked_item: Option<LinkedItemRef>,
    pub props: serde_json::Value,
}

/// Connector render style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Default,
    Dependency,
    Flow,
}

impl EdgeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dependency => "dependency",
            Self::Flow => "flow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "dependency" => Some(Self::Dependency),
            "flow" => Some(Self::Flow),
            _ => None,
        }
    }
}

/// Persisted edge record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEdge {
    pub id: EdgeId,
    pub board_id: BoardId,
    pub source: NodeId,
    pub target: NodeId,
    pub style: EdgeStyle,
    pub relationship_id: Option<Uuid>,
}

/// Node creation request, shared by interactive creation and templates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub node_type: String,
    pub position: Position,
    pub size: Option<Size>,
    pub linked_item: Option<LinkedItemRef>,
    pub props: serde_json::Value,
}

impl NewNode {
    pub fn new(node_type: impl Into<String>, position: Position) -> Self {
        Self {
            node_type: node_type.into(),
            position,
            size: None,
            linked_item: None,
            props: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_linked_item(mut self, linked_item: LinkedItemRef) -> Self {
        self.linked_item = Some(linked_item);
        self
    }

    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }
}

/// One board with its nodes and edges, as emitted by the live query.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub board: Board,
    /// Ordered by `z_index ASC, created_at ASC, node_uuid ASC`.
    pub nodes: Vec<BoardNode>,
    pub edges: Vec<BoardEdge>,
}

#[cfg(test)]
mod tests {
    use super::{BoardCategory, BoardScope};
    use uuid::Uuid;

    #[test]
    fn category_parse_rejects_unknown_tags() {
        assert_eq!(BoardCategory::parse("daily"), Some(BoardCategory::Daily));
        assert_eq!(BoardCategory::parse("Daily"), None);
        assert_eq!(BoardCategory::parse(""), None);
    }

    #[test]
    fn scope_exposes_storage_key_parts() {
        let workspace = Uuid::new_v4();
        let scope = BoardScope::Workspace(workspace);
        assert_eq!(scope.kind_str(), "workspace");
        assert_eq!(scope.id_string(), workspace.to_string());

        let owner = BoardScope::Owner("user_42".to_string());
        assert_eq!(owner.kind_str(), "owner");
        assert_eq!(owner.id_string(), "user_42");
    }
}
