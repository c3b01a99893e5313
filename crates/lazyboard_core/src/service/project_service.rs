//! Project creation with its board card side effect.
//!
//! # Invariants
//! - A project has at most one `project-card` node on its scope's `projects`
//!   board. `add_project_card` is the only path that creates one, and its
//!   check-and-insert runs in one immediate transaction.

use crate::model::atom::{Atom, AtomId, AtomType};
use crate::model::board::{
    BoardCategory, BoardId, BoardScope, LinkedItemRef, NewNode, NodeId, Position,
};
use crate::registry::{builtin_registry, CreationContext, NodeKind, FALLBACK_NODE_SIZE};
use crate::repo::board_repo::{BoardStore, Upsert};
use crate::service::board_service::{BoardResult, BoardService};
use log::info;
use serde_json::{json, Value};

const CARD_COLUMNS: usize = 3;
const CARD_GAP: f64 = 40.0;
const CARD_ORIGIN: Position = Position::new(40.0, 40.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectCard {
    pub board_id: BoardId,
    pub node: Upsert<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedProject {
    pub project_id: AtomId,
    pub card: ProjectCard,
}

pub struct ProjectService<'svc, S: BoardStore> {
    boards: &'svc BoardService<S>,
}

impl<'svc, S: BoardStore> ProjectService<'svc, S> {
    pub fn new(boards: &'svc BoardService<S>) -> Self {
        Self { boards }
    }

    /// Creates a project item, then its card.
    pub fn create_project(&self, scope: &BoardScope, title: &str) -> BoardResult<CreatedProject> {
        let project = Atom::new(AtomType::Project, title);
        let project_id = self.boards.create_item(&project)?;
        let card = self.add_project_card(scope, project_id)?;
        Ok(CreatedProject { project_id, card })
    }

    /// Ensures the scope's `projects` board holds one card for `project_id`.
    pub fn add_project_card(
        &self,
        scope: &BoardScope,
        project_id: AtomId,
    ) -> BoardResult<ProjectCard> {
        let board = self
            .boards
            .create_board(scope, BoardCategory::Projects, false)?;
        let board_id = board.id;
        if board.created {
            // The projects template is empty; cards are the only content.
            self.boards.mark_template_applied(board_id)?;
        }
        let slot = self.boards.snapshot(board_id)?.nodes.len();
        let ctx = self
            .boards
            .creation_context(board_id, scope, BoardCategory::Projects);

        let node = self
            .boards
            .ensure_node(board_id, project_card_node(&ctx, project_id, card_slot(slot)))?;
        info!(
            "event=project_card module=service status=ok board_id={board_id} node_id={} created={}",
            node.id, node.created
        );
        Ok(ProjectCard { board_id, node })
    }
}

/// Card node referencing (not owning) `project_id`.
pub(crate) fn project_card_node(
    ctx: &CreationContext,
    project_id: AtomId,
    position: Position,
) -> NewNode {
    let tag = NodeKind::ProjectCard.tag();
    let (size, mut props) = match builtin_registry().definition(tag) {
        Some(definition) => (definition.default_size, definition.build_props(ctx)),
        None => (FALLBACK_NODE_SIZE, json!({})),
    };
    if let Value::Object(map) = &mut props {
        map.insert("project_id".to_string(), json!(project_id.to_string()));
    }
    NewNode::new(tag, position)
        .with_size(size)
        .with_linked_item(LinkedItemRef::borrowed(project_id))
        .with_props(props)
}

/// Grid slot for the `index`-th card.
pub(crate) fn card_slot(index: usize) -> Position {
    let size = builtin_registry()
        .resolve(NodeKind::ProjectCard.tag())
        .default_size;
    let column = (index % CARD_COLUMNS) as f64;
    let row = (index / CARD_COLUMNS) as f64;
    Position::new(
        CARD_ORIGIN.x + column * (size.width + CARD_GAP),
        CARD_ORIGIN.y + row * (size.height + CARD_GAP),
    )
}

#[cfg(test)]
mod tests {
    use super::{card_slot, ProjectService};
    use crate::db::open_db_in_memory;
    use crate::model::board::{BoardCategory, BoardScope, Position};
    use crate::repo::board_repo::{BoardStore, SqliteBoardStore};
    use crate::service::board_service::{BoardService, Identity};

    #[test]
    fn card_slots_wrap_after_three() {
        assert_eq!(card_slot(0), Position::new(40.0, 40.0));
        assert_eq!(card_slot(2), Position::new(720.0, 40.0));
        assert_eq!(card_slot(3), Position::new(40.0, 260.0));
    }

    #[test]
    fn repeated_card_request_is_a_noop() {
        let conn = open_db_in_memory().unwrap();
        let boards = BoardService::new(SqliteBoardStore::try_new(&conn).unwrap())
            .with_identity(Identity::new("user_1"));
        let projects = ProjectService::new(&boards);
        let scope = BoardScope::Owner("user_1".to_string());

        let created = projects.create_project(&scope, "Garden").unwrap();
        assert!(created.card.node.created);
        let again = projects
            .add_project_card(&scope, created.project_id)
            .unwrap();
        assert!(!again.node.created);
        assert_eq!(again.node.id, created.card.node.id);

        let board = boards
            .store()
            .find_board(&scope, BoardCategory::Projects)
            .unwrap()
            .unwrap();
        let snapshot = boards.snapshot(board.id).unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        let card = &snapshot.nodes[0];
        assert_eq!(card.node_type, "project-card");
        assert_eq!(card.linked_item.map(|link| link.item_id), Some(created.project_id));
        assert_eq!(card.linked_item.map(|link| link.owned), Some(false));
        assert_eq!(card.props["project_id"], created.project_id.to_string().as_str());
    }
}
