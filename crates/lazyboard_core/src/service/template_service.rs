//! Default board creation and board reset.
//!
//! # Responsibility
//! - Create a scope's category board once and expand its template.
//! - Reset a board: clear every node through the delete cascade, then expand
//!   the template again.
//!
//! # Invariants
//! - A board's template is applied at most once. The `template_applied` flag
//!   is set only after expansion finished, so an interrupted expansion is
//!   cleared and retried by the next `create_default_board` call.
//! - Template nodes go through the same creation path as interactive nodes.
//! - Resetting a `projects` board recreates one card per previously carded
//!   project that is still live.

use crate::model::atom::{Atom, AtomId};
use crate::model::board::{BoardCategory, BoardId, BoardNode, BoardScope, NewNode, NodeId};
use crate::registry::NodeKind;
use crate::repo::board_repo::BoardStore;
use crate::service::board_service::{BoardError, BoardResult, BoardService};
use crate::service::project_service::{card_slot, project_card_node};
use crate::service::templates::{template_for, BoardTemplate};
use log::{info, warn};
use serde_json::Value;

/// Counts from one template run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpandReport {
    pub nodes_created: usize,
    pub edges_created: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub nodes_removed: usize,
    pub expanded: ExpandReport,
}

/// Whether a new (scope, category) board becomes the scope's default.
pub fn is_default_category(scope: &BoardScope, category: BoardCategory) -> bool {
    matches!(
        (scope, category),
        (BoardScope::Owner(_), BoardCategory::Personal)
            | (BoardScope::Workspace(_), BoardCategory::Team)
    )
}

pub struct TemplateService<'svc, S: BoardStore> {
    boards: &'svc BoardService<S>,
}

impl<'svc, S: BoardStore> TemplateService<'svc, S> {
    pub fn new(boards: &'svc BoardService<S>) -> Self {
        Self { boards }
    }

    /// Returns the scope's board for `category`, creating and filling it once.
    pub fn create_default_board(
        &self,
        scope: &BoardScope,
        category: BoardCategory,
    ) -> BoardResult<BoardId> {
        let board = self
            .boards
            .create_board(scope, category, is_default_category(scope, category))?;
        let snapshot = self.boards.snapshot(board.id)?;
        if snapshot.board.template_applied {
            return Ok(board.id);
        }

        if !snapshot.nodes.is_empty() {
            warn!(
                "event=board_template module=service status=retry board_id={} leftover_nodes={}",
                board.id,
                snapshot.nodes.len()
            );
            self.clear(&snapshot.nodes)?;
        }
        self.expand(board.id, scope, category)?;
        self.boards.mark_template_applied(board.id)?;
        Ok(board.id)
    }

    /// Clears `board_id` and re-expands its category template.
    pub fn reset_board(&self, board_id: BoardId) -> BoardResult<ResetReport> {
        let snapshot = self.boards.snapshot(board_id)?;
        let scope = snapshot.board.scope.clone();
        let category = snapshot.board.category;

        let carded: Vec<AtomId> = snapshot
            .nodes
            .iter()
            .filter(|node| node.node_type == NodeKind::ProjectCard.tag())
            .filter_map(|node| node.linked_item.map(|link| link.item_id))
            .collect();
        let carded_projects = self.boards.store().active_linked_items(&carded)?;

        self.clear(&snapshot.nodes)?;

        let mut expanded = self.expand(board_id, &scope, category)?;
        self.boards.mark_template_applied(board_id)?;
        if category == BoardCategory::Projects {
            let ctx = self.boards.creation_context(board_id, &scope, category);
            for (index, project_id) in carded_projects.into_iter().enumerate() {
                let card = project_card_node(&ctx, project_id, card_slot(index));
                if self.boards.ensure_node(board_id, card)?.created {
                    expanded.nodes_created += 1;
                }
            }
        }

        info!(
            "event=board_reset module=service status=ok board_id={board_id} removed={} created={}",
            snapshot.nodes.len(),
            expanded.nodes_created
        );
        Ok(ResetReport {
            nodes_removed: snapshot.nodes.len(),
            expanded,
        })
    }

    /// Deletes `nodes` through the service cascade; already-gone nodes are skipped.
    fn clear(&self, nodes: &[BoardNode]) -> BoardResult<()> {
        for node in nodes {
            match self.boards.delete_node(node.id) {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn expand(
        &self,
        board_id: BoardId,
        scope: &BoardScope,
        category: BoardCategory,
    ) -> BoardResult<ExpandReport> {
        let BoardTemplate { nodes, edges } = template_for(category);
        let ctx = self.boards.creation_context(board_id, scope, category);
        let registry = self.boards.registry();

        let mut created: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for entry in nodes {
            let tag = entry.kind.tag();
            let definition = registry
                .definition(tag)
                .ok_or_else(|| BoardError::UnknownNodeType(tag.to_string()))?;

            let mut props = definition.build_props(&ctx);
            if let (Value::Object(base), Value::Object(overrides)) = (&mut props, entry.props) {
                base.extend(overrides);
            }
            let node = NewNode::new(tag, entry.position)
                .with_size(entry.size.unwrap_or(definition.default_size))
                .with_props(props);

            let node_id = match entry.item {
                Some((kind, content)) => {
                    self.boards
                        .create_item_node(board_id, node, &Atom::new(kind, content))?
                }
                None => self.boards.create_node(board_id, node)?,
            };
            created.push(node_id);
        }

        let mut edges_created = 0;
        for edge in edges {
            let (Some(source), Some(target)) = (created.get(edge.source), created.get(edge.target))
            else {
                continue;
            };
            self.boards
                .create_edge(board_id, *source, *target, edge.style, None)?;
            edges_created += 1;
        }

        Ok(ExpandReport {
            nodes_created: created.len(),
            edges_created,
        })
    }
}
