//! Node type registry.
//!
//! # Responsibility
//! - Map node type tags to a renderer, a default size and category membership.
//! - Serve the ordered creation catalog for a board category.
//!
//! # Invariants
//! - The registry is immutable after construction and validated up front:
//!   tags are well-formed and unique, every `NodeKind` is registered, default
//!   sizes are grid-aligned.
//! - Resolving an unknown tag never fails; it yields a no-op renderer.

mod catalog;
pub mod renderers;

use crate::canvas::grid::is_grid_aligned;
use crate::model::atom::AtomType;
use crate::model::board::{BoardCategory, BoardId, Size};
use once_cell::sync::Lazy;
use regex::Regex;
use renderers::{NodeRenderer, NoopRenderer};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use catalog::builtin_definitions;

/// Size used when neither the node nor its type supplies one.
pub const FALLBACK_NODE_SIZE: Size = Size::new(280.0, 180.0);

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("valid tag regex"));

static BUILTIN: Lazy<NodeTypeRegistry> = Lazy::new(|| {
    NodeTypeRegistry::new(builtin_definitions()).expect("builtin node catalog is valid")
});

/// Returns the process-wide builtin registry.
pub fn builtin_registry() -> &'static NodeTypeRegistry {
    &BUILTIN
}

/// Closed set of node widget kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Task,
    Note,
    StickyNote,
    Checklist,
    TaskList,
    ProjectCard,
    ProjectList,
    Kanban,
    Sprint,
    Milestone,
    Calendar,
    Agenda,
    DailyPlanner,
    Routine,
    HabitTracker,
    Pomodoro,
    Chart,
    Stat,
    Progress,
    Goal,
    Shortcut,
    Link,
    Image,
    Quote,
    Clock,
}

impl NodeKind {
    pub const ALL: [NodeKind; 25] = [
        Self::Task,
        Self::Note,
        Self::StickyNote,
        Self::Checklist,
        Self::TaskList,
        Self::ProjectCard,
        Self::ProjectList,
        Self::Kanban,
        Self::Sprint,
        Self::Milestone,
        Self::Calendar,
        Self::Agenda,
        Self::DailyPlanner,
        Self::Routine,
        Self::HabitTracker,
        Self::Pomodoro,
        Self::Chart,
        Self::Stat,
        Self::Progress,
        Self::Goal,
        Self::Shortcut,
        Self::Link,
        Self::Image,
        Self::Quote,
        Self::Clock,
    ];

    /// Stable type tag stored on nodes.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
            Self::StickyNote => "sticky-note",
            Self::Checklist => "checklist",
            Self::TaskList => "task-list",
            Self::ProjectCard => "project-card",
            Self::ProjectList => "project-list",
            Self::Kanban => "kanban",
            Self::Sprint => "sprint",
            Self::Milestone => "milestone",
            Self::Calendar => "calendar",
            Self::Agenda => "agenda",
            Self::DailyPlanner => "daily-planner",
            Self::Routine => "routine",
            Self::HabitTracker => "habit-tracker",
            Self::Pomodoro => "pomodoro",
            Self::Chart => "chart",
            Self::Stat => "stat",
            Self::Progress => "progress",
            Self::Goal => "goal",
            Self::Shortcut => "shortcut",
            Self::Link => "link",
            Self::Image => "image",
            Self::Quote => "quote",
            Self::Clock => "clock",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// Ambient ids injected into the initial property bag of a new node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationContext {
    pub board_id: BoardId,
    pub category: BoardCategory,
    pub owner_id: Option<String>,
    pub workspace_id: Option<Uuid>,
}

/// One creatable node type.
pub struct NodeTypeDefinition {
    pub kind: NodeKind,
    pub label: &'static str,
    pub description: &'static str,
    pub default_size: Size,
    /// Categories whose creation menu offers this type.
    pub categories: &'static [BoardCategory],
    /// Content item created alongside the node, if any.
    pub linked_item: Option<AtomType>,
    pub renderer: Box<dyn NodeRenderer>,
}

impl NodeTypeDefinition {
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// Builds the initial property bag for a new node of this type.
    pub fn build_props(&self, ctx: &CreationContext) -> serde_json::Value {
        catalog::build_props(self.kind, ctx)
    }
}

impl std::fmt::Debug for NodeTypeDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTypeDefinition")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("default_size", &self.default_size)
            .finish_non_exhaustive()
    }
}

/// Result of resolving a type tag.
pub struct ResolvedType<'a> {
    /// `None` for unknown tags.
    pub kind: Option<NodeKind>,
    pub renderer: &'a dyn NodeRenderer,
    pub default_size: Size,
    pub categories: &'a [BoardCategory],
}

/// Registry construction failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidTag(&'static str),
    DuplicateTag(&'static str),
    MissingKind(NodeKind),
    MisalignedDefaultSize(&'static str),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTag(tag) => write!(f, "node type tag is invalid: `{tag}`"),
            Self::DuplicateTag(tag) => write!(f, "node type tag registered twice: `{tag}`"),
            Self::MissingKind(kind) => write!(f, "node kind has no definition: {kind:?}"),
            Self::MisalignedDefaultSize(tag) => {
                write!(f, "default size of `{tag}` is not grid-aligned")
            }
        }
    }
}

impl Error for RegistryError {}

/// Immutable tag → definition catalog.
pub struct NodeTypeRegistry {
    definitions: Vec<NodeTypeDefinition>,
    by_tag: BTreeMap<&'static str, usize>,
    fallback: NoopRenderer,
}

impl NodeTypeRegistry {
    /// Validates and indexes `definitions`, keeping their order.
    pub fn new(definitions: Vec<NodeTypeDefinition>) -> Result<Self, RegistryError> {
        let mut by_tag = BTreeMap::new();
        for (index, definition) in definitions.iter().enumerate() {
            let tag = definition.tag();
            if !TAG_RE.is_match(tag) {
                return Err(RegistryError::InvalidTag(tag));
            }
            if by_tag.insert(tag, index).is_some() {
                return Err(RegistryError::DuplicateTag(tag));
            }
            let size = definition.default_size;
            if !is_grid_aligned(size.width) || !is_grid_aligned(size.height) {
                return Err(RegistryError::MisalignedDefaultSize(tag));
            }
        }
        if let Some(missing) = NodeKind::ALL
            .into_iter()
            .find(|kind| !by_tag.contains_key(kind.tag()))
        {
            return Err(RegistryError::MissingKind(missing));
        }

        Ok(Self {
            definitions,
            by_tag,
            fallback: NoopRenderer,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn definition(&self, tag: &str) -> Option<&NodeTypeDefinition> {
        self.by_tag.get(tag).map(|index| &self.definitions[*index])
    }

    /// Resolves a tag; unknown tags get the no-op renderer.
    pub fn resolve(&self, tag: &str) -> ResolvedType<'_> {
        match self.definition(tag) {
            Some(definition) => ResolvedType {
                kind: Some(definition.kind),
                renderer: definition.renderer.as_ref(),
                default_size: definition.default_size,
                categories: definition.categories,
            },
            None => ResolvedType {
                kind: None,
                renderer: &self.fallback,
                default_size: FALLBACK_NODE_SIZE,
                categories: &[],
            },
        }
    }

    /// Creatable definitions offered on a board of `category`, catalog order.
    pub fn templates_for(&self, category: BoardCategory) -> Vec<&NodeTypeDefinition> {
        self.definitions
            .iter()
            .filter(|definition| definition.categories.contains(&category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        builtin_definitions, builtin_registry, CreationContext, NodeKind, NodeTypeRegistry,
        RegistryError, FALLBACK_NODE_SIZE,
    };
    use crate::model::board::{BoardCategory, Size};
    use uuid::Uuid;

    #[test]
    fn builtin_registry_covers_every_kind() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), NodeKind::ALL.len());
        for kind in NodeKind::ALL {
            assert_eq!(registry.resolve(kind.tag()).kind, Some(kind));
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_resolves_to_fallback() {
        let resolved = builtin_registry().resolve("spreadsheet");
        assert_eq!(resolved.kind, None);
        assert_eq!(resolved.default_size, FALLBACK_NODE_SIZE);
        assert!(resolved.categories.is_empty());
    }

    #[test]
    fn rejects_duplicate_tags() {
        let mut definitions = builtin_definitions();
        let mut duplicate = builtin_definitions();
        definitions.push(duplicate.remove(0));
        let err = NodeTypeRegistry::new(definitions).err();
        assert_eq!(err, Some(RegistryError::DuplicateTag("task")));
    }

    #[test]
    fn rejects_missing_kind() {
        let mut definitions = builtin_definitions();
        definitions.retain(|definition| definition.kind != NodeKind::Clock);
        let err = NodeTypeRegistry::new(definitions).err();
        assert_eq!(err, Some(RegistryError::MissingKind(NodeKind::Clock)));
    }

    #[test]
    fn rejects_misaligned_default_size() {
        let mut definitions = builtin_definitions();
        definitions[0].default_size = Size::new(250.0, 160.0);
        let err = NodeTypeRegistry::new(definitions).err();
        assert_eq!(err, Some(RegistryError::MisalignedDefaultSize("task")));
    }

    #[test]
    fn templates_for_category_keep_catalog_order() {
        let tags: Vec<_> = builtin_registry()
            .templates_for(BoardCategory::Analytics)
            .into_iter()
            .map(|definition| definition.tag())
            .collect();
        assert_eq!(tags, vec!["chart", "stat", "progress", "goal"]);
        assert!(builtin_registry()
            .templates_for(BoardCategory::Projects)
            .iter()
            .any(|definition| definition.kind == NodeKind::ProjectCard));
    }

    #[test]
    fn build_props_injects_scope_ids() {
        let ctx = CreationContext {
            board_id: Uuid::new_v4(),
            category: BoardCategory::Team,
            owner_id: Some("user_7".to_string()),
            workspace_id: Some(Uuid::new_v4()),
        };
        let definition = builtin_registry().definition("kanban").unwrap();
        let props = definition.build_props(&ctx);
        assert_eq!(props["owner_id"], "user_7");
        assert_eq!(
            props["workspace_id"],
            ctx.workspace_id.unwrap().to_string().as_str()
        );
        assert!(props["columns"].is_array());
    }
}
