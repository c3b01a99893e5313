//! Pre-authored board templates, one per category.

use crate::model::atom::AtomType;
use crate::model::board::{BoardCategory, EdgeStyle, Position, Size};
use crate::registry::NodeKind;
use serde_json::{json, Value};

/// One pre-authored node.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub kind: NodeKind,
    pub position: Position,
    /// `None` uses the type's default size.
    pub size: Option<Size>,
    /// Merged over the type's initial props.
    pub props: Value,
    /// Content item created and owned by the node.
    pub item: Option<(AtomType, &'static str)>,
}

/// Connector between two template nodes, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEdge {
    pub source: usize,
    pub target: usize,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardTemplate {
    pub nodes: Vec<TemplateNode>,
    pub edges: Vec<TemplateEdge>,
}

fn node(kind: NodeKind, x: f64, y: f64) -> TemplateNode {
    TemplateNode {
        kind,
        position: Position::new(x, y),
        size: None,
        props: json!({}),
        item: None,
    }
}

impl TemplateNode {
    fn sized(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    fn props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    fn item(mut self, kind: AtomType, content: &'static str) -> Self {
        self.item = Some((kind, content));
        self
    }
}

fn edge(source: usize, target: usize, style: EdgeStyle) -> TemplateEdge {
    TemplateEdge {
        source,
        target,
        style,
    }
}

/// Template for `category`; `projects` boards start empty.
pub fn template_for(category: BoardCategory) -> BoardTemplate {
    match category {
        BoardCategory::Personal => BoardTemplate {
            nodes: vec![
                node(NodeKind::Note, 40.0, 40.0)
                    .props(json!({ "title": "Welcome" }))
                    .item(AtomType::Note, "Drag cards around, double-click to add more."),
                node(NodeKind::TaskList, 380.0, 40.0),
                node(NodeKind::Calendar, 740.0, 40.0),
                node(NodeKind::Goal, 40.0, 280.0).props(json!({ "target": "Weekly review" })),
                node(NodeKind::Quote, 380.0, 440.0),
            ],
            edges: Vec::new(),
        },
        BoardCategory::Team => BoardTemplate {
            nodes: vec![
                node(NodeKind::Kanban, 40.0, 40.0),
                node(NodeKind::Sprint, 720.0, 40.0),
                node(NodeKind::ProjectList, 720.0, 280.0),
                node(NodeKind::StickyNote, 40.0, 480.0)
                    .props(json!({ "title": "Team norms" }))
                    .item(AtomType::Note, "Standup at 10:00."),
            ],
            edges: Vec::new(),
        },
        BoardCategory::Project => BoardTemplate {
            nodes: vec![
                node(NodeKind::Milestone, 40.0, 40.0).props(json!({ "title": "Kickoff" })),
                node(NodeKind::Task, 340.0, 40.0)
                    .props(json!({ "title": "Define scope" }))
                    .item(AtomType::Task, "Define scope"),
                node(NodeKind::Milestone, 680.0, 40.0).props(json!({ "title": "Launch" })),
                node(NodeKind::Kanban, 40.0, 260.0).sized(640.0, 360.0),
                node(NodeKind::Progress, 720.0, 260.0),
            ],
            edges: vec![
                edge(0, 1, EdgeStyle::Flow),
                edge(1, 2, EdgeStyle::Dependency),
            ],
        },
        BoardCategory::Daily => BoardTemplate {
            nodes: vec![
                node(NodeKind::DailyPlanner, 40.0, 40.0),
                node(NodeKind::Routine, 400.0, 40.0).props(json!({
                    "title": "Morning",
                    "items": [{ "text": "Stretch" }, { "text": "Plan the day" }]
                })),
                node(NodeKind::Pomodoro, 700.0, 40.0),
                node(NodeKind::Agenda, 400.0, 360.0),
            ],
            edges: Vec::new(),
        },
        BoardCategory::Calendar => BoardTemplate {
            nodes: vec![
                node(NodeKind::Calendar, 40.0, 40.0).sized(560.0, 440.0),
                node(NodeKind::Agenda, 640.0, 40.0),
                node(NodeKind::Clock, 640.0, 440.0),
            ],
            edges: Vec::new(),
        },
        BoardCategory::Analytics => BoardTemplate {
            nodes: vec![
                node(NodeKind::Stat, 40.0, 40.0).props(json!({ "metric": "tasks_done" })),
                node(NodeKind::Stat, 280.0, 40.0).props(json!({ "metric": "focus_minutes" })),
                node(NodeKind::Chart, 40.0, 200.0),
                node(NodeKind::Progress, 480.0, 200.0),
            ],
            edges: Vec::new(),
        },
        BoardCategory::Projects => BoardTemplate::default(),
    }
}
