//! Builtin node type catalog.

use super::renderers::{CardRenderer, ChartRenderer, ChecklistRenderer, LinkedItemRenderer};
use super::{CreationContext, NodeKind, NodeTypeDefinition};
use crate::model::atom::AtomType;
use crate::model::board::{BoardCategory, Size};
use serde_json::{json, Map, Value};

use BoardCategory::{Analytics, Calendar, Daily, Personal, Project, Projects, Team};

fn card(heading: &'static str, fields: &'static [&'static str]) -> Box<CardRenderer> {
    Box::new(CardRenderer::new(heading, fields))
}

/// Returns the 25 builtin definitions in menu order.
pub fn builtin_definitions() -> Vec<NodeTypeDefinition> {
    vec![
        NodeTypeDefinition {
            kind: NodeKind::Task,
            label: "Task",
            description: "A single actionable task card.",
            default_size: Size::new(280.0, 160.0),
            categories: &[Personal, Team, Project, Daily],
            linked_item: Some(AtomType::Task),
            renderer: Box::new(LinkedItemRenderer::new("Task")),
        },
        NodeTypeDefinition {
            kind: NodeKind::Note,
            label: "Note",
            description: "Markdown note hosted on the board.",
            default_size: Size::new(300.0, 200.0),
            categories: &[Personal, Team, Project, Daily, Calendar],
            linked_item: Some(AtomType::Note),
            renderer: Box::new(LinkedItemRenderer::new("Note")),
        },
        NodeTypeDefinition {
            kind: NodeKind::StickyNote,
            label: "Sticky note",
            description: "Short colored reminder.",
            default_size: Size::new(200.0, 200.0),
            categories: &[Personal, Team],
            linked_item: Some(AtomType::Note),
            renderer: Box::new(LinkedItemRenderer::new("Sticky")),
        },
        NodeTypeDefinition {
            kind: NodeKind::Checklist,
            label: "Checklist",
            description: "Inline list of check items.",
            default_size: Size::new(260.0, 240.0),
            categories: &[Personal, Project, Daily],
            linked_item: None,
            renderer: Box::new(ChecklistRenderer::new("Checklist")),
        },
        NodeTypeDefinition {
            kind: NodeKind::TaskList,
            label: "Task list",
            description: "Filtered list of tasks.",
            default_size: Size::new(320.0, 360.0),
            categories: &[Personal, Team, Project],
            linked_item: None,
            renderer: card("Tasks", &["filter", "limit"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::ProjectCard,
            label: "Project card",
            description: "Summary card for one project.",
            default_size: Size::new(300.0, 180.0),
            categories: &[Team, Projects],
            linked_item: None,
            renderer: Box::new(LinkedItemRenderer::new("Project")),
        },
        NodeTypeDefinition {
            kind: NodeKind::ProjectList,
            label: "Project list",
            description: "All projects in this scope.",
            default_size: Size::new(320.0, 320.0),
            categories: &[Personal, Team],
            linked_item: None,
            renderer: card("Projects", &["sort"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Kanban,
            label: "Kanban",
            description: "Status columns for tasks.",
            default_size: Size::new(640.0, 400.0),
            categories: &[Team, Project],
            linked_item: None,
            renderer: card("Kanban", &["columns"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Sprint,
            label: "Sprint",
            description: "Current sprint window and scope.",
            default_size: Size::new(320.0, 200.0),
            categories: &[Team, Project],
            linked_item: None,
            renderer: card("Sprint", &["name", "length_days"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Milestone,
            label: "Milestone",
            description: "Dated project milestone.",
            default_size: Size::new(240.0, 140.0),
            categories: &[Project],
            linked_item: None,
            renderer: card("Milestone", &["due"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Calendar,
            label: "Calendar",
            description: "Month view of events.",
            default_size: Size::new(480.0, 400.0),
            categories: &[Personal, Team, Calendar],
            linked_item: None,
            renderer: card("Calendar", &["view"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Agenda,
            label: "Agenda",
            description: "Upcoming events as a list.",
            default_size: Size::new(300.0, 360.0),
            categories: &[Daily, Calendar],
            linked_item: None,
            renderer: card("Agenda", &["days"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::DailyPlanner,
            label: "Daily planner",
            description: "Hour-by-hour plan for today.",
            default_size: Size::new(320.0, 480.0),
            categories: &[Daily],
            linked_item: None,
            renderer: card("Today", &["start_hour", "end_hour"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Routine,
            label: "Routine",
            description: "Daily routine check-offs.",
            default_size: Size::new(260.0, 280.0),
            categories: &[Personal, Daily],
            linked_item: None,
            renderer: Box::new(ChecklistRenderer::new("Routine")),
        },
        NodeTypeDefinition {
            kind: NodeKind::HabitTracker,
            label: "Habit tracker",
            description: "Streaks for recurring habits.",
            default_size: Size::new(300.0, 220.0),
            categories: &[Personal, Daily],
            linked_item: None,
            renderer: card("Habits", &["habits"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Pomodoro,
            label: "Pomodoro",
            description: "Focus timer.",
            default_size: Size::new(220.0, 220.0),
            categories: &[Daily],
            linked_item: None,
            renderer: card("Focus", &["work_minutes", "break_minutes"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Chart,
            label: "Chart",
            description: "Bar chart of a metric series.",
            default_size: Size::new(400.0, 280.0),
            categories: &[Project, Analytics],
            linked_item: None,
            renderer: Box::new(ChartRenderer),
        },
        NodeTypeDefinition {
            kind: NodeKind::Stat,
            label: "Stat",
            description: "Single headline number.",
            default_size: Size::new(200.0, 120.0),
            categories: &[Analytics],
            linked_item: None,
            renderer: card("Stat", &["metric", "value"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Progress,
            label: "Progress",
            description: "Completion ratio bar.",
            default_size: Size::new(300.0, 120.0),
            categories: &[Project, Analytics],
            linked_item: None,
            renderer: card("Progress", &["done", "total"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Goal,
            label: "Goal",
            description: "Target with a deadline.",
            default_size: Size::new(280.0, 160.0),
            categories: &[Personal, Analytics],
            linked_item: None,
            renderer: card("Goal", &["target", "deadline"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Shortcut,
            label: "Shortcut",
            description: "Jump to another board or page.",
            default_size: Size::new(180.0, 100.0),
            categories: &[Personal, Team, Daily],
            linked_item: None,
            renderer: card("Shortcut", &["target"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Link,
            label: "Link",
            description: "External bookmark.",
            default_size: Size::new(260.0, 100.0),
            categories: &[Personal, Team, Project],
            linked_item: None,
            renderer: card("Link", &["url"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Image,
            label: "Image",
            description: "Pinned image.",
            default_size: Size::new(320.0, 240.0),
            categories: &[Personal, Team],
            linked_item: None,
            renderer: card("Image", &["src"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Quote,
            label: "Quote",
            description: "Motivational quote.",
            default_size: Size::new(300.0, 140.0),
            categories: &[Personal, Daily],
            linked_item: None,
            renderer: card("Quote", &["text", "author"]),
        },
        NodeTypeDefinition {
            kind: NodeKind::Clock,
            label: "Clock",
            description: "Current time in a timezone.",
            default_size: Size::new(200.0, 120.0),
            categories: &[Daily, Calendar],
            linked_item: None,
            renderer: card("Clock", &["timezone"]),
        },
    ]
}

/// Initial props for a fresh node of `kind`.
pub(super) fn build_props(kind: NodeKind, ctx: &CreationContext) -> Value {
    let mut props = Map::new();
    if let Some(owner_id) = &ctx.owner_id {
        props.insert("owner_id".to_string(), json!(owner_id));
    }
    if let Some(workspace_id) = ctx.workspace_id {
        props.insert("workspace_id".to_string(), json!(workspace_id.to_string()));
    }

    let defaults = match kind {
        NodeKind::Task => json!({ "title": "New task" }),
        NodeKind::Note => json!({ "title": "New note" }),
        NodeKind::StickyNote => json!({ "title": "", "color": "yellow" }),
        NodeKind::Checklist => json!({ "title": "Checklist", "items": [] }),
        NodeKind::TaskList => json!({ "filter": "open", "limit": 10 }),
        NodeKind::ProjectCard => json!({}),
        NodeKind::ProjectList => json!({ "sort": "updated" }),
        NodeKind::Kanban => json!({ "columns": ["todo", "in_progress", "done"] }),
        NodeKind::Sprint => json!({ "name": "Sprint 1", "length_days": 14 }),
        NodeKind::Milestone => json!({ "title": "Milestone", "due": null }),
        NodeKind::Calendar => json!({ "view": "month" }),
        NodeKind::Agenda => json!({ "days": 7 }),
        NodeKind::DailyPlanner => json!({ "start_hour": 8, "end_hour": 18 }),
        NodeKind::Routine => json!({ "title": "Routine", "items": [] }),
        NodeKind::HabitTracker => json!({ "habits": [] }),
        NodeKind::Pomodoro => json!({ "work_minutes": 25, "break_minutes": 5 }),
        NodeKind::Chart => json!({ "title": "Chart", "series": [] }),
        NodeKind::Stat => json!({ "metric": "tasks_done", "value": 0 }),
        NodeKind::Progress => json!({ "done": 0, "total": 0 }),
        NodeKind::Goal => json!({ "target": "", "deadline": null }),
        NodeKind::Shortcut => json!({ "target": null }),
        NodeKind::Link => json!({ "url": "" }),
        NodeKind::Image => json!({ "src": "" }),
        NodeKind::Quote => json!({ "text": "", "author": "" }),
        NodeKind::Clock => json!({ "timezone": "UTC" }),
    };
    if let Value::Object(defaults) = defaults {
        props.extend(defaults);
    }
    Value::Object(props)
}
