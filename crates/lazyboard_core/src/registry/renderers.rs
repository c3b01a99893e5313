//! Widget renderers for node types.
//!
//! Renderers turn a render node into a small textual view. Hosts draw the view
//! however they like; unknown types render nothing.

use crate::canvas::RenderNode;
use crate::model::board::NodeId;
use serde_json::Value;

const CHART_BAR_WIDTH: usize = 10;

/// Textual body of one node widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub node_id: NodeId,
    pub title: String,
    pub lines: Vec<String>,
}

/// Rendering behavior of one node type.
pub trait NodeRenderer: Send + Sync {
    /// Returns `None` when nothing should be drawn.
    fn render(&self, node: &RenderNode) -> Option<NodeView>;
}

/// Renderer for unknown tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl NodeRenderer for NoopRenderer {
    fn render(&self, _node: &RenderNode) -> Option<NodeView> {
        None
    }
}

/// Generic card: a title plus `key: value` lines for selected props.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    heading: &'static str,
    fields: &'static [&'static str],
}

impl CardRenderer {
    pub fn new(heading: &'static str, fields: &'static [&'static str]) -> Self {
        Self { heading, fields }
    }
}

impl NodeRenderer for CardRenderer {
    fn render(&self, node: &RenderNode) -> Option<NodeView> {
        let lines = self
            .fields
            .iter()
            .filter_map(|field| {
                let value = node.props.get(*field)?;
                (!value.is_null()).then(|| format!("{field}: {}", display_value(value)))
            })
            .collect();
        Some(NodeView {
            node_id: node.id,
            title: title_or(node, self.heading),
            lines,
        })
    }
}

/// Card for nodes hosting a linked content item.
#[derive(Debug, Clone)]
pub struct LinkedItemRenderer {
    heading: &'static str,
}

impl LinkedItemRenderer {
    pub fn new(heading: &'static str) -> Self {
        Self { heading }
    }
}

impl NodeRenderer for LinkedItemRenderer {
    fn render(&self, node: &RenderNode) -> Option<NodeView> {
        let lines = match node.linked_item {
            Some(item) => vec![format!("item: {}", item.item_id)],
            None => vec!["no linked item".to_string()],
        };
        Some(NodeView {
            node_id: node.id,
            title: title_or(node, self.heading),
            lines,
        })
    }
}

/// `props.items = [{ "text": .., "done": .. }]` as check lines.
#[derive(Debug, Clone)]
pub struct ChecklistRenderer {
    heading: &'static str,
}

impl ChecklistRenderer {
    pub fn new(heading: &'static str) -> Self {
        Self { heading }
    }
}

impl NodeRenderer for ChecklistRenderer {
    fn render(&self, node: &RenderNode) -> Option<NodeView> {
        let lines = node
            .props
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        let done = item.get("done").and_then(Value::as_bool).unwrap_or(false);
                        let text = item.get("text").and_then(Value::as_str).unwrap_or("");
                        format!("[{}] {text}", if done { "x" } else { " " })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(NodeView {
            node_id: node.id,
            title: title_or(node, self.heading),
            lines,
        })
    }
}

/// `props.series = [{ "label": .., "value": .. }]` as scaled text bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl NodeRenderer for ChartRenderer {
    fn render(&self, node: &RenderNode) -> Option<NodeView> {
        let series: Vec<(&str, f64)> = node
            .props
            .get("series")
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .map(|point| {
                        (
                            point.get("label").and_then(Value::as_str).unwrap_or("?"),
                            point.get("value").and_then(Value::as_f64).unwrap_or(0.0),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let max = series.iter().map(|(_, value)| *value).fold(0.0, f64::max);
        let lines = series
            .iter()
            .map(|(label, value)| {
                let filled = if max > 0.0 {
                    ((value.max(0.0) / max) * CHART_BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                format!("{label} {} {value}", "#".repeat(filled))
            })
            .collect();

        Some(NodeView {
            node_id: node.id,
            title: title_or(node, "Chart"),
            lines,
        })
    }
}

fn title_or(node: &RenderNode, heading: &str) -> String {
    node.props
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(heading)
        .to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
