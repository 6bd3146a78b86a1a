//! Visual style of every node and edge, computed from the model and the
//! current [`Highlight`]. Nothing is mutated in place: leaving a hover simply
//! recomputes the default style.

use eframe::egui::{Color32, Stroke};

use super::graph::{GraphEdge, GraphModel, NodeKind};
use super::highlight::{Focus, Highlight};

pub(super) const REQUIREMENT_FILL: Color32 = Color32::from_rgb(100, 149, 237);
const NODE_OUTLINE: Color32 = Color32::from_rgb(24, 28, 34);
const HAS_TAG_EDGE: Color32 = Color32::from_rgb(150, 150, 150);
const DRAG_OUTLINE: Color32 = Color32::WHITE;
const SEARCH_OUTLINE: Color32 = Color32::from_rgb(103, 196, 255);
const SELECTED_OUTLINE: Color32 = Color32::from_rgb(245, 206, 93);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct NodeStyle {
    pub fill: Color32,
    pub outline: Stroke,
    pub opacity: f32,
    pub emphasized: bool,
}

impl NodeStyle {
    pub(super) fn painted_fill(&self) -> Color32 {
        self.fill.gamma_multiply(self.opacity)
    }

    pub(super) fn painted_outline(&self) -> Stroke {
        Stroke::new(self.outline.width, self.outline.color.gamma_multiply(self.opacity))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct EdgeStyle {
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
    pub dashed: bool,
}

impl EdgeStyle {
    pub(super) fn stroke(&self, zoom: f32) -> Stroke {
        let width = (self.width * zoom.sqrt()).clamp(0.5, 6.0);
        Stroke::new(width, self.color.gamma_multiply(self.opacity))
    }
}

fn tag_color(model: &GraphModel, tag: usize) -> Color32 {
    match model.nodes.get(tag).map(|node| &node.kind) {
        Some(NodeKind::Tag { color, .. }) => *color,
        _ => REQUIREMENT_FILL,
    }
}

fn group_color(model: &GraphModel, group: usize) -> Color32 {
    model
        .groups
        .get(group)
        .map(|group| group.color)
        .unwrap_or(HAS_TAG_EDGE)
}

fn default_node_style(model: &GraphModel, node: usize) -> NodeStyle {
    let fill = match &model.nodes[node].kind {
        NodeKind::Requirement { .. } => REQUIREMENT_FILL,
        NodeKind::Tag { color, .. } => *color,
    };

    NodeStyle {
        fill,
        outline: Stroke::new(1.5, NODE_OUTLINE),
        opacity: 1.0,
        emphasized: false,
    }
}

fn default_edge_style(model: &GraphModel, edge: GraphEdge) -> EdgeStyle {
    match edge {
        GraphEdge::HasTag { .. } => EdgeStyle {
            color: HAS_TAG_EDGE,
            width: 1.2,
            opacity: 0.6,
            dashed: false,
        },
        GraphEdge::SameSource { group, .. } => EdgeStyle {
            color: group_color(model, group),
            width: 1.5,
            opacity: 0.5,
            dashed: true,
        },
    }
}

pub(super) fn node_style(model: &GraphModel, node: usize, highlight: &Highlight) -> NodeStyle {
    let mut style = default_node_style(model, node);

    match highlight.focus {
        Focus::Drag { node: dragged } => {
            if node == dragged {
                style.outline = Stroke::new(2.5, DRAG_OUTLINE);
                style.emphasized = true;
            }
        }
        Focus::SourceHover { group } => {
            if model.group_of(node) == Some(group) {
                style.outline = Stroke::new(3.0, group_color(model, group));
                style.emphasized = true;
            } else {
                style.opacity = 0.35;
            }
        }
        Focus::Tag { tag } => {
            if node == tag {
                style.outline = Stroke::new(3.0, Color32::WHITE);
                style.emphasized = true;
            } else if model.members_of[tag].contains(&node) {
                style.outline = Stroke::new(2.5, tag_color(model, tag));
                style.emphasized = true;
            }
        }
        Focus::None => {
            if highlight.selected_entity == Some(node) {
                style.outline = Stroke::new(2.5, SELECTED_OUTLINE);
                style.emphasized = true;
            } else if highlight.is_search_match(node) {
                style.outline = Stroke::new(2.0, SEARCH_OUTLINE);
                style.emphasized = true;
            }
        }
    }

    style
}

pub(super) fn edge_style(model: &GraphModel, edge: usize, highlight: &Highlight) -> EdgeStyle {
    let graph_edge = model.edges[edge];
    let mut style = default_edge_style(model, graph_edge);

    match highlight.focus {
        Focus::Drag { node } => {
            let (from, to) = graph_edge.endpoints();
            if from == node || to == node {
                style.opacity = 1.0;
                style.width = 2.2;
            }
        }
        Focus::SourceHover { group } => {
            if graph_edge.source_group() == Some(group) {
                style.opacity = 1.0;
                style.width = 2.5;
            } else {
                style.opacity = 0.1;
            }
        }
        Focus::Tag { tag } => {
            if let GraphEdge::HasTag { target, .. } = graph_edge
                && target == tag
            {
                style.color = tag_color(model, tag);
                style.opacity = 1.0;
                style.width = 2.5;
            }
        }
        Focus::None => {}
    }

    style
}
