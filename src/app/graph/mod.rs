//! Arena-backed graph model.
//!
//! Nodes and edges are stored in plain vectors and refer to each other by
//! index. The physics simulation keeps its own position array addressed by
//! the same indices, so nothing here holds references into the layout.

use std::collections::HashMap;

use eframe::egui::{Color32, Vec2};

mod build;
mod interaction;
mod view;

pub(in crate::app) use build::build_graph_model;

pub(in crate::app) const REQUIREMENT_PREFIX: &str = "req:";
pub(in crate::app) const TAG_PREFIX: &str = "tag:";

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum NodeKind {
    Requirement {
        entity_id: String,
        title: String,
        source_document: String,
        group: usize,
    },
    Tag {
        name: String,
        color: Color32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn is_tag(&self) -> bool {
        matches!(self.kind, NodeKind::Tag { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) enum GraphEdge {
    HasTag { source: usize, target: usize },
    SameSource { a: usize, b: usize, group: usize },
}

impl GraphEdge {
    pub fn endpoints(self) -> (usize, usize) {
        match self {
            Self::HasTag { source, target } => (source, target),
            Self::SameSource { a, b, .. } => (a, b),
        }
    }

    pub fn source_group(self) -> Option<usize> {
        match self {
            Self::HasTag { .. } => None,
            Self::SameSource { group, .. } => Some(group),
        }
    }
}

/// Requirements that share one source document, plus the point their
/// cluster is pulled toward.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct SourceGroup {
    pub document: String,
    pub color: Color32,
    pub anchor: Vec2,
    pub members: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub(in crate::app) struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub groups: Vec<SourceGroup>,
    pub index_by_id: HashMap<String, usize>,
    /// Tag indices per node; empty for tag nodes.
    pub tags_of: Vec<Vec<usize>>,
    /// Requirement indices per node; empty for requirement nodes.
    pub members_of: Vec<Vec<usize>>,
    /// Edge indices touching each node.
    pub incident: Vec<Vec<usize>>,
}

impl GraphModel {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_tag())
            .map(|(index, _)| index)
    }

    pub fn group_of(&self, node: usize) -> Option<usize> {
        match self.nodes.get(node)?.kind {
            NodeKind::Requirement { group, .. } => Some(group),
            NodeKind::Tag { .. } => None,
        }
    }

    pub fn edge_document(&self, edge: usize) -> Option<&str> {
        let group = self.edges.get(edge)?.source_group()?;
        self.groups.get(group).map(|group| group.document.as_str())
    }

    pub fn has_tag_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| matches!(edge, GraphEdge::HasTag { .. }))
            .count()
    }

    pub fn same_source_count(&self) -> usize {
        self.edges.len() - self.has_tag_count()
    }
}
