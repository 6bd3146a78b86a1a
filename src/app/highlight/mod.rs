use std::collections::HashSet;
use std::sync::Arc;

use super::controller::{InteractionState, PointerMode};
use super::graph::GraphModel;

mod search;

/// The single emphasis that currently owns the drawing. Drag beats hover,
/// hover beats tag selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) enum Focus {
    #[default]
    None,
    Tag {
        tag: usize,
    },
    SourceHover {
        group: usize,
    },
    Drag {
        node: usize,
    },
}

/// Everything the style functions need to know about the current
/// interaction. Search matches and the selected entity only show while no
/// focus is active.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct Highlight {
    pub focus: Focus,
    pub search_matches: Option<Arc<HashSet<usize>>>,
    pub selected_entity: Option<usize>,
}

impl Highlight {
    pub(super) fn is_search_match(&self, node: usize) -> bool {
        self.search_matches
            .as_ref()
            .is_some_and(|matches| matches.contains(&node))
    }
}

pub(super) fn highlight_for(
    state: &InteractionState,
    model: &GraphModel,
    search_matches: Option<Arc<HashSet<usize>>>,
) -> Highlight {
    let hovered_group = match state.mode {
        PointerMode::HoveringEdge { edge } => {
            model.edges.get(edge).and_then(|edge| edge.source_group())
        }
        _ => None,
    };
    let selected_tag = state
        .selected_tag
        .filter(|&tag| model.nodes.get(tag).is_some_and(|node| node.is_tag()));

    let focus = if let Some(node) = state.dragged_node() {
        Focus::Drag { node }
    } else if let Some(group) = hovered_group {
        Focus::SourceHover { group }
    } else if let Some(tag) = selected_tag {
        Focus::Tag { tag }
    } else {
        Focus::None
    };

    Highlight {
        focus,
        search_matches,
        selected_entity: state.selected_entity,
    }
}
