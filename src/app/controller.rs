//! Pointer interaction as an explicit state machine.
//!
//! [`InteractionState::transition`] is total: every event is accepted in
//! every state, and events that make no sense in the current state leave it
//! unchanged. Layout side effects come back as [`Effect`]s.

use eframe::egui::Vec2;
use tracing::debug;

use super::graph::{GraphEdge, GraphModel};
use super::physics::SimulationHandle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) enum PointerMode {
    #[default]
    Idle,
    Dragging {
        node: usize,
    },
    HoveringEdge {
        edge: usize,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct InteractionState {
    pub mode: PointerMode,
    pub selected_tag: Option<usize>,
    pub selected_entity: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum InteractionEvent {
    DragStart { node: usize, at: Vec2 },
    DragMove { at: Vec2 },
    DragEnd,
    Hover { edge: Option<usize> },
    Click { node: Option<usize> },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Effect {
    Pin { node: usize, at: Vec2 },
    Unpin { node: usize },
    HeatUp,
    CoolDown,
    EntitySelected { node: usize },
}

impl InteractionState {
    pub(super) fn transition(
        &mut self,
        event: InteractionEvent,
        model: &GraphModel,
    ) -> Vec<Effect> {
        let before = self.mode;
        let effects = match (self.mode, event) {
            (PointerMode::Dragging { .. }, InteractionEvent::DragStart { .. }) => Vec::new(),
            (_, InteractionEvent::DragStart { node, at }) if node < model.nodes.len() => {
                self.mode = PointerMode::Dragging { node };
                vec![Effect::Pin { node, at }, Effect::HeatUp]
            }
            (PointerMode::Dragging { node }, InteractionEvent::DragMove { at }) => {
                vec![Effect::Pin { node, at }]
            }
            (PointerMode::Dragging { node }, InteractionEvent::DragEnd) => {
                self.mode = PointerMode::Idle;
                vec![Effect::Unpin { node }, Effect::CoolDown]
            }
            (PointerMode::Dragging { .. }, InteractionEvent::Hover { .. }) => Vec::new(),
            (_, InteractionEvent::Hover { edge }) => {
                let hoverable = edge.filter(|&edge| {
                    matches!(model.edges.get(edge), Some(GraphEdge::SameSource { .. }))
                });
                self.mode = match hoverable {
                    Some(edge) => PointerMode::HoveringEdge { edge },
                    None => PointerMode::Idle,
                };
                Vec::new()
            }
            (_, InteractionEvent::Click { node }) => self.click(node, model),
            _ => Vec::new(),
        };

        if self.mode != before {
            debug!(from = ?before, to = ?self.mode, "interaction mode changed");
        }
        effects
    }

    fn click(&mut self, node: Option<usize>, model: &GraphModel) -> Vec<Effect> {
        let Some(node) = node.filter(|&node| node < model.nodes.len()) else {
            self.selected_entity = None;
            return Vec::new();
        };

        if model.nodes[node].is_tag() {
            self.selected_tag = if self.selected_tag == Some(node) {
                None
            } else {
                Some(node)
            };
            debug!(tag = ?self.selected_tag, "tag selection changed");
            Vec::new()
        } else {
            self.selected_entity = Some(node);
            vec![Effect::EntitySelected { node }]
        }
    }

    pub(super) fn dragged_node(&self) -> Option<usize> {
        match self.mode {
            PointerMode::Dragging { node } => Some(node),
            _ => None,
        }
    }
}

/// Applies layout effects and returns the entity selections for the caller
/// to forward.
pub(super) fn apply_effects(
    effects: &[Effect],
    mut simulation: Option<&mut SimulationHandle>,
) -> Vec<usize> {
    let mut selections = Vec::new();

    for effect in effects {
        match *effect {
            Effect::EntitySelected { node } => selections.push(node),
            Effect::Pin { node, at } => {
                if let Some(handle) = simulation.as_deref_mut() {
                    handle.pin(node, at);
                }
            }
            Effect::Unpin { node } => {
                if let Some(handle) = simulation.as_deref_mut() {
                    handle.unpin(node);
                }
            }
            Effect::HeatUp => {
                if let Some(handle) = simulation.as_deref_mut() {
                    handle.heat_up();
                }
            }
            Effect::CoolDown => {
                if let Some(handle) = simulation.as_deref_mut() {
                    handle.cool_down();
                }
            }
        }
    }

    selections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph_model;
    use crate::app::physics::{LayoutConfig, LayoutEngine};
    use crate::colors::ColorAssigner;
    use crate::requirements::Entity;
    use eframe::egui::vec2;

    // req:1, req:2, req:3, tag:UI, tag:API; edges 0..=2 are HasTag, 3 is SameSource.
    fn sample_model() -> GraphModel {
        build_graph_model(
            &[
                Entity::new("1", "Login").with_tags(&["UI"]).with_source("doc1"),
                Entity::new("2", "Profile").with_tags(&["UI", "API"]).with_source("doc1"),
                Entity::new("3", "Export").with_source("doc2"),
            ],
            &ColorAssigner::new(Some(2)),
            300.0,
        )
    }

    #[test]
    fn drag_pins_heats_moves_and_releases() {
        let model = sample_model();
        let mut state = InteractionState::default();

        let start = state.transition(
            InteractionEvent::DragStart {
                node: 1,
                at: vec2(5.0, 5.0),
            },
            &model,
        );
        assert_eq!(state.mode, PointerMode::Dragging { node: 1 });
        assert_eq!(
            start,
            [
                Effect::Pin {
                    node: 1,
                    at: vec2(5.0, 5.0)
                },
                Effect::HeatUp
            ]
        );

        let moved = state.transition(InteractionEvent::DragMove { at: vec2(8.0, 1.0) }, &model);
        assert_eq!(
            moved,
            [Effect::Pin {
                node: 1,
                at: vec2(8.0, 1.0)
            }]
        );

        let end = state.transition(InteractionEvent::DragEnd, &model);
        assert_eq!(state.mode, PointerMode::Idle);
        assert_eq!(end, [Effect::Unpin { node: 1 }, Effect::CoolDown]);
    }

    #[test]
    fn stray_events_leave_state_alone() {
        let model = sample_model();
        let mut state = InteractionState::default();

        let stray = [
            InteractionEvent::DragMove { at: Vec2::ZERO },
            InteractionEvent::DragEnd,
            InteractionEvent::DragStart {
                node: 99,
                at: Vec2::ZERO,
            },
        ];
        for event in stray {
            assert!(state.transition(event, &model).is_empty());
        }
        assert_eq!(state, InteractionState::default());
    }

    #[test]
    fn only_same_source_edges_are_hoverable() {
        let model = sample_model();
        let same_source = model
            .edges
            .iter()
            .position(|edge| matches!(edge, GraphEdge::SameSource { .. }))
            .unwrap();
        let mut state = InteractionState::default();

        state.transition(InteractionEvent::Hover { edge: Some(0) }, &model);
        assert_eq!(state.mode, PointerMode::Idle);

        state.transition(
            InteractionEvent::Hover {
                edge: Some(same_source),
            },
            &model,
        );
        assert_eq!(state.mode, PointerMode::HoveringEdge { edge: same_source });

        state.transition(InteractionEvent::Hover { edge: None }, &model);
        assert_eq!(state.mode, PointerMode::Idle);
    }

    #[test]
    fn hover_is_ignored_while_dragging_and_drag_overrides_hover() {
        let model = sample_model();
        let mut state = InteractionState {
            mode: PointerMode::HoveringEdge { edge: 3 },
            ..Default::default()
        };

        state.transition(
            InteractionEvent::DragStart {
                node: 0,
                at: Vec2::ZERO,
            },
            &model,
        );
        assert_eq!(state.mode, PointerMode::Dragging { node: 0 });

        state.transition(InteractionEvent::Hover { edge: Some(3) }, &model);
        assert_eq!(state.mode, PointerMode::Dragging { node: 0 });
    }

    #[test]
    fn tag_clicks_toggle_and_switch_selection() {
        let model = sample_model();
        let ui = model.index_by_id["tag:UI"];
        let api = model.index_by_id["tag:API"];
        let mut state = InteractionState::default();

        state.transition(InteractionEvent::Click { node: Some(ui) }, &model);
        assert_eq!(state.selected_tag, Some(ui));
        state.transition(InteractionEvent::Click { node: Some(api) }, &model);
        assert_eq!(state.selected_tag, Some(api));
        state.transition(InteractionEvent::Click { node: Some(api) }, &model);
        assert_eq!(state.selected_tag, None);
    }

    #[test]
    fn requirement_click_selects_entity_and_background_clears_it() {
        let model = sample_model();
        let ui = model.index_by_id["tag:UI"];
        let mut state = InteractionState::default();
        state.transition(InteractionEvent::Click { node: Some(ui) }, &model);

        let effects = state.transition(InteractionEvent::Click { node: Some(2) }, &model);
        assert_eq!(effects, [Effect::EntitySelected { node: 2 }]);
        assert_eq!(state.selected_entity, Some(2));

        state.transition(InteractionEvent::Click { node: None }, &model);
        assert_eq!(state.selected_entity, None);
        assert_eq!(state.selected_tag, Some(ui));
    }

    #[test]
    fn effects_drive_the_simulation() {
        let model = sample_model();
        let engine = LayoutEngine::new();
        let mut handle = engine.start(&model, LayoutConfig::default());
        let mut state = InteractionState::default();
        let target = vec2(123.0, -45.0);

        let effects = state.transition(
            InteractionEvent::DragStart {
                node: 0,
                at: target,
            },
            &model,
        );
        apply_effects(&effects, Some(&mut handle));
        for _ in 0..10 {
            handle.advance(1.0 / 60.0);
        }
        assert_eq!(handle.positions()[0], target);

        let effects = state.transition(InteractionEvent::Click { node: Some(1) }, &model);
        assert_eq!(apply_effects(&effects, Some(&mut handle)), [1]);
        assert_eq!(apply_effects(&effects, None), [1]);
    }
}
