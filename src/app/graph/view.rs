use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Shape, Ui, vec2};

use crate::util::truncate_label;

use super::super::controller::{InteractionEvent, PointerMode, apply_effects};
use super::super::highlight::highlight_for;
use super::super::render_sync::{requirement_labels_visible, sync_frame};
use super::super::render_utils::{circle_visible, draw_background, edge_visible};
use super::super::style::{edge_style, node_style};
use super::super::ViewModel;
use super::interaction::{node_at, same_source_edge_at};

const LABEL_MAX_CHARS: usize = 28;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.transform);
        self.handle_graph_zoom(ui, rect, &response);

        if self.model.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No requirements to display",
                FontId::proportional(16.0),
                Color32::from_gray(190),
            );
            return;
        }

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        match self.simulation.as_mut() {
            Some(simulation) => {
                let positions = simulation.advance(frame_delta_seconds);
                sync_frame(&self.model, positions, self.transform, rect, &mut self.geometry);
            }
            None => sync_frame(&self.model, &[], self.transform, rect, &mut self.geometry),
        }

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered_node = pointer.and_then(|pointer| node_at(&self.geometry, rect, pointer));
        let mut effects = Vec::new();

        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(node) = node_at(&self.geometry, rect, origin)
        {
            let at = self
                .simulation
                .as_ref()
                .and_then(|simulation| simulation.positions().get(node).copied())
                .unwrap_or_else(|| self.transform.screen_to_world(rect, origin));
            effects.extend(
                self.interaction
                    .transition(InteractionEvent::DragStart { node, at }, &self.model),
            );
        }

        self.handle_graph_pan(&response);

        if self.interaction.dragged_node().is_some() {
            let released = response.drag_stopped()
                || !ui.input(|input| input.pointer.primary_down());
            if released {
                effects.extend(
                    self.interaction
                        .transition(InteractionEvent::DragEnd, &self.model),
                );
            } else if let Some(pointer) = ui.input(|input| input.pointer.interact_pos()) {
                let at = self.transform.screen_to_world(rect, pointer);
                effects.extend(
                    self.interaction
                        .transition(InteractionEvent::DragMove { at }, &self.model),
                );
            }
        } else {
            let hovered_edge = if response.hovered() && hovered_node.is_none() {
                pointer.and_then(|pointer| {
                    same_source_edge_at(&self.model, &self.geometry, pointer)
                })
            } else {
                None
            };
            self.interaction
                .transition(InteractionEvent::Hover { edge: hovered_edge }, &self.model);
        }

        if response.clicked_by(PointerButton::Primary) {
            effects.extend(
                self.interaction
                    .transition(InteractionEvent::Click { node: hovered_node }, &self.model),
            );
        }

        for node in apply_effects(&effects, self.simulation.as_mut()) {
            self.notify_selection(node);
        }

        if self.interaction.dragged_node().is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered_node.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let search_matches = self.cached_search_matches();
        let highlight = highlight_for(&self.interaction, &self.model, search_matches);
        let zoom = self.transform.zoom;

        for (index, &[start, end]) in self.geometry.edge_segments.iter().enumerate() {
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let style = edge_style(&self.model, index, &highlight);
            let stroke = style.stroke(zoom);
            if style.dashed {
                painter.extend(Shape::dashed_line(&[start, end], stroke, 7.0, 5.0));
            } else {
                painter.line_segment([start, end], stroke);
            }
        }

        let labels_visible = requirement_labels_visible(self.transform, &self.layout_config);
        for (index, node) in self.model.nodes.iter().enumerate() {
            let position = self.geometry.node_points[index];
            let radius = self.geometry.node_radii[index];
            if !circle_visible(rect, position, radius + 120.0) {
                continue;
            }

            let style = node_style(&self.model, index, &highlight);
            painter.circle_filled(position, radius, style.painted_fill());
            painter.circle_stroke(position, radius, style.painted_outline());

            let draw_label =
                node.is_tag() || style.emphasized || hovered_node == Some(index) || labels_visible;
            if draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.label, LABEL_MAX_CHARS),
                    FontId::proportional(12.0),
                    Color32::from_gray(236).gamma_multiply(style.opacity),
                );
            }
        }

        let hover_text = match self.interaction.mode {
            PointerMode::HoveringEdge { edge } => self
                .model
                .edge_document(edge)
                .map(|document| format!("Same source document: {document}")),
            _ => hovered_node.map(|index| self.model.nodes[index].label.clone()),
        };
        if let Some(text) = hover_text {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        let simulating = self
            .simulation
            .as_ref()
            .is_some_and(|simulation| simulation.is_running());
        if simulating || self.interaction.dragged_node().is_some() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
