use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_sync::FrameGeometry;
use super::super::render_utils::{circle_visible, distance_to_segment};
use super::super::ViewModel;
use super::GraphModel;

const EDGE_HOVER_TOLERANCE: f32 = 6.0;

/// Topmost node under the pointer. Tags are painted last, so they win ties.
pub(super) fn node_at(geometry: &FrameGeometry, rect: Rect, pointer: Pos2) -> Option<usize> {
    (0..geometry.node_points.len())
        .rev()
        .filter(|&index| {
            circle_visible(rect, geometry.node_points[index], geometry.node_radii[index])
        })
        .filter_map(|index| {
            let distance = geometry.node_points[index].distance(pointer);
            (distance <= geometry.node_radii[index] + 2.0).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Closest source-document edge within a few pixels of the pointer.
pub(super) fn same_source_edge_at(
    model: &GraphModel,
    geometry: &FrameGeometry,
    pointer: Pos2,
) -> Option<usize> {
    geometry
        .edge_segments
        .iter()
        .enumerate()
        .filter(|(index, _)| model.edges[*index].source_group().is_some())
        .map(|(index, [start, end])| (index, distance_to_segment(pointer, *start, *end)))
        .filter(|(_, distance)| *distance <= EDGE_HOVER_TOLERANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.transform
            .zoom_about(rect, pointer, zoom_factor, self.zoom_bounds);
    }

    /// Secondary and middle drags always pan; a primary drag pans only when
    /// it did not start on a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag = response.dragged_by(egui::PointerButton::Primary)
            && self.interaction.dragged_node().is_none();

        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.transform.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.transform = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::build_graph_model;
    use crate::colors::ColorAssigner;
    use crate::requirements::Entity;
    use eframe::egui::{pos2, vec2};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(400.0, 400.0))
    }

    // req:1 at (100,100), req:2 at (300,100), tag:UI at (200,300).
    fn fixture() -> (GraphModel, FrameGeometry) {
        let model = build_graph_model(
            &[
                Entity::new("1", "Login").with_tags(&["UI"]).with_source("doc1"),
                Entity::new("2", "Profile").with_tags(&["UI"]).with_source("doc1"),
            ],
            &ColorAssigner::new(Some(1)),
            300.0,
        );
        let node_points = vec![pos2(100.0, 100.0), pos2(300.0, 100.0), pos2(200.0, 300.0)];
        let edge_segments = model
            .edges
            .iter()
            .map(|edge| {
                let (from, to) = edge.endpoints();
                [node_points[from], node_points[to]]
            })
            .collect();
        let geometry = FrameGeometry {
            node_points,
            node_radii: vec![10.0, 10.0, 14.0],
            edge_segments,
        };
        (model, geometry)
    }

    #[test]
    fn node_hit_test_uses_radius() {
        let (_, geometry) = fixture();
        assert_eq!(node_at(&geometry, viewport(), pos2(105.0, 104.0)), Some(0));
        assert_eq!(node_at(&geometry, viewport(), pos2(210.0, 300.0)), Some(2));
        assert_eq!(node_at(&geometry, viewport(), pos2(200.0, 200.0)), None);
    }

    #[test]
    fn only_same_source_edges_are_hit() {
        let (model, geometry) = fixture();
        let same_source = model.edges.len() - 1;

        assert_eq!(same_source_edge_at(&model, &geometry, pos2(200.0, 104.0)), Some(same_source));
        // On the req:1 -> tag:UI segment, which is a tag edge.
        assert_eq!(same_source_edge_at(&model, &geometry, pos2(150.0, 200.0)), None);
        assert_eq!(same_source_edge_at(&model, &geometry, pos2(200.0, 130.0)), None);
    }
}
