//! Copies layout positions into screen space once per frame.

use eframe::egui::{Pos2, Rect, Vec2};

use super::graph::GraphModel;
use super::physics::LayoutConfig;
use super::render_utils::ViewTransform;

const REQUIREMENT_DRAW_RADIUS: f32 = 9.0;
const TAG_DRAW_RADIUS: f32 = 13.0;

pub(super) fn draw_radius(is_tag: bool) -> f32 {
    if is_tag {
        TAG_DRAW_RADIUS
    } else {
        REQUIREMENT_DRAW_RADIUS
    }
}

#[derive(Default)]
pub(super) struct FrameGeometry {
    pub node_points: Vec<Pos2>,
    pub node_radii: Vec<f32>,
    pub edge_segments: Vec<[Pos2; 2]>,
}

pub(super) fn sync_frame(
    model: &GraphModel,
    positions: &[Vec2],
    transform: ViewTransform,
    rect: Rect,
    geometry: &mut FrameGeometry,
) {
    let radius_scale = transform.zoom.powf(0.5);

    geometry.node_points.clear();
    geometry.node_radii.clear();
    for (index, node) in model.nodes.iter().enumerate() {
        let world = positions.get(index).copied().unwrap_or(Vec2::ZERO);
        geometry
            .node_points
            .push(transform.world_to_screen(rect, world));
        geometry
            .node_radii
            .push((draw_radius(node.is_tag()) * radius_scale).clamp(3.0, 40.0));
    }

    geometry.edge_segments.clear();
    for edge in &model.edges {
        let (from, to) = edge.endpoints();
        geometry
            .edge_segments
            .push([geometry.node_points[from], geometry.node_points[to]]);
    }
}

/// Labels for requirements appear once zoomed in far enough that they do
/// not overlap their neighbours at the default link distance.
pub(super) fn requirement_labels_visible(transform: ViewTransform, config: &LayoutConfig) -> bool {
    transform.zoom * config.has_tag_distance > 110.0
}
