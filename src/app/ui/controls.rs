use std::ops::RangeInclusive;

use eframe::egui::{self, Key, Response, Ui};

use super::super::physics::LayoutConfig;
use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct ArrowHold {
    positive_secs: f32,
    negative_secs: f32,
}

fn arrow_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

/// Lets a focused slider be nudged with the arrow keys, speeding up the
/// longer a key is held.
fn apply_arrow_keys(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: &RangeInclusive<f32>,
) -> bool {
    let state_id = response.id.with("arrow_hold");
    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, ArrowHold::default()));
        return false;
    }

    let mut hold = ui
        .ctx()
        .data(|data| data.get_temp::<ArrowHold>(state_id).unwrap_or_default());
    let (delta_time, increase, decrease) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold.positive_secs = if increase {
        hold.positive_secs + delta_time
    } else {
        0.0
    };
    hold.negative_secs = if decrease {
        hold.negative_secs + delta_time
    } else {
        0.0
    };
    ui.ctx().data_mut(|data| data.insert_temp(state_id, hold));

    let direction = (increase as i8) - (decrease as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold.positive_secs
    } else {
        hold.negative_secs
    };
    let step = ((range.end() - range.start()) / 200.0).max(0.0005);
    let delta = direction as f32
        * step
        * SLIDER_KEY_BASE_RATE
        * arrow_accel_multiplier(hold_secs)
        * delta_time;

    let old_value = *value;
    *value = (*value + delta).clamp(*range.start(), *range.end());
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hint: &str,
) -> bool {
    let response = ui
        .add(
            egui::Slider::new(value, range.clone())
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hint);
    if response.hovered() {
        response.request_focus();
    }

    response.changed() | apply_arrow_keys(ui, &response, value, &range)
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (title or tag)")
            .on_hover_text("Fuzzy-highlight matching requirements and tags.");
        ui.text_edit_singleline(&mut self.search);
        if let Some(matches) = self.cached_search_matches() {
            ui.small(format!("{} matching nodes", matches.len()));
        }

        ui.separator();
        self.draw_view_controls(ui);

        ui.separator();
        ui.collapsing("Layout tuning", |ui| self.draw_layout_controls(ui));
    }

    fn draw_view_controls(&mut self, ui: &mut Ui) {
        let bounds = self.zoom_bounds;
        ui.add(
            egui::Slider::new(&mut self.transform.zoom, bounds.min..=bounds.max)
                .logarithmic(true)
                .text("Zoom"),
        )
        .on_hover_text("Scroll over the graph to zoom around the pointer.");

        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
            if ui.button("Reheat layout").clicked() {
                self.reheat_layout();
            }
        });
    }

    fn draw_layout_controls(&mut self, ui: &mut Ui) {
        let mut config = self.layout_config;
        let mut changed = false;

        changed |= tuning_slider(
            ui,
            &mut config.has_tag_distance,
            30.0..=250.0,
            "Tag link distance",
            "Preferred distance between a requirement and its tags.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.same_source_distance,
            60.0..=400.0,
            "Same-source distance",
            "Preferred distance between requirements from one document.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.link_strength,
            0.02..=1.0,
            "Link strength",
            "How strongly links pull toward their preferred distance.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.repulsion,
            0.0..=120_000.0,
            "Repulsion",
            "How strongly every node pushes the others away.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.collision_strength,
            0.0..=1.0,
            "Collision",
            "How hard overlapping nodes are separated.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.cluster_strength,
            0.0..=0.3,
            "Cluster pull",
            "Pull of requirements toward their source document's anchor.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.tag_center_strength,
            0.0..=0.2,
            "Tag centering",
            "Pull of tag nodes toward the middle of the graph.",
        );
        changed |= tuning_slider(
            ui,
            &mut config.velocity_decay,
            0.05..=0.9,
            "Velocity decay",
            "Share of velocity lost every tick.",
        );

        let anchors_changed = tuning_slider(
            ui,
            &mut config.anchor_radius,
            0.0..=900.0,
            "Cluster spacing",
            "Distance of each source document's anchor from the centre.",
        );

        if ui.button("Restore defaults").clicked() {
            config = LayoutConfig::default();
            changed = true;
        }

        if config == self.layout_config {
            return;
        }

        let rebuild = anchors_changed || config.anchor_radius != self.layout_config.anchor_radius;
        self.layout_config = config;
        if rebuild {
            self.graph_dirty = true;
        } else if changed && let Some(simulation) = self.simulation.as_mut() {
            simulation.set_config(config);
        }
    }
}
