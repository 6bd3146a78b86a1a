use eframe::egui::{Color32, RichText, Sense, Shape, Stroke, Ui, vec2};

use crate::util::color_hex;

use super::super::controller::InteractionEvent;
use super::super::graph::NodeKind;
use super::super::style::REQUIREMENT_FILL;
use super::super::ViewModel;

fn swatch(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
    ui.painter().circle_filled(rect.center(), 6.0, color);
}

fn dashed_sample(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(vec2(28.0, 12.0), Sense::hover());
    ui.painter().extend(Shape::dashed_line(
        &[rect.left_center(), rect.right_center()],
        Stroke::new(1.5, color),
        5.0,
        3.0,
    ));
}

impl ViewModel {
    pub(in crate::app) fn draw_legend(&mut self, ui: &mut Ui) {
        ui.heading("Legend");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            swatch(ui, REQUIREMENT_FILL);
            ui.label("Requirement");
        });
        ui.horizontal(|ui| {
            dashed_sample(ui, Color32::from_gray(170));
            ui.label("Same source document");
        });

        ui.separator();
        ui.label(RichText::new("Tags").strong());
        let mut clicked_tag = None;
        let tags = self.model.tag_indices().collect::<Vec<_>>();
        if tags.is_empty() {
            ui.small("No tags in this data set.");
        }
        for tag in tags {
            let NodeKind::Tag { name, color } = &self.model.nodes[tag].kind else {
                continue;
            };
            let selected = self.interaction.selected_tag == Some(tag);
            ui.horizontal(|ui| {
                swatch(ui, *color);
                let response = ui
                    .selectable_label(selected, name.as_str())
                    .on_hover_text(format!(
                        "{} requirements, {}",
                        self.model.members_of[tag].len(),
                        color_hex(*color)
                    ));
                if response.clicked() {
                    clicked_tag = Some(tag);
                }
            });
        }

        ui.separator();
        ui.label(RichText::new("Source documents").strong());
        for group in &self.model.groups {
            ui.horizontal(|ui| {
                dashed_sample(ui, group.color);
                ui.label(format!("{} ({})", group.document, group.members.len()));
            });
        }

        if let Some(tag) = clicked_tag {
            self.toggle_tag_selection(tag);
        }
    }

    fn toggle_tag_selection(&mut self, tag: usize) {
        self.interaction
            .transition(InteractionEvent::Click { node: Some(tag) }, &self.model);
    }
}
