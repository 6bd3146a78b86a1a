use eframe::egui::{self, Color32, CornerRadius, RichText, Ui};

use crate::requirements::Entity;

use super::super::controller::{InteractionEvent, apply_effects};
use super::super::graph::NodeKind;
use super::super::ViewModel;

/// Readable text color on top of a chip background.
fn chip_text_color(background: Color32) -> Color32 {
    let luminance = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luminance > 150.0 {
        Color32::from_gray(20)
    } else {
        Color32::WHITE
    }
}

fn tag_chip(ui: &mut Ui, name: &str, color: Color32) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(RichText::new(name).small().color(chip_text_color(color)));
        });
}

fn optional_row(ui: &mut Ui, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
        ui.label(format!("{label}: {value}"));
    }
}

impl ViewModel {
    fn entity_for_node(&self, node: usize) -> Option<&Entity> {
        let NodeKind::Requirement { entity_id, .. } = &self.model.nodes.get(node)?.kind else {
            return None;
        };
        self.entities.iter().find(|entity| &entity.id == entity_id)
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let selected_entity = self.interaction.selected_entity;
        let selected_tag = self.interaction.selected_tag;
        if selected_entity.is_none() && selected_tag.is_none() {
            ui.label("Click a requirement or a tag in the graph.");
            return;
        }

        if let Some(node) = selected_entity {
            self.draw_entity_details(ui, node);
        }

        if let Some(tag) = selected_tag {
            if selected_entity.is_some() {
                ui.separator();
            }
            self.draw_tag_details(ui, tag);
        }
    }

    fn draw_entity_details(&mut self, ui: &mut Ui, node: usize) {
        let Some(entity) = self.entity_for_node(node) else {
            ui.label("Selected requirement no longer exists.");
            return;
        };

        ui.label(RichText::new(entity.title.as_str()).strong());
        ui.small(format!("id: {}", entity.display_id()));
        ui.add_space(6.0);

        ui.label(format!("Source document: {}", entity.source_document()));
        optional_row(ui, "Status", entity.status.as_deref());
        optional_row(ui, "Priority", entity.priority.as_deref());
        optional_row(ui, "Type", entity.requirement_type.as_deref());

        ui.add_space(4.0);
        if entity.tags.is_empty() {
            ui.small("No tags.");
        } else {
            ui.horizontal_wrapped(|ui| {
                for tag in &entity.tags {
                    tag_chip(ui, &tag.name, self.colors.color_for(&tag.name));
                }
            });
        }

        if let Some(description) = entity
            .description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        {
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("requirement_description")
                .max_height(240.0)
                .show(ui, |ui| ui.label(description));
        }

        if ui.button("Clear selection").clicked() {
            self.interaction
                .transition(InteractionEvent::Click { node: None }, &self.model);
        }
    }

    fn draw_tag_details(&mut self, ui: &mut Ui, tag: usize) {
        let Some(NodeKind::Tag { name, color }) = self.model.nodes.get(tag).map(|node| &node.kind)
        else {
            return;
        };

        ui.horizontal(|ui| {
            tag_chip(ui, name, *color);
            ui.label(format!("{} requirements", self.model.members_of[tag].len()));
        });
        ui.add_space(4.0);

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("tag_members")
            .max_height(320.0)
            .show(ui, |ui| {
                for &member in &self.model.members_of[tag] {
                    let node = &self.model.nodes[member];
                    let selected = self.interaction.selected_entity == Some(member);
                    if ui.selectable_label(selected, node.label.as_str()).clicked() {
                        clicked = Some(member);
                    }
                }
            });

        if let Some(member) = clicked {
            let effects = self
                .interaction
                .transition(InteractionEvent::Click { node: Some(member) }, &self.model);
            for node in apply_effects(&effects, self.simulation.as_mut()) {
                self.notify_selection(node);
            }
        }
    }
}
