use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout};

use crate::colors::ColorAssigner;
use crate::requirements::Entity;

use super::super::controller::InteractionState;
use super::super::graph::GraphModel;
use super::super::physics::{LayoutConfig, LayoutEngine};
use super::super::render_sync::FrameGeometry;
use super::super::render_utils::{ViewTransform, ZoomBounds};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        entities: Vec<Entity>,
        colors: Rc<ColorAssigner>,
        zoom_bounds: ZoomBounds,
    ) -> Self {
        Self {
            entities,
            colors,
            layout: LayoutEngine::new(),
            layout_config: LayoutConfig::default(),
            model: GraphModel::default(),
            simulation: None,
            interaction: InteractionState::default(),
            transform: ViewTransform::default(),
            zoom_bounds,
            search: String::new(),
            search_match_cache: None,
            graph_dirty: true,
            graph_revision: 0,
            geometry: FrameGeometry::default(),
            selection_listener: None,
        }
    }

    fn status_text(&self) -> String {
        match &self.simulation {
            Some(simulation) if simulation.is_running() => {
                format!("layout: running (alpha {:.3})", simulation.alpha())
            }
            Some(_) => "layout: settled".to_owned(),
            None => "layout: idle".to_owned(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        input_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Requirement Graph");
                    ui.separator();
                    ui.label(format!("input: {input_path}"));
                    ui.label(format!("requirements: {}", self.entities.len()));
                    ui.label(format!("nodes: {}", self.model.nodes.len()));
                    ui.label(format!(
                        "edges: {} tag / {} same-source",
                        self.model.has_tag_count(),
                        self.model.same_source_count()
                    ));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Reheat layout").clicked() {
                        self.reheat_layout();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_controls(ui);
                    ui.separator();
                    self.draw_legend(ui);
                });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading requirements...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn reheat_layout(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.reheat();
        }
    }
}
