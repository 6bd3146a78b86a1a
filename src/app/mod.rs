use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::colors::ColorAssigner;
use crate::requirements::{Entity, load_entities};

mod controller;
mod graph;
mod highlight;
mod physics;
mod render_sync;
mod render_utils;
mod style;
mod ui;

use controller::InteractionState;
use graph::{GraphModel, NodeKind};
use physics::{LayoutConfig, LayoutEngine, SimulationHandle};
use render_sync::FrameGeometry;
use render_utils::{ViewTransform, ZoomBounds};

/// Called with the entity id whenever a requirement node is clicked.
pub type SelectionListener = Box<dyn FnMut(&str)>;

type LoadResult = Result<Vec<Entity>, String>;

pub struct Settings {
    pub input_path: PathBuf,
    pub palette_seed: Option<u64>,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

pub struct RequirementGraphApp {
    input_path: PathBuf,
    colors: Rc<ColorAssigner>,
    zoom_bounds: ZoomBounds,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    entities: Vec<Entity>,
    colors: Rc<ColorAssigner>,
    layout: LayoutEngine,
    layout_config: LayoutConfig,
    model: GraphModel,
    simulation: Option<SimulationHandle>,
    interaction: InteractionState,
    transform: ViewTransform,
    zoom_bounds: ZoomBounds,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    graph_dirty: bool,
    graph_revision: u64,
    geometry: FrameGeometry,
    selection_listener: Option<SelectionListener>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl ViewModel {
    /// Swaps in a freshly loaded entity list. The running simulation is
    /// stopped right away; the new one starts with the next rebuild.
    fn replace_entities(&mut self, entities: Vec<Entity>) {
        if let Some(mut simulation) = self.simulation.take() {
            simulation.stop();
        }
        self.entities = entities;
        self.graph_dirty = true;
    }

    fn teardown(&mut self) {
        if let Some(mut simulation) = self.simulation.take()
            && simulation.stop()
        {
            info!("view torn down");
        }
    }

    fn notify_selection(&mut self, node: usize) {
        let Some(NodeKind::Requirement { entity_id, .. }) =
            self.model.nodes.get(node).map(|node| &node.kind)
        else {
            return;
        };

        if let Some(listener) = self.selection_listener.as_mut() {
            listener(entity_id.as_str());
        }
    }
}

fn log_selection(entity_id: &str) {
    info!(requirement = entity_id, "requirement selected");
}

impl RequirementGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let colors = Rc::new(ColorAssigner::new(settings.palette_seed));
        let zoom_bounds = ZoomBounds::new(settings.min_zoom, settings.max_zoom);
        let state = Self::start_load(settings.input_path.clone());

        Self {
            input_path: settings.input_path,
            colors,
            zoom_bounds,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(input_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            info!(path = %input_path.display(), "loading requirements");
            let result = load_entities(&input_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(input_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(input_path),
        }
    }

    fn ready_state(&self, entities: Vec<Entity>) -> AppState {
        info!(requirements = entities.len(), "requirements loaded");
        let mut view = ViewModel::new(entities, Rc::clone(&self.colors), self.zoom_bounds);
        view.selection_listener = Some(Box::new(log_selection));
        AppState::Ready(Box::new(view))
    }

    fn error_state(error: String) -> AppState {
        error!(%error, "failed to load requirements");
        AppState::Error(error)
    }

    fn input_label(path: &Path) -> String {
        path.display().to_string()
    }
}

impl eframe::App for RequirementGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let input_label = Self::input_label(&self.input_path);

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading requirements...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load requirements");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.input_path.clone());
                    return;
                }
            }
            AppState::Ready(view) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                view.show(ctx, &input_label, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.input_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(entities)) => {
                            info!(requirements = entities.len(), "requirements reloaded");
                            view.replace_entities(entities);
                        }
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            if let AppState::Ready(view) = &mut self.state {
                view.teardown();
            }
            self.reload_rx = None;
            self.state = match result {
                Ok(entities) => self.ready_state(entities),
                Err(error) => Self::error_state(error),
            };
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let AppState::Ready(view) = &mut self.state {
            view.teardown();
        }
    }
}
