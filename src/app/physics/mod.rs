//! Force layout for the requirement graph.
//!
//! The simulation owns one position and one velocity per graph node, indexed
//! like [`GraphModel::nodes`]. Forces are summed every tick: link springs,
//! Barnes-Hut repulsion, collision and a pull toward each node's cluster
//! anchor. All of them scale with `alpha`, the simulation heat, which decays
//! toward `alpha_target` until the layout settles.

mod forces;
mod quadtree;

use std::cell::Cell;
use std::rc::Rc;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info};

use crate::util::stable_pair;

use super::graph::{GraphEdge, GraphModel, NodeKind};
use forces::{
    RepulsionParams, accumulate_collisions, accumulate_repulsion, link_correction, pull_toward,
};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.8;
const REPULSION_SOFTENING: f32 = 400.0;
const TICK_SECONDS: f32 = 1.0 / 60.0;
const MAX_TICKS_PER_FRAME: u32 = 4;
const MAX_SPEED: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct LayoutConfig {
    pub has_tag_distance: f32,
    pub same_source_distance: f32,
    pub link_strength: f32,
    pub repulsion: f32,
    pub requirement_radius: f32,
    pub tag_radius: f32,
    pub collision_strength: f32,
    pub cluster_strength: f32,
    pub tag_center_strength: f32,
    pub anchor_radius: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub drag_alpha_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            has_tag_distance: 90.0,
            same_source_distance: 160.0,
            link_strength: 0.3,
            repulsion: 36_000.0,
            requirement_radius: 22.0,
            tag_radius: 34.0,
            collision_strength: 0.35,
            cluster_strength: 0.08,
            tag_center_strength: 0.03,
            anchor_radius: 320.0,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            alpha_decay: 0.0228,
            drag_alpha_target: 0.3,
        }
    }
}

impl LayoutConfig {
    pub fn collision_radius(&self, is_tag: bool) -> f32 {
        if is_tag {
            self.tag_radius
        } else {
            self.requirement_radius
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum LinkKind {
    HasTag,
    SameSource,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    from: usize,
    to: usize,
    kind: LinkKind,
}

#[derive(Clone, Copy, Debug)]
enum Pull {
    Anchor(Vec2),
    Center,
}

struct Simulation {
    config: LayoutConfig,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    pinned: Vec<Option<Vec2>>,
    is_tag: Vec<bool>,
    pulls: Vec<Pull>,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    accumulator: f32,
    forces: Vec<Vec2>,
    radii: Vec<f32>,
}

impl Simulation {
    fn new(model: &GraphModel, config: LayoutConfig) -> Self {
        let node_count = model.nodes.len();
        let mut positions = Vec::with_capacity(node_count);
        let mut is_tag = Vec::with_capacity(node_count);
        let mut pulls = Vec::with_capacity(node_count);

        for (index, node) in model.nodes.iter().enumerate() {
            let (jx, jy) = stable_pair(&node.id);
            let mut offset = vec2(jx, jy);
            if offset.length_sq() <= 0.0001 {
                let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
                offset = vec2(angle.cos(), angle.sin());
            }

            match &node.kind {
                NodeKind::Requirement { group, .. } => {
                    let anchor = model
                        .groups
                        .get(*group)
                        .map(|group| group.anchor)
                        .unwrap_or(Vec2::ZERO);
                    positions.push(anchor + offset * 70.0);
                    pulls.push(Pull::Anchor(anchor));
                    is_tag.push(false);
                }
                NodeKind::Tag { .. } => {
                    positions.push(offset * 110.0);
                    pulls.push(Pull::Center);
                    is_tag.push(true);
                }
            }
        }

        let links = model
            .edges
            .iter()
            .map(|edge| match *edge {
                GraphEdge::HasTag { source, target } => Link {
                    from: source,
                    to: target,
                    kind: LinkKind::HasTag,
                },
                GraphEdge::SameSource { a, b, .. } => Link {
                    from: a,
                    to: b,
                    kind: LinkKind::SameSource,
                },
            })
            .collect();

        Self {
            config,
            positions,
            velocities: vec![Vec2::ZERO; node_count],
            pinned: vec![None; node_count],
            is_tag,
            pulls,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            accumulator: 0.0,
            forces: Vec::with_capacity(node_count),
            radii: Vec::with_capacity(node_count),
        }
    }

    fn is_hot(&self) -> bool {
        self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min
    }

    fn advance(&mut self, dt: f32) {
        let budget = TICK_SECONDS * MAX_TICKS_PER_FRAME as f32;
        self.accumulator = (self.accumulator + dt.max(0.0)).min(budget);
        let ticks = ((self.accumulator / TICK_SECONDS) + 0.001).floor() as u32;
        self.accumulator = (self.accumulator - ticks as f32 * TICK_SECONDS).max(0.0);

        for _ in 0..ticks {
            if !self.is_hot() {
                self.accumulator = 0.0;
                break;
            }
            self.tick();
        }
    }

    fn tick(&mut self) {
        let config = self.config;
        self.alpha += (self.alpha_target - self.alpha) * config.alpha_decay;
        let alpha = self.alpha;
        let node_count = self.positions.len();

        self.forces.clear();
        self.forces.resize(node_count, Vec2::ZERO);
        self.radii.clear();
        self.radii
            .extend(self.is_tag.iter().map(|&is_tag| config.collision_radius(is_tag)));

        for link in &self.links {
            if link.from >= node_count || link.to >= node_count || link.from == link.to {
                continue;
            }

            let distance = match link.kind {
                LinkKind::HasTag => config.has_tag_distance,
                LinkKind::SameSource => config.same_source_distance,
            };
            let correction = link_correction(
                self.positions[link.from],
                self.velocities[link.from],
                self.positions[link.to],
                self.velocities[link.to],
                distance,
                config.link_strength * alpha,
            );
            self.forces[link.from] += correction;
            self.forces[link.to] -= correction;
        }

        if let Some(tree) = QuadNode::build(&self.positions, &self.radii) {
            let params = RepulsionParams {
                strength: config.repulsion * alpha,
                softening: REPULSION_SOFTENING,
                theta: BARNES_HUT_THETA,
            };
            for (index, force) in self.forces.iter_mut().enumerate() {
                accumulate_repulsion(&tree, index, &self.positions, params, force);
            }

            accumulate_collisions(
                &tree,
                &tree,
                true,
                &self.positions,
                &self.radii,
                config.collision_strength,
                &mut self.forces,
            );
        }

        for (index, force) in self.forces.iter_mut().enumerate() {
            let (target, strength) = match self.pulls[index] {
                Pull::Anchor(anchor) => (anchor, config.cluster_strength),
                Pull::Center => (Vec2::ZERO, config.tag_center_strength),
            };
            *force += pull_toward(self.positions[index], target, strength * alpha);
        }

        let retain = 1.0 - config.velocity_decay.clamp(0.0, 1.0);
        for index in 0..node_count {
            if let Some(pin) = self.pinned[index] {
                self.positions[index] = pin;
                self.velocities[index] = Vec2::ZERO;
                continue;
            }

            let mut velocity = (self.velocities[index] + self.forces[index]) * retain;
            let speed = velocity.length();
            if speed > MAX_SPEED {
                velocity *= MAX_SPEED / speed;
            }
            self.velocities[index] = velocity;
            self.positions[index] += velocity;
        }
    }
}

/// Hands out simulations and counts the ones that have not been stopped.
pub(in crate::app) struct LayoutEngine {
    live: Rc<Cell<usize>>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            live: Rc::new(Cell::new(0)),
        }
    }

    pub fn start(&self, model: &GraphModel, config: LayoutConfig) -> SimulationHandle {
        self.live.set(self.live.get() + 1);
        info!(
            nodes = model.nodes.len(),
            links = model.edges.len(),
            live = self.live.get(),
            "layout simulation started"
        );

        SimulationHandle {
            simulation: Simulation::new(model, config),
            stopped: false,
            live: Rc::clone(&self.live),
        }
    }

    #[cfg(test)]
    pub fn active_simulations(&self) -> usize {
        self.live.get()
    }
}

/// A running layout. Stopping is idempotent and also happens on drop, so a
/// discarded handle never keeps the frame loop alive.
pub(in crate::app) struct SimulationHandle {
    simulation: Simulation,
    stopped: bool,
    live: Rc<Cell<usize>>,
}

impl SimulationHandle {
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        self.stopped = true;
        self.live.set(self.live.get().saturating_sub(1));
        info!(live = self.live.get(), "layout simulation stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        !self.stopped && self.simulation.is_hot()
    }

    pub fn advance(&mut self, dt: f32) -> &[Vec2] {
        if !self.stopped {
            self.simulation.advance(dt);
        }
        &self.simulation.positions
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.simulation.positions
    }

    pub fn alpha(&self) -> f32 {
        self.simulation.alpha
    }

    pub fn pin(&mut self, node: usize, at: Vec2) {
        if let Some(slot) = self.simulation.pinned.get_mut(node) {
            *slot = Some(at);
            self.simulation.positions[node] = at;
            self.simulation.velocities[node] = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, node: usize) {
        if let Some(slot) = self.simulation.pinned.get_mut(node) {
            *slot = None;
        }
    }

    pub fn heat_up(&mut self) {
        self.simulation.alpha_target = self.simulation.config.drag_alpha_target;
        debug!(alpha = self.simulation.alpha, "layout heated");
    }

    pub fn cool_down(&mut self) {
        self.simulation.alpha_target = 0.0;
    }

    pub fn reheat(&mut self) {
        self.simulation.alpha = self.simulation.alpha.max(0.5);
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        if self.simulation.config != config {
            self.simulation.config = config;
            self.reheat();
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
