//! Alpha-scheduled force simulation over the positions stored on graph nodes.

mod forces;
mod quadtree;

use std::time::{Duration, Instant};

use eframe::egui::{Vec2, vec2};
use serde::Deserialize;
use tracing::{debug, info};

use crate::media::{Graph, Link, Node, NodeKind, relation};
use crate::util::stable_pair;
use crate::view::node_radius;

use forces::{
    CollisionParams, Spring, accumulate_centering, accumulate_charge_for_node,
    accumulate_collision_pairs, accumulate_springs,
};
use quadtree::QuadNode;

const INITIAL_RADIUS: f32 = 10.0;
const INITIAL_JITTER: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargeStrengths {
    pub organizational: f32,
    pub shelf: f32,
    pub tag: f32,
    pub other: f32,
}

impl Default for ChargeStrengths {
    fn default() -> Self {
        Self {
            organizational: -2000.0,
            shelf: -500.0,
            tag: -500.0,
            other: -200.0,
        }
    }
}

impl ChargeStrengths {
    pub fn for_kind(&self, kind: NodeKind) -> f32 {
        match kind {
            NodeKind::Organizational => self.organizational,
            NodeKind::Shelf => self.shelf,
            NodeKind::Tag => self.tag,
            NodeKind::Media | NodeKind::Creator => self.other,
        }
    }
}

/// Rest lengths of link springs, longest for the overview scaffold.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkDistances {
    pub overview: f32,
    pub shelf_or_tag: f32,
    pub derived: f32,
    pub other: f32,
}

impl Default for LinkDistances {
    fn default() -> Self {
        Self {
            overview: 200.0,
            shelf_or_tag: 150.0,
            derived: 110.0,
            other: 80.0,
        }
    }
}

impl LinkDistances {
    pub fn for_link(&self, link: &Link, source: &Node, target: &Node) -> f32 {
        match link.relation.as_str() {
            relation::CONTAINS | relation::RELATED => self.overview,
            relation::HAS_TAG => self.shelf_or_tag,
            _ if matches!(source.kind, NodeKind::Shelf | NodeKind::Tag)
                || matches!(target.kind, NodeKind::Shelf | NodeKind::Tag) =>
            {
                self.shelf_or_tag
            }
            relation::WORKED_WITH | relation::CO_ACTOR => self.derived,
            _ => self.other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub restart_alpha: f64,
    /// Below this alpha the engine reports `Cooling`.
    pub cooling_alpha: f64,
    /// Fraction of velocity removed each tick.
    pub velocity_decay: f32,
    pub center_strength: f32,
    pub collision_strength: f32,
    pub collision_padding: f32,
    pub theta: f32,
    pub charges: ChargeStrengths,
    pub link_distances: LinkDistances,
    /// Ticks allowed per run before the engine stops regardless of alpha.
    pub max_ticks: Option<usize>,
    /// Wall-clock allowance per run, in milliseconds.
    pub time_budget_ms: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            restart_alpha: 0.3,
            cooling_alpha: 0.1,
            velocity_decay: 0.4,
            center_strength: 0.01,
            collision_strength: 0.7,
            collision_padding: 10.0,
            theta: 0.72,
            charges: ChargeStrengths::default(),
            link_distances: LinkDistances::default(),
            max_ticks: None,
            time_budget_ms: None,
        }
    }
}

impl LayoutConfig {
    pub fn ticks_to_converge(&self) -> usize {
        ticks_to_converge(self.alpha_min, self.alpha_decay)
    }
}

/// Number of ticks a run started at `alpha = 1` takes to fall below
/// `alpha_min`. Depends only on the decay schedule.
///
/// This is the smallest `k` with `(1 - r)^k < alpha_min`, i.e.
/// `ceil(ln(alpha_min) / ln(1 - r))`, plus one when `alpha_min` is an exact
/// power of `1 - r`. The logarithm only seeds the count; the last steps
/// repeat the engine's own multiplication so float rounding agrees with it.
pub fn ticks_to_converge(alpha_min: f64, alpha_decay: f64) -> usize {
    if alpha_min > 1.0 {
        return 0;
    }
    if alpha_decay <= 0.0 || alpha_min <= 0.0 {
        return usize::MAX;
    }
    if alpha_decay >= 1.0 {
        return 1;
    }

    let keep = 1.0 - alpha_decay;
    let estimate = (alpha_min.ln() / keep.ln()).floor().max(0.0) as usize;
    let mut ticks = estimate.saturating_sub(2);
    let mut alpha = 1.0_f64;
    for _ in 0..ticks {
        alpha *= keep;
    }
    while alpha >= alpha_min {
        alpha *= keep;
        ticks += 1;
    }
    ticks
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutState {
    Idle,
    Running { alpha: f64 },
    Cooling { alpha: f64 },
    Stopped,
}

impl LayoutState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running { .. } | Self::Cooling { .. })
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    forces: Vec<Vec2>,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    alpha: f64,
    state: LayoutState,
    ticks: usize,
    run_started: Option<Instant>,
    charges: Vec<f32>,
    radii: Vec<f32>,
    springs: Vec<Spring>,
    scratch: Scratch,
}

impl LayoutEngine {
    /// Prepares per-node and per-link force parameters for `graph`. The node
    /// and link sets must not change while the engine drives this graph.
    pub fn new(config: LayoutConfig, graph: &Graph) -> Self {
        let degrees = graph.degrees();
        let nodes = graph.nodes();

        let charges = nodes
            .iter()
            .map(|node| config.charges.for_kind(node.kind))
            .collect();
        let radii = nodes
            .iter()
            .zip(&degrees)
            .map(|(node, &degree)| node_radius(node, degree))
            .collect();
        let springs = graph
            .links()
            .iter()
            .zip(graph.endpoints())
            .filter(|(_, (source, target))| source != target)
            .map(|(link, &(source, target))| {
                let source_degree = degrees[source].max(1) as f32;
                let target_degree = degrees[target].max(1) as f32;
                Spring {
                    source,
                    target,
                    distance: config
                        .link_distances
                        .for_link(link, &nodes[source], &nodes[target]),
                    strength: 1.0 / source_degree.min(target_degree),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        Self {
            config,
            alpha: 0.0,
            state: LayoutState::Idle,
            ticks: 0,
            run_started: None,
            charges,
            radii,
            springs,
            scratch: Scratch::default(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Ticks performed since the last start or restart.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn radius(&self, index: usize) -> f32 {
        self.radii.get(index).copied().unwrap_or(0.0)
    }

    /// Places every node on a phyllotaxis spiral, offset by a small jitter
    /// derived from its id. Pinned nodes start at their pin.
    pub fn seed_positions(&self, graph: &mut Graph) {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
            node.velocity = Vec2::ZERO;
            if let Some(pin) = node.pin {
                node.pos = pin;
                continue;
            }

            let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            let (jitter_x, jitter_y) = stable_pair(&node.id);
            node.pos = vec2(angle.cos(), angle.sin()) * radius
                + vec2(jitter_x, jitter_y) * INITIAL_JITTER;
        }
    }

    pub fn start(&mut self) {
        self.begin_run(1.0);
        info!(
            bodies = self.radii.len(),
            springs = self.springs.len(),
            "layout started"
        );
    }

    /// Reheats the simulation after a perturbation. An engine that is
    /// hotter than the restart value keeps its current alpha.
    pub fn restart(&mut self) {
        let alpha = self.alpha.max(self.config.restart_alpha);
        self.begin_run(alpha);
        debug!(alpha, "layout restarted");
    }

    pub fn stop(&mut self) {
        self.state = LayoutState::Stopped;
        self.run_started = None;
    }

    fn begin_run(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.ticks = 0;
        self.run_started = Some(Instant::now());
        self.state = self.state_for_alpha();
    }

    fn state_for_alpha(&self) -> LayoutState {
        if self.alpha < self.config.alpha_min {
            LayoutState::Stopped
        } else if self.alpha < self.config.cooling_alpha {
            LayoutState::Cooling { alpha: self.alpha }
        } else {
            LayoutState::Running { alpha: self.alpha }
        }
    }

    /// Advances the simulation by one step. Returns false without touching
    /// the graph when the engine is idle or stopped.
    pub fn tick(&mut self, graph: &mut Graph) -> bool {
        if !self.state.is_active() {
            return false;
        }

        self.apply_forces(graph);
        self.ticks += 1;
        self.alpha *= 1.0 - self.config.alpha_decay;
        self.state = self.state_for_alpha();

        if self.state.is_active() && self.budget_exhausted() {
            debug!(ticks = self.ticks, "layout budget exhausted");
            self.state = LayoutState::Stopped;
        }
        if self.state == LayoutState::Stopped {
            self.run_started = None;
            info!(ticks = self.ticks, alpha = self.alpha, "layout settled");
        }
        true
    }

    fn budget_exhausted(&self) -> bool {
        let over_ticks = self
            .config
            .max_ticks
            .is_some_and(|max_ticks| self.ticks >= max_ticks);
        let over_time = match (self.config.time_budget_ms, self.run_started) {
            (Some(budget), Some(started)) => started.elapsed() >= Duration::from_millis(budget),
            _ => false,
        };
        over_ticks || over_time
    }

    fn apply_forces(&mut self, graph: &mut Graph) {
        let node_count = graph.node_count().min(self.radii.len());
        let alpha = self.alpha as f32;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        for node in &graph.nodes()[..node_count] {
            scratch.positions.push(node.pos);
            scratch.velocities.push(node.velocity);
        }
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);

        let positions = &scratch.positions;
        let forces = &mut scratch.forces;
        let charges = &self.charges[..node_count];
        let radii = &self.radii[..node_count];

        if let Some(tree) = QuadNode::build(positions, charges) {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_charge_for_node(
                    &tree,
                    index,
                    positions,
                    charges,
                    self.config.theta,
                    alpha,
                    force,
                );
            }

            let max_radius = radii.iter().copied().fold(0.0_f32, f32::max);
            let reach = (max_radius + self.config.collision_padding) * 2.0;
            if reach > 0.0 && self.config.collision_strength > 0.0 {
                accumulate_collision_pairs(
                    &tree,
                    &tree,
                    true,
                    positions,
                    radii,
                    CollisionParams {
                        strength: self.config.collision_strength,
                        padding: self.config.collision_padding,
                        max_distance_sq: reach * reach,
                    },
                    forces,
                );
            }
        }

        accumulate_springs(
            &self.springs,
            positions,
            &scratch.velocities,
            alpha,
            forces,
        );
        accumulate_centering(positions, self.config.center_strength, alpha, forces);

        let friction = 1.0 - self.config.velocity_decay.clamp(0.0, 1.0);
        for (node, force) in graph.nodes_mut()[..node_count].iter_mut().zip(forces.iter()) {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = (node.velocity + *force) * friction;
            if velocity.is_finite() {
                node.velocity = velocity;
                node.pos += velocity;
            } else {
                node.velocity = Vec2::ZERO;
            }
        }
    }
}
