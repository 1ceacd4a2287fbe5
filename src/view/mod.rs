//! Camera, culling, styling, rendering and pointer handling, tied together
//! by [`GraphView`].

mod camera;
mod cull;
mod interaction;
mod neighborhood;
mod render;
mod search;
mod style;

use std::collections::BTreeSet;
use std::time::Instant;

use eframe::egui::{Color32, Pos2, Rect, vec2};
use tracing::{debug, info};

use crate::config::{ViewConfig, VisualizationConfig};
use crate::error::{GraphError, Result};
use crate::layout::{LayoutEngine, LayoutState};
use crate::media::{Graph, Node, NodeKind};

pub use camera::Camera;
pub use cull::{CullBudget, CullResult, ViewportCuller};
pub use interaction::{
    InteractionConfig, InteractionContext, InteractionController, InteractionResponse,
    PointerEvent, PointerState, SelectionChange,
};
pub use neighborhood::Neighborhood;
pub use render::{Emphasis, NodeStyles, RenderStats, Renderer, Surface};
pub use search::search_by_name;
pub use style::{
    CREATOR_PALETTE, ColorAssignmentRegistry, blend_color, blend_palette, color_for, dim_color,
    node_radius, shelf_modulated,
};

const ALL_CATEGORIES: &str = "all";

/// One visualization session over a loaded graph.
pub struct GraphView {
    graph: Graph,
    adjacency: Vec<Vec<(usize, usize)>>,
    engine: LayoutEngine,
    culler: ViewportCuller,
    renderer: Renderer,
    interaction: InteractionController,
    camera: Camera,
    registry: ColorAssignmentRegistry,
    colors: Vec<Color32>,
    radii: Vec<f32>,
    config: ViewConfig,
    category_filter: Option<String>,
    type_filter: Option<NodeKind>,
    /// Emphasis from filters or search; a selection takes precedence.
    filter_emphasis: Emphasis,
    selection_emphasis: Emphasis,
    culled: CullResult,
}

impl GraphView {
    /// Takes ownership of `graph` and starts its layout. A second view needs
    /// a fresh graph, so no state is shared between sessions.
    pub fn init(graph: Graph, config: &VisualizationConfig, viewport: Rect) -> Result<Self> {
        if graph.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let mut graph = graph;
        let adjacency = graph.adjacency();
        let engine = LayoutEngine::new(config.layout.clone(), &graph);
        engine.seed_positions(&mut graph);

        let degrees = graph.degrees();
        let radii = graph
            .nodes()
            .iter()
            .zip(&degrees)
            .map(|(node, &degree)| node_radius(node, degree))
            .collect();
        let mut registry = ColorAssignmentRegistry::new();
        let colors = registry.node_colors(&graph);

        let view = &config.view;
        let mut camera = Camera::new(viewport, view.min_scale, view.max_scale);
        camera.reset(view.initial_scale);

        let mut session = Self {
            culler: ViewportCuller::new(config.cull, view.viewport_margin, &graph),
            renderer: Renderer::new(view.label_min_zoom, view.label_max_chars),
            interaction: InteractionController::new(view.interaction()),
            graph,
            adjacency,
            engine,
            camera,
            registry,
            colors,
            radii,
            config: view.clone(),
            category_filter: None,
            type_filter: None,
            filter_emphasis: Emphasis::None,
            selection_emphasis: Emphasis::None,
            culled: CullResult::default(),
        };
        session.engine.start();
        session.refresh_cull();

        info!(
            nodes = session.graph.node_count(),
            links = session.graph.link_count(),
            creators_colored = session.registry.len(),
            "view initialized"
        );
        Ok(session)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layout_state(&self) -> LayoutState {
        self.engine.state()
    }

    pub fn culled(&self) -> &CullResult {
        &self.culled
    }

    pub fn node_color(&self, index: usize) -> Option<Color32> {
        self.colors.get(index).copied()
    }

    pub fn selected(&self) -> Option<&Node> {
        self.interaction
            .selected()
            .and_then(|index| self.graph.nodes().get(index))
    }

    pub fn hovered(&self) -> Option<&Node> {
        self.interaction
            .hovered()
            .and_then(|index| self.graph.nodes().get(index))
    }

    pub fn emphasis(&self) -> &Emphasis {
        if self.selection_emphasis.is_active() {
            &self.selection_emphasis
        } else {
            &self.filter_emphasis
        }
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    pub fn type_filter(&self) -> Option<NodeKind> {
        self.type_filter
    }

    /// New viewport size; a missing dimension keeps its current value.
    pub fn resize(&mut self, width: Option<f32>, height: Option<f32>) {
        let current = self.camera.viewport();
        let size = vec2(
            width.unwrap_or(current.width()).max(1.0),
            height.unwrap_or(current.height()).max(1.0),
        );
        self.set_viewport(Rect::from_min_size(current.min, size));
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.camera.viewport() != viewport {
            self.camera.set_viewport(viewport);
            self.refresh_cull();
        }
    }

    pub fn zoom_in(&mut self) {
        let center = self.camera.viewport().center();
        self.camera.zoom_at(center, self.config.zoom_in_factor);
        self.refresh_cull();
    }

    pub fn zoom_out(&mut self) {
        let center = self.camera.viewport().center();
        self.camera.zoom_at(center, self.config.zoom_out_factor);
        self.refresh_cull();
    }

    pub fn reset_view(&mut self) {
        self.camera.reset(self.config.initial_scale);
        self.refresh_cull();
    }

    /// `"all"` clears the category filter. Returns the number of matching nodes.
    pub fn filter_by_category(&mut self, category: &str) -> usize {
        let category = category.trim();
        self.category_filter = (!category.is_empty() && !category.eq_ignore_ascii_case(ALL_CATEGORIES))
            .then(|| category.to_lowercase());
        self.apply_filters()
    }

    /// `None` clears the kind filter. Returns the number of matching nodes.
    pub fn filter_by_type(&mut self, kind: Option<NodeKind>) -> usize {
        self.type_filter = kind;
        self.apply_filters()
    }

    fn apply_filters(&mut self) -> usize {
        let matched = self.refresh_filter_emphasis();
        debug!(
            category = self.category_filter.as_deref(),
            kind = self.type_filter.map(NodeKind::label),
            matched,
            "filters applied"
        );
        self.engine.restart();
        self.refresh_cull();
        matched
    }

    /// Recomputes the emphasis implied by the active filters alone.
    fn refresh_filter_emphasis(&mut self) -> usize {
        if self.category_filter.is_none() && self.type_filter.is_none() {
            self.filter_emphasis = Emphasis::None;
            self.graph.node_count()
        } else {
            let nodes = self
                .graph
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| {
                    self.category_filter
                        .as_deref()
                        .is_none_or(|category| node.category_is(category))
                        && self.type_filter.is_none_or(|kind| node.kind == kind)
                })
                .map(|(index, _)| index)
                .collect::<BTreeSet<_>>();
            let matched = nodes.len();
            self.filter_emphasis = Emphasis::matches(&self.graph, nodes);
            matched
        }
    }

    /// Matching nodes, best first. A single hit is selected and centred
    /// at the focus scale; several hits are emphasized. With no hit the
    /// active filters decide the emphasis again.
    pub fn search_by_name(&mut self, query: &str) -> Vec<&Node> {
        let hits = search_by_name(&self.graph, query);

        match hits.as_slice() {
            [] => {
                self.refresh_filter_emphasis();
            }
            [single] => {
                let index = *single;
                self.select(Some(index));
                self.camera
                    .center_on(self.graph.nodes()[index].pos, self.config.focus_scale);
            }
            _ => {
                self.filter_emphasis =
                    Emphasis::matches(&self.graph, hits.iter().copied().collect());
            }
        }
        self.refresh_cull();

        let nodes = self.graph.nodes();
        hits.into_iter().map(|index| &nodes[index]).collect()
    }

    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|&index| index < self.graph.node_count());
        self.interaction.select(index, &self.adjacency);
        self.sync_selection();
        self.engine.restart();
        self.refresh_cull();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> InteractionResponse {
        let mut context = InteractionContext {
            graph: &mut self.graph,
            camera: &mut self.camera,
            radii: &self.radii,
            candidates: &self.culled.nodes,
            adjacency: &self.adjacency,
            now,
        };
        let response = self.interaction.handle(event, &mut context);

        if response.selection.is_some() {
            self.sync_selection();
        }
        if response.reheat {
            self.engine.restart();
        }
        if response.camera_moved || response.selection.is_some() {
            self.refresh_cull();
        }
        response
    }

    /// One animation frame: releases expired pins, advances the layout and
    /// recomputes the visible set. Returns true while anything is moving.
    pub fn frame(&mut self, now: Instant) -> bool {
        self.interaction.expire_pins(&mut self.graph, now);
        let moved = self.engine.tick(&mut self.graph);
        self.refresh_cull();
        moved || self.interaction.pending_unpins() > 0
    }

    pub fn paint(&self, surface: &mut dyn Surface) -> RenderStats {
        let styles = NodeStyles {
            colors: &self.colors,
            radii: &self.radii,
        };
        self.renderer.render(
            &self.graph,
            &self.culled,
            &self.camera,
            self.emphasis(),
            &styles,
            surface,
        )
    }

    /// Screen position of a node, for overlays drawn by the host.
    pub fn screen_position(&self, index: usize) -> Option<Pos2> {
        self.graph
            .nodes()
            .get(index)
            .map(|node| self.camera.world_to_screen(node.pos))
    }

    fn sync_selection(&mut self) {
        self.selection_emphasis = match self.interaction.selection() {
            Some(neighborhood) => Emphasis::Selection(neighborhood.clone()),
            None => Emphasis::None,
        };
    }

    fn refresh_cull(&mut self) {
        self.culled = self
            .culler
            .cull(&self.graph, &self.camera, self.interaction.selection());
    }
}
