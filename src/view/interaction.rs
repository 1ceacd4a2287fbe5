use std::time::{Duration, Instant};

use eframe::egui::{Pos2, Vec2};
use tracing::debug;

use crate::media::Graph;

use super::camera::Camera;
use super::neighborhood::Neighborhood;

/// Pointer input in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Moved(Pos2),
    Pressed(Pos2),
    Released(Pos2),
    /// Wheel or pinch; positive `delta` zooms in around `at`.
    Scrolled { at: Pos2, delta: f32 },
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerState {
    Idle,
    Hovering { node: usize },
    Dragging { node: usize, origin: Pos2, moved: bool },
    /// Press on empty background; moving turns it into a pan.
    Selecting { origin: Pos2, last: Pos2, moved: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(usize),
    Cleared,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionResponse {
    /// The layout should be restarted.
    pub reheat: bool,
    pub selection: Option<SelectionChange>,
    pub camera_moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Hit radius in screen pixels, constant across zoom levels.
    pub hit_radius: f32,
    /// Pointer travel, in pixels, after which a press no longer counts as a click.
    pub click_tolerance: f32,
    pub unpin_grace: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_radius: 12.0,
            click_tolerance: 4.0,
            unpin_grace: Duration::from_millis(1500),
        }
    }
}

/// Everything an event may read or change besides the controller itself.
pub struct InteractionContext<'a> {
    pub graph: &'a mut Graph,
    pub camera: &'a mut Camera,
    /// World-space radius per node.
    pub radii: &'a [f32],
    /// Nodes eligible for hit-testing, usually the culled set.
    pub candidates: &'a [usize],
    pub adjacency: &'a [Vec<(usize, usize)>],
    pub now: Instant,
}

pub struct InteractionController {
    config: InteractionConfig,
    state: PointerState,
    selection: Option<Neighborhood>,
    pending_unpins: Vec<(usize, Instant)>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: PointerState::Idle,
            selection: None,
            pending_unpins: Vec::new(),
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn selection(&self) -> Option<&Neighborhood> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.as_ref().map(|neighborhood| neighborhood.center)
    }

    pub fn hovered(&self) -> Option<usize> {
        match self.state {
            PointerState::Hovering { node } | PointerState::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn pending_unpins(&self) -> usize {
        self.pending_unpins.len()
    }

    /// Nearest candidate within the hit radius of `screen`. The radius is a
    /// screen-pixel distance, or the node's own drawn radius when larger.
    pub fn hit_test(
        &self,
        graph: &Graph,
        camera: &Camera,
        radii: &[f32],
        candidates: &[usize],
        screen: Pos2,
    ) -> Option<usize> {
        let world = camera.screen_to_world(screen);
        let reach = camera.screen_to_world_len(self.config.hit_radius);
        let nodes = graph.nodes();

        candidates
            .iter()
            .copied()
            .filter(|&index| index < nodes.len())
            .filter_map(|index| {
                let distance = (nodes[index].pos - world).length();
                let limit = reach.max(radii.get(index).copied().unwrap_or(0.0));
                (distance <= limit).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(index, _)| index)
    }

    pub fn handle(&mut self, event: PointerEvent, context: &mut InteractionContext<'_>) -> InteractionResponse {
        let mut response = InteractionResponse::default();

        match event {
            PointerEvent::Moved(at) => self.on_move(at, context, &mut response),
            PointerEvent::Pressed(at) => self.on_press(at, context, &mut response),
            PointerEvent::Released(at) => self.on_release(at, context, &mut response),
            PointerEvent::Scrolled { at, delta } => {
                let factor = (1.0 + (delta * 0.0018)).clamp(0.85, 1.15);
                context.camera.zoom_at(at, factor);
                response.camera_moved = true;
            }
            PointerEvent::Left => {
                if let PointerState::Dragging { node, .. } = self.state {
                    self.release_pin(node, context);
                }
                self.state = PointerState::Idle;
            }
        }

        response
    }

    fn on_move(&mut self, at: Pos2, context: &mut InteractionContext<'_>, response: &mut InteractionResponse) {
        match self.state {
            PointerState::Dragging { node, origin, moved } => {
                let world = context.camera.screen_to_world(at);
                if let Some(target) = context.graph.nodes_mut().get_mut(node) {
                    target.pin = Some(world);
                    target.pos = world;
                    target.velocity = Vec2::ZERO;
                }
                self.state = PointerState::Dragging {
                    node,
                    origin,
                    moved: moved || origin.distance(at) > self.config.click_tolerance,
                };
            }
            PointerState::Selecting { origin, last, moved } => {
                context.camera.pan_by(at - last);
                response.camera_moved = true;
                self.state = PointerState::Selecting {
                    origin,
                    last: at,
                    moved: moved || origin.distance(at) > self.config.click_tolerance,
                };
            }
            PointerState::Idle | PointerState::Hovering { .. } => {
                self.state = match self.hit_test(
                    context.graph,
                    context.camera,
                    context.radii,
                    context.candidates,
                    at,
                ) {
                    Some(node) => PointerState::Hovering { node },
                    None => PointerState::Idle,
                };
            }
        }
    }

    fn on_press(&mut self, at: Pos2, context: &mut InteractionContext<'_>, response: &mut InteractionResponse) {
        let hit = self.hit_test(
            context.graph,
            context.camera,
            context.radii,
            context.candidates,
            at,
        );

        let Some(node) = hit else {
            self.state = PointerState::Selecting {
                origin: at,
                last: at,
                moved: false,
            };
            return;
        };

        self.pending_unpins.retain(|&(pending, _)| pending != node);
        if let Some(target) = context.graph.nodes_mut().get_mut(node) {
            target.pin = Some(target.pos);
            target.velocity = Vec2::ZERO;
        }
        self.state = PointerState::Dragging {
            node,
            origin: at,
            moved: false,
        };
        response.reheat = true;
    }

    fn on_release(&mut self, at: Pos2, context: &mut InteractionContext<'_>, response: &mut InteractionResponse) {
        match self.state {
            PointerState::Dragging { node, moved, .. } => {
                self.release_pin(node, context);
                if !moved {
                    let change = if self.selected() == Some(node) {
                        self.selection = None;
                        SelectionChange::Cleared
                    } else {
                        self.selection = Some(Neighborhood::collect(context.adjacency, node));
                        SelectionChange::Selected(node)
                    };
                    debug!(?change, "selection toggled");
                    response.selection = Some(change);
                    response.reheat = true;
                }
                self.state = PointerState::Hovering { node };
            }
            PointerState::Selecting { moved, .. } => {
                if !moved && self.selection.take().is_some() {
                    response.selection = Some(SelectionChange::Cleared);
                    response.reheat = true;
                }
                self.state = PointerState::Idle;
                self.on_move(at, context, response);
            }
            PointerState::Idle | PointerState::Hovering { .. } => {}
        }
    }

    /// Anchor kinds keep their pin; everything else is released after the
    /// grace delay.
    fn release_pin(&mut self, node: usize, context: &InteractionContext<'_>) {
        let anchor = context
            .graph
            .nodes()
            .get(node)
            .is_some_and(|target| target.kind.is_anchor());
        if anchor {
            return;
        }

        self.pending_unpins.retain(|&(pending, _)| pending != node);
        self.pending_unpins
            .push((node, context.now + self.config.unpin_grace));
    }

    /// Clears pins whose grace delay has passed. Returns how many were released.
    pub fn expire_pins(&mut self, graph: &mut Graph, now: Instant) -> usize {
        let dragging = match self.state {
            PointerState::Dragging { node, .. } => Some(node),
            _ => None,
        };

        let mut released = 0;
        self.pending_unpins.retain(|&(node, deadline)| {
            if deadline > now || Some(node) == dragging {
                return true;
            }
            if let Some(target) = graph.nodes_mut().get_mut(node) {
                target.pin = None;
                released += 1;
            }
            false
        });
        released
    }

    /// Programmatic selection, as used by search.
    pub fn select(&mut self, node: Option<usize>, adjacency: &[Vec<(usize, usize)>]) {
        self.selection = node.map(|node| Neighborhood::collect(adjacency, node));
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, pos2, vec2};

    use super::*;
    use crate::media::{Link, Node, NodeKind, relation};

    struct Fixture {
        graph: Graph,
        camera: Camera,
        radii: Vec<f32>,
        candidates: Vec<usize>,
        adjacency: Vec<Vec<(usize, usize)>>,
        start: Instant,
    }

    impl Fixture {
        fn new() -> Self {
            let mut graph = Graph::new();
            graph.push_node(Node::new("m1", "Heat", NodeKind::Media));
            graph.push_node(Node::new("c1", "Michael Mann", NodeKind::Creator));
            graph.push_node(Node::new("movies", "Movies", NodeKind::Organizational));
            graph.push_link(Link::new("c1", "m1", relation::DIRECTED));
            graph.push_link(Link::new("movies", "m1", relation::CONTAINS));
            graph.nodes_mut()[0].pos = vec2(0.0, 0.0);
            graph.nodes_mut()[1].pos = vec2(100.0, 0.0);
            graph.nodes_mut()[2].pos = vec2(-150.0, 0.0);

            let adjacency = graph.adjacency();
            Self {
                graph,
                camera: Camera::new(Rect::from_min_size(Pos2::ZERO, vec2(400.0, 400.0)), 0.1, 8.0),
                radii: vec![8.0, 8.0, 30.0],
                candidates: vec![0, 1, 2],
                adjacency,
                start: Instant::now(),
            }
        }

        fn send(
            &mut self,
            controller: &mut InteractionController,
            event: PointerEvent,
            after: Duration,
        ) -> InteractionResponse {
            let mut context = InteractionContext {
                graph: &mut self.graph,
                camera: &mut self.camera,
                radii: &self.radii,
                candidates: &self.candidates,
                adjacency: &self.adjacency,
                now: self.start + after,
            };
            controller.handle(event, &mut context)
        }
    }

    // Graph origin sits at the viewport centre (200, 200).
    fn screen(x: f32, y: f32) -> Pos2 {
        pos2(200.0 + x, 200.0 + y)
    }

    #[test]
    fn hit_radius_is_constant_on_screen() {
        let mut fixture = Fixture::new();
        let controller = InteractionController::new(InteractionConfig::default());

        let hit = |fixture: &Fixture, at| {
            controller.hit_test(&fixture.graph, &fixture.camera, &fixture.radii, &fixture.candidates, at)
        };
        assert_eq!(hit(&fixture, screen(100.0, 11.0)), Some(1));
        assert_eq!(hit(&fixture, screen(100.0, 20.0)), None);

        fixture.camera.set_scale(0.5);
        // 11 screen pixels at half zoom are 22 graph units
        assert_eq!(hit(&fixture, screen(50.0, 11.0)), Some(1));
        assert_eq!(hit(&fixture, screen(50.0, 14.0)), None);
    }

    #[test]
    fn drag_pins_then_releases_after_grace() {
        let mut fixture = Fixture::new();
        let mut controller = InteractionController::new(InteractionConfig::default());

        let pressed = fixture.send(&mut controller, PointerEvent::Pressed(screen(100.0, 0.0)), Duration::ZERO);
        assert!(pressed.reheat);
        assert_eq!(fixture.graph.nodes()[1].pin, Some(vec2(100.0, 0.0)));

        fixture.send(&mut controller, PointerEvent::Moved(screen(120.0, 40.0)), Duration::ZERO);
        assert_eq!(fixture.graph.nodes()[1].pin, Some(vec2(120.0, 40.0)));
        assert_eq!(fixture.graph.nodes()[1].pos, vec2(120.0, 40.0));

        let released = fixture.send(
            &mut controller,
            PointerEvent::Released(screen(120.0, 40.0)),
            Duration::from_millis(10),
        );
        assert_eq!(released.selection, None);
        assert_eq!(controller.pending_unpins(), 1);

        let early = fixture.start + Duration::from_millis(500);
        assert_eq!(controller.expire_pins(&mut fixture.graph, early), 0);
        assert!(fixture.graph.nodes()[1].pin.is_some());

        let late = fixture.start + Duration::from_secs(2);
        assert_eq!(controller.expire_pins(&mut fixture.graph, late), 1);
        assert_eq!(fixture.graph.nodes()[1].pin, None);
    }

    #[test]
    fn anchors_stay_pinned() {
        let mut fixture = Fixture::new();
        let mut controller = InteractionController::new(InteractionConfig::default());

        fixture.send(&mut controller, PointerEvent::Pressed(screen(-150.0, 0.0)), Duration::ZERO);
        fixture.send(&mut controller, PointerEvent::Moved(screen(-180.0, 30.0)), Duration::ZERO);
        fixture.send(&mut controller, PointerEvent::Released(screen(-180.0, 30.0)), Duration::ZERO);

        assert_eq!(controller.pending_unpins(), 0);
        controller.expire_pins(&mut fixture.graph, fixture.start + Duration::from_secs(10));
        assert_eq!(fixture.graph.nodes()[2].pin, Some(vec2(-180.0, 30.0)));
    }

    #[test]
    fn click_toggles_selection_and_background_clears_it() {
        let mut fixture = Fixture::new();
        let mut controller = InteractionController::new(InteractionConfig::default());

        fixture.send(&mut controller, PointerEvent::Pressed(screen(0.0, 0.0)), Duration::ZERO);
        let clicked = fixture.send(&mut controller, PointerEvent::Released(screen(0.0, 0.0)), Duration::ZERO);
        assert_eq!(clicked.selection, Some(SelectionChange::Selected(0)));
        let neighborhood = controller.selection().expect("selected");
        assert!(neighborhood.contains_node(1) && neighborhood.contains_node(2));

        fixture.send(&mut controller, PointerEvent::Pressed(screen(0.0, 0.0)), Duration::ZERO);
        let again = fixture.send(&mut controller, PointerEvent::Released(screen(0.0, 0.0)), Duration::ZERO);
        assert_eq!(again.selection, Some(SelectionChange::Cleared));
        assert_eq!(controller.selected(), None);

        fixture.send(&mut controller, PointerEvent::Pressed(screen(0.0, 0.0)), Duration::ZERO);
        fixture.send(&mut controller, PointerEvent::Released(screen(0.0, 0.0)), Duration::ZERO);
        fixture.send(&mut controller, PointerEvent::Pressed(screen(60.0, 120.0)), Duration::ZERO);
        let background = fixture.send(&mut controller, PointerEvent::Released(screen(60.0, 120.0)), Duration::ZERO);
        assert_eq!(background.selection, Some(SelectionChange::Cleared));
        assert_eq!(controller.state(), PointerState::Idle);
    }

    #[test]
    fn background_drag_pans_and_scroll_zooms_within_range() {
        let mut fixture = Fixture::new();
        let mut controller = InteractionController::new(InteractionConfig::default());

        fixture.send(&mut controller, PointerEvent::Pressed(screen(60.0, 120.0)), Duration::ZERO);
        let moved = fixture.send(&mut controller, PointerEvent::Moved(screen(90.0, 100.0)), Duration::ZERO);
        assert!(moved.camera_moved);
        assert_eq!(fixture.camera.pan(), vec2(30.0, -20.0));
        let released = fixture.send(&mut controller, PointerEvent::Released(screen(90.0, 100.0)), Duration::ZERO);
        assert_eq!(released.selection, None);

        for _ in 0..200 {
            fixture.send(
                &mut controller,
                PointerEvent::Scrolled { at: screen(0.0, 0.0), delta: 400.0 },
                Duration::ZERO,
            );
        }
        assert_eq!(fixture.camera.zoom(), 8.0);
    }
}
