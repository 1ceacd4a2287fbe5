use serde::Deserialize;
use tracing::debug;

use crate::media::Graph;

use super::camera::Camera;
use super::neighborhood::Neighborhood;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CullBudget {
    /// Hard cap on nodes handed to the renderer.
    pub max_nodes: usize,
}

impl Default for CullBudget {
    fn default() -> Self {
        Self { max_nodes: 400 }
    }
}

/// Indices into `graph.nodes()` and `graph.links()` to draw this frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CullResult {
    pub nodes: Vec<usize>,
    pub links: Vec<usize>,
    /// True when the degree-ranked budget cut nodes.
    pub budget_applied: bool,
}

pub struct ViewportCuller {
    budget: CullBudget,
    margin: f32,
    /// Node indices by descending degree, ties by index.
    ranked: Vec<usize>,
}

impl ViewportCuller {
    pub fn new(budget: CullBudget, margin: f32, graph: &Graph) -> Self {
        let degrees = graph.degrees();
        let mut ranked = (0..graph.node_count()).collect::<Vec<_>>();
        ranked.sort_by(|&a, &b| degrees[b].cmp(&degrees[a]).then(a.cmp(&b)));

        Self {
            budget,
            margin,
            ranked,
        }
    }

    pub fn budget(&self) -> CullBudget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: CullBudget) {
        self.budget = budget;
    }

    /// A selection returns exactly its closed neighborhood. Otherwise graphs
    /// larger than the budget keep their highest-degree nodes and only the
    /// links between survivors; the viewport test then runs on what is left.
    pub fn cull(&self, graph: &Graph, camera: &Camera, selection: Option<&Neighborhood>) -> CullResult {
        if let Some(neighborhood) = selection {
            return CullResult {
                nodes: neighborhood.nodes.iter().copied().collect(),
                links: neighborhood.links.iter().copied().collect(),
                budget_applied: false,
            };
        }

        let node_count = graph.node_count();
        let budget_applied = node_count > self.budget.max_nodes;
        let mut kept = vec![!budget_applied; node_count];
        if budget_applied {
            for &index in self.ranked.iter().take(self.budget.max_nodes) {
                kept[index] = true;
            }
            debug!(
                total = node_count,
                kept = self.budget.max_nodes,
                "node budget applied"
            );
        }

        let view = camera.visible_world_rect(self.margin);
        let visible = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| kept[index] && view.contains(node.pos.to_pos2()))
            .collect::<Vec<_>>();

        let links = graph
            .endpoints()
            .iter()
            .enumerate()
            .filter(|&(_, &(source, target))| {
                if budget_applied {
                    visible[source] && visible[target]
                } else {
                    visible[source] || visible[target]
                }
            })
            .map(|(index, _)| index)
            .collect();

        CullResult {
            nodes: (0..node_count).filter(|&index| visible[index]).collect(),
            links,
            budget_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Pos2, Rect, vec2};

    use super::*;
    use crate::media::{Link, Node, NodeKind, relation};

    fn camera() -> Camera {
        Camera::new(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)), 0.1, 8.0)
    }

    fn star_graph() -> Graph {
        let mut graph = Graph::new();
        graph.push_node(Node::new("hub", "hub", NodeKind::Media));
        for index in 0..4 {
            let id = format!("leaf{index}");
            let mut node = Node::new(id.as_str(), id.as_str(), NodeKind::Creator);
            node.pos = vec2(30.0 * index as f32, 10.0);
            graph.push_node(node);
            graph.push_link(Link::new(id.as_str(), "hub", relation::ACTED_IN));
        }
        graph
    }

    #[test]
    fn nodes_outside_view_plus_margin_are_dropped() {
        let mut graph = star_graph();
        graph.nodes_mut()[1].pos = vec2(5000.0, 0.0);
        graph.nodes_mut()[2].pos = vec2(420.0, 0.0);

        let culler = ViewportCuller::new(CullBudget::default(), 40.0, &graph);
        let result = culler.cull(&graph, &camera(), None);

        assert!(!result.nodes.contains(&1));
        assert!(result.nodes.contains(&2));
        // hub is visible, so its link to the far leaf is still drawn
        assert!(result.links.contains(&0));
    }

    #[test]
    fn budget_keeps_highest_degree_nodes() {
        let graph = star_graph();
        let culler = ViewportCuller::new(CullBudget { max_nodes: 2 }, 40.0, &graph);
        let result = culler.cull(&graph, &camera(), None);

        assert!(result.budget_applied);
        assert_eq!(result.nodes, vec![0, 1]);
        assert_eq!(result.links, vec![0]);
    }

    #[test]
    fn selection_overrides_budget_and_viewport() {
        let mut graph = star_graph();
        graph.nodes_mut()[3].pos = vec2(9000.0, 9000.0);
        let culler = ViewportCuller::new(CullBudget { max_nodes: 1 }, 0.0, &graph);
        let neighborhood = Neighborhood::collect(&graph.adjacency(), 0);

        let result = culler.cull(&graph, &camera(), Some(&neighborhood));
        assert_eq!(result.nodes, vec![0, 1, 2, 3, 4]);
        assert_eq!(result.links, vec![0, 1, 2, 3]);
        assert!(!result.budget_applied);
    }
}
