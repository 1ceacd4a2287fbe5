use std::collections::BTreeSet;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Stroke, vec2};

use crate::media::Graph;
use crate::util::truncate_label;

use super::camera::Camera;
use super::cull::CullResult;
use super::neighborhood::Neighborhood;
use super::style::{LINK_COLOR, SELECTION_STROKE, blend_color, dim_color};

/// Drawing target. Labels are anchored at their left-centre point.
pub trait Surface {
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke);
    fn text(&mut self, anchor: Pos2, text: &str, size: f32, color: Color32);
}

impl Surface for Painter {
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.line_segment([from, to], stroke);
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        Painter::circle(self, center, radius, fill, stroke);
    }

    fn text(&mut self, anchor: Pos2, text: &str, size: f32, color: Color32) {
        Painter::text(
            self,
            anchor,
            Align2::LEFT_CENTER,
            text,
            FontId::proportional(size),
            color,
        );
    }
}

/// What the current selection or filter puts in front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Emphasis {
    #[default]
    None,
    Selection(Neighborhood),
    Matches {
        nodes: BTreeSet<usize>,
        links: BTreeSet<usize>,
    },
}

impl Emphasis {
    /// Emphasis for a set of matching nodes and the links among them.
    pub fn matches(graph: &Graph, nodes: BTreeSet<usize>) -> Self {
        let links = graph
            .endpoints()
            .iter()
            .enumerate()
            .filter(|&(_, &(source, target))| nodes.contains(&source) && nodes.contains(&target))
            .map(|(index, _)| index)
            .collect();
        Self::Matches { nodes, links }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn selected(&self) -> Option<usize> {
        match self {
            Self::Selection(neighborhood) => Some(neighborhood.center),
            _ => None,
        }
    }

    pub fn neighborhood(&self) -> Option<&Neighborhood> {
        match self {
            Self::Selection(neighborhood) => Some(neighborhood),
            _ => None,
        }
    }

    pub fn node(&self, index: usize) -> bool {
        match self {
            Self::None => false,
            Self::Selection(neighborhood) => neighborhood.contains_node(index),
            Self::Matches { nodes, .. } => nodes.contains(&index),
        }
    }

    pub fn link(&self, index: usize) -> bool {
        match self {
            Self::None => false,
            Self::Selection(neighborhood) => neighborhood.contains_link(index),
            Self::Matches { links, .. } => links.contains(&index),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub links: usize,
    pub nodes: usize,
    pub labels: usize,
}

/// Per-node appearance computed once per session.
pub struct NodeStyles<'a> {
    pub colors: &'a [Color32],
    pub radii: &'a [f32],
}

pub struct Renderer {
    label_min_zoom: f32,
    label_max_chars: usize,
}

impl Renderer {
    pub fn new(label_min_zoom: f32, label_max_chars: usize) -> Self {
        Self {
            label_min_zoom,
            label_max_chars: label_max_chars.max(2),
        }
    }

    /// Draws links, then nodes, then labels. Within each layer the
    /// emphasized elements go on top of the rest.
    pub fn render(
        &self,
        graph: &Graph,
        culled: &CullResult,
        camera: &Camera,
        emphasis: &Emphasis,
        styles: &NodeStyles<'_>,
        surface: &mut dyn Surface,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let zoom = camera.zoom();
        let zoom_sqrt = zoom.sqrt();
        let dimming = emphasis.is_active();
        let nodes = graph.nodes();
        let endpoints = graph.endpoints();

        let screen = |index: usize| camera.world_to_screen(nodes[index].pos);
        let screen_radius = |index: usize| {
            (styles.radii.get(index).copied().unwrap_or(6.0) * zoom).max(1.5)
        };
        let fill = |index: usize| styles.colors.get(index).copied().unwrap_or(LINK_COLOR);

        for highlighted in [false, true] {
            for &link in &culled.links {
                if emphasis.link(link) != highlighted {
                    continue;
                }
                let Some(&(source, target)) = endpoints.get(link) else {
                    continue;
                };

                let stroke = if highlighted {
                    Stroke::new((2.2 * zoom_sqrt).clamp(1.2, 4.4), blend_color(LINK_COLOR, SELECTION_STROKE, 0.55))
                } else if dimming {
                    Stroke::new((0.8 * zoom_sqrt).clamp(0.45, 2.0), dim_color(LINK_COLOR, 0.35))
                } else {
                    Stroke::new((1.1 * zoom_sqrt).clamp(0.6, 3.4), LINK_COLOR)
                };
                surface.line(screen(source), screen(target), stroke);
                stats.links += 1;
            }
        }

        let selected = emphasis.selected();
        for highlighted in [false, true] {
            for &index in &culled.nodes {
                if emphasis.node(index) != highlighted || index >= nodes.len() {
                    continue;
                }

                let color = if dimming && !highlighted {
                    dim_color(fill(index), 0.35)
                } else {
                    fill(index)
                };
                let stroke = if selected == Some(index) {
                    Stroke::new(2.5, SELECTION_STROKE)
                } else {
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(240, 240, 240, 170))
                };
                surface.circle(screen(index), screen_radius(index), color, stroke);
                stats.nodes += 1;
            }
        }

        for highlighted in [false, true] {
            for &index in &culled.nodes {
                if emphasis.node(index) != highlighted || index >= nodes.len() {
                    continue;
                }
                if !highlighted && zoom < self.label_min_zoom {
                    continue;
                }

                let node = &nodes[index];
                let (label, color) = if highlighted {
                    (node.name.clone(), Color32::from_gray(245))
                } else if dimming {
                    (truncate_label(&node.name, self.label_max_chars), Color32::from_gray(120))
                } else {
                    (truncate_label(&node.name, self.label_max_chars), Color32::from_gray(220))
                };
                let size = if selected == Some(index) { 14.0 } else { 11.0 };
                let anchor = screen(index) + vec2(screen_radius(index) + 4.0, 0.0);
                surface.text(anchor, &label, size, color);
                stats.labels += 1;
            }
        }

        stats
    }
}
