use std::collections::HashMap;

use eframe::egui::Color32;

use crate::media::{Graph, Node, NodeKind, ShelfStatus, relation};

pub const NEUTRAL: Color32 = Color32::from_rgb(0x36, 0x36, 0x46);
pub const LINK_COLOR: Color32 = Color32::from_rgb(0x72, 0x71, 0x69);
pub const SELECTION_STROKE: Color32 = Color32::from_rgb(245, 206, 93);

/// Palette handed out to creators, in assignment order.
pub const CREATOR_PALETTE: [Color32; 15] = [
    Color32::from_rgb(0x76, 0x94, 0x6a),
    Color32::from_rgb(0xc3, 0x40, 0x43),
    Color32::from_rgb(0xdc, 0xa5, 0x61),
    Color32::from_rgb(0xe8, 0x24, 0x24),
    Color32::from_rgb(0xff, 0x9e, 0x3b),
    Color32::from_rgb(0x6a, 0x95, 0x89),
    Color32::from_rgb(0x65, 0x85, 0x94),
    Color32::from_rgb(0x93, 0x8a, 0xa9),
    Color32::from_rgb(0x7e, 0x9c, 0xd8),
    Color32::from_rgb(0x7f, 0xb4, 0xca),
    Color32::from_rgb(0x98, 0xbb, 0x6c),
    Color32::from_rgb(0xd2, 0x7e, 0x99),
    Color32::from_rgb(0xe4, 0x68, 0x76),
    Color32::from_rgb(0xff, 0x5d, 0x62),
    Color32::from_rgb(0xff, 0xa0, 0x66),
];

/// Base fill for a node kind and category.
pub fn color_for(kind: NodeKind, category: Option<&str>) -> Color32 {
    match kind {
        NodeKind::Organizational => Color32::from_rgb(0x9a, 0x9a, 0xa6),
        NodeKind::Shelf => Color32::from_rgb(0xff, 0xbe, 0x0b),
        NodeKind::Tag => Color32::from_rgb(0x06, 0xd6, 0xa0),
        NodeKind::Creator => Color32::from_rgb(0x8a, 0x8f, 0x98),
        NodeKind::Media => match category.map(str::to_ascii_lowercase).as_deref() {
            Some("book" | "edition") => Color32::from_rgb(0x43, 0x61, 0xee),
            Some("movie") => Color32::from_rgb(0xe5, 0x38, 0x3b),
            Some("tv" | "tvseries") => Color32::from_rgb(0x72, 0x09, 0xb7),
            Some("music" | "album") => Color32::from_rgb(0xf7, 0x25, 0x85),
            Some("podcast") => Color32::from_rgb(0x4c, 0xc9, 0xf0),
            Some("game") => Color32::from_rgb(0x4f, 0x77, 0x2d),
            _ => Color32::from_rgb(0x55, 0x55, 0x55),
        },
    }
}

/// Brightness follows shelf status: complete items are shown at full
/// strength, dropped ones are greyed out.
pub fn shelf_modulated(color: Color32, status: Option<ShelfStatus>) -> Color32 {
    match status {
        None | Some(ShelfStatus::Complete) => color,
        Some(ShelfStatus::Progress) => dim_color(color, 0.85),
        Some(ShelfStatus::Wishlist | ShelfStatus::Unknown) => dim_color(color, 0.65),
        Some(ShelfStatus::Dropped) => blend_color(dim_color(color, 0.6), NEUTRAL, 0.6),
    }
}

/// Radius in world units.
pub fn node_radius(node: &Node, degree: usize) -> f32 {
    match node.kind {
        NodeKind::Organizational => 30.0,
        NodeKind::Shelf | NodeKind::Tag => 12.0,
        NodeKind::Media => 8.0 + node.rating.map_or(0.0, |rating| rating / 5.0),
        NodeKind::Creator => 6.0 + (degree.min(16) as f32).sqrt() * 1.5,
    }
}

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| ((from as f32 * (1.0 - amount)) + (to as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

fn closest_palette_color(r: f32, g: f32, b: f32) -> Color32 {
    CREATOR_PALETTE
        .iter()
        .copied()
        .min_by(|left, right| {
            let distance = |color: &Color32| {
                (color.r() as f32 - r).powi(2)
                    + (color.g() as f32 - g).powi(2)
                    + (color.b() as f32 - b).powi(2)
            };
            distance(left).total_cmp(&distance(right))
        })
        .unwrap_or(NEUTRAL)
}

/// Averages `colors` and snaps the result back onto the creator palette.
pub fn blend_palette(colors: &[Color32]) -> Option<Color32> {
    match colors {
        [] => None,
        [single] => Some(*single),
        _ => {
            let count = colors.len() as f32;
            let (r, g, b) = colors.iter().fold((0.0, 0.0, 0.0), |(r, g, b), color| {
                (
                    r + color.r() as f32 / count,
                    g + color.g() as f32 / count,
                    b + color.b() as f32 / count,
                )
            });
            Some(closest_palette_color(r, g, b))
        }
    }
}

fn is_credit(relation_name: &str) -> bool {
    matches!(
        relation_name,
        relation::DIRECTED
            | relation::ACTED_IN
            | relation::WROTE
            | relation::TRANSLATED
            | relation::PERFORMED
    )
}

/// Creator colors for one visualization session. Creators credited on at
/// least one completed item receive palette entries round-robin, in the
/// order they are first asked for.
#[derive(Clone, Debug, Default)]
pub struct ColorAssignmentRegistry {
    assigned: HashMap<String, Color32>,
    next_index: usize,
}

impl ColorAssignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creator_color(&mut self, creator_id: &str) -> Color32 {
        if let Some(color) = self.assigned.get(creator_id) {
            return *color;
        }

        let color = CREATOR_PALETTE[self.next_index % CREATOR_PALETTE.len()];
        self.next_index += 1;
        self.assigned.insert(creator_id.to_owned(), color);
        color
    }

    pub fn assigned(&self, creator_id: &str) -> Option<Color32> {
        self.assigned.get(creator_id).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Fill colors for every node of `graph`, indexed like `graph.nodes()`.
    pub fn node_colors(&mut self, graph: &Graph) -> Vec<Color32> {
        let nodes = graph.nodes();
        let completed = |index: usize| nodes[index].shelf_status == Some(ShelfStatus::Complete);

        let mut credits: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (link, &(source, target)) in graph.links().iter().zip(graph.endpoints()) {
            if !is_credit(&link.relation) {
                continue;
            }
            credits[source].push(target);
            credits[target].push(source);
        }

        for (index, node) in nodes.iter().enumerate() {
            if node.kind == NodeKind::Creator && credits[index].iter().any(|&media| completed(media)) {
                self.creator_color(&node.id);
            }
        }

        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| match node.kind {
                NodeKind::Creator => self
                    .assigned(&node.id)
                    .unwrap_or_else(|| color_for(node.kind, node.category.as_deref())),
                NodeKind::Media if completed(index) => {
                    let creator_colors = credits[index]
                        .iter()
                        .filter(|&&other| nodes[other].kind == NodeKind::Creator)
                        .filter_map(|&other| self.assigned(&nodes[other].id))
                        .collect::<Vec<_>>();
                    blend_palette(&creator_colors)
                        .unwrap_or_else(|| color_for(node.kind, node.category.as_deref()))
                }
                _ => shelf_modulated(
                    color_for(node.kind, node.category.as_deref()),
                    node.shelf_status,
                ),
            })
            .collect()
    }
}
