use eframe::egui::{Vec2, vec2};

const LEAF_BODIES: usize = 12;
const DEPTH_LIMIT: usize = 10;

/// Axis-aligned square cell: lower corner plus side length.
#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    min: Vec2,
    side: f32,
}

impl QuadBounds {
    fn around(points: &[Vec2]) -> Option<Self> {
        let (low, high) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(low, high), point| (low.min(*point), high.max(*point)),
        );
        if !(low.is_finite() && high.is_finite()) {
            return None;
        }

        // Pad by one unit so bodies on the edge stay strictly inside.
        let side = (high - low).max_elem().max(1.0) + 2.0;
        let middle = (low + high) * 0.5;
        Some(Self {
            min: middle - Vec2::splat(side * 0.5),
            side,
        })
    }

    fn middle(self) -> Vec2 {
        self.min + Vec2::splat(self.side * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let local = point - self.min;
        (0.0..=self.side).contains(&local.x) && (0.0..=self.side).contains(&local.y)
    }

    /// Quadrant index: bit 0 set for the right half, bit 1 for the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        let middle = self.middle();
        usize::from(point.x >= middle.x) | (usize::from(point.y >= middle.y) << 1)
    }

    fn sub_cell(self, quadrant: usize) -> Self {
        let half = self.side * 0.5;
        let shift = vec2(
            if quadrant & 1 == 1 { half } else { 0.0 },
            if quadrant & 2 == 2 { half } else { 0.0 },
        );
        Self {
            min: self.min + shift,
            side: half,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.side
    }

    /// Squared gap between two cells; zero when they touch or overlap.
    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let gap_x = (other.min.x - (self.min.x + self.side))
            .max(self.min.x - (other.min.x + other.side))
            .max(0.0);
        let gap_y = (other.min.y - (self.min.y + self.side))
            .max(self.min.y - (other.min.y + other.side))
            .max(0.0);
        gap_x * gap_x + gap_y * gap_y
    }
}

/// Barnes-Hut cell. `charge` is the summed strength of the bodies below it
/// and `center_of_charge` their centroid weighted by strength magnitude.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_charge: Vec2,
    pub(super) charge: f32,
    pub(super) count: usize,
    /// Bodies held directly; empty once the cell is split.
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], strengths: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::around(positions)?;
        Some(Self::cell(bounds, (0..positions.len()).collect(), positions, strengths, 0))
    }

    fn cell(
        bounds: QuadBounds,
        bodies: Vec<usize>,
        positions: &[Vec2],
        strengths: &[f32],
        depth: usize,
    ) -> Self {
        let (charge, magnitude, weighted, plain) = bodies.iter().fold(
            (0.0_f32, 0.0_f32, Vec2::ZERO, Vec2::ZERO),
            |(charge, magnitude, weighted, plain), &body| {
                let strength = strengths[body];
                (
                    charge + strength,
                    magnitude + strength.abs(),
                    weighted + positions[body] * strength.abs(),
                    plain + positions[body],
                )
            },
        );
        let center_of_charge = match bodies.len() {
            0 => bounds.middle(),
            _ if magnitude > 0.0 => weighted / magnitude,
            count => plain / count as f32,
        };

        let mut node = Self {
            bounds,
            center_of_charge,
            charge,
            count: bodies.len(),
            indices: bodies,
            children: Default::default(),
        };
        if depth >= DEPTH_LIMIT || node.count <= LEAF_BODIES {
            return node;
        }

        let mut split: [Vec<usize>; 4] = Default::default();
        for &body in &node.indices {
            split[bounds.quadrant(positions[body])].push(body);
        }
        // Coincident bodies would recurse to the depth limit for nothing.
        if split.iter().any(|part| part.len() == node.count) {
            return node;
        }

        node.indices = Vec::new();
        for (quadrant, part) in split.into_iter().enumerate() {
            if !part.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::cell(
                    bounds.sub_cell(quadrant),
                    part,
                    positions,
                    strengths,
                    depth + 1,
                )));
            }
        }
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().flatten().map(|child| &**child)
    }
}
