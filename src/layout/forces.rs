use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Distances below this are treated as this value, which keeps every force
/// finite even for coincident bodies.
pub(super) const MIN_DISTANCE: f32 = 1.0;
const MIN_DISTANCE_SQ: f32 = MIN_DISTANCE * MIN_DISTANCE;

/// Unit vector from `to` towards `from`; coincident points get a fixed
/// direction derived from their indices.
pub(super) fn separation_direction(delta: Vec2, from: usize, to: usize) -> (Vec2, f32) {
    let distance = delta.length();
    if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        (vec2(angle.cos(), angle.sin()), 0.0)
    }
}

/// Inverse-distance charge exerted on a body at `point` by a charge at
/// `source`. Negative strengths repel.
fn charge_between(
    point: Vec2,
    source: Vec2,
    strength: f32,
    alpha: f32,
    index: usize,
    other: usize,
) -> Vec2 {
    let (direction, distance) = separation_direction(point - source, index, other);
    let distance = distance.max(MIN_DISTANCE);
    direction * (-strength * alpha / distance)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strengths: &[f32],
    theta: f32,
    alpha: f32,
    force: &mut Vec2,
) {
    if node.count == 0 || node.charge == 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *force += charge_between(point, positions[other], strengths[other], alpha, index, other);
        }
        return;
    }

    let distance_sq = (point - node.center_of_charge).length_sq().max(MIN_DISTANCE_SQ);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance_sq.sqrt()) < theta
        && node.count > 1;

    if can_approximate {
        *force += charge_between(
            point,
            node.center_of_charge,
            node.charge,
            alpha,
            index,
            usize::MAX,
        );
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, strengths, theta, alpha, force);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) padding: f32,
    pub(super) max_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to] + params.padding * 2.0;
    let (direction, distance) = separation_direction(positions[from] - positions[to], from, to);
    if distance >= min_distance {
        return;
    }

    let overlap_push = (min_distance - distance) * params.strength;
    let share = radii[to] * radii[to] / (radii[from] * radii[from] + radii[to] * radii[to]).max(0.0001);
    forces[from] += direction * overlap_push * share;
    forces[to] -= direction * overlap_push * (1.0 - share);
}

/// Dual-tree walk over every pair of bodies closer than the collision reach.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (position, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[position + 1..] {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (position, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);
            for child_b in &children[position + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.side_length() >= node_b.bounds.side_length()
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

/// Spring pulling the endpoints of one link towards `distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Spring {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) distance: f32,
    pub(super) strength: f32,
    /// Share of the correction applied to the target; the source gets the rest.
    pub(super) bias: f32,
}

pub(super) fn accumulate_springs(
    springs: &[Spring],
    positions: &[Vec2],
    velocities: &[Vec2],
    alpha: f32,
    forces: &mut [Vec2],
) {
    for spring in springs {
        let (source, target) = (spring.source, spring.target);
        let delta = (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        let (direction, distance) = separation_direction(delta, target, source);
        let distance = distance.max(MIN_DISTANCE);
        let correction = direction * (distance - spring.distance) * alpha * spring.strength;

        forces[target] -= correction * spring.bias;
        forces[source] += correction * (1.0 - spring.bias);
    }
}

pub(super) fn accumulate_centering(positions: &[Vec2], strength: f32, alpha: f32, forces: &mut [Vec2]) {
    for (force, position) in forces.iter_mut().zip(positions) {
        *force -= *position * strength * alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_still_get_a_direction() {
        let (direction, distance) = separation_direction(Vec2::ZERO, 3, 8);
        assert_eq!(distance, 0.0);
        assert!((direction.length() - 1.0).abs() < 1e-4);

        let (swapped, _) = separation_direction(Vec2::ZERO, 8, 3);
        assert!(swapped.is_finite());
    }

    #[test]
    fn charge_is_finite_for_coincident_bodies() {
        let positions = vec![Vec2::ZERO; 3];
        let strengths = vec![-2000.0; 3];
        let root = QuadNode::build(&positions, &strengths).expect("tree");

        for index in 0..positions.len() {
            let mut force = Vec2::ZERO;
            accumulate_charge_for_node(&root, index, &positions, &strengths, 0.9, 1.0, &mut force);
            assert!(force.is_finite());
            assert!(force.length() > 0.0);
        }
    }

    #[test]
    fn springs_pull_stretched_links_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(300.0, 0.0)];
        let velocities = vec![Vec2::ZERO; 2];
        let mut forces = vec![Vec2::ZERO; 2];
        let spring = Spring {
            source: 0,
            target: 1,
            distance: 80.0,
            strength: 1.0,
            bias: 0.5,
        };

        accumulate_springs(&[spring], &positions, &velocities, 1.0, &mut forces);
        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        assert!((forces[0].x + forces[1].x).abs() < 1e-3);
    }

    #[test]
    fn overlapping_bodies_are_pushed_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(4.0, 0.0)];
        let radii = vec![8.0, 8.0];
        let strengths = vec![-1.0, -1.0];
        let mut forces = vec![Vec2::ZERO; 2];
        let root = QuadNode::build(&positions, &strengths).expect("tree");
        let params = CollisionParams {
            strength: 0.7,
            padding: 10.0,
            max_distance_sq: 10_000.0,
        };

        accumulate_collision_pairs(&root, &root, true, &positions, &radii, params, &mut forces);
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
    }
}
