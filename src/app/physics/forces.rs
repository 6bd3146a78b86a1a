use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

fn separation_direction(delta: Vec2, distance: f32, from: usize, to: usize) -> Vec2 {
    if distance > 0.0001 {
        delta / distance
    } else {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

fn repulsion_between(point_a: Vec2, point_b: Vec2, strength: f32, softening: f32) -> Vec2 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        vec2(1.0, 0.0)
    };
    direction * (strength / (distance_sq + softening))
}

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

pub(super) fn accumulate_repulsion(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other != index {
                *force +=
                    repulsion_between(point, positions[other], params.strength, params.softening);
            }
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let far_enough = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta;

    if far_enough {
        *force += (delta / distance)
            * (params.strength * node.mass / (distance_sq + params.softening));
        return;
    }

    for child in node.children() {
        accumulate_repulsion(child, index, positions, params, force);
    }
}

fn push_apart(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = radii[from] + radii[to];
    if distance >= min_distance {
        return;
    }

    let direction = separation_direction(delta, distance, from, to);
    let push = direction * ((min_distance - distance) * strength);
    forces[from] += push;
    forces[to] -= push;
}

/// Dual-tree walk that only visits pairs of cells close enough for their
/// largest bodies to overlap.
pub(super) fn accumulate_collisions(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    if node_a.bounds.gap_to(node_b.bounds) > node_a.max_radius + node_b.max_radius {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    push_apart(from, to, positions, radii, strength, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    push_apart(from, to, positions, radii, strength, forces);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, positions, radii, strength, forces);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, positions, radii, strength, forces);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collisions(child, node_b, false, positions, radii, strength, forces);
        }
    } else {
        for child in node_b.children() {
            accumulate_collisions(node_a, child, false, positions, radii, strength, forces);
        }
    }
}

/// Spring toward `distance`, looking one step ahead like the velocity Verlet
/// link force in d3.
pub(super) fn link_correction(
    from_position: Vec2,
    from_velocity: Vec2,
    to_position: Vec2,
    to_velocity: Vec2,
    distance: f32,
    strength: f32,
) -> Vec2 {
    let delta = (to_position + to_velocity) - (from_position + from_velocity);
    let length = delta.length();
    if length <= 0.0001 {
        return Vec2::ZERO;
    }
    delta * ((length - distance) / length * strength * 0.5)
}

pub(super) fn pull_toward(position: Vec2, target: Vec2, strength: f32) -> Vec2 {
    (target - position) * strength
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_bodies_are_pushed_apart_symmetrically() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 0.0)];
        let radii = [20.0, 20.0, 20.0];
        let tree = QuadNode::build(&positions, &radii).unwrap();
        let mut forces = vec![Vec2::ZERO; 3];

        accumulate_collisions(&tree, &tree, true, &positions, &radii, 0.5, &mut forces);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert!((forces[0] + forces[1]).length() < 0.0001);
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn repulsion_points_away_from_neighbors() {
        let positions = [vec2(-50.0, 0.0), vec2(50.0, 0.0)];
        let tree = QuadNode::build(&positions, &[1.0, 1.0]).unwrap();
        let params = RepulsionParams {
            strength: 1000.0,
            softening: 10.0,
            theta: 0.8,
        };

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, params, &mut left);
        accumulate_repulsion(&tree, 1, &positions, params, &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
        assert!((left + right).length() < 0.0001);
    }

    #[test]
    fn link_pulls_when_stretched_and_pushes_when_compressed() {
        let correction = |target: Vec2| {
            link_correction(Vec2::ZERO, Vec2::ZERO, target, Vec2::ZERO, 100.0, 1.0)
        };

        let stretched = correction(vec2(200.0, 0.0));
        assert!(stretched.x > 0.0);

        let compressed = correction(vec2(50.0, 0.0));
        assert!(compressed.x < 0.0);

        let resting = correction(vec2(100.0, 0.0));
        assert!(resting.length() < 0.0001);
    }
}
