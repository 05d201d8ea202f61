//! Force-Directed Layout
//!
//! Spring physics over the topology tree: attraction along edges, repulsion
//! between all pairs, and a gentle pull toward the plane center. Repulsion
//! switches to a Barnes-Hut quadtree approximation on large graphs. The same
//! iteration kernel backs both the synchronous path and the worker thread,
//! selected by graph size in the engine.

use eframe::egui::{Pos2, Vec2};
use std::collections::HashMap;

use crate::scene::SceneGraph;

const CENTER: Pos2 = Pos2::new(50.0, 57.0);
const REPULSION: f32 = 160.0;
const ATTRACTION: f32 = 0.045;
const GRAVITY: f32 = 0.03;
const STEP: f32 = 0.6;
const MAX_FORCE: f32 = 8.0;

/// Barnes-Hut opening threshold
const THETA: f32 = 0.7;

/// Plain-data graph handed to the iteration kernel; safe to ship to the
/// worker thread
#[derive(Debug, Clone)]
pub struct ForceInput {
    pub ids: Vec<String>,
    pub positions: Vec<Pos2>,
    pub edges: Vec<(usize, usize)>,

    /// Use the quadtree approximation for repulsion
    pub barnes_hut: bool,
}

impl ForceInput {
    /// Snapshot the scene in sorted-id order.
    ///
    /// A bounded id-hash jitter breaks exact coincidence; stacked points
    /// would otherwise produce a zero-direction repulsion and never
    /// separate.
    pub fn from_scene(scene: &SceneGraph, barnes_hut_min: usize) -> Self {
        let ids = scene.sorted_ids();
        let index: HashMap<&String, usize> =
            ids.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let positions = ids
            .iter()
            .map(|id| {
                let pos = scene.get_node(id).map(|n| n.pos).unwrap_or(CENTER);
                pos + crate::scene::model::id_jitter(id, 1.5)
            })
            .collect();
        let edges = scene
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
            .collect();
        let barnes_hut = ids.len() >= barnes_hut_min;
        Self { ids, positions, edges, barnes_hut }
    }

    /// Advance the simulation by `iterations` steps
    pub fn run(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.step();
        }
    }

    fn step(&mut self) {
        let n = self.positions.len();
        if n == 0 {
            return;
        }

        let mut forces = vec![Vec2::ZERO; n];

        if self.barnes_hut {
            let tree = QuadTree::build(&self.positions);
            for (i, pos) in self.positions.iter().enumerate() {
                forces[i] += tree.repulsion(*pos);
            }
        } else {
            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = self.positions[j] - self.positions[i];
                    let dist = delta.length().max(0.5);
                    let push = delta / dist * (REPULSION / (dist * dist));
                    forces[i] -= push;
                    forces[j] += push;
                }
            }
        }

        for &(a, b) in &self.edges {
            let delta = self.positions[b] - self.positions[a];
            let pull = delta * ATTRACTION;
            forces[a] += pull;
            forces[b] -= pull;
        }

        for (i, pos) in self.positions.iter_mut().enumerate() {
            let mut force = forces[i] + (CENTER - *pos) * GRAVITY;
            force.x = force.x.clamp(-MAX_FORCE, MAX_FORCE);
            force.y = force.y.clamp(-MAX_FORCE, MAX_FORCE);
            *pos += force * STEP;
            pos.x = pos.x.clamp(2.0, 98.0);
            pos.y = pos.y.clamp(14.0, 98.0);
        }
    }

    /// Current positions keyed by node id
    pub fn position_map(&self) -> HashMap<String, Pos2> {
        self.ids
            .iter()
            .cloned()
            .zip(self.positions.iter().copied())
            .collect()
    }
}

/// Iteration budget scaled to graph size
pub fn scaled_iterations(node_count: usize) -> usize {
    (60 + node_count * 2).min(300)
}

/// Synchronous full run, used for small graphs and as the worker fallback
pub fn compute(scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut input = ForceInput::from_scene(scene, 100);
    input.run(scaled_iterations(input.ids.len()));
    input.position_map()
}

/// Barnes-Hut quadtree over point masses
struct QuadTree {
    /// Region center and half-extent
    cx: f32,
    cy: f32,
    half: f32,

    /// Aggregate mass (point count) and center of mass
    mass: f32,
    com: Vec2,

    children: Option<Box<[Option<QuadTree>; 4]>>,

    /// Leaf payload
    point: Option<Vec2>,
}

impl QuadTree {
    fn build(points: &[Pos2]) -> Self {
        let mut tree = QuadTree::empty(50.0, 50.0, 64.0);
        for p in points {
            tree.insert(Vec2::new(p.x, p.y), 0);
        }
        tree
    }

    fn empty(cx: f32, cy: f32, half: f32) -> Self {
        Self { cx, cy, half, mass: 0.0, com: Vec2::ZERO, children: None, point: None }
    }

    fn insert(&mut self, p: Vec2, depth: usize) {
        self.com = (self.com * self.mass + p) / (self.mass + 1.0);
        self.mass += 1.0;

        // Depth cap keeps coincident points from recursing forever
        if depth >= 16 {
            return;
        }

        if self.children.is_some() {
            self.insert_child(p, depth);
            return;
        }
        match self.point.take() {
            None => self.point = Some(p),
            Some(existing) => {
                self.children = Some(Box::new([None, None, None, None]));
                self.insert_child(existing, depth);
                self.insert_child(p, depth);
            }
        }
    }

    fn insert_child(&mut self, p: Vec2, depth: usize) {
        let quadrant = (p.x > self.cx) as usize + 2 * (p.y > self.cy) as usize;
        let h = self.half / 2.0;
        let cx = self.cx + if p.x > self.cx { h } else { -h };
        let cy = self.cy + if p.y > self.cy { h } else { -h };
        let children = self.children.as_mut().unwrap();
        children[quadrant]
            .get_or_insert_with(|| QuadTree::empty(cx, cy, h))
            .insert(p, depth + 1);
    }

    /// Approximate repulsive force on a point from this subtree
    fn repulsion(&self, at: Pos2) -> Vec2 {
        if self.mass == 0.0 {
            return Vec2::ZERO;
        }
        let target = Vec2::new(at.x, at.y);
        let delta = target - self.com;
        let dist = delta.length().max(0.5);

        // Far enough away (or a leaf): treat the subtree as one body
        if self.children.is_none() || (self.half * 2.0) / dist < THETA {
            // A node does not repel itself
            if self.mass <= 1.0 && dist < 0.01 {
                return Vec2::ZERO;
            }
            return delta / dist * (REPULSION * self.mass / (dist * dist));
        }

        let mut total = Vec2::ZERO;
        for child in self.children.as_ref().unwrap().iter().flatten() {
            total += child.repulsion(at);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_connected_nodes_end_near_each_other() {
        let scene = testutil::scene(3, 2, 1);
        let positions = compute(&scene);
        testutil::assert_covers_plane(&scene, &positions);

        // Each sensor finishes closer to its own user than to the others
        for u in 0..3 {
            let user = positions[&format!("u{}", u)];
            for s in 0..2 {
                let sensor = positions[&format!("u{}s{}", u, s)];
                let own = (sensor - user).length();
                for other in 0..3 {
                    if other == u {
                        continue;
                    }
                    let foreign = (sensor - positions[&format!("u{}", other)]).length();
                    assert!(own < foreign + 0.5);
                }
            }
        }
    }

    #[test]
    fn test_disconnected_nodes_pushed_apart() {
        let scene = testutil::scene(2, 0, 0);
        let positions = compute(&scene);
        let d = (positions["u0"] - positions["u1"]).length();
        assert!(d > 5.0, "repulsion failed: {}", d);
    }

    #[test]
    fn test_barnes_hut_tracks_brute_force() {
        let scene = testutil::scene(6, 2, 1);
        let mut brute = ForceInput::from_scene(&scene, usize::MAX);
        let mut approx = brute.clone();
        approx.barnes_hut = true;

        brute.run(10);
        approx.run(10);

        // The approximation should land in the same neighborhood
        let brute_map = brute.position_map();
        for (id, pos) in approx.position_map() {
            let d = (pos - brute_map[&id]).length();
            assert!(d < 12.0, "{} diverged by {}", id, d);
        }
    }

    #[test]
    fn test_quadtree_aggregates_mass() {
        let points = vec![
            Pos2::new(10.0, 10.0),
            Pos2::new(90.0, 10.0),
            Pos2::new(10.0, 90.0),
            Pos2::new(90.0, 90.0),
        ];
        let tree = QuadTree::build(&points);
        assert_eq!(tree.mass, 4.0);
        // Force at the exact center cancels out by symmetry
        let f = tree.repulsion(Pos2::new(50.0, 50.0));
        assert!(f.length() < 0.5);
    }

    #[test]
    fn test_coincident_points_do_not_recurse_forever() {
        let points = vec![Pos2::new(50.0, 50.0); 20];
        let tree = QuadTree::build(&points);
        assert_eq!(tree.mass, 20.0);
    }
}
