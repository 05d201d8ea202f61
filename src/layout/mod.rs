//! Layout Engines for the Topology Scene
//!
//! Six spatial arrangements over the normalized 0-100 plane:
//! - Force: spring physics, Barnes-Hut approximated on big graphs
//! - PerUser: three-level nested radial clustering
//! - PerType: attribute-type lanes under a user row
//! - Radial: concentric rings with proportional angular spans
//! - Constellation: square grid of user cells with polygon clusters
//! - Flower: petal spines under a sinusoidal width envelope
//!
//! Every layout is a pure function from the scene to a position map,
//! deterministic for the same graph. The engine applies the map, optionally
//! through the transition animator.

pub mod constellation;
pub mod flower;
pub mod force;
pub mod pertype;
pub mod peruser;
pub mod radial;
pub mod transition;
pub mod worker;

pub use transition::TransitionAnimator;
pub use worker::ForceWorker;

use eframe::egui::Pos2;
use std::collections::HashMap;

use crate::scene::{NodeKind, SceneGraph};

/// Available layout algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Force-directed spring physics
    #[default]
    Force,
    /// Nested rings per user
    PerUser,
    /// Vertical lanes per attribute type
    PerType,
    /// Concentric radial tree
    Radial,
    /// Grid of user cells
    Constellation,
    /// Petal spines
    Flower,
}

impl LayoutMode {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::Force => "Topology",
            LayoutMode::PerUser => "Per User",
            LayoutMode::PerType => "Per Type",
            LayoutMode::Radial => "Radial Tree",
            LayoutMode::Constellation => "Constellation",
            LayoutMode::Flower => "Flower",
        }
    }

    pub fn all() -> &'static [LayoutMode] {
        &[
            LayoutMode::Force,
            LayoutMode::PerUser,
            LayoutMode::PerType,
            LayoutMode::Radial,
            LayoutMode::Constellation,
            LayoutMode::Flower,
        ]
    }
}

/// Compute target positions for every node under the given layout.
///
/// Always synchronous; the engine routes large Force graphs through the
/// worker instead of calling this directly.
pub fn run_layout(mode: LayoutMode, scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut positions = match mode {
        LayoutMode::Force => force::compute(scene),
        LayoutMode::PerUser => peruser::compute(scene),
        LayoutMode::PerType => pertype::compute(scene),
        LayoutMode::Radial => radial::compute(scene),
        LayoutMode::Constellation => constellation::compute(scene),
        LayoutMode::Flower => flower::compute(scene),
    };
    place_rooms(scene, &mut positions);
    positions
}

/// Write a position map into the scene
pub fn apply_positions(scene: &mut SceneGraph, positions: &HashMap<String, Pos2>) {
    for (id, pos) in positions {
        if let Some(node) = scene.get_node_mut(id) {
            node.pos = *pos;
        }
    }
}

/// User node ids in sorted order
pub(crate) fn sorted_users(scene: &SceneGraph) -> Vec<String> {
    let mut ids: Vec<String> = scene
        .nodes
        .values()
        .filter(|n| n.kind == NodeKind::User)
        .map(|n| n.id.clone())
        .collect();
    ids.sort();
    ids
}

/// Sensor ids owned by a user, sorted
pub(crate) fn sensors_of(scene: &SceneGraph, user_id: &str) -> Vec<String> {
    scene
        .children_of(user_id)
        .into_iter()
        .filter(|id| scene.get_node(id).map(|n| n.kind == NodeKind::Sensor).unwrap_or(false))
        .collect()
}

/// Attribute ids owned by a sensor, sorted
pub(crate) fn attributes_of(scene: &SceneGraph, sensor_id: &str) -> Vec<String> {
    scene
        .children_of(sensor_id)
        .into_iter()
        .filter(|id| {
            scene.get_node(id).map(|n| n.kind == NodeKind::Attribute).unwrap_or(false)
        })
        .collect()
}

/// Point on a circle, angle measured from twelve o'clock
pub(crate) fn ring_point(center: Pos2, radius: f32, index: usize, count: usize) -> Pos2 {
    let angle = angle_of(index, count);
    Pos2::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius)
}

pub(crate) fn angle_of(index: usize, count: usize) -> f32 {
    let n = count.max(1) as f32;
    2.0 * std::f32::consts::PI * index as f32 / n - std::f32::consts::FRAC_PI_2
}

/// Rooms sit in a fixed strip along the top edge, outside every layout's
/// working area
fn place_rooms(scene: &SceneGraph, positions: &mut HashMap<String, Pos2>) {
    let mut rooms: Vec<String> = scene
        .nodes
        .values()
        .filter(|n| n.kind == NodeKind::Room)
        .map(|n| n.id.clone())
        .collect();
    rooms.sort();
    let n = rooms.len();
    for (i, id) in rooms.into_iter().enumerate() {
        let x = 100.0 * (i as f32 + 1.0) / (n as f32 + 1.0);
        positions.insert(id, Pos2::new(x, 5.0));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_covers_every_node() {
        let scene = testutil::scene(4, 3, 2);
        for mode in LayoutMode::all() {
            let positions = run_layout(*mode, &scene);
            testutil::assert_covers_plane(&scene, &positions);
        }
    }

    #[test]
    fn test_deterministic_modes_repeat_exactly() {
        let scene = testutil::scene(5, 2, 3);
        for mode in [
            LayoutMode::PerUser,
            LayoutMode::PerType,
            LayoutMode::Radial,
            LayoutMode::Constellation,
            LayoutMode::Flower,
        ] {
            let a = run_layout(mode, &scene);
            let b = run_layout(mode, &scene);
            assert_eq!(a, b, "{} not deterministic", mode.name());
        }
    }

    #[test]
    fn test_rooms_pinned_to_top_strip() {
        let scene = testutil::scene(2, 1, 1);
        // testutil scenes have no rooms; add coverage via an explicit one
        let mut scene = scene;
        scene.add_node(crate::scene::SceneNode::new(
            "room-1",
            crate::scene::NodeKind::Room,
            crate::scene::NodePayload::Room { name: "Lab".to_string() },
        ));
        let positions = run_layout(LayoutMode::Radial, &scene);
        assert_eq!(positions["room-1"].y, 5.0);
    }
}
