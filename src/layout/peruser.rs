//! Per-User Layout
//!
//! Three-level nested radial clustering: users on an outer ring sized to the
//! user count, each user's sensors on a smaller ring around it, each
//! sensor's attributes on an even smaller ring around the sensor.

use eframe::egui::Pos2;
use std::collections::HashMap;

use super::{attributes_of, ring_point, sensors_of, sorted_users};
use crate::scene::SceneGraph;

const CENTER: Pos2 = Pos2::new(50.0, 57.0);
const SENSOR_RING: f32 = 7.5;
const ATTR_RING: f32 = 3.2;

pub fn compute(scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut positions = HashMap::new();
    let users = sorted_users(scene);
    let n = users.len();

    // Ring grows with population but keeps sensor clusters on the plane
    let user_ring = match n {
        0 | 1 => 0.0,
        _ => (10.0 + 2.4 * n as f32).clamp(14.0, 33.0),
    };

    for (i, user_id) in users.iter().enumerate() {
        let user_pos = ring_point(CENTER, user_ring, i, n);
        positions.insert(user_id.clone(), user_pos);

        let sensors = sensors_of(scene, user_id);
        for (j, sensor_id) in sensors.iter().enumerate() {
            let sensor_pos = ring_point(user_pos, SENSOR_RING, j, sensors.len());
            positions.insert(sensor_id.clone(), sensor_pos);

            let attrs = attributes_of(scene, sensor_id);
            for (k, attr_id) in attrs.iter().enumerate() {
                positions.insert(
                    attr_id.clone(),
                    ring_point(sensor_pos, ATTR_RING, k, attrs.len()),
                );
            }
        }
    }

    clamp(&mut positions);
    positions
}

fn clamp(positions: &mut HashMap<String, Pos2>) {
    for pos in positions.values_mut() {
        pos.x = pos.x.clamp(2.0, 98.0);
        pos.y = pos.y.clamp(14.0, 98.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_sensors_cluster_around_their_user() {
        let scene = testutil::scene(4, 3, 1);
        let positions = compute(&scene);
        testutil::assert_covers_plane(&scene, &positions);

        for u in 0..4 {
            let user_pos = positions[&format!("u{}", u)];
            for s in 0..3 {
                let sensor_pos = positions[&format!("u{}s{}", u, s)];
                assert!((sensor_pos - user_pos).length() <= SENSOR_RING + 0.01);
            }
        }
    }

    #[test]
    fn test_single_user_sits_at_center() {
        let scene = testutil::scene(1, 2, 0);
        let positions = compute(&scene);
        assert_eq!(positions["u0"], CENTER);
    }

    #[test]
    fn test_users_spread_on_distinct_angles() {
        let scene = testutil::scene(6, 0, 0);
        let positions = compute(&scene);
        let mut seen: Vec<Pos2> = Vec::new();
        for u in 0..6 {
            let p = positions[&format!("u{}", u)];
            assert!(seen.iter().all(|q| (*q - p).length() > 1.0));
            seen.push(p);
        }
    }
}
