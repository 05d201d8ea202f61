//! Per-Type Layout
//!
//! Users along a top row; one vertical lane per distinct attribute type,
//! alphabetically ordered; attributes stacked vertically within their type's
//! lane. A sensor sits in the lane of its alphabetically-first attribute
//! type; sensors with no attributes share a trailing lane.

use eframe::egui::Pos2;
use std::collections::{BTreeMap, HashMap};

use super::{attributes_of, sensors_of, sorted_users};
use crate::scene::{NodePayload, SceneGraph};

const USER_ROW_Y: f32 = 17.0;
const LANE_TOP: f32 = 30.0;
const LANE_BOTTOM: f32 = 95.0;

/// Lane label for sensors that carry no attributes
const MISC_LANE: &str = "~misc";

fn attr_type(scene: &SceneGraph, attr_id: &str) -> String {
    match scene.get_node(attr_id).map(|n| &n.payload) {
        Some(NodePayload::Attribute { attr_type, .. }) if !attr_type.is_empty() => {
            attr_type.clone()
        }
        _ => "other".to_string(),
    }
}

pub fn compute(scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut positions = HashMap::new();

    let users = sorted_users(scene);
    let n_users = users.len();
    for (i, user_id) in users.iter().enumerate() {
        let x = 100.0 * (i as f32 + 1.0) / (n_users as f32 + 1.0);
        positions.insert(user_id.clone(), Pos2::new(x, USER_ROW_Y));
    }

    // Lane membership: BTreeMap keys give the alphabetical column order.
    // Each lane holds (sensor, its attributes of that type) entries plus
    // attributes whose sensor lives in another lane.
    let mut lanes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for user_id in &users {
        for sensor_id in sensors_of(scene, user_id) {
            let attrs = attributes_of(scene, &sensor_id);
            let mut by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for attr_id in &attrs {
                by_type.entry(attr_type(scene, attr_id)).or_default().push(attr_id.clone());
            }

            // The sensor leads its first type's lane
            let home = by_type
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| MISC_LANE.to_string());
            lanes.entry(home).or_default().push(sensor_id.clone());

            for (ty, attr_ids) in by_type {
                lanes.entry(ty).or_default().extend(attr_ids);
            }
        }
    }

    let n_lanes = lanes.len();
    for (col, (_, members)) in lanes.iter().enumerate() {
        let x = 100.0 * (col as f32 + 1.0) / (n_lanes as f32 + 1.0);
        let count = members.len();
        for (row, id) in members.iter().enumerate() {
            let y = if count == 1 {
                (LANE_TOP + LANE_BOTTOM) / 2.0
            } else {
                LANE_TOP + (LANE_BOTTOM - LANE_TOP) * row as f32 / (count as f32 - 1.0)
            };
            positions.insert(id.clone(), Pos2::new(x, y));
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_users_share_the_top_row() {
        let scene = testutil::scene(3, 2, 2);
        let positions = compute(&scene);
        testutil::assert_covers_plane(&scene, &positions);
        for u in 0..3 {
            assert_eq!(positions[&format!("u{}", u)].y, USER_ROW_Y);
        }
    }

    #[test]
    fn test_lanes_are_alphabetical_columns() {
        // testutil types cycle heart_rate, temperature, humidity; with two
        // attributes per sensor only heart_rate and temperature appear
        let scene = testutil::scene(1, 1, 2);
        let positions = compute(&scene);

        let heart_x = positions["u0s0:a0"].x; // heart_rate
        let temp_x = positions["u0s0:a1"].x; // temperature
        assert!(heart_x < temp_x, "heart_rate lane must sit left of temperature");

        // Sensor leads its first type's lane
        assert_eq!(positions["u0s0"].x, heart_x);
    }

    #[test]
    fn test_attributeless_sensor_gets_trailing_lane() {
        let scene = testutil::scene(1, 2, 0);
        let positions = compute(&scene);
        // Both sensors stack in the single misc lane
        assert_eq!(positions["u0s0"].x, positions["u0s1"].x);
        assert!(positions["u0s0"].y < positions["u0s1"].y);
    }

    #[test]
    fn test_lane_members_never_collide() {
        let scene = testutil::scene(2, 2, 3);
        let positions = compute(&scene);
        let mut seen: Vec<Pos2> = Vec::new();
        for pos in positions.values() {
            assert!(seen.iter().all(|q| (*q - *pos).length() > 0.01));
            seen.push(*pos);
        }
    }
}
