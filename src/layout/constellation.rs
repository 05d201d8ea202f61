//! Constellation Layout
//!
//! Users tiled into a square grid of cells; within a cell, the user's
//! sensors form a regular polygon around the cell center and each sensor's
//! attributes a smaller polygon around the sensor.

use eframe::egui::Pos2;
use std::collections::HashMap;

use super::{attributes_of, ring_point, sensors_of, sorted_users};
use crate::scene::SceneGraph;

const FIELD_TOP: f32 = 14.0;
const FIELD_BOTTOM: f32 = 98.0;

pub fn compute(scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut positions = HashMap::new();
    let users = sorted_users(scene);
    let n = users.len();
    if n == 0 {
        return positions;
    }

    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);

    let cell_w = 100.0 / cols as f32;
    let cell_h = (FIELD_BOTTOM - FIELD_TOP) / rows as f32;
    let sensor_radius = (cell_w.min(cell_h) * 0.30).max(2.5);
    let attr_radius = (cell_w.min(cell_h) * 0.11).max(1.2);

    for (i, user_id) in users.iter().enumerate() {
        let col = i % cols;
        let row = i / cols;
        let cell_center = Pos2::new(
            cell_w * (col as f32 + 0.5),
            FIELD_TOP + cell_h * (row as f32 + 0.5),
        );
        positions.insert(user_id.clone(), cell_center);

        let sensors = sensors_of(scene, user_id);
        for (j, sensor_id) in sensors.iter().enumerate() {
            let sensor_pos = ring_point(cell_center, sensor_radius, j, sensors.len());
            positions.insert(sensor_id.clone(), sensor_pos);

            let attrs = attributes_of(scene, sensor_id);
            for (k, attr_id) in attrs.iter().enumerate() {
                positions.insert(
                    attr_id.clone(),
                    ring_point(sensor_pos, attr_radius, k, attrs.len()),
                );
            }
        }
    }

    for pos in positions.values_mut() {
        pos.x = pos.x.clamp(1.0, 99.0);
        pos.y = pos.y.clamp(FIELD_TOP - 2.0, 99.0);
    }
    positions
}
