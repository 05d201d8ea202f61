//! Radial Tree Layout
//!
//! Three concentric rings (users, sensors, attributes). Each subtree gets an
//! angular span proportional to its leaf weight and children are centered on
//! their parent's angle, so sibling subtrees never overlap.

use eframe::egui::Pos2;
use std::collections::HashMap;

use super::{attributes_of, sensors_of, sorted_users};
use crate::scene::SceneGraph;

const CENTER: Pos2 = Pos2::new(50.0, 57.0);
const USER_RING: f32 = 14.0;
const SENSOR_RING: f32 = 27.0;
const ATTR_RING: f32 = 38.0;
const TAU: f32 = std::f32::consts::TAU;

fn at_angle(radius: f32, angle: f32) -> Pos2 {
    Pos2::new(CENTER.x + angle.cos() * radius, CENTER.y + angle.sin() * radius)
}

/// Leaf weight of a sensor subtree; attribute-less sensors still occupy a slot
fn sensor_weight(scene: &SceneGraph, sensor_id: &str) -> f32 {
    attributes_of(scene, sensor_id).len().max(1) as f32
}

pub fn compute(scene: &SceneGraph) -> HashMap<String, Pos2> {
    let mut positions = HashMap::new();
    let users = sorted_users(scene);

    let user_weights: Vec<f32> = users
        .iter()
        .map(|u| {
            sensors_of(scene, u)
                .iter()
                .map(|s| sensor_weight(scene, s))
                .sum::<f32>()
                .max(1.0)
        })
        .collect();
    let total: f32 = user_weights.iter().sum();
    if total == 0.0 {
        return positions;
    }

    let mut cursor = -std::f32::consts::FRAC_PI_2;
    for (user_id, weight) in users.iter().zip(&user_weights) {
        let span = TAU * weight / total;
        let user_angle = cursor + span / 2.0;
        positions.insert(user_id.clone(), at_angle(USER_RING, user_angle));

        let sensors = sensors_of(scene, user_id);
        let sensor_total: f32 = sensors.iter().map(|s| sensor_weight(scene, s)).sum();
        let mut sensor_cursor = cursor;
        for sensor_id in &sensors {
            let sensor_span = span * sensor_weight(scene, sensor_id) / sensor_total;
            let sensor_angle = sensor_cursor + sensor_span / 2.0;
            positions.insert(sensor_id.clone(), at_angle(SENSOR_RING, sensor_angle));

            let attrs = attributes_of(scene, sensor_id);
            let n_attrs = attrs.len();
            for (k, attr_id) in attrs.iter().enumerate() {
                // Attributes subdivide the sensor span evenly, centered
                let attr_angle = sensor_cursor
                    + sensor_span * (k as f32 + 0.5) / n_attrs.max(1) as f32;
                positions.insert(attr_id.clone(), at_angle(ATTR_RING, attr_angle));
            }

            sensor_cursor += sensor_span;
        }

        cursor += span;
    }

    for pos in positions.values_mut() {
        pos.x = pos.x.clamp(2.0, 98.0);
        pos.y = pos.y.clamp(14.0, 98.0);
    }
    positions
}

/// Angular spans per user subtree, exposed for overlap checks
#[cfg(test)]
fn user_spans(scene: &SceneGraph) -> Vec<(String, f32, f32)> {
    let users = sorted_users(scene);
    let weights: Vec<f32> = users
        .iter()
        .map(|u| {
            sensors_of(scene, u)
                .iter()
                .map(|s| sensor_weight(scene, s))
                .sum::<f32>()
                .max(1.0)
        })
        .collect();
    let total: f32 = weights.iter().sum();
    let mut cursor = -std::f32::consts::FRAC_PI_2;
    let mut out = Vec::new();
    for (user, weight) in users.iter().zip(&weights) {
        let span = TAU * weight / total;
        out.push((user.clone(), cursor, cursor + span));
        cursor += span;
    }
    out
}
