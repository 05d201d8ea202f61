//! Heartbeat Sync Overlay
//!
//! Extracts BPM values from heart-rate attribute telemetry and pulses each
//! sensor node on a continuous sine wave at its own rate. Sensors without a
//! known BPM pulse at the group average. The positive peak of every cycle
//! raises a heartbeat glow.

use std::collections::HashMap;
use std::time::Instant;

use crate::events::{extract_bpm, is_heart_rate_attribute, TelemetryEvent};
use crate::glow::{GlowKind, GlowRegistry};
use crate::scene::{NodeKind, SceneGraph};
use crate::theme::{lighten, PanelTheme};

const TAU: f32 = std::f32::consts::TAU;

/// Rate used before any reading arrives
const RESTING_BPM: f32 = 70.0;

#[derive(Debug)]
pub struct HeartbeatOverlay {
    started: Instant,

    /// Known BPM per sensor node
    bpm: HashMap<String, f32>,

    /// Last completed pulse cycle per sensor, for peak edge detection
    last_cycle: HashMap<String, i64>,
}

impl HeartbeatOverlay {
    pub fn new(now: Instant) -> Self {
        Self { started: now, bpm: HashMap::new(), last_cycle: HashMap::new() }
    }

    /// Capture a BPM reading from heart-rate telemetry; everything else is
    /// ignored
    pub fn on_telemetry(&mut self, scene: &SceneGraph, event: &TelemetryEvent) {
        if !is_heart_rate_attribute(&event.attribute_id) {
            return;
        }
        if scene.get_node(&event.sensor_id).is_none() {
            return;
        }
        if let Some(bpm) = extract_bpm(&event.payload) {
            self.bpm.insert(event.sensor_id.clone(), bpm);
        }
    }

    /// BPM a sensor pulses at: its own reading, else the group average
    fn rate_for(&self, sensor_id: &str) -> f32 {
        if let Some(bpm) = self.bpm.get(sensor_id) {
            return *bpm;
        }
        if self.bpm.is_empty() {
            RESTING_BPM
        } else {
            self.bpm.values().sum::<f32>() / self.bpm.len() as f32
        }
    }

    /// Continuous pulse pass; always animating while the overlay is active
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        glows: &mut GlowRegistry,
        now: Instant,
        theme: &PanelTheme,
    ) -> bool {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();

        let sensor_ids: Vec<String> = scene
            .nodes
            .values()
            .filter(|n| n.kind == NodeKind::Sensor)
            .map(|n| n.id.clone())
            .collect();

        for sensor_id in sensor_ids {
            let bpm = self.rate_for(&sensor_id);
            let phase = elapsed * bpm / 60.0 * TAU;
            let pulse = phase.sin();

            if let Some(node) = scene.get_node_mut(&sensor_id) {
                node.size = node.kind.base_size() * (1.0 + 0.14 * pulse.max(0.0));
                node.color = lighten(theme.node_sensor, 0.35 * pulse.max(0.0));
            }

            // One glow per cycle, on the crossing of the positive peak
            let cycle = ((phase - std::f32::consts::FRAC_PI_2) / TAU).floor() as i64;
            match self.last_cycle.get(&sensor_id) {
                Some(&last) if cycle > last => {
                    glows.trigger_node(&sensor_id, GlowKind::Heartbeat, now);
                    self.last_cycle.insert(sensor_id, cycle);
                }
                None => {
                    // First observation; arm without glowing
                    self.last_cycle.insert(sensor_id, cycle);
                }
                _ => {}
            }
        }

        true
    }

    #[cfg(test)]
    pub fn known_bpm(&self, sensor_id: &str) -> Option<f32> {
        self.bpm.get(sensor_id).copied()
    }
}
