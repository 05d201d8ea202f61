//! Attention Radar Overlay
//!
//! External attention events recolor and resize a sensor node and its
//! attribute children immediately; `high` also raises a glow. No periodic
//! work, purely event-driven.

use std::collections::HashMap;
use std::time::Instant;

use crate::events::{AttentionEvent, AttentionLevel};
use crate::glow::{GlowKind, GlowRegistry};
use crate::scene::SceneGraph;
use crate::theme::PanelTheme;

fn level_style(level: AttentionLevel, theme: &PanelTheme) -> (eframe::egui::Color32, f32) {
    match level {
        AttentionLevel::High => (theme.attention_high, 1.5),
        AttentionLevel::Medium => (theme.attention_medium, 1.2),
        AttentionLevel::Low => (theme.attention_low, 1.0),
        AttentionLevel::None => (theme.attention_none, 0.85),
    }
}

#[derive(Debug, Default)]
pub struct AttentionOverlay {
    levels: HashMap<String, AttentionLevel>,
}

impl AttentionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an attention change; unknown sensors are ignored
    pub fn on_attention(
        &mut self,
        scene: &mut SceneGraph,
        glows: &mut GlowRegistry,
        event: &AttentionEvent,
        now: Instant,
        theme: &PanelTheme,
    ) {
        if scene.get_node(&event.sensor_id).is_none() {
            log::debug!("attention event for unknown sensor {}", event.sensor_id);
            return;
        }
        self.levels.insert(event.sensor_id.clone(), event.level);

        let (color, scale) = level_style(event.level, theme);
        let children = scene.children_of(&event.sensor_id);

        if let Some(sensor) = scene.get_node_mut(&event.sensor_id) {
            sensor.color = color;
            sensor.size = sensor.kind.base_size() * scale;
        }
        for child_id in children {
            if let Some(child) = scene.get_node_mut(&child_id) {
                child.color = color;
                child.size = child.kind.base_size() * (0.8 + 0.2 * scale);
            }
        }

        if event.level == AttentionLevel::High {
            glows.trigger_node(&event.sensor_id, GlowKind::Attention, now);
        }
    }

    pub fn level(&self, sensor_id: &str) -> Option<AttentionLevel> {
        self.levels.get(sensor_id).copied()
    }
}
