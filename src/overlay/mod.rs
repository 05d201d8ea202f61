//! Visual Overlay Subsystems
//!
//! Five independently startable appearance layers over the spatial layout:
//! - Heatmap: activity counters bucketed into color tiers
//! - Freshness: staleness decay with flash-on-update
//! - Heartbeat: BPM-synchronized pulsing
//! - River: flowing particles along the telemetry path
//! - Attention: externally assigned attention levels
//!
//! At most one overlay is active at a time. Each owns a private per-node
//! state map, mutates node appearance in place, and never touches graph
//! structure. Stopping an overlay clears its state; the engine restores
//! default appearance when a pure layout mode returns.

pub mod attention;
pub mod freshness;
pub mod heartbeat;
pub mod heatmap;
pub mod river;

pub use attention::AttentionOverlay;
pub use freshness::FreshnessOverlay;
pub use heartbeat::HeartbeatOverlay;
pub use heatmap::HeatmapOverlay;
pub use river::{Particle, RiverOverlay};

use std::time::Instant;

use crate::config::EngineConfig;
use crate::events::{ActivityEvent, AttentionEvent, TelemetryEvent};
use crate::frame::HaloSprite;
use crate::glow::GlowRegistry;
use crate::scene::{attribute_node_id, SceneGraph};
use crate::theme::PanelTheme;

/// Available overlay subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    Heatmap,
    Freshness,
    Heartbeat,
    River,
    Attention,
}

impl OverlayMode {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayMode::Heatmap => "Activity Heatmap",
            OverlayMode::Freshness => "Freshness",
            OverlayMode::Heartbeat => "Heartbeat",
            OverlayMode::River => "Data River",
            OverlayMode::Attention => "Attention",
        }
    }

    pub fn all() -> &'static [OverlayMode] {
        &[
            OverlayMode::Heatmap,
            OverlayMode::Freshness,
            OverlayMode::Heartbeat,
            OverlayMode::River,
            OverlayMode::Attention,
        ]
    }
}

enum ActiveOverlay {
    Heatmap(HeatmapOverlay),
    Freshness(FreshnessOverlay),
    Heartbeat(HeartbeatOverlay),
    River(RiverOverlay),
    Attention(AttentionOverlay),
}

/// Routes events and frame ticks to the single active overlay
#[derive(Default)]
pub struct OverlayHost {
    active: Option<ActiveOverlay>,
}

impl OverlayHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<OverlayMode> {
        match self.active {
            Some(ActiveOverlay::Heatmap(_)) => Some(OverlayMode::Heatmap),
            Some(ActiveOverlay::Freshness(_)) => Some(OverlayMode::Freshness),
            Some(ActiveOverlay::Heartbeat(_)) => Some(OverlayMode::Heartbeat),
            Some(ActiveOverlay::River(_)) => Some(OverlayMode::River),
            Some(ActiveOverlay::Attention(_)) => Some(OverlayMode::Attention),
            None => None,
        }
    }

    /// Activate an overlay with fresh state
    pub fn start(&mut self, mode: OverlayMode, now: Instant) {
        log::info!("overlay started: {}", mode.name());
        self.active = Some(match mode {
            OverlayMode::Heatmap => ActiveOverlay::Heatmap(HeatmapOverlay::new()),
            OverlayMode::Freshness => ActiveOverlay::Freshness(FreshnessOverlay::new(now)),
            OverlayMode::Heartbeat => ActiveOverlay::Heartbeat(HeartbeatOverlay::new(now)),
            OverlayMode::River => ActiveOverlay::River(RiverOverlay::new()),
            OverlayMode::Attention => ActiveOverlay::Attention(AttentionOverlay::new()),
        });
    }

    /// Drop the active overlay and its state
    pub fn stop(&mut self) {
        if let Some(mode) = self.mode() {
            log::info!("overlay stopped: {}", mode.name());
        }
        self.active = None;
    }

    pub fn on_telemetry(
        &mut self,
        scene: &mut SceneGraph,
        event: &TelemetryEvent,
        now: Instant,
        config: &EngineConfig,
    ) {
        match &mut self.active {
            Some(ActiveOverlay::Heatmap(heatmap)) => {
                heatmap.record(&event.sensor_id, now);
                heatmap.record(&attribute_node_id(&event.sensor_id, &event.attribute_id), now);
            }
            Some(ActiveOverlay::Freshness(freshness)) => {
                freshness.record(&event.sensor_id, now);
                freshness.record(&attribute_node_id(&event.sensor_id, &event.attribute_id), now);
            }
            Some(ActiveOverlay::Heartbeat(heartbeat)) => heartbeat.on_telemetry(scene, event),
            Some(ActiveOverlay::River(river)) => river.spawn(scene, event, config),
            _ => {}
        }
    }

    pub fn on_activity(&mut self, event: &ActivityEvent, now: Instant) {
        match &mut self.active {
            Some(ActiveOverlay::Heatmap(heatmap)) => {
                heatmap.record(&event.sensor_id, now);
                for attr_id in &event.attribute_ids {
                    heatmap.record(&attribute_node_id(&event.sensor_id, attr_id), now);
                }
            }
            Some(ActiveOverlay::Freshness(freshness)) => {
                freshness.record(&event.sensor_id, now);
                for attr_id in &event.attribute_ids {
                    freshness.record(&attribute_node_id(&event.sensor_id, attr_id), now);
                }
            }
            _ => {}
        }
    }

    pub fn on_attention(
        &mut self,
        scene: &mut SceneGraph,
        glows: &mut GlowRegistry,
        event: &AttentionEvent,
        now: Instant,
        theme: &PanelTheme,
    ) {
        if let Some(ActiveOverlay::Attention(attention)) = &mut self.active {
            attention.on_attention(scene, glows, event, now, theme);
        }
    }

    /// Per-frame update. Returns `true` while the overlay still animates.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        glows: &mut GlowRegistry,
        now: Instant,
        config: &EngineConfig,
        theme: &PanelTheme,
    ) -> bool {
        match &mut self.active {
            Some(ActiveOverlay::Heatmap(heatmap)) => {
                heatmap.tick(scene, now, config.heatmap_decay(), theme)
            }
            Some(ActiveOverlay::Freshness(freshness)) => freshness.tick(
                scene,
                now,
                config.freshness_cadence(),
                config.fresh_flash(),
                theme,
            ),
            Some(ActiveOverlay::Heartbeat(heartbeat)) => {
                heartbeat.tick(scene, glows, now, theme)
            }
            Some(ActiveOverlay::River(river)) => river.tick(),
            Some(ActiveOverlay::Attention(_)) => false,
            None => false,
        }
    }

    /// Auxiliary-layer sprites owned by the active overlay
    pub fn sprites(&self, theme: &PanelTheme) -> Vec<HaloSprite> {
        match &self.active {
            Some(ActiveOverlay::River(river)) => river.sprites(theme),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_start_replaces_previous_state() {
        let mut host = OverlayHost::new();
        let now = Instant::now();
        let mut scene = testutil::scene(1, 1, 1);
        let config = EngineConfig::default();

        host.start(OverlayMode::River, now);
        let ev = TelemetryEvent {
            sensor_id: "u0s0".to_string(),
            attribute_id: "a0".to_string(),
            payload: json!(1),
            timestamp: Utc::now(),
        };
        host.on_telemetry(&mut scene, &ev, now, &config);
        assert_eq!(host.mode(), Some(OverlayMode::River));

        // Switching overlays starts from scratch
        host.start(OverlayMode::Heatmap, now);
        assert_eq!(host.mode(), Some(OverlayMode::Heatmap));
        host.stop();
        assert_eq!(host.mode(), None);
    }

    #[test]
    fn test_idle_host_reports_not_animating() {
        let mut host = OverlayHost::new();
        let mut scene = testutil::scene(1, 1, 1);
        let mut glows = GlowRegistry::new();
        let config = EngineConfig::default();
        let theme = PanelTheme::dark();

        assert!(!host.tick(&mut scene, &mut glows, Instant::now(), &config, &theme));
    }

    #[test]
    fn test_attention_routed_only_when_active() {
        let mut host = OverlayHost::new();
        let mut scene = testutil::scene(1, 1, 1);
        let mut glows = GlowRegistry::new();
        let theme = PanelTheme::dark();
        let now = Instant::now();
        let ev = AttentionEvent {
            sensor_id: "u0s0".to_string(),
            level: crate::events::AttentionLevel::High,
        };

        // Inactive: nothing happens
        host.on_attention(&mut scene, &mut glows, &ev, now, &theme);
        assert!(glows.is_empty());

        host.start(OverlayMode::Attention, now);
        host.on_attention(&mut scene, &mut glows, &ev, now, &theme);
        assert_eq!(glows.len(), 1);
    }
}
