//! Data River Overlay
//!
//! Telemetry events spawn particles that flow along the user -> sensor ->
//! attribute path. Particles advance a fixed increment per frame and are
//! discarded on completion; a capacity bound drops the oldest first. They
//! render as soft sprites with a fading trail on the auxiliary layer, never
//! as graph nodes.

use eframe::egui::Pos2;
use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::events::TelemetryEvent;
use crate::frame::HaloSprite;
use crate::scene::{attribute_node_id, SceneGraph};
use crate::theme::PanelTheme;

/// One flowing particle
#[derive(Debug, Clone)]
pub struct Particle {
    /// user, sensor, attribute positions captured at spawn
    pub waypoints: Vec<Pos2>,

    /// Path completion, [0, 1)
    pub progress: f32,

    /// Progress advanced per frame
    pub speed: f32,
}

impl Particle {
    /// Position along the waypoint polyline at the current progress
    pub fn position(&self) -> Pos2 {
        self.position_at(self.progress)
    }

    fn position_at(&self, progress: f32) -> Pos2 {
        let segments = self.waypoints.len() - 1;
        let t = progress.clamp(0.0, 1.0) * segments as f32;
        let seg = (t as usize).min(segments - 1);
        let local = t - seg as f32;
        let a = self.waypoints[seg];
        let b = self.waypoints[seg + 1];
        Pos2::new(a.x + (b.x - a.x) * local, a.y + (b.y - a.y) * local)
    }
}

#[derive(Debug, Default)]
pub struct RiverOverlay {
    particles: VecDeque<Particle>,

    /// Spawn sequence; varies per-particle speed deterministically
    seq: u64,
}

impl RiverOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Spawn a particle for a telemetry event. Events referencing unknown
    /// nodes spawn nothing.
    pub fn spawn(&mut self, scene: &SceneGraph, event: &TelemetryEvent, config: &EngineConfig) {
        let Some(sensor) = scene.get_node(&event.sensor_id) else {
            return;
        };
        let attr_id = attribute_node_id(&event.sensor_id, &event.attribute_id);
        let Some(attribute) = scene.get_node(&attr_id) else {
            return;
        };
        let Some(user) = sensor.parent.as_ref().and_then(|p| scene.get_node(p)) else {
            return;
        };

        let jitter = (self.seq % 7) as f32 / 7.0;
        self.seq += 1;
        self.particles.push_back(Particle {
            waypoints: vec![user.pos, sensor.pos, attribute.pos],
            progress: 0.0,
            speed: config.river_step * (0.85 + 0.3 * jitter),
        });

        while self.particles.len() > config.river_capacity {
            self.particles.pop_front();
        }
    }

    /// Advance every particle one frame; completed particles are discarded.
    /// Returns `true` while any particle is in flight.
    pub fn tick(&mut self) -> bool {
        for particle in &mut self.particles {
            particle.progress += particle.speed;
        }
        self.particles.retain(|p| p.progress < 1.0);
        !self.particles.is_empty()
    }

    /// Soft sprites for the auxiliary layer: a bright head plus a fading
    /// trail behind it
    pub fn sprites(&self, theme: &PanelTheme) -> Vec<HaloSprite> {
        let mut out = Vec::with_capacity(self.particles.len() * 4);
        for particle in &self.particles {
            out.push(HaloSprite {
                pos: particle.position(),
                radius: 1.3,
                color: theme.river_particle,
                alpha: 0.85,
            });
            for (k, alpha) in [(1usize, 0.4f32), (2, 0.22), (3, 0.1)] {
                let behind = particle.progress - k as f32 * 0.035;
                if behind < 0.0 {
                    continue;
                }
                out.push(HaloSprite {
                    pos: particle.position_at(behind),
                    radius: 1.3 - k as f32 * 0.25,
                    color: theme.river_particle,
                    alpha,
                });
            }
        }
        out
    }

    #[cfg(test)]
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;
    use chrono::Utc;
    use serde_json::json;

    fn event(sensor: &str, attr: &str) -> TelemetryEvent {
        TelemetryEvent {
            sensor_id: sensor.to_string(),
            attribute_id: attr.to_string(),
            payload: json!(1.0),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_spawn_captures_three_waypoints() {
        let scene = testutil::scene(1, 1, 1);
        let mut river = RiverOverlay::new();
        let config = EngineConfig::default();

        river.spawn(&scene, &event("u0s0", "a0"), &config);
        assert_eq!(river.len(), 1);
        let particle = river.particles().next().unwrap();
        assert_eq!(particle.waypoints.len(), 3);
        assert_eq!(particle.waypoints[0], scene.get_node("u0").unwrap().pos);
        assert_eq!(particle.waypoints[1], scene.get_node("u0s0").unwrap().pos);
    }

    #[test]
    fn test_unknown_ids_spawn_nothing() {
        let scene = testutil::scene(1, 1, 1);
        let mut river = RiverOverlay::new();
        let config = EngineConfig::default();

        river.spawn(&scene, &event("ghost", "a0"), &config);
        river.spawn(&scene, &event("u0s0", "ghost"), &config);
        assert!(river.is_empty());
    }

    #[test]
    fn test_progress_strictly_increases_until_removal() {
        let scene = testutil::scene(1, 1, 1);
        let mut river = RiverOverlay::new();
        let mut config = EngineConfig::default();
        config.river_step = 0.3;

        river.spawn(&scene, &event("u0s0", "a0"), &config);
        let mut last = 0.0;
        let mut frames = 0;
        while river.tick() {
            let p = river.particles().next().unwrap().progress;
            assert!(p > last);
            last = p;
            frames += 1;
            assert!(frames < 10, "particle never completed");
        }
        assert!(river.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest_first() {
        let scene = testutil::scene(1, 1, 1);
        let mut river = RiverOverlay::new();
        let mut config = EngineConfig::default();
        config.river_capacity = 3;

        for _ in 0..5 {
            river.spawn(&scene, &event("u0s0", "a0"), &config);
        }
        assert_eq!(river.len(), 3);
    }

    #[test]
    fn test_sprites_trail_behind_head() {
        let scene = testutil::scene(1, 1, 1);
        let mut river = RiverOverlay::new();
        let config = EngineConfig::default();

        river.spawn(&scene, &event("u0s0", "a0"), &config);
        for _ in 0..10 {
            river.tick();
        }
        let theme = PanelTheme::dark();
        let sprites = river.sprites(&theme);
        assert!(sprites.len() >= 2);
        // Head is the brightest
        assert!(sprites[0].alpha > sprites[1].alpha);
    }
}
