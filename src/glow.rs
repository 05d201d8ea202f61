//! Glow Compositor
//!
//! Registry of transient halo effects marking recent events. Entries decay
//! over a short fixed lifetime; each frame the compositor emits a layered
//! sprite set (core plus two angularly-offset wisps) for every live entry
//! inside the viewport. The pass is a no-op once the registry drains, so an
//! idle panel costs nothing.

use eframe::egui::Pos2;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::camera::CameraState;
use crate::frame::HaloSprite;
use crate::scene::SceneGraph;
use crate::theme::PanelTheme;

/// Event category a glow marks; each kind has a distinct palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlowKind {
    Data,
    Attention,
    Heartbeat,
    Connect,
    Disconnect,
}

/// Where a glow is anchored
#[derive(Debug, Clone)]
pub enum GlowAnchor {
    /// Follows a live node
    Node(String),

    /// Frozen position of a node that no longer exists
    Frozen(Pos2),
}

/// One active halo
#[derive(Debug, Clone)]
pub struct ActiveGlow {
    pub anchor: GlowAnchor,
    pub kind: GlowKind,
    pub started: Instant,
}

/// Viewport culling margin in model units
const CULL_MARGIN: f32 = 8.0;

/// Registry of active glows, keyed by node id
#[derive(Debug, Default)]
pub struct GlowRegistry {
    entries: HashMap<String, ActiveGlow>,
}

impl GlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or refresh) a glow following a live node
    pub fn trigger_node(&mut self, node_id: &str, kind: GlowKind, now: Instant) {
        self.entries.insert(
            node_id.to_string(),
            ActiveGlow { anchor: GlowAnchor::Node(node_id.to_string()), kind, started: now },
        );
    }

    /// Register a glow at a frozen position, for a node being removed
    pub fn trigger_frozen(&mut self, node_id: &str, pos: Pos2, kind: GlowKind, now: Instant) {
        self.entries.insert(
            node_id.to_string(),
            ActiveGlow { anchor: GlowAnchor::Frozen(pos), kind, started: now },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop expired entries and entries whose node vanished without a frozen
    /// snapshot
    pub fn prune(&mut self, scene: &SceneGraph, duration: Duration, now: Instant) {
        self.entries.retain(|_, glow| {
            if now.saturating_duration_since(glow.started) >= duration {
                return false;
            }
            match &glow.anchor {
                GlowAnchor::Node(id) => scene.get_node(id).is_some(),
                GlowAnchor::Frozen(_) => true,
            }
        });
    }

    /// Emit halo sprites for every live entry inside the viewport.
    ///
    /// Expired entries are never emitted even if `prune` has not run yet
    /// this frame.
    pub fn compose(
        &self,
        scene: &SceneGraph,
        camera: &CameraState,
        theme: &PanelTheme,
        duration: Duration,
        now: Instant,
    ) -> Vec<HaloSprite> {
        let mut sprites = Vec::new();
        if self.entries.is_empty() {
            return sprites;
        }

        for (key, glow) in &self.entries {
            let age = now.saturating_duration_since(glow.started);
            if age >= duration {
                continue;
            }

            let (pos, base) = match &glow.anchor {
                GlowAnchor::Node(id) => match scene.get_node(id) {
                    Some(node) => (node.pos, node.size),
                    None => continue,
                },
                GlowAnchor::Frozen(pos) => (*pos, 2.0),
            };

            if !camera.is_visible(pos, CULL_MARGIN) {
                continue;
            }

            let t = age.as_secs_f32() / duration.as_secs_f32();
            let color = theme.glow_color(glow.kind);
            let radius = base * 1.3 + t * base * 2.2;
            let alpha = 1.0 - t;

            // Core halo
            sprites.push(HaloSprite { pos, radius, color, alpha });

            // Two wisps, angularly offset and slowly rotating with age
            let seed = key.bytes().fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
            let base_angle = (seed % 628) as f32 / 100.0 + t * 1.8;
            for k in 0..2 {
                let angle = base_angle + k as f32 * std::f32::consts::PI * 0.9;
                let offset = Pos2::new(
                    pos.x + angle.cos() * radius * 0.45,
                    pos.y + angle.sin() * radius * 0.45,
                );
                sprites.push(HaloSprite {
                    pos: offset,
                    radius: radius * 0.55,
                    color,
                    alpha: alpha * 0.6,
                });
            }
        }

        sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, NodePayload, SceneNode};

    fn scene_with(id: &str, pos: Pos2) -> SceneGraph {
        let mut scene = SceneGraph::new();
        let mut node = SceneNode::new(
            id,
            NodeKind::Sensor,
            NodePayload::Sensor { label: String::new() },
        );
        node.pos = pos;
        scene.add_node(node);
        scene
    }

    #[test]
    fn test_glow_expires_after_duration() {
        let scene = scene_with("s1", Pos2::new(50.0, 50.0));
        let mut glows = GlowRegistry::new();
        let duration = Duration::from_millis(350);
        let t0 = Instant::now();

        glows.trigger_node("s1", GlowKind::Data, t0);
        glows.prune(&scene, duration, t0 + Duration::from_millis(349));
        assert_eq!(glows.len(), 1);

        glows.prune(&scene, duration, t0 + Duration::from_millis(350));
        assert!(glows.is_empty());
    }

    #[test]
    fn test_expired_glow_never_composed() {
        let scene = scene_with("s1", Pos2::new(50.0, 50.0));
        let mut glows = GlowRegistry::new();
        let duration = Duration::from_millis(350);
        let t0 = Instant::now();
        let camera = CameraState::default();
        let theme = PanelTheme::dark();

        glows.trigger_node("s1", GlowKind::Data, t0);
        let late = t0 + Duration::from_millis(400);
        // Not pruned yet, but still must not render
        assert!(glows.compose(&scene, &camera, &theme, duration, late).is_empty());
    }

    #[test]
    fn test_frozen_glow_survives_node_removal() {
        let mut scene = scene_with("s1", Pos2::new(40.0, 40.0));
        let mut glows = GlowRegistry::new();
        let duration = Duration::from_millis(350);
        let t0 = Instant::now();
        let camera = CameraState::default();
        let theme = PanelTheme::dark();

        glows.trigger_frozen("s1", Pos2::new(40.0, 40.0), GlowKind::Disconnect, t0);
        scene.remove_node("s1");

        glows.prune(&scene, duration, t0 + Duration::from_millis(100));
        assert_eq!(glows.len(), 1);
        let sprites = glows.compose(&scene, &camera, &theme, duration, t0 + Duration::from_millis(100));
        // Core + two wisps
        assert_eq!(sprites.len(), 3);
    }

    #[test]
    fn test_live_glow_dropped_when_node_vanishes() {
        let mut scene = scene_with("s1", Pos2::new(40.0, 40.0));
        let mut glows = GlowRegistry::new();
        let t0 = Instant::now();

        glows.trigger_node("s1", GlowKind::Data, t0);
        scene.remove_node("s1");
        glows.prune(&scene, Duration::from_millis(350), t0 + Duration::from_millis(10));
        assert!(glows.is_empty());
    }

    #[test]
    fn test_offscreen_glow_skipped() {
        let scene = scene_with("s1", Pos2::new(50.0, 50.0));
        let mut glows = GlowRegistry::new();
        let duration = Duration::from_millis(350);
        let t0 = Instant::now();
        let theme = PanelTheme::dark();

        // Zoomed far in on the opposite corner
        let mut camera = CameraState::default();
        camera.center = Pos2::new(5.0, 5.0);
        camera.zoom_ratio = 0.1;

        glows.trigger_node("s1", GlowKind::Data, t0);
        let sprites = glows.compose(&scene, &camera, &theme, duration, t0 + Duration::from_millis(10));
        assert!(sprites.is_empty());
    }

    #[test]
    fn test_alpha_fades_with_age() {
        let scene = scene_with("s1", Pos2::new(50.0, 50.0));
        let mut glows = GlowRegistry::new();
        let duration = Duration::from_millis(350);
        let t0 = Instant::now();
        let camera = CameraState::default();
        let theme = PanelTheme::dark();

        glows.trigger_node("s1", GlowKind::Heartbeat, t0);
        let early = glows.compose(&scene, &camera, &theme, duration, t0 + Duration::from_millis(50));
        let late = glows.compose(&scene, &camera, &theme, duration, t0 + Duration::from_millis(300));
        assert!(early[0].alpha > late[0].alpha);
        assert!(early[0].radius < late[0].radius);
    }
}
