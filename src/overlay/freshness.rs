//! Freshness Decay Overlay
//!
//! Tracks the last update per node and fades stale nodes down through fixed
//! staleness breakpoints on a periodic cadence. A fresh event briefly
//! flashes the node lighter before it settles back to its tier.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::scene::{NodeKind, SceneGraph};
use crate::theme::{lighten, PanelTheme};

/// (max staleness, opacity, size factor), evaluated in order
const BREAKPOINTS: [(Duration, f32, f32); 4] = [
    (Duration::from_secs(2), 1.0, 1.0),
    (Duration::from_secs(10), 0.8, 0.92),
    (Duration::from_secs(30), 0.55, 0.82),
    (Duration::from_secs(120), 0.35, 0.72),
];

/// Fallback tier past the last breakpoint
const STALE: (f32, f32) = (0.18, 0.6);

/// Opacity and size factor for a given staleness
pub fn staleness_level(age: Duration) -> (f32, f32) {
    for (limit, alpha, scale) in BREAKPOINTS {
        if age < limit {
            return (alpha, scale);
        }
    }
    STALE
}

#[derive(Debug)]
pub struct FreshnessOverlay {
    /// Overlay start; nodes never updated age from here
    started: Instant,

    /// Last event per node
    last_event: HashMap<String, Instant>,

    /// Cadence gate
    last_eval: Option<Instant>,
}

impl FreshnessOverlay {
    pub fn new(now: Instant) -> Self {
        Self { started: now, last_event: HashMap::new(), last_eval: None }
    }

    /// Mark a node freshly updated
    pub fn record(&mut self, node_id: &str, now: Instant) {
        self.last_event.insert(node_id.to_string(), now);
    }

    /// Periodic staleness evaluation. Cheap between cadence boundaries;
    /// always reports animating since staleness only grows.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        now: Instant,
        cadence: Duration,
        flash: Duration,
        theme: &PanelTheme,
    ) -> bool {
        if let Some(last) = self.last_eval {
            if now.saturating_duration_since(last) < cadence {
                return true;
            }
        }
        self.last_eval = Some(now);

        for node in scene.nodes.values_mut() {
            if !matches!(node.kind, NodeKind::Sensor | NodeKind::Attribute) {
                continue;
            }
            let seen = self.last_event.get(&node.id).copied().unwrap_or(self.started);
            let age = now.saturating_duration_since(seen);
            let (alpha, scale) = staleness_level(age);
            node.alpha = alpha;
            node.size = node.kind.base_size() * scale;

            let base = theme.node_color(node.kind);
            node.color = if age < flash { lighten(base, 0.6) } else { base };
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_breakpoints_monotonically_decrease() {
        let ages = [0u64, 3, 15, 60, 500];
        let mut previous = (f32::MAX, f32::MAX);
        for secs in ages {
            let (alpha, scale) = staleness_level(Duration::from_secs(secs));
            assert!(alpha <= previous.0 && scale <= previous.1);
            previous = (alpha, scale);
        }
        assert_eq!(staleness_level(Duration::from_secs(1)), (1.0, 1.0));
        assert_eq!(staleness_level(Duration::from_secs(500)), STALE);
    }

    #[test]
    fn test_fresh_event_flashes_then_reverts() {
        let mut scene = testutil::scene(1, 1, 0);
        let theme = PanelTheme::dark();
        let t0 = Instant::now();
        let mut overlay = FreshnessOverlay::new(t0);
        let cadence = Duration::from_millis(500);
        let flash = Duration::from_millis(300);

        overlay.record("u0s0", t0);
        overlay.tick(&mut scene, t0 + Duration::from_millis(100), cadence, flash, &theme);
        let flashed = scene.get_node("u0s0").unwrap().color;
        assert_ne!(flashed, theme.node_sensor);

        overlay.tick(&mut scene, t0 + Duration::from_millis(700), cadence, flash, &theme);
        assert_eq!(scene.get_node("u0s0").unwrap().color, theme.node_sensor);
    }

    #[test]
    fn test_untouched_node_fades_from_overlay_start() {
        let mut scene = testutil::scene(1, 1, 0);
        let theme = PanelTheme::dark();
        let t0 = Instant::now();
        let mut overlay = FreshnessOverlay::new(t0);

        overlay.tick(
            &mut scene,
            t0 + Duration::from_secs(40),
            Duration::from_millis(500),
            Duration::from_millis(300),
            &theme,
        );
        let node = scene.get_node("u0s0").unwrap();
        assert_eq!(node.alpha, 0.35);
    }

    #[test]
    fn test_cadence_gates_reevaluation() {
        let mut scene = testutil::scene(1, 1, 0);
        let theme = PanelTheme::dark();
        let t0 = Instant::now();
        let mut overlay = FreshnessOverlay::new(t0);
        let cadence = Duration::from_millis(500);
        let flash = Duration::from_millis(300);

        overlay.tick(&mut scene, t0, cadence, flash, &theme);
        let alpha_before = scene.get_node("u0s0").unwrap().alpha;

        // A tick 100ms later is inside the cadence window; nothing changes
        overlay.record("u0s0", t0 + Duration::from_millis(50));
        overlay.tick(&mut scene, t0 + Duration::from_millis(100), cadence, flash, &theme);
        assert_eq!(scene.get_node("u0s0").unwrap().alpha, alpha_before);
    }
}
