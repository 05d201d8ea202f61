//! Activity Heatmap Overlay
//!
//! Per-node rolling event counter; each counted event expires after a fixed
//! decay window. The live count buckets into five color tiers and nudges the
//! node size up modestly.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::scene::{NodeKind, SceneGraph};
use crate::theme::PanelTheme;

/// Count thresholds for tiers 1..=4; below the first is tier 0
const TIER_STEPS: [usize; 4] = [1, 3, 6, 11];

/// Bucket a live count into a tier index 0..=4
pub fn tier(count: usize) -> usize {
    TIER_STEPS.iter().filter(|&&step| count >= step).count()
}

#[derive(Debug, Default)]
pub struct HeatmapOverlay {
    /// Timestamps of recent events per node, oldest first
    events: HashMap<String, VecDeque<Instant>>,
}

impl HeatmapOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event against a node
    pub fn record(&mut self, node_id: &str, now: Instant) {
        self.events.entry(node_id.to_string()).or_default().push_back(now);
    }

    /// Decay counters and recolor the scene. Returns `true` while any
    /// counter is still alive.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        now: Instant,
        decay: Duration,
        theme: &PanelTheme,
    ) -> bool {
        for stamps in self.events.values_mut() {
            while let Some(front) = stamps.front() {
                if now.saturating_duration_since(*front) >= decay {
                    stamps.pop_front();
                } else {
                    break;
                }
            }
        }
        self.events.retain(|_, stamps| !stamps.is_empty());

        for node in scene.nodes.values_mut() {
            if !matches!(node.kind, NodeKind::Sensor | NodeKind::Attribute) {
                continue;
            }
            let count = self.events.get(&node.id).map(|s| s.len()).unwrap_or(0);
            node.color = theme.heat_color(tier(count));
            node.size = node.kind.base_size() * (1.0 + 0.05 * count.min(12) as f32);
        }

        !self.events.is_empty()
    }

    #[cfg(test)]
    pub fn live_count(&self, node_id: &str) -> usize {
        self.events.get(node_id).map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_tier_buckets() {
        assert_eq!(tier(0), 0);
        assert_eq!(tier(1), 1);
        assert_eq!(tier(2), 1);
        assert_eq!(tier(3), 2);
        assert_eq!(tier(5), 2);
        assert_eq!(tier(6), 3);
        assert_eq!(tier(10), 3);
        assert_eq!(tier(11), 4);
        assert_eq!(tier(100), 4);
    }

    #[test]
    fn test_counts_decay_per_increment() {
        let mut scene = testutil::scene(1, 1, 0);
        let mut heatmap = HeatmapOverlay::new();
        let theme = PanelTheme::dark();
        let decay = Duration::from_secs(10);
        let t0 = Instant::now();

        heatmap.record("u0s0", t0);
        heatmap.record("u0s0", t0 + Duration::from_secs(5));

        // Both alive at t0+6
        heatmap.tick(&mut scene, t0 + Duration::from_secs(6), decay, &theme);
        assert_eq!(heatmap.live_count("u0s0"), 2);

        // First expired at t0+11, second still alive
        heatmap.tick(&mut scene, t0 + Duration::from_secs(11), decay, &theme);
        assert_eq!(heatmap.live_count("u0s0"), 1);

        // All gone; overlay goes idle
        assert!(!heatmap.tick(&mut scene, t0 + Duration::from_secs(20), decay, &theme));
    }

    #[test]
    fn test_hot_node_grows_and_recolors() {
        let mut scene = testutil::scene(1, 1, 0);
        let mut heatmap = HeatmapOverlay::new();
        let theme = PanelTheme::dark();
        let t0 = Instant::now();

        for _ in 0..7 {
            heatmap.record("u0s0", t0);
        }
        heatmap.tick(&mut scene, t0, Duration::from_secs(10), &theme);

        let node = scene.get_node("u0s0").unwrap();
        assert_eq!(node.color, theme.heat_tiers[3]);
        assert!(node.size > crate::scene::NodeKind::Sensor.base_size());
    }
}
