//! Engine Configuration
//!
//! Tuned policy constants for the topology engine. All of these bound cost or
//! pacing rather than correctness; hosts can deserialize overrides from JSON
//! the same way the panel's defaults are constructed here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy knobs for the topology engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce window for incoming topology snapshots
    pub topology_debounce_ms: u64,

    /// Incremental patch gives way to a full rebuild above this fraction
    /// of the current node count
    pub rebuild_fraction: f32,

    /// ... or above this absolute change count
    pub rebuild_absolute: usize,

    /// Layout transition duration
    pub transition_ms: u64,

    /// Minimum spacing between mode switches
    pub mode_guard_ms: u64,

    /// Lifetime of a glow halo
    pub glow_ms: u64,

    /// Attribute nodes are LOD-culled only above this node count
    pub lod_node_threshold: usize,

    /// ... and once the camera zoom ratio exceeds this
    pub lod_zoom_threshold: f32,

    /// Force layout moves to the worker thread at this node count
    pub worker_min_nodes: usize,

    /// Force layout switches to Barnes-Hut repulsion at this node count
    pub barnes_hut_min_nodes: usize,

    /// Worker run duration bounds; actual run scales with graph size
    pub worker_min_run_ms: u64,
    pub worker_max_run_ms: u64,

    /// Heatmap: each counted event expires after this window
    pub heatmap_decay_ms: u64,

    /// Freshness: staleness re-evaluation cadence
    pub freshness_cadence_ms: u64,

    /// Freshness: flash duration after a fresh event
    pub fresh_flash_ms: u64,

    /// River: particle capacity (oldest dropped beyond this)
    pub river_capacity: usize,

    /// River: progress advanced per frame
    pub river_step: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            topology_debounce_ms: 500,
            rebuild_fraction: 0.30,
            rebuild_absolute: 50,
            transition_ms: 450,
            mode_guard_ms: 600,
            glow_ms: 350,
            lod_node_threshold: 1000,
            lod_zoom_threshold: 2.5,
            worker_min_nodes: 50,
            barnes_hut_min_nodes: 100,
            worker_min_run_ms: 1500,
            worker_max_run_ms: 3000,
            heatmap_decay_ms: 10_000,
            freshness_cadence_ms: 500,
            fresh_flash_ms: 300,
            river_capacity: 400,
            river_step: 0.02,
        }
    }
}

impl EngineConfig {
    pub fn topology_debounce(&self) -> Duration {
        Duration::from_millis(self.topology_debounce_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn mode_guard(&self) -> Duration {
        Duration::from_millis(self.mode_guard_ms)
    }

    pub fn glow_duration(&self) -> Duration {
        Duration::from_millis(self.glow_ms)
    }

    pub fn heatmap_decay(&self) -> Duration {
        Duration::from_millis(self.heatmap_decay_ms)
    }

    pub fn freshness_cadence(&self) -> Duration {
        Duration::from_millis(self.freshness_cadence_ms)
    }

    pub fn fresh_flash(&self) -> Duration {
        Duration::from_millis(self.fresh_flash_ms)
    }

    /// Worker run budget for a graph of `node_count` nodes, scaled between
    /// the configured bounds
    pub fn worker_run(&self, node_count: usize) -> Duration {
        let t = ((node_count as f32 - self.worker_min_nodes as f32) / 400.0).clamp(0.0, 1.0);
        let ms = self.worker_min_run_ms as f32
            + t * (self.worker_max_run_ms.saturating_sub(self.worker_min_run_ms)) as f32;
        Duration::from_millis(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_run_scales_with_size() {
        let config = EngineConfig::default();
        let small = config.worker_run(50);
        let large = config.worker_run(2000);
        assert_eq!(small, Duration::from_millis(1500));
        assert_eq!(large, Duration::from_millis(3000));
        assert!(config.worker_run(250) > small);
        assert!(config.worker_run(250) < large);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rebuild_absolute, config.rebuild_absolute);
    }

    #[test]
    fn test_partial_override() {
        let config: EngineConfig = serde_json::from_str(r#"{"river_capacity": 16}"#).unwrap();
        assert_eq!(config.river_capacity, 16);
        assert_eq!(config.topology_debounce_ms, 500);
    }
}
