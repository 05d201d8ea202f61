//! Level-of-Detail Controller
//!
//! Hides attribute nodes (and their incident edges) when the graph is large
//! and the camera is zoomed out. A single threshold toggle, re-evaluated on
//! every camera change; flipping it only marks the frame dirty, it never
//! recomputes a layout.

use crate::config::EngineConfig;
use crate::scene::{NodeKind, SceneGraph};

/// Attribute-node visibility state machine
#[derive(Debug, Default)]
pub struct LodController {
    attributes_hidden: bool,
}

impl LodController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes_hidden(&self) -> bool {
        self.attributes_hidden
    }

    /// Re-evaluate against the current camera and graph size.
    ///
    /// Returns `true` when visibility flipped and the scene was touched.
    pub fn evaluate(
        &mut self,
        scene: &mut SceneGraph,
        node_count: usize,
        zoom_ratio: f32,
        config: &EngineConfig,
    ) -> bool {
        let hide =
            node_count > config.lod_node_threshold && zoom_ratio > config.lod_zoom_threshold;
        if hide == self.attributes_hidden {
            return false;
        }

        self.attributes_hidden = hide;
        Self::apply(scene, hide);
        log::debug!(
            "LOD: attribute nodes {} ({} nodes, zoom {:.2})",
            if hide { "hidden" } else { "shown" },
            node_count,
            zoom_ratio
        );
        true
    }

    /// Re-impose the current visibility on a scene whose nodes were just
    /// recreated by a topology patch
    pub fn reapply(&self, scene: &mut SceneGraph) {
        Self::apply(scene, self.attributes_hidden);
    }

    fn apply(scene: &mut SceneGraph, hide: bool) {
        for node in scene.nodes.values_mut() {
            if node.kind == NodeKind::Attribute {
                node.visible = !hide;
            }
        }
        // An edge into a hidden attribute disappears with it
        let hidden: Vec<String> = scene
            .nodes
            .values()
            .filter(|n| !n.visible)
            .map(|n| n.id.clone())
            .collect();
        for edge in &mut scene.edges {
            edge.visible = !hidden.contains(&edge.source) && !hidden.contains(&edge.target);
        }
    }
}
