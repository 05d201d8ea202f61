//! Per-Frame Render Output
//!
//! Flat attribute arrays handed to the rendering backend each frame. The
//! engine fills these; the host adapter (or any other backend) just draws
//! them in order: edges, nodes, then halo sprites on the auxiliary layer.

use eframe::egui::{Color32, Pos2};

use crate::scene::NodeKind;

/// Drawable state of one node
#[derive(Debug, Clone)]
pub struct NodeInstance {
    pub id: String,
    pub kind: NodeKind,
    pub pos: Pos2,
    pub size: f32,
    pub color: Color32,
    pub alpha: f32,
}

/// Drawable state of one edge, endpoints pre-resolved
#[derive(Debug, Clone)]
pub struct EdgeInstance {
    pub from: Pos2,
    pub to: Pos2,
    pub size: f32,
    pub color: Color32,
    pub curvature: f32,
}

/// One soft radial-gradient sprite on the auxiliary layer.
///
/// Used for both glow halos and river particles; `alpha` already includes
/// any age fade.
#[derive(Debug, Clone, Copy)]
pub struct HaloSprite {
    pub pos: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub alpha: f32,
}

/// Everything the backend needs to draw one frame
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub nodes: Vec<NodeInstance>,
    pub edges: Vec<EdgeInstance>,

    /// Auxiliary-layer sprites (glows, particles); cleared every frame
    pub halos: Vec<HaloSprite>,
}

impl RenderFrame {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.halos.is_empty()
    }
}
