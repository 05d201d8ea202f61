//! Scene Graph Data Structures
//!
//! In-memory node/edge storage for the topology view. Positions live on the
//! normalized 0-100 plane; appearance attributes (size, color, alpha,
//! visibility) are mutated in place by layouts and overlays.

use eframe::egui::{Color32, Pos2, Vec2};
use std::collections::HashMap;

use crate::theme::PanelTheme;

/// What a node represents in the topology tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Room,
    User,
    Sensor,
    Attribute,
}

impl NodeKind {
    /// Default node radius in model units
    pub fn base_size(&self) -> f32 {
        match self {
            NodeKind::Room => 4.5,
            NodeKind::User => 3.2,
            NodeKind::Sensor => 2.0,
            NodeKind::Attribute => 1.1,
        }
    }
}

/// Per-kind domain record carried by a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Room { name: String },
    User { connector_id: String, sensor_count: usize },
    Sensor { label: String },
    Attribute { attr_type: String, last_value: Option<serde_json::Value> },
}

/// A node in the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Stable identifier; uniquely determines kind and payload
    pub id: String,

    /// Topology level
    pub kind: NodeKind,

    /// Position on the normalized 0-100 plane
    pub pos: Pos2,

    /// Radius in model units
    pub size: f32,

    /// Fill color
    pub color: Color32,

    /// Opacity (0.0 - 1.0)
    pub alpha: f32,

    /// Visibility toggle (LOD culling)
    pub visible: bool,

    /// Parent node id; upward traversal is a map lookup, never an edge walk
    pub parent: Option<String>,

    /// Domain record
    pub payload: NodePayload,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            kind,
            pos: Pos2::new(50.0, 50.0),
            size: kind.base_size(),
            color: Color32::GRAY,
            alpha: 1.0,
            visible: true,
            parent: None,
            payload,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Whether a model-space point falls inside this node
    pub fn contains(&self, p: Pos2) -> bool {
        (p - self.pos).length() <= self.size
    }
}

/// A structural edge between two nodes
#[derive(Debug, Clone)]
pub struct SceneEdge {
    pub source: String,
    pub target: String,

    /// Stroke width in model units
    pub size: f32,

    pub color: Color32,

    /// Perpendicular bow of the edge midpoint, in model units
    pub curvature: f32,

    /// Visibility toggle (follows LOD culling of the endpoints)
    pub visible: bool,
}

impl SceneEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            size: 0.25,
            color: Color32::GRAY,
            curvature: 0.0,
            visible: true,
        }
    }
}

/// The positioned projection of the current topology
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub nodes: HashMap<String, SceneNode>,
    pub edges: Vec<SceneEdge>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node
    pub fn add_node(&mut self, node: SceneNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add a structural edge. Self-edges, duplicate ordered pairs, and edges
    /// referencing missing nodes are rejected silently.
    pub fn add_edge(&mut self, edge: SceneEdge) -> bool {
        if edge.source == edge.target {
            log::debug!("rejecting self-edge on {}", edge.source);
            return false;
        }
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            log::debug!("rejecting edge {} -> {}: missing endpoint", edge.source, edge.target);
            return false;
        }
        if self
            .edges
            .iter()
            .any(|e| e.source == edge.source && e.target == edge.target)
        {
            log::debug!("rejecting duplicate edge {} -> {}", edge.source, edge.target);
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Remove a node and every incident edge
    pub fn remove_node(&mut self, id: &str) -> Option<SceneNode> {
        let removed = self.nodes.remove(id);
        if removed.is_some() {
            self.edges.retain(|e| e.source != id && e.target != id);
        }
        removed
    }

    pub fn get_node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }

    /// Node ids in sorted order, for deterministic iteration
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids of nodes whose parent is `id`, sorted
    pub fn children_of(&self, id: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.parent.as_deref() == Some(id))
            .map(|n| n.id.clone())
            .collect();
        out.sort();
        out
    }

    /// Topmost visible node under a model-space point
    pub fn node_at(&self, p: Pos2) -> Option<&SceneNode> {
        // Smallest hit wins so attributes are pickable inside sensor halos
        self.nodes
            .values()
            .filter(|n| n.visible && n.contains(p))
            .min_by(|a, b| a.size.total_cmp(&b.size))
    }

    /// Restore default per-kind appearance after an overlay is stopped
    pub fn reset_appearance(&mut self, theme: &PanelTheme) {
        for node in self.nodes.values_mut() {
            node.color = theme.node_color(node.kind);
            node.size = node.kind.base_size();
            node.alpha = 1.0;
        }
        for edge in &mut self.edges {
            edge.color = theme.edge_color;
        }
    }

    /// Clamp every node onto the plane (layouts already stay inside; this
    /// guards patched-in jitter near the borders)
    pub fn clamp_to_plane(&mut self) {
        for node in self.nodes.values_mut() {
            node.pos.x = node.pos.x.clamp(0.0, 100.0);
            node.pos.y = node.pos.y.clamp(0.0, 100.0);
        }
    }
}

/// Deterministic per-id jitter offset, bounded by `amplitude` model units.
///
/// FNV-1a over the id; never identity-affecting, so layouts stay
/// reproducible for the same graph.
pub fn id_jitter(id: &str, amplitude: f32) -> Vec2 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in id.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    let a = ((hash & 0xffff) as f32 / 65535.0) * 2.0 - 1.0;
    let b = (((hash >> 16) & 0xffff) as f32 / 65535.0) * 2.0 - 1.0;
    Vec2::new(a * amplitude, b * amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> SceneNode {
        SceneNode::new(
            id,
            NodeKind::User,
            NodePayload::User { connector_id: id.to_string(), sensor_count: 0 },
        )
    }

    #[test]
    fn test_rejects_self_and_duplicate_edges() {
        let mut scene = SceneGraph::new();
        scene.add_node(user("a"));
        scene.add_node(user("b"));

        assert!(!scene.add_edge(SceneEdge::new("a", "a")));
        assert!(scene.add_edge(SceneEdge::new("a", "b")));
        assert!(!scene.add_edge(SceneEdge::new("a", "b")));
        assert!(!scene.add_edge(SceneEdge::new("a", "missing")));
        assert_eq!(scene.edges.len(), 1);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut scene = SceneGraph::new();
        scene.add_node(user("a"));
        scene.add_node(user("b"));
        scene.add_edge(SceneEdge::new("a", "b"));

        scene.remove_node("b");
        assert!(scene.edges.is_empty());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_node_at_prefers_smallest() {
        let mut scene = SceneGraph::new();
        let mut big = user("big");
        big.pos = Pos2::new(50.0, 50.0);
        big.size = 10.0;
        let mut small = user("small");
        small.pos = Pos2::new(50.0, 50.0);
        small.size = 1.0;
        scene.add_node(big);
        scene.add_node(small);

        assert_eq!(scene.node_at(Pos2::new(50.0, 50.0)).unwrap().id, "small");
    }

    #[test]
    fn test_id_jitter_is_stable_and_bounded() {
        let a = id_jitter("sensor-1", 2.0);
        let b = id_jitter("sensor-1", 2.0);
        let c = id_jitter("sensor-2", 2.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.x.abs() <= 2.0 && a.y.abs() <= 2.0);
    }
}
