//! Topology Diff Engine
//!
//! Compares the previous and current topology snapshots, applies the minimal
//! add/remove set to the scene graph, and falls back to a full rebuild when
//! the churn is large enough that patching stops being worth it. Snapshot
//! submission is debounced so a burst of connector changes collapses into a
//! single patch.

use eframe::egui::Pos2;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::model::{id_jitter, NodeKind, NodePayload, SceneEdge, SceneGraph, SceneNode};
use super::snapshot::TopologySnapshot;
use crate::config::EngineConfig;
use crate::glow::{GlowKind, GlowRegistry};
use crate::theme::PanelTheme;

/// Node id for an attribute, namespaced under its sensor
pub fn attribute_node_id(sensor_id: &str, attr_id: &str) -> String {
    format!("{}:{}", sensor_id, attr_id)
}

/// What a snapshot application did to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Snapshot matched the scene exactly
    Unchanged,
    /// Incremental patch
    Patched { added: usize, removed: usize },
    /// Full drop-and-recreate
    Rebuilt,
}

/// Debounced diff engine over topology snapshots
#[derive(Debug, Default)]
pub struct TopologyDiffer {
    /// Snapshot waiting out the debounce window
    pending: Option<(TopologySnapshot, Instant)>,

    /// User ids present after the last applied snapshot
    known_users: HashSet<String>,

    /// Sensor ids present after the last applied snapshot
    known_sensors: HashSet<String>,

    /// Room ids present after the last applied snapshot
    known_rooms: HashSet<String>,

    /// Whether any snapshot has been applied yet
    built: bool,
}

impl TopologyDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot; each submission restarts the debounce delay
    pub fn submit(&mut self, snapshot: TopologySnapshot, now: Instant, debounce: Duration) {
        self.pending = Some((snapshot, now + debounce));
    }

    /// Snapshot whose debounce window has elapsed, if any
    pub fn take_due(&mut self, now: Instant) -> Option<TopologySnapshot> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(s, _)| s),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the scene has ever been built from a snapshot
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Apply a snapshot to the scene, patching incrementally or rebuilding
    pub fn apply(
        &mut self,
        scene: &mut SceneGraph,
        glows: &mut GlowRegistry,
        snapshot: &TopologySnapshot,
        theme: &PanelTheme,
        config: &EngineConfig,
        now: Instant,
    ) -> PatchOutcome {
        let target_users: HashSet<String> =
            snapshot.users.iter().map(|u| u.connector_id.clone()).collect();
        let target_sensors: HashSet<String> = snapshot.sensors.keys().cloned().collect();

        if !self.built {
            self.rebuild(scene, snapshot, theme);
            return PatchOutcome::Rebuilt;
        }

        let added_users: Vec<&String> = target_users.difference(&self.known_users).collect();
        let removed_users: Vec<String> =
            self.known_users.difference(&target_users).cloned().collect();
        let added_sensors: Vec<&String> = target_sensors.difference(&self.known_sensors).collect();
        let removed_sensors: Vec<String> =
            self.known_sensors.difference(&target_sensors).cloned().collect();

        let change_count =
            added_users.len() + removed_users.len() + added_sensors.len() + removed_sensors.len();

        let limit = ((scene.node_count() as f32 * config.rebuild_fraction) as usize)
            .min(config.rebuild_absolute);
        if change_count > limit {
            log::info!(
                "topology churn ({} changes, limit {}): full rebuild",
                change_count,
                limit
            );
            self.rebuild(scene, snapshot, theme);
            return PatchOutcome::Rebuilt;
        }

        let mut added = 0usize;
        let mut removed = 0usize;

        // Departing sensors leave a frozen disconnect halo behind
        for sensor_id in &removed_sensors {
            if let Some(node) = scene.get_node(sensor_id) {
                glows.trigger_frozen(sensor_id, node.pos, GlowKind::Disconnect, now);
            }
            for attr_id in scene.children_of(sensor_id) {
                scene.remove_node(&attr_id);
                removed += 1;
            }
            if scene.remove_node(sensor_id).is_some() {
                removed += 1;
            }
        }

        for user_id in &removed_users {
            if scene.remove_node(user_id).is_some() {
                removed += 1;
            }
        }

        // Room set rarely changes; keep it exact anyway
        let target_rooms: HashSet<String> = snapshot.rooms.iter().map(|r| r.id.clone()).collect();
        for room_id in self.known_rooms.difference(&target_rooms) {
            if scene.remove_node(room_id).is_some() {
                removed += 1;
            }
        }
        for room in &snapshot.rooms {
            if !self.known_rooms.contains(&room.id) {
                scene.add_node(Self::room_node(room.id.clone(), room.name.clone(), theme));
                added += 1;
            }
        }

        for user in &snapshot.users {
            if self.known_users.contains(&user.connector_id) {
                // Refresh the payload on surviving users
                if let Some(node) = scene.get_node_mut(&user.connector_id) {
                    node.payload = NodePayload::User {
                        connector_id: user.connector_id.clone(),
                        sensor_count: user.sensor_count,
                    };
                }
                continue;
            }
            let mut node = SceneNode::new(
                user.connector_id.clone(),
                NodeKind::User,
                NodePayload::User {
                    connector_id: user.connector_id.clone(),
                    sensor_count: user.sensor_count,
                },
            );
            node.pos = Pos2::new(50.0, 50.0) + id_jitter(&user.connector_id, 18.0);
            node.color = theme.node_color(NodeKind::User);
            scene.add_node(node);
            added += 1;
        }

        for (sensor_id, info) in &snapshot.sensors {
            if self.known_sensors.contains(sensor_id) {
                let (a, r) = self.patch_attributes(scene, sensor_id, info, theme);
                added += a;
                removed += r;
                continue;
            }
            let parent_pos = scene
                .get_node(&info.user_id)
                .map(|n| n.pos)
                .unwrap_or(Pos2::new(50.0, 50.0));
            let mut node = SceneNode::new(
                sensor_id.clone(),
                NodeKind::Sensor,
                NodePayload::Sensor { label: info.label.clone() },
            )
            .with_parent(info.user_id.clone());
            node.pos = parent_pos + id_jitter(sensor_id, 6.0);
            node.color = theme.node_color(NodeKind::Sensor);
            scene.add_node(node);
            scene.add_edge(Self::tree_edge(&info.user_id, sensor_id, theme));
            glows.trigger_node(sensor_id, GlowKind::Connect, now);
            added += 1;

            for (attr_id, attr) in &info.attributes {
                added += Self::add_attribute(scene, sensor_id, attr_id, &attr.attr_type, theme);
            }
        }

        self.known_users = target_users;
        self.known_sensors = target_sensors;
        self.known_rooms = target_rooms;
        scene.clamp_to_plane();

        if added == 0 && removed == 0 {
            PatchOutcome::Unchanged
        } else {
            log::debug!("topology patch: +{} -{} nodes", added, removed);
            PatchOutcome::Patched { added, removed }
        }
    }

    /// Reconcile the attribute set of a surviving sensor.
    /// Returns (added, removed) node counts.
    fn patch_attributes(
        &self,
        scene: &mut SceneGraph,
        sensor_id: &str,
        info: &super::snapshot::SensorInfo,
        theme: &PanelTheme,
    ) -> (usize, usize) {
        let target: HashSet<String> = info
            .attributes
            .keys()
            .map(|a| attribute_node_id(sensor_id, a))
            .collect();
        let current: HashSet<String> = scene.children_of(sensor_id).into_iter().collect();

        let mut removed = 0;
        for gone in current.difference(&target) {
            if scene.remove_node(gone).is_some() {
                removed += 1;
            }
        }

        let mut added = 0;
        for (attr_id, attr) in &info.attributes {
            if !current.contains(&attribute_node_id(sensor_id, attr_id)) {
                added += Self::add_attribute(scene, sensor_id, attr_id, &attr.attr_type, theme);
            }
        }
        (added, removed)
    }

    fn add_attribute(
        scene: &mut SceneGraph,
        sensor_id: &str,
        attr_id: &str,
        attr_type: &str,
        theme: &PanelTheme,
    ) -> usize {
        let node_id = attribute_node_id(sensor_id, attr_id);
        let parent_pos = scene
            .get_node(sensor_id)
            .map(|n| n.pos)
            .unwrap_or(Pos2::new(50.0, 50.0));
        let mut node = SceneNode::new(
            node_id.clone(),
            NodeKind::Attribute,
            NodePayload::Attribute { attr_type: attr_type.to_string(), last_value: None },
        )
        .with_parent(sensor_id.to_string());
        node.pos = parent_pos + id_jitter(&node_id, 3.0);
        node.color = theme.node_color(NodeKind::Attribute);
        scene.add_node(node);
        scene.add_edge(Self::tree_edge(sensor_id, &node_id, theme));
        1
    }

    fn room_node(id: String, name: String, theme: &PanelTheme) -> SceneNode {
        let mut node = SceneNode::new(id.clone(), NodeKind::Room, NodePayload::Room { name });
        node.pos = Pos2::new(50.0, 6.0) + id_jitter(&id, 12.0);
        node.pos.y = node.pos.y.clamp(2.0, 12.0);
        node.color = theme.node_color(NodeKind::Room);
        node
    }

    fn tree_edge(source: &str, target: &str, theme: &PanelTheme) -> SceneEdge {
        let mut edge = SceneEdge::new(source, target);
        edge.color = theme.edge_color;
        edge
    }

    /// Drop and recreate every node and edge from the snapshot
    fn rebuild(&mut self, scene: &mut SceneGraph, snapshot: &TopologySnapshot, theme: &PanelTheme) {
        scene.nodes.clear();
        scene.edges.clear();

        for room in &snapshot.rooms {
            scene.add_node(Self::room_node(room.id.clone(), room.name.clone(), theme));
        }

        for user in &snapshot.users {
            let mut node = SceneNode::new(
                user.connector_id.clone(),
                NodeKind::User,
                NodePayload::User {
                    connector_id: user.connector_id.clone(),
                    sensor_count: user.sensor_count,
                },
            );
            node.pos = Pos2::new(50.0, 50.0) + id_jitter(&user.connector_id, 22.0);
            node.color = theme.node_color(NodeKind::User);
            scene.add_node(node);
        }

        for (sensor_id, info) in &snapshot.sensors {
            let parent_pos = scene
                .get_node(&info.user_id)
                .map(|n| n.pos)
                .unwrap_or(Pos2::new(50.0, 50.0));
            let mut node = SceneNode::new(
                sensor_id.clone(),
                NodeKind::Sensor,
                NodePayload::Sensor { label: info.label.clone() },
            )
            .with_parent(info.user_id.clone());
            node.pos = parent_pos + id_jitter(sensor_id, 8.0);
            node.color = theme.node_color(NodeKind::Sensor);
            scene.add_node(node);
            scene.add_edge(Self::tree_edge(&info.user_id, sensor_id, theme));

            for (attr_id, attr) in &info.attributes {
                Self::add_attribute(scene, sensor_id, attr_id, &attr.attr_type, theme);
            }
        }

        scene.clamp_to_plane();

        self.known_users = snapshot.users.iter().map(|u| u.connector_id.clone()).collect();
        self.known_sensors = snapshot.sensors.keys().cloned().collect();
        self.known_rooms = snapshot.rooms.iter().map(|r| r.id.clone()).collect();
        self.built = true;
    }
}
