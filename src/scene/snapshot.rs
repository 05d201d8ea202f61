//! Topology Snapshot
//!
//! The authoritative room/user/sensor/attribute hierarchy at a point in time,
//! pushed by the transport whenever the connector set changes. The engine
//! only ever reads snapshots; it never computes topology itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Snapshot decoding errors, for hosts feeding raw JSON
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed topology snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A room in the installation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
}

/// A connector user currently present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Connector id; doubles as the user's stable node id
    pub connector_id: String,

    /// Number of sensors the connector reports
    pub sensor_count: usize,
}

/// A sensor with its nested attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Owning connector user
    pub user_id: String,

    /// Human-readable label
    #[serde(default)]
    pub label: String,

    /// Attributes keyed by attribute id
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeInfo>,
}

/// One attribute of a sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Attribute type, used for per-type lane grouping
    #[serde(default)]
    pub attr_type: String,
}

/// Authoritative topology at a point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub rooms: Vec<RoomInfo>,

    #[serde(default)]
    pub users: Vec<UserInfo>,

    /// Sensors keyed by sensor id
    #[serde(default)]
    pub sensors: BTreeMap<String, SensorInfo>,
}

impl TopologySnapshot {
    /// Decode a snapshot from raw JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Total node count this snapshot implies (rooms + users + sensors + attributes)
    pub fn implied_node_count(&self) -> usize {
        let attrs: usize = self.sensors.values().map(|s| s.attributes.len()).sum();
        self.rooms.len() + self.users.len() + self.sensors.len() + attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal() {
        let json = br#"{
            "rooms": [{"id": "room-1", "name": "Lab"}],
            "users": [{"connector_id": "u1", "sensor_count": 1}],
            "sensors": {
                "s1": {
                    "user_id": "u1",
                    "label": "wrist",
                    "attributes": {"hr": {"attr_type": "heart_rate"}}
                }
            }
        }"#;
        let snap = TopologySnapshot::from_json(json).unwrap();
        assert_eq!(snap.implied_node_count(), 4);
        assert_eq!(snap.sensors["s1"].user_id, "u1");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TopologySnapshot::from_json(b"not json").is_err());
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let snap = TopologySnapshot::from_json(b"{}").unwrap();
        assert_eq!(snap.implied_node_count(), 0);
    }
}
