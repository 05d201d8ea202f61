//! Scene Graph and Topology Diffing
//!
//! The scene graph is the positioned, colored projection of the authoritative
//! topology snapshot. The diff engine keeps it consistent under a live stream
//! of snapshots, patching incrementally where cheap and rebuilding where not.

pub mod diff;
pub mod model;
pub mod snapshot;

pub use diff::{attribute_node_id, PatchOutcome, TopologyDiffer};
pub use model::{NodeKind, NodePayload, SceneEdge, SceneGraph, SceneNode};
pub use snapshot::{AttributeInfo, RoomInfo, SensorInfo, SnapshotError, TopologySnapshot, UserInfo};
