//! Topo Studio - Live Device-Topology Dashboard Panel
//!
//! Provides the engine behind a live node-link view of a device topology
//! (rooms, connector users, sensors, attributes): debounced topology diffing,
//! six deterministic spatial layouts with animated transitions, zoom-level
//! culling, event-driven visual overlays, and a transient glow layer.

pub mod camera;
pub mod config;
pub mod engine;
pub mod events;
pub mod frame;
pub mod glow;
pub mod layout;
pub mod lod;
pub mod modes;
pub mod overlay;
pub mod panel;
pub mod scene;
pub mod theme;

// Re-export commonly used types
pub use camera::CameraState;
pub use config::EngineConfig;
pub use engine::{PickHit, TopologyEngine};
pub use events::{ActivityEvent, AttentionEvent, AttentionLevel, TelemetryEvent};
pub use frame::{EdgeInstance, HaloSprite, NodeInstance, RenderFrame};
pub use glow::{ActiveGlow, GlowAnchor, GlowKind, GlowRegistry};
pub use layout::{LayoutMode, TransitionAnimator};
pub use modes::ModeController;
pub use overlay::OverlayMode;
pub use panel::TopologyPanel;
pub use scene::{
    AttributeInfo, NodeKind, NodePayload, SceneEdge, SceneGraph, SceneNode, SensorInfo,
    TopologySnapshot, UserInfo,
};
pub use theme::PanelTheme;
