//! Topology Engine
//!
//! Facade wiring the scene graph, diff engine, layouts, transition animator,
//! LOD controller, overlays, and glow compositor into one frame-driven unit.
//! The host calls the event entry points as data arrives, `tick` once per
//! animation frame, and `frame` to collect draw data. Everything mutates on
//! the host's UI thread; the force-layout worker is the only helper thread
//! and its output is folded in at tick boundaries.

use std::time::Instant;

use crate::camera::CameraState;
use crate::config::EngineConfig;
use crate::events::{normalized_value, ActivityEvent, AttentionEvent, TelemetryEvent};
use crate::frame::{EdgeInstance, NodeInstance, RenderFrame};
use crate::glow::{GlowKind, GlowRegistry};
use crate::layout::{self, ForceWorker, LayoutMode, TransitionAnimator};
use crate::layout::force::ForceInput;
use crate::lod::LodController;
use crate::modes::ModeController;
use crate::overlay::{OverlayHost, OverlayMode};
use crate::scene::{
    attribute_node_id, NodeKind, NodePayload, PatchOutcome, SceneGraph, TopologyDiffer,
    TopologySnapshot,
};
use crate::theme::PanelTheme;

/// Hover/selection result for external UI chrome
#[derive(Debug, Clone)]
pub struct PickHit {
    pub node_id: String,
    pub kind: NodeKind,
    pub payload: NodePayload,
}

pub struct TopologyEngine {
    config: EngineConfig,
    theme: PanelTheme,
    scene: SceneGraph,
    differ: TopologyDiffer,
    modes: ModeController,
    transition: TransitionAnimator,
    lod: LodController,
    overlays: OverlayHost,
    glows: GlowRegistry,
    worker: Option<ForceWorker>,
    camera: CameraState,
}

impl TopologyEngine {
    pub fn new(config: EngineConfig, theme: PanelTheme) -> Self {
        Self {
            config,
            theme,
            scene: SceneGraph::new(),
            differ: TopologyDiffer::new(),
            modes: ModeController::new(),
            transition: TransitionAnimator::new(),
            lod: LodController::new(),
            overlays: OverlayHost::new(),
            glows: GlowRegistry::new(),
            worker: None,
            camera: CameraState::default(),
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn layout(&self) -> LayoutMode {
        self.modes.layout()
    }

    pub fn overlay(&self) -> Option<OverlayMode> {
        self.modes.overlay()
    }

    pub fn theme(&self) -> &PanelTheme {
        &self.theme
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    // ── Event entry points ─────────────────────────────────────────────

    /// Submit a new topology snapshot; diffing runs after the debounce
    /// window elapses, inside `tick`
    pub fn apply_topology(&mut self, snapshot: TopologySnapshot, now: Instant) {
        self.differ.submit(snapshot, now, self.config.topology_debounce());
    }

    /// Route a telemetry event. Malformed payloads and unknown ids change
    /// nothing.
    pub fn handle_telemetry(&mut self, event: &TelemetryEvent, now: Instant) {
        if normalized_value(&event.payload).is_none() {
            log::debug!("dropping malformed telemetry for {}", event.sensor_id);
            return;
        }
        if self.scene.get_node(&event.sensor_id).is_none() {
            log::debug!("telemetry for unknown sensor {}", event.sensor_id);
            return;
        }

        let attr_id = attribute_node_id(&event.sensor_id, &event.attribute_id);
        if let Some(node) = self.scene.get_node_mut(&attr_id) {
            if let NodePayload::Attribute { last_value, .. } = &mut node.payload {
                *last_value = normalized_value(&event.payload).map(|v| {
                    serde_json::Number::from_f64(v)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                });
            }
        }

        self.glows.trigger_node(&event.sensor_id, GlowKind::Data, now);
        self.overlays.on_telemetry(&mut self.scene, event, now, &self.config);
    }

    /// Route an activity burst; unknown sensors are ignored
    pub fn handle_activity(&mut self, event: &ActivityEvent, now: Instant) {
        if self.scene.get_node(&event.sensor_id).is_none() {
            return;
        }
        self.overlays.on_activity(event, now);
    }

    /// Route an attention change to the attention overlay
    pub fn handle_attention(&mut self, event: &AttentionEvent, now: Instant) {
        self.overlays
            .on_attention(&mut self.scene, &mut self.glows, event, now, &self.theme);
    }

    // ── Mode switches ──────────────────────────────────────────────────

    /// Switch the active layout; animated for synchronous layouts, streamed
    /// from the worker for large force graphs
    pub fn set_layout(&mut self, mode: LayoutMode, now: Instant) {
        if !self.modes.try_set_layout(mode, now, self.config.mode_guard()) {
            return;
        }
        self.transition.cancel();
        self.stop_worker();
        self.apply_layout(mode, now, true);
    }

    /// Switch the active overlay (or leave overlays with `None`)
    pub fn set_overlay(&mut self, overlay: Option<OverlayMode>, now: Instant) {
        if !self.modes.try_set_overlay(overlay, now, self.config.mode_guard()) {
            return;
        }
        self.transition.cancel();
        self.overlays.stop();
        self.scene.reset_appearance(&self.theme);

        if let Some(mode) = overlay {
            // Entering an overlay re-applies the last layout synchronously
            self.stop_worker();
            let targets = layout::run_layout(self.modes.layout(), &self.scene);
            layout::apply_positions(&mut self.scene, &targets);
            self.overlays.start(mode, now);
        }
    }

    /// Update the camera; LOD re-evaluates on every change
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
        let node_count = self.scene.nodes.len();
        self.lod.evaluate(&mut self.scene, node_count, camera.zoom_ratio, &self.config);
    }

    // ── Frame loop ─────────────────────────────────────────────────────

    /// Advance every subsystem one frame. Returns `true` while anything is
    /// still animating and the host should keep repainting.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(snapshot) = self.differ.take_due(now) {
            let outcome = self.differ.apply(
                &mut self.scene,
                &mut self.glows,
                &snapshot,
                &self.theme,
                &self.config,
                now,
            );
            match outcome {
                PatchOutcome::Rebuilt => {
                    // Worker graphs are stale after a rebuild
                    self.stop_worker();
                    self.transition.cancel();
                    self.scene.reset_appearance(&self.theme);
                    self.apply_layout(self.modes.layout(), now, false);
                }
                PatchOutcome::Patched { .. } => {
                    self.apply_layout(self.modes.layout(), now, true);
                }
                PatchOutcome::Unchanged => {}
            }
            if outcome != PatchOutcome::Unchanged {
                // Freshly created nodes default to visible
                self.lod.reapply(&mut self.scene);
            }
        }

        self.drain_worker(now);

        let mut animating = self.transition.tick(&mut self.scene, now);
        animating |= self
            .overlays
            .tick(&mut self.scene, &mut self.glows, now, &self.config, &self.theme);

        self.glows.prune(&self.scene, self.config.glow_duration(), now);
        animating |= !self.glows.is_empty();
        animating |= self.worker.is_some();
        animating |= self.differ.has_pending();
        animating
    }

    /// Collect draw data for the rendering backend
    pub fn frame(&self, now: Instant) -> RenderFrame {
        let mut frame = RenderFrame::default();

        for edge in &self.scene.edges {
            if !edge.visible {
                continue;
            }
            let (Some(source), Some(target)) =
                (self.scene.get_node(&edge.source), self.scene.get_node(&edge.target))
            else {
                continue;
            };
            if !source.visible || !target.visible {
                continue;
            }
            frame.edges.push(EdgeInstance {
                from: source.pos,
                to: target.pos,
                size: edge.size,
                color: edge.color,
                curvature: edge.curvature,
            });
        }

        for node in self.scene.nodes.values() {
            if !node.visible {
                continue;
            }
            frame.nodes.push(NodeInstance {
                id: node.id.clone(),
                kind: node.kind,
                pos: node.pos,
                size: node.size,
                color: node.color,
                alpha: node.alpha,
            });
        }

        frame.halos = self.glows.compose(
            &self.scene,
            &self.camera,
            &self.theme,
            self.config.glow_duration(),
            now,
        );
        frame.halos.extend(self.overlays.sprites(&self.theme));
        frame
    }

    /// Node under a model-space point, for hover/selection chrome
    pub fn pick(&self, model_pos: eframe::egui::Pos2) -> Option<PickHit> {
        self.scene.node_at(model_pos).map(|node| PickHit {
            node_id: node.id.clone(),
            kind: node.kind,
            payload: node.payload.clone(),
        })
    }

    /// Cancel outstanding animation and the worker thread
    pub fn teardown(&mut self) {
        self.transition.cancel();
        self.overlays.stop();
        self.stop_worker();
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Apply a layout: worker for large force graphs, otherwise synchronous
    /// targets, animated when `animate` is set
    fn apply_layout(&mut self, mode: LayoutMode, now: Instant, animate: bool) {
        if mode == LayoutMode::Force && self.scene.nodes.len() >= self.config.worker_min_nodes {
            let input = ForceInput::from_scene(&self.scene, self.config.barnes_hut_min_nodes);
            let run_for = self.config.worker_run(self.scene.nodes.len());
            self.worker = Some(ForceWorker::spawn(input, run_for));
            return;
        }

        let targets = layout::run_layout(mode, &self.scene);
        if animate {
            self.transition
                .begin(&self.scene, targets, now, self.config.transition());
        } else {
            layout::apply_positions(&mut self.scene, &targets);
        }
    }

    /// Fold worker output into the scene at the tick boundary
    fn drain_worker(&mut self, now: Instant) {
        let Some(worker) = self.worker.as_mut() else {
            return;
        };

        let latest = worker.poll();
        let failed = worker.failed();
        let finished = worker.is_finished();

        if let Some(positions) = latest {
            layout::apply_positions(&mut self.scene, &positions);
        }

        if failed {
            self.worker = None;
            log::warn!("force worker failed; applying synchronous layout");
            let targets = layout::run_layout(LayoutMode::Force, &self.scene);
            self.transition
                .begin(&self.scene, targets, now, self.config.transition());
        } else if finished {
            if let Some(mut worker) = self.worker.take() {
                if let Some(positions) = worker.poll() {
                    layout::apply_positions(&mut self.scene, &positions);
                }
            }
        }
    }

    fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}

impl Drop for TopologyEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
