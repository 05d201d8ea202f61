//! Interactive Topology Panel
//!
//! Native egui host adapter around the engine:
//! - Pan and zoom (mouse wheel + drag) mapped onto the engine camera
//! - Hover and click-to-select with payload pick events
//! - Draws the per-frame node/edge arrays and the auxiliary halo layer
//! - Compact toolbar for switching layout and overlay modes
//!
//! The engine itself never draws; any backend consuming `RenderFrame` could
//! replace this widget.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Vec2};
use std::time::Instant;

use crate::camera::{CameraState, PLANE_CENTER};
use crate::engine::{PickHit, TopologyEngine};
use crate::frame::{HaloSprite, RenderFrame};
use crate::layout::LayoutMode;
use crate::overlay::OverlayMode;
use crate::scene::NodeKind;

pub struct TopologyPanel {
    /// The engine this panel hosts
    pub engine: TopologyEngine,

    /// Camera center offset from the plane center, model units
    pan: Vec2,

    /// Visible plane fraction (bigger = farther out)
    zoom_ratio: f32,

    /// Currently selected node
    pub selected: Option<PickHit>,

    /// Currently hovered node id
    pub hovered: Option<String>,

    /// Show the mode toolbar
    pub show_toolbar: bool,
}

impl TopologyPanel {
    pub fn new(engine: TopologyEngine) -> Self {
        Self {
            engine,
            pan: Vec2::ZERO,
            zoom_ratio: 1.1,
            selected: None,
            hovered: None,
            show_toolbar: true,
        }
    }

    /// Main UI entry; call once per frame from the host app
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;

        let camera = CameraState {
            center: PLANE_CENTER + self.pan,
            zoom_ratio: self.zoom_ratio,
            viewport: rect,
        };
        self.handle_input(ui, &response, &camera);

        // Re-read after input so dragging feels immediate
        let camera = CameraState {
            center: PLANE_CENTER + self.pan,
            zoom_ratio: self.zoom_ratio,
            viewport: rect,
        };
        self.engine.set_camera(camera);

        let now = Instant::now();
        let animating = self.engine.tick(now);
        let frame = self.engine.frame(now);

        painter.rect_filled(rect, 0.0, self.engine.theme().canvas_bg);
        self.draw_frame(&painter, &frame, &camera);

        if self.show_toolbar {
            self.draw_toolbar(ui, rect);
        }

        if animating {
            ui.ctx().request_repaint();
        }
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, camera: &CameraState) {
        if response.dragged() {
            self.pan -= response.drag_delta() / camera.scale();
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.0 {
                let factor = (-scroll * 0.002).exp();
                self.zoom_ratio = (self.zoom_ratio * factor).clamp(0.05, 8.0);
            }
        }

        if let Some(pointer) = response.hover_pos() {
            let model = camera.screen_to_model(pointer);
            self.hovered = self.engine.pick(model).map(|hit| hit.node_id);
            if response.clicked() {
                self.selected = self.engine.pick(model);
            }
        } else {
            self.hovered = None;
        }
    }

    fn draw_frame(&self, painter: &egui::Painter, frame: &RenderFrame, camera: &CameraState) {
        let scale = camera.scale();

        for edge in &frame.edges {
            let from = camera.model_to_screen(edge.from);
            let to = camera.model_to_screen(edge.to);
            let stroke = Stroke::new((edge.size * scale).max(0.5), edge.color);

            if edge.curvature.abs() > f32::EPSILON {
                let mid = Pos2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
                let dir = to - from;
                let normal = Vec2::new(-dir.y, dir.x).normalized();
                let control = mid + normal * edge.curvature * scale;
                painter.add(egui::epaint::QuadraticBezierShape::from_points_stroke(
                    [from, control, to],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                ));
            } else {
                painter.line_segment([from, to], stroke);
            }
        }

        let theme = self.engine.theme();
        for node in &frame.nodes {
            let center = camera.model_to_screen(node.pos);
            let radius = (node.size * scale).max(1.5);
            let fill = node.color.gamma_multiply(node.alpha);
            painter.circle_filled(center, radius, fill);
            painter.circle_stroke(center, radius, Stroke::new(1.0, theme.node_stroke));

            if self.selected.as_ref().map(|s| s.node_id == node.id).unwrap_or(false) {
                painter.circle_stroke(center, radius + 3.0, Stroke::new(2.0, theme.node_selected));
            } else if self.hovered.as_deref() == Some(node.id.as_str()) {
                painter.circle_stroke(center, radius + 2.0, Stroke::new(1.5, theme.node_hover));
            }

            // Labels only where there is room to read them
            if node.kind == NodeKind::User && radius > 14.0 {
                painter.text(
                    center + Vec2::new(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    &node.id,
                    FontId::proportional(11.0),
                    theme.label_color,
                );
            }
        }

        for sprite in &frame.halos {
            draw_halo(painter, sprite, camera);
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let now = Instant::now();
        let toolbar_rect = egui::Rect::from_min_size(
            rect.min + Vec2::new(8.0, 8.0),
            Vec2::new(rect.width() - 16.0, 28.0),
        );

        ui.allocate_ui_at_rect(toolbar_rect, |ui| {
            ui.horizontal(|ui| {
                for mode in LayoutMode::all() {
                    let active = self.engine.layout() == *mode;
                    if ui.selectable_label(active, mode.name()).clicked() {
                        self.engine.set_layout(*mode, now);
                    }
                }
                ui.separator();
                for mode in OverlayMode::all() {
                    let active = self.engine.overlay() == Some(*mode);
                    if ui.selectable_label(active, mode.name()).clicked() {
                        let next = if active { None } else { Some(*mode) };
                        self.engine.set_overlay(next, now);
                    }
                }
            });
        });
    }
}

/// Paint one soft sprite as stacked translucent circles; egui has no radial
/// gradients, so the falloff is faked with three rings
fn draw_halo(painter: &egui::Painter, sprite: &HaloSprite, camera: &CameraState) {
    let center = camera.model_to_screen(sprite.pos);
    let radius = sprite.radius * camera.scale();
    for (factor, weight) in [(1.0f32, 0.25f32), (0.65, 0.35), (0.35, 0.5)] {
        let color = sprite.color.gamma_multiply(sprite.alpha * weight);
        painter.circle_filled(center, radius * factor, color);
    }
}
