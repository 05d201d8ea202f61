//! Camera State and Projection
//!
//! The scene lives on a normalized 0-100 plane; the camera maps it onto the
//! host's screen viewport. The zoom ratio is the fraction of the plane the
//! viewport spans: 1.0 shows the whole plane, larger values are zoomed out.

use eframe::egui::{Pos2, Rect, Vec2};

/// Side length of the normalized model plane
pub const PLANE_EXTENT: f32 = 100.0;

/// Center of the model plane
pub const PLANE_CENTER: Pos2 = Pos2::new(50.0, 50.0);

/// Viewport-to-model mapping supplied by the host on every camera change
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    /// Model-plane point at the viewport center
    pub center: Pos2,

    /// Visible model extent relative to the plane extent (bigger = farther out)
    pub zoom_ratio: f32,

    /// Screen-space viewport rectangle
    pub viewport: Rect,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: PLANE_CENTER,
            zoom_ratio: 1.0,
            viewport: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

impl CameraState {
    /// Screen pixels per model unit
    pub fn scale(&self) -> f32 {
        let visible = PLANE_EXTENT * self.zoom_ratio.max(0.01);
        self.viewport.width().max(1.0) / visible
    }

    /// Project a model point into screen space
    pub fn model_to_screen(&self, p: Pos2) -> Pos2 {
        self.viewport.center() + (p - self.center) * self.scale()
    }

    /// Unproject a screen point into model space
    pub fn screen_to_model(&self, p: Pos2) -> Pos2 {
        self.center + (p - self.viewport.center()) / self.scale()
    }

    /// Model-space rectangle currently visible, padded by `margin` model units
    pub fn visible_bounds(&self, margin: f32) -> Rect {
        let half = self.viewport.size() / (2.0 * self.scale());
        Rect::from_center_size(self.center, (half * 2.0) + Vec2::splat(margin * 2.0))
    }

    /// Whether a model point falls inside the viewport plus margin
    pub fn is_visible(&self, p: Pos2, margin: f32) -> bool {
        self.visible_bounds(margin).contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_roundtrip() {
        let camera = CameraState::default();
        let p = Pos2::new(25.0, 75.0);
        let back = camera.screen_to_model(camera.model_to_screen(p));
        assert!((back - p).length() < 0.001);
    }

    #[test]
    fn test_center_maps_to_viewport_center() {
        let camera = CameraState::default();
        let screen = camera.model_to_screen(camera.center);
        assert!((screen - camera.viewport.center()).length() < 0.001);
    }

    #[test]
    fn test_visibility_margin() {
        let camera = CameraState::default();
        // Everything on the plane is visible at ratio 1.0
        assert!(camera.is_visible(Pos2::new(0.0, 50.0), 0.0));
        // A point far off the plane is not, until the margin covers it
        let far = Pos2::new(-30.0, 50.0);
        assert!(!camera.is_visible(far, 0.0));
        assert!(camera.is_visible(far, 40.0));
    }
}
