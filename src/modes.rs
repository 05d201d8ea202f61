//! Mode Controller
//!
//! Two orthogonal state axes: the active layout (always exactly one) and the
//! active overlay (none or one). A global guard suppresses overlapping
//! switches so a double-click cannot start two transitions mid-flight. The
//! engine owns the orchestration; this is the decision state machine.

use std::time::{Duration, Instant};

use crate::layout::LayoutMode;
use crate::overlay::OverlayMode;

#[derive(Debug)]
pub struct ModeController {
    layout: LayoutMode,
    overlay: Option<OverlayMode>,
    last_switch: Option<Instant>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self { layout: LayoutMode::default(), overlay: None, last_switch: None }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn overlay(&self) -> Option<OverlayMode> {
        self.overlay
    }

    fn guarded(&self, now: Instant, guard: Duration) -> bool {
        self.last_switch
            .map(|last| now.saturating_duration_since(last) < guard)
            .unwrap_or(false)
    }

    /// Accept a layout switch unless guarded or already active.
    /// Returns `true` when the switch should proceed.
    pub fn try_set_layout(&mut self, mode: LayoutMode, now: Instant, guard: Duration) -> bool {
        if mode == self.layout || self.guarded(now, guard) {
            return false;
        }
        log::info!("layout: {} -> {}", self.layout.name(), mode.name());
        self.layout = mode;
        self.last_switch = Some(now);
        true
    }

    /// Accept an overlay change unless guarded or already in that state
    pub fn try_set_overlay(
        &mut self,
        overlay: Option<OverlayMode>,
        now: Instant,
        guard: Duration,
    ) -> bool {
        if overlay == self.overlay || self.guarded(now, guard) {
            return false;
        }
        match (self.overlay, overlay) {
            (_, Some(mode)) => log::info!("overlay: {}", mode.name()),
            (Some(old), None) => log::info!("overlay off: {}", old.name()),
            _ => {}
        }
        self.overlay = overlay;
        self.last_switch = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUARD: Duration = Duration::from_millis(600);

    #[test]
    fn test_guard_window_suppresses_rapid_switches() {
        let mut modes = ModeController::new();
        let t0 = Instant::now();

        assert!(modes.try_set_layout(LayoutMode::Radial, t0, GUARD));
        // Too soon
        assert!(!modes.try_set_layout(LayoutMode::Flower, t0 + Duration::from_millis(300), GUARD));
        assert_eq!(modes.layout(), LayoutMode::Radial);
        // Window elapsed
        assert!(modes.try_set_layout(LayoutMode::Flower, t0 + Duration::from_millis(700), GUARD));
        assert_eq!(modes.layout(), LayoutMode::Flower);
    }

    #[test]
    fn test_same_mode_is_a_no_op() {
        let mut modes = ModeController::new();
        let t0 = Instant::now();
        assert!(!modes.try_set_layout(LayoutMode::Force, t0, GUARD));
        assert!(!modes.try_set_overlay(None, t0, GUARD));
    }

    #[test]
    fn test_axes_share_one_guard() {
        let mut modes = ModeController::new();
        let t0 = Instant::now();

        assert!(modes.try_set_overlay(Some(OverlayMode::River), t0, GUARD));
        // A layout switch right after the overlay switch is also guarded
        assert!(!modes.try_set_layout(LayoutMode::Radial, t0 + Duration::from_millis(100), GUARD));
        assert!(modes.try_set_layout(LayoutMode::Radial, t0 + Duration::from_millis(700), GUARD));
        assert_eq!(modes.overlay(), Some(OverlayMode::River));
    }
}
