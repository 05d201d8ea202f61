//! Transition Animator
//!
//! Interpolates node positions between two captured position sets over a
//! fixed duration with ease-out cubic pacing. Transitions move nodes only;
//! graph structure and identity are untouched.

use eframe::egui::Pos2;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::scene::SceneGraph;

fn ease_out_cubic(t: f32) -> f32 {
    let u = 1.0 - t;
    1.0 - u * u * u
}

struct Transition {
    from: HashMap<String, Pos2>,
    to: HashMap<String, Pos2>,
    started: Instant,
    duration: Duration,
}

/// Animates one position-set change at a time
#[derive(Default)]
pub struct TransitionAnimator {
    active: Option<Transition>,
}

impl TransitionAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin interpolating from current positions toward `to`.
    ///
    /// Any in-flight transition is replaced; nodes only in one of the two
    /// sets keep their target (or current) position.
    pub fn begin(
        &mut self,
        scene: &SceneGraph,
        to: HashMap<String, Pos2>,
        now: Instant,
        duration: Duration,
    ) {
        let from: HashMap<String, Pos2> =
            scene.nodes.values().map(|n| (n.id.clone(), n.pos)).collect();
        self.active = Some(Transition { from, to, started: now, duration });
    }

    /// Drop the in-flight transition without touching positions
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Advance the interpolation. Returns `true` while still animating.
    pub fn tick(&mut self, scene: &mut SceneGraph, now: Instant) -> bool {
        let Some(transition) = &self.active else {
            return false;
        };

        let elapsed = now.saturating_duration_since(transition.started);
        let raw = (elapsed.as_secs_f32() / transition.duration.as_secs_f32()).min(1.0);
        let t = ease_out_cubic(raw);

        for node in scene.nodes.values_mut() {
            let Some(target) = transition.to.get(&node.id) else {
                continue;
            };
            let start = transition.from.get(&node.id).copied().unwrap_or(*target);
            node.pos = Pos2::new(
                start.x + (target.x - start.x) * t,
                start.y + (target.y - start.y) * t,
            );
        }

        if raw >= 1.0 {
            self.active = None;
            return false;
        }
        true
    }
}
