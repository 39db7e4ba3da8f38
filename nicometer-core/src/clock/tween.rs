//! Time-based tween for a single property.

use std::time::Duration;

use crate::easing::{EasingFunction, interpolate_f32};
use crate::types::ids::PropertyKey;

/// A running interpolation of one property toward a target.
#[derive(Debug, Clone)]
pub struct Tween<E> {
    pub(crate) key: PropertyKey,
    pub(crate) from: f32,
    pub(crate) to: f32,
    pub(crate) started_at: Duration,
    pub(crate) duration: Duration,
    pub(crate) easing: EasingFunction,
    pub(crate) on_complete: Option<E>,
    pub(crate) seq: u64,
}

impl<E> Tween<E> {
    /// Simulated instant at which the value reaches `to`.
    pub fn ends_at(&self) -> Duration {
        self.started_at + self.duration
    }

    pub(crate) fn is_finished_at(&self, now: Duration) -> bool {
        now >= self.ends_at()
    }

    /// Value at `now`. Past the end this is exactly `to`.
    pub fn value_at(&self, now: Duration) -> f32 {
        if self.is_finished_at(now) {
            return self.to;
        }
        let elapsed = now.saturating_sub(self.started_at);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        interpolate_f32(self.from, self.to, self.easing.apply(t))
    }
}
