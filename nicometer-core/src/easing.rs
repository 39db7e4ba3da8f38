//! Easing curves for needle and opacity tweens.

use serde::{Deserialize, Serialize};

/// Overshoot constant of the classic "back" curve.
const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing function types for tweens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// Constant speed.
    #[default]
    Linear,
    /// Fast start, decelerating into the end value.
    EaseOutQuad,
    /// Runs past the end value before coming back to it.
    EaseOutBack,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0).
    ///
    /// Input is clamped; output is not, so `EaseOutBack` returns values
    /// above 1.0 near the end of the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseOutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                let p = t - 1.0;
                1.0 + c3 * p.powi(3) + BACK_OVERSHOOT * p.powi(2)
            }
        }
    }
}

/// Interpolate between two f32 values
pub fn interpolate_f32(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
