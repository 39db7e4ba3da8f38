//! Needle animation segments and the settle choreography.

use std::time::Duration;

use crate::easing::EasingFunction;

/// One interpolation step in a needle chain. The start is implicit: a
/// segment always begins from wherever the needle is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSegment {
    /// Angle in degrees the segment ends on.
    pub target_angle: f32,
    /// Time to get there.
    pub duration: Duration,
    /// Progress curve.
    pub easing: EasingFunction,
}

impl AnimationSegment {
    /// Segment with an explicit curve.
    pub fn new(
        target_angle: f32,
        duration: Duration,
        easing: EasingFunction,
    ) -> Self {
        Self {
            target_angle,
            duration,
            easing,
        }
    }

    /// Constant-speed segment.
    pub fn linear(target_angle: f32, duration: Duration) -> Self {
        Self::new(target_angle, duration, EasingFunction::Linear)
    }
}

/// Kick away from the target, overshoot it, then a damped wobble:
/// +6, -4, +2 and home.
pub fn settle_plan(target: f32) -> [AnimationSegment; 6] {
    [
        AnimationSegment::new(
            -target * 0.6,
            Duration::from_millis(500),
            EasingFunction::EaseOutQuad,
        ),
        AnimationSegment::new(
            target,
            Duration::from_millis(600),
            EasingFunction::EaseOutBack,
        ),
        AnimationSegment::linear(target + 6.0, Duration::from_millis(300)),
        AnimationSegment::linear(target - 4.0, Duration::from_millis(300)),
        AnimationSegment::linear(target + 2.0, Duration::from_millis(200)),
        AnimationSegment::linear(target, Duration::from_millis(200)),
    ]
}

/// Total length of [`settle_plan`], 2.1 s.
pub fn settle_duration() -> Duration {
    settle_plan(0.0).iter().map(|segment| segment.duration).sum()
}
