//! Needle phase and the queue of segments still to run.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::segment::AnimationSegment;

/// What the needle is doing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NeedlePhase {
    /// Still, waiting for a target or done.
    #[default]
    Resting,
    /// Random back-and-forth across the dial.
    Sweeping,
    /// Swinging near the target before committing.
    Anticipating,
    /// Kick, overshoot and wobble onto the target.
    Settling,
}

impl std::fmt::Display for NeedlePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NeedlePhase::Resting => "resting",
            NeedlePhase::Sweeping => "sweeping",
            NeedlePhase::Anticipating => "anticipating",
            NeedlePhase::Settling => "settling",
        };
        f.write_str(name)
    }
}

/// Mutable needle state. Phase changes only happen when a segment or a
/// pause completes, never while a segment is interpolating.
#[derive(Debug, Clone, Default)]
pub struct NeedleState {
    /// Last rendered angle in degrees.
    pub current_angle: f32,
    /// Phase of the current chain.
    pub phase: NeedlePhase,
    /// The segment currently interpolating, if any.
    pub active: Option<AnimationSegment>,
    /// Segments of the current chain not yet started, in order.
    pub pending: VecDeque<AnimationSegment>,
}

impl NeedleState {
    /// Start a new chain, replacing whatever was queued.
    pub(crate) fn load_chain<I>(&mut self, phase: NeedlePhase, segments: I)
    where
        I: IntoIterator<Item = AnimationSegment>,
    {
        self.phase = phase;
        self.active = None;
        self.pending = segments.into_iter().collect();
    }

    /// Promote the next queued segment to active.
    pub(crate) fn advance(&mut self) -> Option<AnimationSegment> {
        self.active = self.pending.pop_front();
        self.active
    }

    pub(crate) fn clear(&mut self) {
        self.active = None;
        self.pending.clear();
    }
}
