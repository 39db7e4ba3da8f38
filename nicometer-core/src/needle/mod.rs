//! The needle and its motion state machine.
//!
//! `Resting → Sweeping → Anticipating → Settling → Resting`. Every phase
//! is a chain of [`AnimationSegment`]s; each segment is started from the
//! previous one's completion callback, so at most one is ever interpolating.

pub mod animator;
pub mod segment;
pub mod state;

pub use animator::{NeedleAnimator, NeedleCue, NeedleSignal};
pub use segment::{AnimationSegment, settle_duration, settle_plan};
pub use state::{NeedlePhase, NeedleState};
