//! Single-threaded cooperative clock.
//!
//! The scheduler owns simulated time, one-shot timers and property tweens.
//! It never calls back into the engine itself: [`Scheduler::step_to`]
//! returns the payloads that became due and the driver dispatches them.

pub mod scheduler;
pub mod tween;

pub use scheduler::{Scheduler, TimerId};
pub use tween::Tween;
