//! Headless driver for the nicometer engine.
//!
//! `nicometerctl` builds a [`nicometer_core::Stage`] with recording
//! collaborators, feeds it input on a simulated clock and reports the
//! timeline. It is the quickest way to see what a configuration does without
//! a renderer attached.

pub mod cli;
pub mod simulation;
