//! Engine tuning.
//!
//! Durations are stored as whole milliseconds so they read naturally in TOML
//! and JSON; the accessors convert to [`Duration`]. Loading from files and
//! the environment lives in the `nicometer-config` crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every fixed delay and animation length used by the meter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeterTimings {
    /// Pause between pressing start and the needle waking up.
    pub wake_delay_ms: u64,
    /// Length of one random sweep segment.
    pub sweep_step_ms: u64,
    /// Window the sweeps are fitted into; the sweep count is
    /// `sweep_window_ms / sweep_step_ms`, rounded down.
    pub sweep_window_ms: u64,
    /// Swing away from a nearby target before settling.
    pub anticipation_swing_ms: u64,
    /// Hold after the anticipation swing before the settle starts.
    pub anticipation_pause_ms: u64,
    /// Upper bound between start and reveal. The reveal normally follows
    /// the needle's settle signal; this only fires if that never arrives.
    pub reveal_deadline_ms: u64,
    /// Fade of the reset control and the scanning indicator at scan start.
    pub control_fade_ms: u64,
    /// Scanning indicator fade at reveal.
    pub indicator_fade_out_ms: u64,
    /// Result image fade at reveal.
    pub result_fade_in_ms: u64,
    /// Needle return to 0 at the start of a soft reset.
    pub needle_return_ms: u64,
    /// Overlap of the outgoing and incoming sessions during a soft reset.
    pub crossfade_ms: u64,
    /// Delay before the click feedback sound.
    pub click_delay_ms: u64,
}

impl Default for MeterTimings {
    fn default() -> Self {
        Self {
            wake_delay_ms: 1_000,
            sweep_step_ms: 300,
            sweep_window_ms: 6_417,
            anticipation_swing_ms: 400,
            anticipation_pause_ms: 100,
            reveal_deadline_ms: 10_417,
            control_fade_ms: 500,
            indicator_fade_out_ms: 300,
            result_fade_in_ms: 500,
            needle_return_ms: 500,
            crossfade_ms: 1_250,
            click_delay_ms: 100,
        }
    }
}

impl MeterTimings {
    /// [`MeterTimings::wake_delay_ms`].
    pub fn wake_delay(&self) -> Duration {
        Duration::from_millis(self.wake_delay_ms)
    }

    /// [`MeterTimings::sweep_step_ms`].
    pub fn sweep_step(&self) -> Duration {
        Duration::from_millis(self.sweep_step_ms)
    }

    /// Number of random sweeps, `floor(window / step)`; 21 by default.
    pub fn sweep_count(&self) -> u32 {
        self.sweep_window_ms
            .checked_div(self.sweep_step_ms)
            .map(|count| count.min(u32::MAX as u64) as u32)
            .unwrap_or(0)
    }

    /// [`MeterTimings::anticipation_swing_ms`].
    pub fn anticipation_swing(&self) -> Duration {
        Duration::from_millis(self.anticipation_swing_ms)
    }

    /// [`MeterTimings::anticipation_pause_ms`].
    pub fn anticipation_pause(&self) -> Duration {
        Duration::from_millis(self.anticipation_pause_ms)
    }

    /// [`MeterTimings::reveal_deadline_ms`].
    pub fn reveal_deadline(&self) -> Duration {
        Duration::from_millis(self.reveal_deadline_ms)
    }

    /// [`MeterTimings::control_fade_ms`].
    pub fn control_fade(&self) -> Duration {
        Duration::from_millis(self.control_fade_ms)
    }

    /// [`MeterTimings::indicator_fade_out_ms`].
    pub fn indicator_fade_out(&self) -> Duration {
        Duration::from_millis(self.indicator_fade_out_ms)
    }

    /// [`MeterTimings::result_fade_in_ms`].
    pub fn result_fade_in(&self) -> Duration {
        Duration::from_millis(self.result_fade_in_ms)
    }

    /// [`MeterTimings::needle_return_ms`].
    pub fn needle_return(&self) -> Duration {
        Duration::from_millis(self.needle_return_ms)
    }

    /// [`MeterTimings::crossfade_ms`].
    pub fn crossfade(&self) -> Duration {
        Duration::from_millis(self.crossfade_ms)
    }

    /// [`MeterTimings::click_delay_ms`].
    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    /// Longest possible time from start to the needle resting on target.
    pub fn worst_case_needle_run(&self) -> Duration {
        self.wake_delay()
            + self.sweep_step() * self.sweep_count()
            + self.anticipation_swing()
            + self.anticipation_pause()
            + crate::needle::segment::settle_duration()
    }
}

/// Top-level engine settings handed to [`crate::stage::Stage::new`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delays and animation lengths.
    pub timings: MeterTimings,
    /// Playback volume passed to every sound request.
    pub volume: f32,
    /// Seed for the needle's random sweeps. `None` draws from OS entropy;
    /// set it for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timings: MeterTimings::default(),
            volume: 0.95,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Same settings with a fixed sweep seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_count_is_twenty_one() {
        assert_eq!(MeterTimings::default().sweep_count(), 21);
    }

    #[test]
    fn zero_step_disables_sweeping() {
        let timings = MeterTimings {
            sweep_step_ms: 0,
            ..MeterTimings::default()
        };
        assert_eq!(timings.sweep_count(), 0);
    }

    #[test]
    fn default_deadline_covers_worst_case_needle_run() {
        let timings = MeterTimings::default();
        // 1.0 + 21 * 0.3 + 0.4 + 0.1 + 2.1
        assert_eq!(
            timings.worst_case_needle_run(),
            Duration::from_millis(9_900)
        );
        assert!(timings.reveal_deadline() > timings.worst_case_needle_run());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let parsed: EngineConfig =
            serde_json::from_str(r#"{"timings":{"crossfade_ms":2000}}"#)
                .expect("parse");
        assert_eq!(parsed.timings.crossfade_ms, 2_000);
        assert_eq!(parsed.timings.sweep_step_ms, 300);
        assert!((parsed.volume - 0.95).abs() < f32::EPSILON);
        assert_eq!(parsed.rng_seed, None);
    }
}
