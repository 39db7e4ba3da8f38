//! Guard rails: settings the engine cannot run with, and settings it runs
//! with but probably not as intended.

use std::fmt;
use thiserror::Error;

use super::models::MeterConfig;

/// A setting the engine cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigGuardRailError {
    /// A duration the engine divides by or waits on is zero.
    #[error("timings.{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending `timings` key.
        field: &'static str,
    },
    /// Volume is not a finite fraction.
    #[error(
        "engine.volume must be a finite value between 0 and 1 (got {volume})"
    )]
    VolumeOutOfRange {
        /// The configured value.
        volume: f32,
    },
}

/// A setting the engine accepts but that changes what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRailWarning {
    /// The sweep window is shorter than one step, so nothing sweeps.
    NoSweeps {
        /// `sweep_window_ms`.
        window_ms: u64,
        /// `sweep_step_ms`.
        step_ms: u64,
    },
    /// The reveal fallback can fire while the needle is still moving.
    DeadlineBeforeSettle {
        /// `reveal_deadline_ms`.
        deadline_ms: u64,
        /// Longest possible start-to-rest run for these timings.
        worst_case_ms: u64,
    },
    /// Every sound plays at volume 0.
    Muted,
}

impl GuardRailWarning {
    /// How to make the warning go away, when there is a single obvious fix.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GuardRailWarning::NoSweeps { .. } => {
                Some("raise sweep_window_ms or lower sweep_step_ms")
            }
            GuardRailWarning::DeadlineBeforeSettle { .. } => {
                Some("raise reveal_deadline_ms or shorten the needle timings")
            }
            GuardRailWarning::Muted => None,
        }
    }
}

impl fmt::Display for GuardRailWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardRailWarning::NoSweeps { window_ms, step_ms } => write!(
                f,
                "sweep_window_ms ({window_ms}) is shorter than one sweep step \
                 ({step_ms} ms); the needle will not sweep"
            ),
            GuardRailWarning::DeadlineBeforeSettle {
                deadline_ms,
                worst_case_ms,
            } => write!(
                f,
                "reveal_deadline_ms ({deadline_ms}) is shorter than the \
                 worst-case needle run ({worst_case_ms} ms); results may be \
                 revealed mid-swing"
            ),
            GuardRailWarning::Muted => {
                f.write_str("engine.volume is 0; every sound is muted")
            }
        }
    }
}

/// Reject unusable settings, returning warnings for the questionable ones.
pub fn apply_guard_rails(
    config: &MeterConfig,
) -> Result<Vec<GuardRailWarning>, ConfigGuardRailError> {
    let engine = &config.engine;
    let timings = &engine.timings;

    // Sweep count divides by the step; teardown waits on the crossfade.
    let required = [
        ("sweep_step_ms", timings.sweep_step_ms),
        ("crossfade_ms", timings.crossfade_ms),
    ];
    if let Some(&(field, _)) = required.iter().find(|(_, value)| *value == 0)
    {
        return Err(ConfigGuardRailError::ZeroDuration { field });
    }
    if !engine.volume.is_finite() || !(0.0..=1.0).contains(&engine.volume) {
        return Err(ConfigGuardRailError::VolumeOutOfRange {
            volume: engine.volume,
        });
    }

    let mut warnings = Vec::new();
    if timings.sweep_count() == 0 {
        warnings.push(GuardRailWarning::NoSweeps {
            window_ms: timings.sweep_window_ms,
            step_ms: timings.sweep_step_ms,
        });
    }
    let worst_case = timings.worst_case_needle_run();
    if timings.reveal_deadline() < worst_case {
        warnings.push(GuardRailWarning::DeadlineBeforeSettle {
            deadline_ms: timings.reveal_deadline_ms,
            worst_case_ms: u64::try_from(worst_case.as_millis())
                .unwrap_or(u64::MAX),
        });
    }
    if engine.volume == 0.0 {
        warnings.push(GuardRailWarning::Muted);
    }
    Ok(warnings)
}
