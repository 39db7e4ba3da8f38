//! Host input, already hit-tested.

use serde::{Deserialize, Serialize};

/// A single pointer contact, already hit-tested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Input {
    /// Press on the zone strip; `fraction` runs 0 to 1 left to right.
    ResetControl {
        /// Horizontal press position within the strip.
        fraction: f32,
    },
    /// Press on the start button.
    Start,
    /// Tap on the result image area.
    ResultImage,
}
