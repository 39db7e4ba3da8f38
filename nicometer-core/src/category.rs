//! The five fixed outcomes and the zone strip that selects them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sound played when a scan starts.
pub const SCAN_SOUND: &str = "scan.wav";

/// Feedback sound for accepted control presses.
pub const CLICK_SOUND: &str = "click.wav";

/// Image shown by the scanning indicator.
pub const SCANNING_IMAGE: &str = "result-scanning.png";

/// Number of zones on the selection strip.
pub const ZONE_COUNT: usize = 5;

/// Outcome categories, ordered by zone index (left to right).
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Far left, -70 degrees.
    Naughty,
    /// -20 degrees.
    NaughtyIsh,
    /// Dead centre.
    OnTheLine,
    /// +20 degrees.
    Nice,
    /// Far right, +70 degrees.
    Wow,
}

impl Category {
    /// Every category in zone order.
    pub const ALL: [Category; ZONE_COUNT] = [
        Category::Naughty,
        Category::NaughtyIsh,
        Category::OnTheLine,
        Category::Nice,
        Category::Wow,
    ];

    /// Angle (degrees, signed) the needle settles on for this outcome.
    pub fn target_angle(&self) -> f32 {
        match self {
            Category::Naughty => -70.0,
            Category::NaughtyIsh => -20.0,
            Category::OnTheLine => 0.0,
            Category::Nice => 20.0,
            Category::Wow => 70.0,
        }
    }

    /// Sound played when this result is revealed.
    pub fn sound_id(&self) -> &'static str {
        match self {
            Category::Naughty | Category::NaughtyIsh => "naughty.wav",
            Category::OnTheLine => "ontheline.wav",
            Category::Nice | Category::Wow => "nice-bell.wav",
        }
    }

    /// Result image faded in at reveal.
    pub fn image_id(&self) -> &'static str {
        match self {
            Category::Naughty => "result-naughty.png",
            Category::NaughtyIsh => "result-naughtyish.png",
            Category::OnTheLine => "result-ontheline.png",
            Category::Nice => "result-nice.png",
            Category::Wow => "result-wow.png",
        }
    }

    /// Stable lowercase key used in logs and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Naughty => "naughty",
            Category::NaughtyIsh => "naughtyish",
            Category::OnTheLine => "ontheline",
            Category::Nice => "nice",
            Category::Wow => "wow",
        }
    }

    /// Position on the strip, 0 (left) to 4.
    pub fn zone_index(&self) -> usize {
        match self {
            Category::Naughty => 0,
            Category::NaughtyIsh => 1,
            Category::OnTheLine => 2,
            Category::Nice => 3,
            Category::Wow => 4,
        }
    }

    /// Inverse of [`Category::zone_index`].
    pub fn from_zone_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Resolve a contact at `fraction` of the strip's width to a zone.
    ///
    /// Zones are `[0, 0.2)`, `[0.2, 0.4)`, `[0.4, 0.6)`, `[0.6, 0.8)` and
    /// `[0.8, 1.0]`. Anything outside `0.0..=1.0` (or NaN) did not land on
    /// the strip and yields `None`.
    pub fn from_zone_fraction(fraction: f32) -> Option<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return None;
        }
        let category = if fraction < 0.2 {
            Category::Naughty
        } else if fraction < 0.4 {
            Category::NaughtyIsh
        } else if fraction < 0.6 {
            Category::OnTheLine
        } else if fraction < 0.8 {
            Category::Nice
        } else {
            Category::Wow
        };
        Some(category)
    }

    /// Half-open fraction range covered by this category's zone.
    pub fn zone_range(&self) -> (f32, f32) {
        let width = 1.0 / ZONE_COUNT as f32;
        let start = self.zone_index() as f32 * width;
        (start, start + width)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Category::ALL
            .into_iter()
            .find(|category| category.key() == normalized)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
