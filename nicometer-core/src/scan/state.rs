//! Scan flags and the moves allowed between them.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{MeterError, Result};

/// Where a session is in its scan sequence, derived from [`SessionState`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    /// Nothing selected.
    #[default]
    Idle,
    /// A category is selected, no scan yet.
    Selecting,
    /// Needle running, result hidden.
    Scanning,
    /// Result image shown.
    ResultDisplayed,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Selecting => "selecting",
            ScanPhase::Scanning => "scanning",
            ScanPhase::ResultDisplayed => "result_displayed",
        };
        f.write_str(name)
    }
}

/// Per-session scan flags. Every mutation goes through a transition function
/// that refuses illegal moves instead of applying them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct SessionState {
    /// Last category chosen on the zone strip.
    pub selected: Option<Category>,
    /// Between start and reveal.
    pub scanning: bool,
    /// Set at reveal and only cleared by replacing the session.
    pub result_displayed: bool,
}

impl SessionState {
    /// Phase implied by the flags.
    pub fn phase(&self) -> ScanPhase {
        if self.scanning {
            ScanPhase::Scanning
        } else if self.result_displayed {
            ScanPhase::ResultDisplayed
        } else if self.selected.is_some() {
            ScanPhase::Selecting
        } else {
            ScanPhase::Idle
        }
    }

    /// Whether a press on the reset control means "reset" rather than
    /// "select".
    pub fn accepts_reset(&self) -> bool {
        self.scanning || self.result_displayed
    }

    /// A selection exists and no scan is running.
    pub fn can_start(&self) -> bool {
        !self.scanning && self.selected.is_some()
    }

    /// Choose a category. Refused while scanning.
    pub fn select(&mut self, category: Category) -> Result<()> {
        if self.scanning {
            return Err(MeterError::invalid("selection while scanning"));
        }
        self.selected = Some(category);
        Ok(())
    }

    /// Enter scanning, returning the category being scanned.
    pub fn begin_scan(&mut self) -> Result<Category> {
        if self.scanning {
            return Err(MeterError::invalid("scan already running"));
        }
        let category = self
            .selected
            .ok_or(MeterError::invalid("start without a selection"))?;
        self.scanning = true;
        Ok(category)
    }

    /// Leave scanning and mark the result displayed.
    pub fn finish_scan(&mut self) -> Result<Category> {
        if !self.scanning {
            return Err(MeterError::invalid("reveal outside a scan"));
        }
        let category = self
            .selected
            .ok_or(MeterError::invalid("scan without a selection"))?;
        self.scanning = false;
        self.result_displayed = true;
        Ok(category)
    }
}
