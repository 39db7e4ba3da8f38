//! Scan orchestration: `Idle → Selecting → Scanning → ResultDisplayed`.

pub mod controller;
pub mod state;

pub use controller::{ScanCue, ScanSequenceController};
pub use state::{ScanPhase, SessionState};
