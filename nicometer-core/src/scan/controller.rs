//! Selection, scan start and result reveal for one session.

use tracing::{debug, info, warn};

use super::state::{ScanPhase, SessionState};
use crate::category::{Category, SCAN_SOUND};
use crate::clock::TimerId;
use crate::needle::NeedleAnimator;
use crate::session::{Cue, SessionContext};
use crate::types::ids::{Part, SessionId};

/// Scan timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCue {
    /// Upper bound on a scan. Only reveals if the needle never settled.
    RevealDeadline,
}

/// Orchestrates one session's scan: selection, start, needle run, reveal.
#[derive(Debug)]
pub struct ScanSequenceController {
    session: SessionId,
    state: SessionState,
    revealed: Option<Category>,
    deadline: Option<TimerId>,
}

impl ScanSequenceController {
    pub(crate) fn new(session: SessionId) -> Self {
        Self {
            session,
            state: SessionState::default(),
            revealed: None,
            deadline: None,
        }
    }

    /// Raw scan flags.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current scan phase.
    pub fn phase(&self) -> ScanPhase {
        self.state.phase()
    }

    /// Between start and reveal.
    pub fn is_scanning(&self) -> bool {
        self.state.scanning
    }

    /// The result image has been revealed.
    pub fn is_result_displayed(&self) -> bool {
        self.state.result_displayed
    }

    /// Currently selected category.
    pub fn selected(&self) -> Option<Category> {
        self.state.selected
    }

    /// Category whose result image was last faded in.
    pub fn revealed(&self) -> Option<Category> {
        self.revealed
    }

    pub(crate) fn on_zone_selected(
        &mut self,
        category: Category,
        _cx: &mut SessionContext<'_>,
    ) -> bool {
        match self.state.select(category) {
            Ok(()) => {
                debug!(session = %self.session, %category, "zone selected");
                true
            }
            Err(err) => {
                debug!(
                    session = %self.session,
                    %category,
                    %err,
                    "selection ignored"
                );
                false
            }
        }
    }

    pub(crate) fn on_start_pressed(
        &mut self,
        needle: &mut NeedleAnimator,
        cx: &mut SessionContext<'_>,
    ) -> bool {
        if self.state.can_start() && !needle.is_idle() {
            debug!(
                session = %self.session,
                phase = ?needle.phase(),
                "start ignored, needle still moving"
            );
            return false;
        }
        let category = match self.state.begin_scan() {
            Ok(category) => category,
            Err(err) => {
                debug!(session = %self.session, %err, "start ignored");
                return false;
            }
        };

        let fade = cx.timings().control_fade();
        cx.fade(Part::ResetControl, 0.0, fade);
        cx.fade(Part::ScanningIndicator, 1.0, fade);
        cx.play(SCAN_SOUND);
        needle.start_full_animation(category.target_angle(), cx);

        let deadline = cx.timings().reveal_deadline();
        self.deadline = Some(cx.schedule(
            Part::Root,
            deadline,
            Cue::Scan(ScanCue::RevealDeadline),
        ));
        info!(session = %self.session, %category, "scan started");
        true
    }

    /// The needle came to rest. Reveals unless the deadline already did.
    pub(crate) fn on_needle_settled(
        &mut self,
        angle: f32,
        cx: &mut SessionContext<'_>,
    ) {
        if !self.state.scanning {
            debug!(
                session = %self.session,
                angle,
                "needle settled after reveal"
            );
            return;
        }
        if let Some(timer) = self.deadline.take() {
            cx.scheduler.cancel_timer(timer);
        }
        self.reveal_result(cx);
    }

    pub(crate) fn handle(&mut self, cue: ScanCue, cx: &mut SessionContext<'_>) {
        match cue {
            ScanCue::RevealDeadline => {
                self.deadline = None;
                if self.state.scanning {
                    warn!(
                        session = %self.session,
                        "reveal deadline reached before the needle settled"
                    );
                    self.reveal_result(cx);
                }
            }
        }
    }

    fn reveal_result(&mut self, cx: &mut SessionContext<'_>) {
        let category = match self.state.finish_scan() {
            Ok(category) => category,
            Err(err) => {
                debug!(session = %self.session, %err, "reveal ignored");
                return;
            }
        };

        let fade_out = cx.timings().indicator_fade_out();
        let fade_in = cx.timings().result_fade_in();
        cx.fade(Part::ScanningIndicator, 0.0, fade_out);
        for other in Category::ALL {
            cx.set_opacity(Part::ResultImage(other), 0.0);
        }
        cx.fade(Part::ResultImage(category), 1.0, fade_in);
        cx.play(category.sound_id());
        self.revealed = Some(category);
        info!(
            session = %self.session,
            %category,
            image = category.image_id(),
            "result revealed"
        );
    }
}
