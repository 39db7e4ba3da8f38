//! One instantiation of the meter and the plumbing its parts share.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, trace};

use crate::category::Category;
use crate::clock::{Scheduler, TimerId};
use crate::collaborators::{AudioSink, play_sound};
use crate::config::{EngineConfig, MeterTimings};
use crate::easing::EasingFunction;
use crate::needle::{NeedleAnimator, NeedleCue, NeedleSignal};
use crate::scan::{ScanCue, ScanSequenceController};
use crate::transition::ResetCue;
use crate::types::ids::{Part, PropertyKey, SessionId, WidgetId};

/// What a scheduled callback resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Needle motion.
    Needle(NeedleCue),
    /// Scan sequence step.
    Scan(ScanCue),
    /// Soft reset step, only honoured for the active transition.
    Reset(ResetCue),
    /// Delayed feedback sound.
    Sound(&'static str),
}

/// Scheduler payload: a cue tagged with the session that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Callback {
    /// Session that scheduled the cue.
    pub session: SessionId,
    /// What to resume.
    pub cue: Cue,
}

/// Everything a session part needs to cause effects, scoped to one session.
pub(crate) struct SessionContext<'a> {
    pub(crate) session: SessionId,
    pub(crate) scheduler: &'a mut Scheduler<Callback>,
    pub(crate) audio: &'a mut dyn AudioSink,
    pub(crate) config: &'a EngineConfig,
}

impl std::fmt::Debug for SessionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session", &self.session)
            .field("now", &self.scheduler.now())
            .finish()
    }
}

impl<'a> SessionContext<'a> {
    pub(crate) fn new(
        session: SessionId,
        scheduler: &'a mut Scheduler<Callback>,
        audio: &'a mut dyn AudioSink,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            session,
            scheduler,
            audio,
            config,
        }
    }

    pub(crate) fn timings(&self) -> &MeterTimings {
        &self.config.timings
    }

    pub(crate) fn widget(&self, part: Part) -> WidgetId {
        WidgetId::new(self.session, part)
    }

    fn callback(&self, cue: Cue) -> Callback {
        Callback {
            session: self.session,
            cue,
        }
    }

    pub(crate) fn schedule(
        &mut self,
        owner: Part,
        delay: Duration,
        cue: Cue,
    ) -> TimerId {
        let callback = self.callback(cue);
        let owner = self.widget(owner);
        self.scheduler.schedule_once(owner, delay, callback)
    }

    pub(crate) fn animate(
        &mut self,
        key: PropertyKey,
        to: f32,
        duration: Duration,
        easing: EasingFunction,
        on_complete: Option<Cue>,
    ) {
        let on_complete = on_complete.map(|cue| self.callback(cue));
        self.scheduler
            .animate(key, to, duration, easing, on_complete);
    }

    /// Linear opacity fade with no completion callback.
    pub(crate) fn fade(&mut self, part: Part, to: f32, duration: Duration) {
        let key = PropertyKey::opacity(self.widget(part));
        self.scheduler
            .animate(key, to, duration, EasingFunction::Linear, None);
    }

    pub(crate) fn set_opacity(&mut self, part: Part, opacity: f32) {
        let key = PropertyKey::opacity(self.widget(part));
        self.scheduler.set_value(key, opacity);
    }

    pub(crate) fn opacity(&self, part: Part) -> Option<f32> {
        self.scheduler
            .value(PropertyKey::opacity(self.widget(part)))
    }

    pub(crate) fn play(&mut self, sound: &str) {
        play_sound(&mut *self.audio, sound, self.config.volume);
    }
}

/// One meter: a needle plus the scan controller driving it.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    needle: NeedleAnimator,
    scan: ScanSequenceController,
    attached: bool,
    retiring: bool,
}

impl Session {
    pub(crate) fn new(id: SessionId, rng: StdRng) -> Self {
        Self {
            id,
            needle: NeedleAnimator::new(id, rng),
            scan: ScanSequenceController::new(id),
            attached: false,
            retiring: false,
        }
    }

    /// Stable identity, unique within one stage.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The needle and its motion state.
    pub fn needle(&self) -> &NeedleAnimator {
        &self.needle
    }

    pub(crate) fn needle_mut(&mut self) -> &mut NeedleAnimator {
        &mut self.needle
    }

    /// Selection, scan and reveal state.
    pub fn scan(&self) -> &ScanSequenceController {
        &self.scan
    }

    /// Whether the session currently sits in a container.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    /// Set once a soft reset has been triggered on this session. A retiring
    /// session no longer takes input and only receives reset cues.
    pub fn is_retiring(&self) -> bool {
        self.retiring
    }

    pub(crate) fn retire(&mut self) {
        self.retiring = true;
    }

    /// Write the initial value of every part: needle centred, reset control
    /// visible, indicator and result images hidden, root at `opacity`.
    pub(crate) fn mount(
        &self,
        scheduler: &mut Scheduler<Callback>,
        opacity: f32,
    ) {
        for part in Part::all() {
            let widget = WidgetId::new(self.id, part);
            match part {
                Part::Root => {
                    scheduler.set_value(PropertyKey::opacity(widget), opacity)
                }
                Part::Needle => {
                    scheduler.set_value(PropertyKey::angle(widget), 0.0)
                }
                Part::ResetControl => {
                    scheduler.set_value(PropertyKey::opacity(widget), 1.0)
                }
                Part::ScanningIndicator | Part::ResultImage(_) => {
                    scheduler.set_value(PropertyKey::opacity(widget), 0.0)
                }
            }
        }
    }

    /// Throw away all state and scheduled work, keeping the identity.
    pub(crate) fn reinitialize(&mut self, cx: &mut SessionContext<'_>) {
        let dropped = cx.scheduler.purge_session(self.id);
        let seed = self.needle.reseed();
        self.needle = NeedleAnimator::new(self.id, seed);
        self.scan = ScanSequenceController::new(self.id);
        self.retiring = false;
        self.mount(cx.scheduler, 1.0);
        debug!(session = %self.id, dropped, "session reinitialised in place");
    }

    pub(crate) fn on_zone_selected(
        &mut self,
        category: Category,
        cx: &mut SessionContext<'_>,
    ) -> bool {
        self.scan.on_zone_selected(category, cx)
    }

    pub(crate) fn on_start_pressed(
        &mut self,
        cx: &mut SessionContext<'_>,
    ) -> bool {
        self.scan.on_start_pressed(&mut self.needle, cx)
    }

    /// Route a fired cue to the part that scheduled it. Reset cues belong to
    /// the transition and are ignored here.
    pub(crate) fn handle(&mut self, cue: Cue, cx: &mut SessionContext<'_>) {
        match cue {
            Cue::Needle(cue) => {
                if let Some(NeedleSignal::Settled { angle }) =
                    self.needle.handle(cue, cx)
                {
                    self.scan.on_needle_settled(angle, cx);
                }
            }
            Cue::Scan(cue) => self.scan.handle(cue, cx),
            Cue::Sound(sound) => cx.play(sound),
            Cue::Reset(cue) => {
                trace!(
                    session = %self.id,
                    ?cue,
                    "reset cue outside a transition"
                );
            }
        }
    }
}

/// Builds fresh sessions with increasing ids.
#[derive(Debug)]
pub struct SessionFactory {
    next_id: u64,
    rng: StdRng,
}

impl SessionFactory {
    /// Factory seeded with `seed`, or from the OS when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { next_id: 1, rng }
    }

    /// Factory using the configured seed.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.rng_seed)
    }

    /// A brand-new, unattached session: needle at rest, nothing selected.
    pub fn create(&mut self) -> Session {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        let rng = StdRng::seed_from_u64(self.rng.random());
        Session::new(id, rng)
    }
}
