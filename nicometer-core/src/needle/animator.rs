//! Drives the needle through its phases as chained tweens.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::segment::{AnimationSegment, settle_plan};
use super::state::{NeedlePhase, NeedleState};
use crate::clock::TimerId;
use crate::easing::EasingFunction;
use crate::session::{Cue, SessionContext};
use crate::types::ids::{Part, PropertyKey, SessionId, WidgetId};

/// Random sweeps stay within the gauge, `[-70, 70]` degrees.
pub const SWEEP_LIMIT_DEG: f32 = 70.0;

/// Closer than this to the target at the end of the sweeps, the needle
/// swings away first so the final move is big enough to read.
pub const CLOSE_THRESHOLD_DEG: f32 = 30.0;

/// Anticipation swing for a centred target, either side.
pub const CENTRE_SWING_DEG: f32 = 35.0;

/// Fallback swing when mirroring the target would land on zero.
pub const MIRROR_FALLBACK_DEG: f32 = 60.0;

/// Needle timers and tween completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedleCue {
    /// The pause after start has elapsed; begin sweeping.
    WakeUp,
    /// The active segment reached its target.
    SegmentFinished,
    /// The hold after the anticipation swing has elapsed.
    AnticipationElapsed,
}

/// Notifications the needle raises for its session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeedleSignal {
    /// The settle chain finished; the needle rests on its target.
    Settled {
        /// Final resting angle in degrees.
        angle: f32,
    },
}

/// One session's needle.
#[derive(Debug)]
pub struct NeedleAnimator {
    widget: WidgetId,
    state: NeedleState,
    target: f32,
    wake: Option<TimerId>,
    rng: StdRng,
}

impl NeedleAnimator {
    pub(crate) fn new(session: SessionId, rng: StdRng) -> Self {
        Self {
            widget: WidgetId::new(session, Part::Needle),
            state: NeedleState::default(),
            target: 0.0,
            wake: None,
            rng,
        }
    }

    /// The needle widget.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// Rotation property of the needle widget.
    pub fn angle_key(&self) -> PropertyKey {
        PropertyKey::angle(self.widget)
    }

    /// Last rendered angle in degrees.
    pub fn current_angle(&self) -> f32 {
        self.state.current_angle
    }

    /// Current phase.
    pub fn phase(&self) -> NeedlePhase {
        self.state.phase
    }

    /// Phase, angle and queued segments.
    pub fn state(&self) -> &NeedleState {
        &self.state
    }

    /// Angle of the running (or last) full animation.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Segment currently interpolating.
    pub fn active_segment(&self) -> Option<&AnimationSegment> {
        self.state.active.as_ref()
    }

    /// Segments of the current chain not yet started.
    pub fn pending_segments(&self) -> impl Iterator<Item = &AnimationSegment> {
        self.state.pending.iter()
    }

    /// Resting with no wake-up pending: a full animation may start.
    pub fn is_idle(&self) -> bool {
        self.state.phase == NeedlePhase::Resting && self.wake.is_none()
    }

    /// Mirror a rendered angle written by the scheduler.
    pub(crate) fn observe_angle(&mut self, degrees: f32) {
        self.state.current_angle = degrees;
    }

    /// A fresh generator split off this needle's, for a replacement needle.
    pub(crate) fn reseed(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.random())
    }

    /// Sweep, anticipate and settle on `target`. Ignored unless idle.
    pub(crate) fn start_full_animation(
        &mut self,
        target: f32,
        cx: &mut SessionContext<'_>,
    ) -> bool {
        if !self.is_idle() {
            debug!(
                session = %self.widget.session,
                phase = ?self.state.phase,
                "needle busy, full animation ignored"
            );
            return false;
        }
        self.target = target;
        let delay = cx.timings().wake_delay();
        let wake = Cue::Needle(NeedleCue::WakeUp);
        self.wake = Some(cx.schedule(Part::Needle, delay, wake));
        debug!(session = %self.widget.session, target, "needle armed");
        true
    }

    /// Stop the running segment and every pending timer for this needle.
    ///
    /// The angle stays where it is and the phase is left untouched; the
    /// caller reconciles. Safe to call repeatedly.
    pub(crate) fn cancel_all(&mut self, cx: &mut SessionContext<'_>) -> usize {
        let cancelled = cx.scheduler.cancel_owner(self.widget);
        self.state.clear();
        self.wake = None;
        if let Some(angle) = cx.scheduler.value(self.angle_key()) {
            self.state.current_angle = angle;
        }
        trace!(session = %self.widget.session, cancelled, "needle cancelled");
        cancelled
    }

    /// Ease back to 0 and fire `on_complete`. Valid from any phase.
    pub(crate) fn return_to_zero(
        &mut self,
        cx: &mut SessionContext<'_>,
        on_complete: Cue,
    ) {
        let duration = cx.timings().needle_return();
        cx.animate(
            self.angle_key(),
            0.0,
            duration,
            EasingFunction::EaseOutQuad,
            Some(on_complete),
        );
    }

    /// Advance on a fired needle cue.
    pub(crate) fn handle(
        &mut self,
        cue: NeedleCue,
        cx: &mut SessionContext<'_>,
    ) -> Option<NeedleSignal> {
        match cue {
            NeedleCue::WakeUp => {
                self.wake = None;
                if self.state.phase == NeedlePhase::Resting {
                    self.begin_sweeping(cx);
                }
                None
            }
            NeedleCue::SegmentFinished => self.on_segment_finished(cx),
            NeedleCue::AnticipationElapsed => {
                if self.state.phase == NeedlePhase::Anticipating {
                    self.begin_settling(cx);
                }
                None
            }
        }
    }

    fn on_segment_finished(
        &mut self,
        cx: &mut SessionContext<'_>,
    ) -> Option<NeedleSignal> {
        self.refresh_angle(cx);
        match self.state.phase {
            NeedlePhase::Sweeping => {
                if !self.start_next_segment(cx) {
                    self.anticipate(cx);
                }
                None
            }
            NeedlePhase::Anticipating => {
                self.state.active = None;
                let pause = cx.timings().anticipation_pause();
                cx.schedule(
                    Part::Needle,
                    pause,
                    Cue::Needle(NeedleCue::AnticipationElapsed),
                );
                None
            }
            NeedlePhase::Settling => {
                if self.start_next_segment(cx) {
                    return None;
                }
                self.state.phase = NeedlePhase::Resting;
                debug!(
                    session = %self.widget.session,
                    angle = self.state.current_angle,
                    "needle settled"
                );
                Some(NeedleSignal::Settled {
                    angle: self.state.current_angle,
                })
            }
            NeedlePhase::Resting => {
                trace!(
                    session = %self.widget.session,
                    "segment finished while resting"
                );
                None
            }
        }
    }

    fn begin_sweeping(&mut self, cx: &mut SessionContext<'_>) {
        let count = cx.timings().sweep_count();
        let step = cx.timings().sweep_step();
        let segments: Vec<AnimationSegment> = (0..count)
            .map(|_| {
                let angle =
                    self.rng.random_range(-SWEEP_LIMIT_DEG..=SWEEP_LIMIT_DEG);
                AnimationSegment::linear(angle, step)
            })
            .collect();
        self.state.load_chain(NeedlePhase::Sweeping, segments);
        debug!(session = %self.widget.session, count, "needle sweeping");
        if !self.start_next_segment(cx) {
            self.anticipate(cx);
        }
    }

    /// Pick the swing that precedes the settle, if one is needed.
    fn anticipation_swing(&mut self) -> Option<f32> {
        let target = self.target;
        if target.abs() < f32::EPSILON {
            return Some(self.either_side(CENTRE_SWING_DEG));
        }
        if (self.state.current_angle - target).abs() < CLOSE_THRESHOLD_DEG {
            let mirrored = -target;
            if mirrored.abs() < f32::EPSILON {
                return Some(self.either_side(MIRROR_FALLBACK_DEG));
            }
            return Some(mirrored);
        }
        None
    }

    fn either_side(&mut self, magnitude: f32) -> f32 {
        if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }

    fn anticipate(&mut self, cx: &mut SessionContext<'_>) {
        self.refresh_angle(cx);
        match self.anticipation_swing() {
            Some(angle) => {
                let swing = cx.timings().anticipation_swing();
                self.state.load_chain(
                    NeedlePhase::Anticipating,
                    [AnimationSegment::linear(angle, swing)],
                );
                debug!(
                    session = %self.widget.session,
                    angle,
                    "needle anticipating"
                );
                self.start_next_segment(cx);
            }
            None => self.begin_settling(cx),
        }
    }

    fn begin_settling(&mut self, cx: &mut SessionContext<'_>) {
        self.state
            .load_chain(NeedlePhase::Settling, settle_plan(self.target));
        debug!(
            session = %self.widget.session,
            target = self.target,
            "needle settling"
        );
        self.start_next_segment(cx);
    }

    fn start_next_segment(&mut self, cx: &mut SessionContext<'_>) -> bool {
        let Some(segment) = self.state.advance() else {
            return false;
        };
        cx.animate(
            self.angle_key(),
            segment.target_angle,
            segment.duration,
            segment.easing,
            Some(Cue::Needle(NeedleCue::SegmentFinished)),
        );
        true
    }

    fn refresh_angle(&mut self, cx: &SessionContext<'_>) {
        if let Some(angle) = cx.scheduler.value(self.angle_key()) {
            self.state.current_angle = angle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::clock::Scheduler;
    use crate::collaborators::SilentAudio;
    use crate::config::EngineConfig;
    use crate::session::Callback;
    use std::time::Duration;

    struct Rig {
        needle: NeedleAnimator,
        scheduler: Scheduler<Callback>,
        audio: SilentAudio,
        config: EngineConfig,
        /// Segments started, with the phase they were started in.
        started: Vec<(NeedlePhase, AnimationSegment)>,
        signals: Vec<(Duration, NeedleSignal)>,
    }

    impl Rig {
        fn new(seed: u64) -> Self {
            let session = SessionId(1);
            let mut scheduler = Scheduler::new();
            scheduler.set_value(
                PropertyKey::angle(WidgetId::new(session, Part::Needle)),
                0.0,
            );
            Self {
                needle: NeedleAnimator::new(
                    session,
                    StdRng::seed_from_u64(seed),
                ),
                scheduler,
                audio: SilentAudio,
                config: EngineConfig::default(),
                started: Vec::new(),
                signals: Vec::new(),
            }
        }

        fn start(&mut self, target: f32) -> bool {
            let mut cx = SessionContext::new(
                SessionId(1),
                &mut self.scheduler,
                &mut self.audio,
                &self.config,
            );
            self.needle.start_full_animation(target, &mut cx)
        }

        fn cancel(&mut self) -> usize {
            let mut cx = SessionContext::new(
                SessionId(1),
                &mut self.scheduler,
                &mut self.audio,
                &self.config,
            );
            self.needle.cancel_all(&mut cx)
        }

        fn run_for(&mut self, span: Duration) {
            let until = self.scheduler.now() + span;
            while let Some(deadline) =
                self.scheduler.next_deadline().filter(|at| *at <= until)
            {
                let fired = self.scheduler.step_to(deadline);
                self.sync();
                for callback in fired {
                    let Cue::Needle(cue) = callback.cue else { continue };
                    let before = self.needle.active_segment().copied();
                    let mut cx = SessionContext::new(
                        callback.session,
                        &mut self.scheduler,
                        &mut self.audio,
                        &self.config,
                    );
                    if let Some(signal) = self.needle.handle(cue, &mut cx) {
                        self.signals.push((deadline, signal));
                    }
                    let after = self.needle.active_segment().copied();
                    if let Some(segment) = after
                        && (before != after
                            || cue == NeedleCue::SegmentFinished)
                    {
                        self.started.push((self.needle.phase(), segment));
                    }
                }
            }
            self.scheduler.step_to(until);
            self.sync();
        }

        fn sync(&mut self) {
            for (key, value) in self.scheduler.drain_changes() {
                if key == self.needle.angle_key() {
                    self.needle.observe_angle(value);
                }
            }
        }

        fn started_in(&self, phase: NeedlePhase) -> Vec<AnimationSegment> {
            self.started
                .iter()
                .filter(|(started_phase, _)| *started_phase == phase)
                .map(|(_, segment)| *segment)
                .collect()
        }
    }

    #[test]
    fn every_category_lands_on_its_target() {
        for (seed, category) in Category::ALL.into_iter().enumerate() {
            let mut rig = Rig::new(seed as u64);
            assert!(rig.start(category.target_angle()));
            rig.run_for(Duration::from_secs(12));

            assert_eq!(rig.needle.phase(), NeedlePhase::Resting, "{category}");
            assert!(rig.needle.is_idle());
            assert!(
                (rig.needle.current_angle() - category.target_angle()).abs()
                    < 1e-4,
                "{category} ended at {}",
                rig.needle.current_angle()
            );
            assert_eq!(rig.signals.len(), 1);
        }
    }

    #[test]
    fn sweeps_are_twenty_one_steps_within_the_gauge() {
        let mut rig = Rig::new(7);
        rig.start(Category::Wow.target_angle());
        rig.run_for(Duration::from_secs(12));

        let sweeps = rig.started_in(NeedlePhase::Sweeping);
        assert_eq!(sweeps.len(), 21);
        for sweep in sweeps {
            assert_eq!(sweep.duration, Duration::from_millis(300));
            assert_eq!(sweep.easing, EasingFunction::Linear);
            assert!(
                (-SWEEP_LIMIT_DEG..=SWEEP_LIMIT_DEG)
                    .contains(&sweep.target_angle)
            );
        }
    }

    #[test]
    fn sweeping_starts_after_the_wake_delay() {
        let mut rig = Rig::new(1);
        rig.start(20.0);
        rig.run_for(Duration::from_millis(999));
        assert_eq!(rig.needle.phase(), NeedlePhase::Resting);
        assert!(!rig.needle.is_idle());

        rig.run_for(Duration::from_millis(1));
        assert_eq!(rig.needle.phase(), NeedlePhase::Sweeping);
        assert_eq!(rig.needle.pending_segments().count(), 20);
    }

    #[test]
    fn settle_runs_six_segments_in_order() {
        let mut rig = Rig::new(11);
        rig.start(-70.0);
        rig.run_for(Duration::from_secs(12));

        let settle = rig.started_in(NeedlePhase::Settling);
        let durations: Vec<u64> = settle
            .iter()
            .map(|segment| segment.duration.as_millis() as u64)
            .collect();
        assert_eq!(durations, vec![500, 600, 300, 300, 200, 200]);
        let targets: Vec<f32> =
            settle.iter().map(|segment| segment.target_angle).collect();
        assert!((targets[0] - 42.0).abs() < 1e-4);
        assert_eq!(targets[1..], [-70.0, -64.0, -74.0, -68.0, -70.0]);
    }

    #[test]
    fn centred_target_always_swings_to_thirty_five() {
        for seed in 0..8 {
            let mut rig = Rig::new(seed);
            rig.start(0.0);
            rig.run_for(Duration::from_secs(12));

            let swings = rig.started_in(NeedlePhase::Anticipating);
            assert_eq!(swings.len(), 1);
            assert_eq!(swings[0].target_angle.abs(), CENTRE_SWING_DEG);
            assert_eq!(swings[0].duration, Duration::from_millis(400));
        }
    }

    #[test]
    fn nearby_target_swings_to_its_mirror() {
        // Find a seed whose last sweep lands near +20.
        let found = (0..500u64).find_map(|seed| {
            let mut rig = Rig::new(seed);
            rig.start(20.0);
            rig.run_for(Duration::from_secs(12));
            let last_sweep = *rig.started_in(NeedlePhase::Sweeping).last()?;
            ((last_sweep.target_angle - 20.0).abs() < CLOSE_THRESHOLD_DEG)
                .then_some(rig)
        });
        let rig = found.expect("some seed ends the sweep near the target");
        let swings = rig.started_in(NeedlePhase::Anticipating);
        assert_eq!(swings.len(), 1);
        assert_eq!(swings[0].target_angle, -20.0);
    }

    #[test]
    fn distant_target_settles_without_a_swing() {
        let found = (0..500u64).find_map(|seed| {
            let mut rig = Rig::new(seed);
            rig.start(70.0);
            rig.run_for(Duration::from_secs(12));
            let last_sweep = *rig.started_in(NeedlePhase::Sweeping).last()?;
            ((last_sweep.target_angle - 70.0).abs() >= CLOSE_THRESHOLD_DEG)
                .then_some(rig)
        });
        let rig = found.expect("some seed ends the sweep far from the target");
        assert!(rig.started_in(NeedlePhase::Anticipating).is_empty());
        assert_eq!(rig.started_in(NeedlePhase::Settling).len(), 6);
    }

    #[test]
    fn start_is_ignored_while_busy() {
        let mut rig = Rig::new(3);
        assert!(rig.start(20.0));
        assert!(!rig.start(-20.0));
        rig.run_for(Duration::from_secs(2));
        assert!(!rig.start(-20.0));
        assert_eq!(rig.needle.target(), 20.0);
    }

    #[test]
    fn cancel_all_is_idempotent_and_keeps_the_angle() {
        let mut rig = Rig::new(5);
        assert_eq!(rig.cancel(), 0);
        assert_eq!(rig.cancel(), 0);

        rig.start(20.0);
        rig.run_for(Duration::from_millis(1_150));
        let angle = rig.needle.current_angle();
        assert!(rig.cancel() > 0);
        assert_eq!(rig.cancel(), 0);
        assert_eq!(rig.needle.current_angle(), angle);
        assert!(rig.needle.active_segment().is_none());

        rig.run_for(Duration::from_secs(5));
        assert_eq!(rig.needle.current_angle(), angle);
        assert!(rig.signals.is_empty());
    }

    #[test]
    fn return_to_zero_reports_completion() {
        let mut rig = Rig::new(9);
        rig.start(70.0);
        rig.run_for(Duration::from_millis(1_450));
        rig.cancel();
        {
            let mut cx = SessionContext::new(
                SessionId(1),
                &mut rig.scheduler,
                &mut rig.audio,
                &rig.config,
            );
            rig.needle
                .return_to_zero(&mut cx, Cue::Sound("returned.wav"));
        }
        let fired = rig.scheduler.step_to(
            rig.scheduler.now() + Duration::from_millis(500),
        );
        rig.sync();
        assert_eq!(
            fired,
            vec![Callback {
                session: SessionId(1),
                cue: Cue::Sound("returned.wav"),
            }]
        );
        assert_eq!(rig.needle.current_angle(), 0.0);
    }
}
