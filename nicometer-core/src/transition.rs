//! Soft reset: park the needle, crossfade into a fresh session, drop the
//! old one.

use tracing::{debug, info, warn};

use crate::clock::Scheduler;
use crate::config::MeterTimings;
use crate::container::SessionContainer;
use crate::easing::EasingFunction;
use crate::error::MeterError;
use crate::session::{Callback, Cue, Session, SessionContext, SessionFactory};
use crate::types::ids::{Part, PropertyKey, SessionId, WidgetId};

/// Steps of a soft reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCue {
    /// The outgoing needle reached 0.
    NeedleReturned,
    /// The crossfade duration has passed since the incoming session was
    /// attached.
    CrossfadeElapsed,
}

/// Where a soft reset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    /// The outgoing needle is easing back to 0.
    ReturningNeedle,
    /// Both sessions are attached and their roots are fading.
    Crossfading {
        /// The replacement session.
        incoming: SessionId,
    },
}

/// One running replacement of `outgoing` by a fresh session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftResetTransition {
    outgoing: SessionId,
    phase: ResetPhase,
}

impl SoftResetTransition {
    /// Start replacing `outgoing`.
    ///
    /// A session without a parent cannot be crossfaded out; it is reset in
    /// place instead and no transition is returned.
    pub(crate) fn trigger(
        outgoing: &mut Session,
        cx: &mut SessionContext<'_>,
    ) -> Option<Self> {
        let id = outgoing.id();
        outgoing.needle_mut().cancel_all(cx);

        if !outgoing.is_attached() {
            let error = MeterError::OrphanedSession { session: id };
            warn!(%error, "reinitialising in place");
            outgoing.reinitialize(cx);
            return None;
        }

        outgoing.retire();
        outgoing
            .needle_mut()
            .return_to_zero(cx, Cue::Reset(ResetCue::NeedleReturned));
        info!(session = %id, "soft reset triggered");
        Some(Self {
            outgoing: id,
            phase: ResetPhase::ReturningNeedle,
        })
    }

    /// Session being replaced.
    pub fn outgoing(&self) -> SessionId {
        self.outgoing
    }

    /// Replacement session, once attached.
    pub fn incoming(&self) -> Option<SessionId> {
        match self.phase {
            ResetPhase::ReturningNeedle => None,
            ResetPhase::Crossfading { incoming } => Some(incoming),
        }
    }

    /// Current step.
    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    /// Attach the replacement at opacity 0 and start both root fades.
    pub(crate) fn on_needle_returned(
        &mut self,
        parent: &mut SessionContainer,
        factory: &mut SessionFactory,
        scheduler: &mut Scheduler<Callback>,
        timings: &MeterTimings,
    ) {
        if self.phase != ResetPhase::ReturningNeedle {
            debug!(session = %self.outgoing, "needle return reported twice");
            return;
        }

        let incoming = factory.create();
        let incoming_id = incoming.id();
        incoming.mount(scheduler, 0.0);
        parent.attach(incoming);

        let crossfade = timings.crossfade();
        let outgoing_root = root_opacity(self.outgoing);
        scheduler.animate(
            outgoing_root,
            0.0,
            crossfade,
            EasingFunction::Linear,
            None,
        );
        scheduler.animate(
            root_opacity(incoming_id),
            1.0,
            crossfade,
            EasingFunction::Linear,
            None,
        );
        // Teardown is timed separately from the root fade.
        scheduler.schedule_once(
            outgoing_root.widget,
            crossfade,
            Callback {
                session: self.outgoing,
                cue: Cue::Reset(ResetCue::CrossfadeElapsed),
            },
        );
        self.phase = ResetPhase::Crossfading {
            incoming: incoming_id,
        };
        debug!(
            outgoing = %self.outgoing,
            incoming = %incoming_id,
            "crossfade started"
        );
    }

    /// Detach and drop the outgoing session along with anything it still
    /// had scheduled.
    pub(crate) fn finish(
        self,
        parent: &mut SessionContainer,
        scheduler: &mut Scheduler<Callback>,
    ) {
        match parent.detach(self.outgoing) {
            Ok(session) => drop(session),
            Err(error) => warn!(%error, "outgoing session already gone"),
        }
        let purged = scheduler.purge_session(self.outgoing);
        info!(
            outgoing = %self.outgoing,
            incoming = ?self.incoming(),
            purged,
            "soft reset complete"
        );
    }
}

fn root_opacity(session: SessionId) -> PropertyKey {
    PropertyKey::opacity(WidgetId::new(session, Part::Root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::collaborators::SilentAudio;
    use crate::config::EngineConfig;
    use std::time::Duration;

    struct Rig {
        scheduler: Scheduler<Callback>,
        audio: SilentAudio,
        config: EngineConfig,
        factory: SessionFactory,
        parent: SessionContainer,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scheduler: Scheduler::new(),
                audio: SilentAudio,
                config: EngineConfig::default().with_seed(3),
                factory: SessionFactory::new(Some(3)),
                parent: SessionContainer::new(),
            }
        }

        fn scanning_session(&mut self) -> Session {
            let mut session = self.factory.create();
            session.mount(&mut self.scheduler, 1.0);
            let mut cx = SessionContext::new(
                session.id(),
                &mut self.scheduler,
                &mut self.audio,
                &self.config,
            );
            session.on_zone_selected(Category::Nice, &mut cx);
            session.on_start_pressed(&mut cx);
            session
        }

        fn trigger(&mut self, id: SessionId) -> Option<SoftResetTransition> {
            let session = self.parent.get_mut(id)?;
            let mut cx = SessionContext::new(
                id,
                &mut self.scheduler,
                &mut self.audio,
                &self.config,
            );
            SoftResetTransition::trigger(session, &mut cx)
        }
    }

    #[test]
    fn orphaned_session_is_reset_in_place() {
        let mut rig = Rig::new();
        let mut session = rig.scanning_session();
        let id = session.id();
        rig.scheduler.step_to(Duration::from_millis(2_000));

        let mut cx = SessionContext::new(
            id,
            &mut rig.scheduler,
            &mut rig.audio,
            &rig.config,
        );
        assert!(SoftResetTransition::trigger(&mut session, &mut cx).is_none());

        assert_eq!(session.id(), id);
        assert!(!session.scan().is_scanning());
        assert!(!session.is_retiring());
        assert_eq!(rig.scheduler.pending_for(id), 0);
        let needle = WidgetId::new(id, Part::Needle);
        assert_eq!(rig.scheduler.value(PropertyKey::angle(needle)), Some(0.0));
        assert_eq!(rig.scheduler.value(root_opacity(id)), Some(1.0));
    }

    #[test]
    fn trigger_retires_and_returns_the_needle() {
        let mut rig = Rig::new();
        let session = rig.scanning_session();
        let id = session.id();
        rig.parent.attach(session);
        rig.scheduler.step_to(Duration::from_millis(1_500));

        let transition = rig.trigger(id).expect("attached session");
        assert_eq!(transition.phase(), ResetPhase::ReturningNeedle);
        assert_eq!(transition.incoming(), None);

        let session = rig.parent.get(id).expect("still attached");
        assert!(session.is_retiring());
        let tween = rig
            .scheduler
            .tween(session.needle().angle_key())
            .expect("return tween");
        assert_eq!(tween.to, 0.0);
        assert_eq!(tween.duration, Duration::from_millis(500));
        assert_eq!(tween.easing, EasingFunction::EaseOutQuad);
    }

    #[test]
    fn crossfade_attaches_then_finish_detaches() {
        let mut rig = Rig::new();
        let session = rig.scanning_session();
        let outgoing = session.id();
        rig.parent.attach(session);

        let mut transition = rig.trigger(outgoing).expect("attached session");
        let fired = rig.scheduler.step_to(Duration::from_millis(500));
        assert!(fired.contains(&Callback {
            session: outgoing,
            cue: Cue::Reset(ResetCue::NeedleReturned),
        }));

        transition.on_needle_returned(
            &mut rig.parent,
            &mut rig.factory,
            &mut rig.scheduler,
            &rig.config.timings,
        );
        let incoming = transition.incoming().expect("incoming attached");
        assert_eq!(rig.parent.len(), 2);
        assert_eq!(rig.parent.current_id(), Some(incoming));
        assert_eq!(rig.scheduler.value(root_opacity(incoming)), Some(0.0));

        // Reporting the return again changes nothing.
        transition.on_needle_returned(
            &mut rig.parent,
            &mut rig.factory,
            &mut rig.scheduler,
            &rig.config.timings,
        );
        assert_eq!(rig.parent.len(), 2);

        let fired = rig.scheduler.step_to(Duration::from_millis(1_750));
        assert!(fired.contains(&Callback {
            session: outgoing,
            cue: Cue::Reset(ResetCue::CrossfadeElapsed),
        }));
        assert_eq!(rig.scheduler.value(root_opacity(incoming)), Some(1.0));

        transition.finish(&mut rig.parent, &mut rig.scheduler);
        assert_eq!(rig.parent.len(), 1);
        assert!(!rig.parent.contains(outgoing));
        assert_eq!(rig.scheduler.pending_for(outgoing), 0);
        assert_eq!(rig.scheduler.value(root_opacity(outgoing)), None);
    }

    #[test]
    fn finishing_after_an_external_detach_is_tolerated() {
        let mut rig = Rig::new();
        let session = rig.scanning_session();
        let outgoing = session.id();
        rig.parent.attach(session);
        let transition = rig.trigger(outgoing).expect("attached session");

        rig.parent.detach(outgoing).unwrap();
        transition.finish(&mut rig.parent, &mut rig.scheduler);
        assert!(rig.parent.is_empty());
        assert_eq!(rig.scheduler.pending_for(outgoing), 0);
    }

    #[test]
    fn rewriting_the_outgoing_fade_still_finishes() {
        let mut rig = Rig::new();
        let session = rig.scanning_session();
        let outgoing = session.id();
        rig.parent.attach(session);

        let mut transition = rig.trigger(outgoing).expect("attached session");
        rig.scheduler.step_to(Duration::from_millis(500));
        transition.on_needle_returned(
            &mut rig.parent,
            &mut rig.factory,
            &mut rig.scheduler,
            &rig.config.timings,
        );

        rig.scheduler.step_to(Duration::from_millis(1_000));
        rig.scheduler.set_value(root_opacity(outgoing), 0.25);
        assert!(!rig.scheduler.is_animating(root_opacity(outgoing)));

        let fired = rig.scheduler.step_to(Duration::from_millis(1_750));
        assert!(fired.contains(&Callback {
            session: outgoing,
            cue: Cue::Reset(ResetCue::CrossfadeElapsed),
        }));
    }
}
