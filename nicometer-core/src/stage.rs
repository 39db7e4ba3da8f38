//! Host-facing driver.

use std::time::Duration;
use tracing::{debug, trace};

use crate::category::{CLICK_SOUND, Category};
use crate::clock::Scheduler;
use crate::collaborators::{AudioSink, Renderer};
use crate::config::EngineConfig;
use crate::container::SessionContainer;
use crate::error::MeterError;
use crate::input::Input;
use crate::session::{Callback, Cue, Session, SessionContext, SessionFactory};
use crate::transition::{ResetCue, SoftResetTransition};
use crate::types::ids::{Part, Property, PropertyKey, SessionId, WidgetId};

/// Owns the clock, the live sessions and the collaborators.
///
/// Hosts feed it [`Input`] and frame deltas through [`Stage::advance`]. Each
/// scheduler step is handled in the same order: property writes go to the
/// renderer and the needle mirrors first, then the fired callbacks run, each
/// one checked against the container so work scheduled by a torn-down or
/// retiring session is dropped.
#[derive(Debug)]
pub struct Stage<A: AudioSink, R: Renderer> {
    config: EngineConfig,
    scheduler: Scheduler<Callback>,
    container: SessionContainer,
    factory: SessionFactory,
    transition: Option<SoftResetTransition>,
    audio: A,
    renderer: R,
}

impl<A: AudioSink, R: Renderer> Stage<A, R> {
    /// Mount the first session, fully visible.
    pub fn new(config: EngineConfig, audio: A, renderer: R) -> Self {
        let mut scheduler = Scheduler::new();
        let mut factory = SessionFactory::from_config(&config);
        let mut container = SessionContainer::new();
        let first = factory.create();
        first.mount(&mut scheduler, 1.0);
        debug!(session = %first.id(), "stage created");
        container.attach(first);

        let mut stage = Self {
            config,
            scheduler,
            container,
            factory,
            transition: None,
            audio,
            renderer,
        };
        stage.flush();
        stage
    }

    /// Settings the stage was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulated time since creation.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Live sessions.
    pub fn sessions(&self) -> &SessionContainer {
        &self.container
    }

    /// The session that receives input.
    pub fn current_session(&self) -> Option<&Session> {
        self.container.current()
    }

    /// One normally, two during a crossfade.
    pub fn live_session_count(&self) -> usize {
        self.container.len()
    }

    /// A soft reset is running.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// The running soft reset.
    pub fn transition(&self) -> Option<&SoftResetTransition> {
        self.transition.as_ref()
    }

    /// Last value written to a property.
    pub fn property(&self, key: PropertyKey) -> Option<f32> {
        self.scheduler.value(key)
    }

    /// Last opacity written for one part of a session.
    pub fn opacity(&self, session: SessionId, part: Part) -> Option<f32> {
        self.property(PropertyKey::opacity(WidgetId::new(session, part)))
    }

    /// No timer pending and no tween running anywhere.
    pub fn is_quiescent(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// The audio collaborator.
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// The audio collaborator, mutably.
    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// The rendering collaborator.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The rendering collaborator, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Tear down the stage, returning the collaborators.
    pub fn into_parts(self) -> (A, R) {
        (self.audio, self.renderer)
    }

    /// Route one host input to the current session.
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::ResetControl { fraction } => self.on_reset_control(fraction),
            Input::Start => self.on_start(),
            Input::ResultImage => self.on_result_image(),
        }
        self.flush();
    }

    /// Replace the current session through a crossfade.
    ///
    /// Returns false when a reset is already running or no session takes
    /// input.
    pub fn soft_reset(&mut self) -> bool {
        if self.transition.is_some() {
            let error = MeterError::invalid("reset already running");
            debug!(%error, "reset request ignored");
            return false;
        }
        let Some(id) = self.container.current_id() else {
            debug!("reset request with no current session");
            return false;
        };
        let transition = match self.session_cx(id) {
            Some((session, mut cx)) => {
                SoftResetTransition::trigger(session, &mut cx)
            }
            None => None,
        };
        let started = transition.is_some();
        self.transition = transition;
        self.flush();
        started
    }

    /// Move the clock forward by `dt`, running everything that falls due.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some(at) =
            self.scheduler.next_deadline().filter(|at| *at <= until)
        {
            let fired = self.scheduler.step_to(at);
            self.flush();
            for callback in fired {
                self.dispatch(callback);
            }
            self.flush();
        }
        self.scheduler.step_to(until);
        self.flush();
    }

    fn on_reset_control(&mut self, fraction: f32) {
        let Some(category) = Category::from_zone_fraction(fraction) else {
            debug!(fraction, "contact outside the zone strip");
            return;
        };
        let Some(session) = self.container.current() else {
            debug!("input while no session is current");
            return;
        };
        let id = session.id();
        if session.scan().state().accepts_reset() {
            self.soft_reset();
            return;
        }
        if let Some((session, mut cx)) = self.session_cx(id)
            && session.on_zone_selected(category, &mut cx)
        {
            let delay = cx.timings().click_delay();
            cx.schedule(Part::ResetControl, delay, Cue::Sound(CLICK_SOUND));
        }
    }

    fn on_start(&mut self) {
        let Some(id) = self.container.current_id() else {
            debug!("input while no session is current");
            return;
        };
        if let Some((session, mut cx)) = self.session_cx(id)
            && session.on_start_pressed(&mut cx)
        {
            let delay = cx.timings().click_delay();
            cx.schedule(Part::Root, delay, Cue::Sound(CLICK_SOUND));
        }
    }

    fn on_result_image(&mut self) {
        let Some(session) = self.container.current() else {
            return;
        };
        let id = session.id();
        let visible = session.scan().revealed().is_some_and(|category| {
            self.opacity(id, Part::ResultImage(category))
                .is_some_and(|opacity| opacity > 0.0)
        });
        if visible {
            self.soft_reset();
        } else {
            trace!(session = %id, "tap on a hidden result image");
        }
    }

    fn session_cx(
        &mut self,
        id: SessionId,
    ) -> Option<(&mut Session, SessionContext<'_>)> {
        let session = self.container.get_mut(id)?;
        let cx = SessionContext::new(
            id,
            &mut self.scheduler,
            &mut self.audio,
            &self.config,
        );
        Some((session, cx))
    }

    fn dispatch(&mut self, callback: Callback) {
        let Callback { session: id, cue } = callback;
        let Some(retiring) = self.container.get(id).map(Session::is_retiring)
        else {
            let error = MeterError::StaleCallback { session: id };
            trace!(%error, ?cue, "callback dropped");
            return;
        };

        if let Cue::Reset(cue) = cue {
            if self
                .transition
                .as_ref()
                .is_some_and(|transition| transition.outgoing() == id)
            {
                self.on_reset_cue(cue);
            } else {
                trace!(session = %id, ?cue, "reset cue without its transition");
            }
            return;
        }

        if retiring {
            let error = MeterError::StaleCallback { session: id };
            trace!(%error, ?cue, "callback for retiring session dropped");
            return;
        }
        if let Some((session, mut cx)) = self.session_cx(id) {
            session.handle(cue, &mut cx);
        }
    }

    fn on_reset_cue(&mut self, cue: ResetCue) {
        match cue {
            ResetCue::NeedleReturned => {
                if let Some(transition) = self.transition.as_mut() {
                    transition.on_needle_returned(
                        &mut self.container,
                        &mut self.factory,
                        &mut self.scheduler,
                        &self.config.timings,
                    );
                }
            }
            ResetCue::CrossfadeElapsed => {
                if let Some(transition) = self.transition.take() {
                    transition.finish(&mut self.container, &mut self.scheduler);
                }
            }
        }
    }

    /// Forward buffered property writes of live sessions.
    fn flush(&mut self) {
        for (key, value) in self.scheduler.drain_changes() {
            let Some(session) = self.container.get_mut(key.session()) else {
                trace!(
                    widget = %key.widget,
                    "write for a detached session dropped"
                );
                continue;
            };
            match key.property {
                Property::Angle => {
                    if key.widget.part == Part::Needle {
                        session.needle_mut().observe_angle(value);
                    }
                    self.renderer.set_angle(key.widget, value);
                }
                Property::Opacity => {
                    self.renderer.set_opacity(key.widget, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockAudioSink, MockRenderer, NullRenderer};
    use crate::scan::ScanPhase;

    fn permissive_renderer() -> MockRenderer {
        let mut renderer = MockRenderer::new();
        renderer.expect_set_angle().returning(|_, _| ());
        renderer.expect_set_opacity().returning(|_, _| ());
        renderer
    }

    #[test]
    fn new_stage_mounts_one_visible_session() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_set_opacity()
            .withf(|widget, opacity| {
                widget.part == Part::Root && *opacity == 1.0
            })
            .times(1)
            .returning(|_, _| ());
        renderer
            .expect_set_opacity()
            .withf(|widget, _| widget.part != Part::Root)
            .returning(|_, _| ());
        renderer
            .expect_set_angle()
            .withf(|widget, degrees| {
                widget.part == Part::Needle && *degrees == 0.0
            })
            .times(1)
            .returning(|_, _| ());
        let mut audio = MockAudioSink::new();
        audio.expect_play().never();

        let config = EngineConfig::default().with_seed(1);
        let stage = Stage::new(config, audio, renderer);
        assert_eq!(stage.live_session_count(), 1);
        assert!(!stage.is_transitioning());
        let current = stage.current_session().expect("first session");
        assert_eq!(current.id(), SessionId(1));
        assert_eq!(current.scan().phase(), ScanPhase::Idle);
    }

    #[test]
    fn missing_sounds_never_interrupt_a_scan() {
        let mut audio = MockAudioSink::new();
        audio
            .expect_play()
            .returning(|sound, _| Err(MeterError::missing_asset(sound)));
        let mut stage = Stage::new(
            EngineConfig::default().with_seed(9),
            audio,
            permissive_renderer(),
        );

        stage.handle(Input::ResetControl { fraction: 0.1 });
        stage.handle(Input::Start);
        stage.advance(Duration::from_millis(10_417));

        let session = stage.current_session().expect("session");
        assert!(session.scan().is_result_displayed());
        assert_eq!(session.scan().revealed(), Some(Category::Naughty));
    }

    #[test]
    fn off_strip_contact_is_ignored() {
        let mut audio = MockAudioSink::new();
        audio.expect_play().never();
        let config = EngineConfig::default().with_seed(2);
        let mut stage = Stage::new(config, audio, NullRenderer);

        stage.handle(Input::ResetControl { fraction: 1.5 });
        stage.handle(Input::ResetControl { fraction: f32::NAN });
        stage.handle(Input::Start);
        stage.advance(Duration::from_secs(1));

        let session = stage.current_session().expect("session");
        assert_eq!(session.scan().selected(), None);
        assert!(stage.is_quiescent());
    }

    #[test]
    fn selection_clicks_after_a_short_delay() {
        let mut audio = MockAudioSink::new();
        audio.expect_play().never();
        let config = EngineConfig::default().with_seed(2);
        let mut stage = Stage::new(config, audio, NullRenderer);

        stage.handle(Input::ResetControl { fraction: 0.5 });
        stage.advance(Duration::from_millis(99));
        stage.audio_mut().checkpoint();
        stage
            .audio_mut()
            .expect_play()
            .withf(|sound, _| sound == CLICK_SOUND)
            .times(1)
            .returning(|_, _| Ok(()));
        stage.advance(Duration::from_millis(1));

        let session = stage.current_session().expect("session");
        assert_eq!(session.scan().selected(), Some(Category::OnTheLine));
    }

    #[test]
    fn result_tap_before_reveal_does_not_reset() {
        let mut stage = Stage::new(
            EngineConfig::default().with_seed(4),
            crate::collaborators::SilentAudio,
            NullRenderer,
        );
        stage.handle(Input::ResultImage);
        stage.handle(Input::ResetControl { fraction: 0.9 });
        stage.handle(Input::ResultImage);
        assert!(!stage.is_transitioning());

        stage.handle(Input::Start);
        stage.handle(Input::ResultImage);
        assert!(!stage.is_transitioning());
    }
}
