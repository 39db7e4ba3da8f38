//! Collaborators that record instead of playing or drawing.

use std::collections::BTreeMap;

use nicometer_core::{AudioSink, MeterError, Renderer, SessionId, WidgetId};

/// Audio sink that remembers every request instead of playing it.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    played: Vec<String>,
}

impl RecordingAudio {
    /// Sound names in request order.
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: &str, _volume: f32) -> Result<(), MeterError> {
        self.played.push(sound.to_owned());
        Ok(())
    }
}

/// Counts property writes per session.
#[derive(Debug, Default)]
pub struct TimelineRenderer {
    writes: BTreeMap<SessionId, usize>,
}

impl TimelineRenderer {
    /// Property writes per session.
    pub fn writes(&self) -> &BTreeMap<SessionId, usize> {
        &self.writes
    }

    fn record(&mut self, widget: WidgetId) {
        *self.writes.entry(widget.session).or_default() += 1;
    }
}

impl Renderer for TimelineRenderer {
    fn set_angle(&mut self, widget: WidgetId, _degrees: f32) {
        self.record(widget);
    }

    fn set_opacity(&mut self, widget: WidgetId, _opacity: f32) {
        self.record(widget);
    }
}
