//! Seams to the outside world: sound playback and rendering.

use tracing::warn;

use crate::error::MeterError;
use crate::types::ids::WidgetId;

/// Fire-and-forget sound playback.
///
/// Implementations resolve `sound` by name and return
/// [`MeterError::MissingAsset`] when they cannot; the engine logs that and
/// carries on.
#[cfg_attr(test, mockall::automock)]
pub trait AudioSink {
    /// Start `sound` at `volume` in `[0, 1]`.
    fn play(&mut self, sound: &str, volume: f32) -> Result<(), MeterError>;
}

/// Thin subscriber to property changes. Both calls are plain setters.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    /// Rotate a widget, in degrees.
    fn set_angle(&mut self, widget: WidgetId, degrees: f32);
    /// Set a widget's opacity, 0 to 1.
    fn set_opacity(&mut self, widget: WidgetId, opacity: f32);
}

/// Request a sound, tolerating a missing asset.
pub(crate) fn play_sound(audio: &mut dyn AudioSink, sound: &str, volume: f32) {
    if let Err(error) = audio.play(sound, volume) {
        warn!(%error, sound, "sound playback skipped");
    }
}

/// Renderer that draws nothing, for hosts that only poll state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn set_angle(&mut self, _widget: WidgetId, _degrees: f32) {}
    fn set_opacity(&mut self, _widget: WidgetId, _opacity: f32) {}
}

/// Audio sink that discards every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: &str, _volume: f32) -> Result<(), MeterError> {
        Ok(())
    }
}
