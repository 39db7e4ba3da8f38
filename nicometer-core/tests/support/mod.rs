#![allow(dead_code)]

use std::time::Duration;

use nicometer_core::{
    AudioSink, EngineConfig, MeterError, Renderer, SessionId, Stage, WidgetId,
};

/// Sounds requested so far, with the stage time they were requested at.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<String>,
    /// Sounds that report a missing asset instead of playing.
    pub missing: Vec<String>,
}

impl RecordingAudio {
    pub fn with_missing(sounds: &[&str]) -> Self {
        Self {
            played: Vec::new(),
            missing: sounds.iter().map(|sound| sound.to_string()).collect(),
        }
    }

    pub fn count(&self, sound: &str) -> usize {
        self.played.iter().filter(|played| *played == sound).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: &str, _volume: f32) -> Result<(), MeterError> {
        self.played.push(sound.to_string());
        if self.missing.iter().any(|missing| missing == sound) {
            return Err(MeterError::missing_asset(sound));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Write {
    Angle(WidgetId, f32),
    Opacity(WidgetId, f32),
}

impl Write {
    pub fn widget(&self) -> WidgetId {
        match self {
            Write::Angle(widget, _) | Write::Opacity(widget, _) => *widget,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub writes: Vec<Write>,
}

impl RecordingRenderer {
    pub fn touched(&self, session: SessionId) -> usize {
        self.writes
            .iter()
            .filter(|write| write.widget().session == session)
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn set_angle(&mut self, widget: WidgetId, degrees: f32) {
        self.writes.push(Write::Angle(widget, degrees));
    }

    fn set_opacity(&mut self, widget: WidgetId, opacity: f32) {
        self.writes.push(Write::Opacity(widget, opacity));
    }
}

pub type TestStage = Stage<RecordingAudio, RecordingRenderer>;

pub fn stage(seed: u64) -> TestStage {
    Stage::new(
        EngineConfig::default().with_seed(seed),
        RecordingAudio::default(),
        RecordingRenderer::default(),
    )
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Advance in fixed frames, calling `each` after every frame.
pub fn run_frames(
    stage: &mut TestStage,
    total: Duration,
    frame: Duration,
    mut each: impl FnMut(&TestStage),
) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        let step = frame.min(total - elapsed);
        stage.advance(step);
        elapsed += step;
        each(stage);
    }
}
