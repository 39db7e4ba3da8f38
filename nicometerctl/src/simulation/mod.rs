//! Drive a [`Stage`] headlessly and record what happened.
//!
//! Time is simulated: the run advances in fixed frames and samples the
//! stage after each one, so event times are quantised to the frame length.

pub mod recorders;

use anyhow::{Result, anyhow, ensure};
use nicometer_core::{
    Category, EngineConfig, Input, NeedlePhase, Part, ScanPhase, SessionId,
    Stage,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

pub use recorders::{RecordingAudio, TimelineRenderer};

/// Stage wired to the recording collaborators.
pub type SimStage = Stage<RecordingAudio, TimelineRenderer>;

/// How to drive one simulated scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Contact position on the zone strip, 0 to 1.
    pub zone: f32,
    /// Ask for a soft reset this long after start.
    pub reset_after: Option<Duration>,
    /// Simulated frame length.
    pub frame: Duration,
    /// Give up after this much simulated time.
    pub limit: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            zone: 0.5,
            reset_after: None,
            frame: Duration::from_millis(10),
            limit: Duration::from_secs(60),
        }
    }
}

/// Something observed during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// A sound was requested.
    Sound {
        /// Asset name.
        sound: String,
    },
    /// A needle changed phase.
    Needle {
        /// Owning session.
        session: SessionId,
        /// New phase.
        phase: NeedlePhase,
    },
    /// A scan changed phase.
    Scan {
        /// Owning session.
        session: SessionId,
        /// New phase.
        phase: ScanPhase,
    },
    /// A soft reset was asked for.
    ResetRequested {
        /// Whether the stage started one.
        accepted: bool,
    },
    /// The number of attached sessions changed.
    LiveSessions {
        /// Sessions now attached.
        count: usize,
    },
}

/// An event stamped with simulated time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    /// Milliseconds since the stage was created.
    pub at_ms: u64,
    /// What happened.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// End state of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    /// Category picked from the zone.
    pub selected: Category,
    /// Current session when the run ended.
    pub session: Option<SessionId>,
    /// Category that session revealed, if any.
    pub revealed: Option<Category>,
    /// Its needle angle in degrees.
    pub final_angle: Option<f32>,
    /// Result image currently drawn with non-zero opacity.
    pub visible_result: Option<&'static str>,
    /// Sessions still attached.
    pub live_sessions: usize,
    /// Property writes the renderer saw, per session.
    pub renderer_writes: BTreeMap<SessionId, usize>,
    /// Simulated time the run took.
    pub elapsed_ms: u64,
    /// False when the run hit the time limit first.
    pub completed: bool,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// Sweep seed, when one was fixed.
    pub seed: Option<u64>,
    /// Observed events in time order.
    pub events: Vec<TimelineEvent>,
    /// End state.
    pub summary: ScanSummary,
}

/// Select the zone, press start and run until everything has come to rest.
pub fn run_scan(
    config: EngineConfig,
    options: &ScanOptions,
) -> Result<ScanReport> {
    let selected = Category::from_zone_fraction(options.zone).ok_or_else(|| {
        anyhow!("zone {} is outside the strip (expected 0..=1)", options.zone)
    })?;
    ensure!(!options.frame.is_zero(), "frame length must be greater than zero");

    let seed = config.rng_seed;
    let mut stage = Stage::new(
        config,
        RecordingAudio::default(),
        TimelineRenderer::default(),
    );
    let mut observer = Observer::default();
    observer.sample(&stage);

    stage.handle(Input::ResetControl {
        fraction: options.zone,
    });
    stage.handle(Input::Start);
    info!(%selected, "scan started");
    observer.sample(&stage);

    let started = stage.now();
    let mut reset_pending = options.reset_after;
    let completed = loop {
        if let Some(after) = reset_pending
            && stage.now() - started >= after
        {
            let accepted = stage.soft_reset();
            observer.push(&stage, EventKind::ResetRequested { accepted });
            reset_pending = None;
        }
        if reset_pending.is_none() && is_finished(&stage) {
            break true;
        }
        if stage.now() - started >= options.limit {
            break false;
        }
        stage.advance(options.frame);
        observer.sample(&stage);
    };
    debug!(completed, elapsed = ?stage.now(), "simulation stopped");

    let summary = summarize(&stage, selected, completed);
    Ok(ScanReport {
        seed,
        events: observer.events,
        summary,
    })
}

fn is_finished(stage: &SimStage) -> bool {
    !stage.is_transitioning()
        && stage.is_quiescent()
        && stage
            .current_session()
            .is_some_and(|session| !session.scan().is_scanning())
}

fn summarize(
    stage: &SimStage,
    selected: Category,
    completed: bool,
) -> ScanSummary {
    let current = stage.current_session();
    let revealed = current.and_then(|session| session.scan().revealed());
    let visible_result = current.zip(revealed).and_then(|(session, category)| {
        stage
            .opacity(session.id(), Part::ResultImage(category))
            .filter(|opacity| *opacity > 0.0)
            .map(|_| category.image_id())
    });

    ScanSummary {
        selected,
        session: current.map(|session| session.id()),
        revealed,
        final_angle: current.map(|session| session.needle().current_angle()),
        visible_result,
        live_sessions: stage.live_session_count(),
        renderer_writes: stage.renderer().writes().clone(),
        elapsed_ms: millis(stage.now()),
        completed,
    }
}

fn millis(at: Duration) -> u64 {
    u64::try_from(at.as_millis()).unwrap_or(u64::MAX)
}

/// Turns successive stage snapshots into change events.
#[derive(Debug, Default)]
struct Observer {
    sounds_seen: usize,
    needles: BTreeMap<SessionId, NeedlePhase>,
    scans: BTreeMap<SessionId, ScanPhase>,
    live: usize,
    events: Vec<TimelineEvent>,
}

impl Observer {
    fn push(&mut self, stage: &SimStage, kind: EventKind) {
        self.events.push(TimelineEvent {
            at_ms: millis(stage.now()),
            kind,
        });
    }

    fn sample(&mut self, stage: &SimStage) {
        let played = stage.audio().played();
        for sound in &played[self.sounds_seen..] {
            self.events.push(TimelineEvent {
                at_ms: millis(stage.now()),
                kind: EventKind::Sound {
                    sound: sound.clone(),
                },
            });
        }
        self.sounds_seen = played.len();

        for session in stage.sessions().iter() {
            let id = session.id();
            let needle = session.needle().phase();
            if self.needles.insert(id, needle) != Some(needle) {
                let event = EventKind::Needle {
                    session: id,
                    phase: needle,
                };
                self.push(stage, event);
            }
            let scan = session.scan().phase();
            if self.scans.insert(id, scan) != Some(scan) {
                self.push(stage, EventKind::Scan { session: id, phase: scan });
            }
        }

        let live = stage.live_session_count();
        if live != self.live {
            self.live = live;
            self.push(stage, EventKind::LiveSessions { count: live });
        }
    }
}
