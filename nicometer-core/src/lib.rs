//! Core engine for the Naughty-Nic-O-Meter.
//!
//! The crate models one screen of the meter as a set of sessions driven by a
//! single cooperative clock:
//!
//! * [`needle::NeedleAnimator`] owns the needle's sweep / anticipation /
//!   settle state machine and expresses it as chained tween segments.
//! * [`scan::ScanSequenceController`] ties selection, the scan start and the
//!   result reveal together.
//! * [`transition::SoftResetTransition`] returns the needle to centre and
//!   crossfades the outgoing session into a fresh one.
//! * [`stage::Stage`] is the host-facing driver: it owns the
//!   [`clock::Scheduler`], the [`container::SessionContainer`] and the audio
//!   and rendering collaborators, routes [`input::Input`] and guards every
//!   fired callback against torn-down sessions.
//!
//! Nothing here touches a real clock or a real window. Hosts call
//! [`stage::Stage::advance`] with their frame delta and receive property
//! changes through the [`collaborators::Renderer`] trait.

pub mod category;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod container;
pub mod easing;
pub mod error;
pub mod input;
pub mod needle;
pub mod scan;
pub mod session;
pub mod stage;
pub mod transition;
pub mod types;

pub use category::Category;
pub use clock::{Scheduler, TimerId};
pub use collaborators::{AudioSink, Renderer};
pub use config::{EngineConfig, MeterTimings};
pub use container::SessionContainer;
pub use easing::EasingFunction;
pub use error::{MeterError, Result};
pub use input::Input;
pub use needle::{NeedleAnimator, NeedlePhase, NeedleSignal};
pub use scan::{ScanPhase, ScanSequenceController, SessionState};
pub use session::{Callback, Cue, Session, SessionFactory};
pub use stage::Stage;
pub use transition::SoftResetTransition;
pub use types::ids::{Part, Property, PropertyKey, SessionId, WidgetId};
