//! Configuration for the nicometer engine.
//!
//! The serde types live in `nicometer_core::config`; this crate finds them
//! (explicit path, environment, well-known files), parses TOML or JSON and
//! runs the guard rails that reject settings the engine cannot run with.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{ConfigSource, Format, MeterConfig};
pub use validation::{
    ConfigGuardRailError, GuardRailWarning, apply_guard_rails,
};
