//! Loader failures.

use super::super::validation::ConfigGuardRailError;

use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The source could not be read or parsed.
    #[error("failed to load meter configuration: {0}")]
    Source(#[source] anyhow::Error),
    /// The configuration parsed but cannot be run.
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
}
