//! One-call loading: resolve, parse, validate.

pub mod error;

use std::path::PathBuf;
use tracing::{debug, warn};

use self::error::ConfigLoadError;
use crate::models::{ConfigSource, MeterConfig};
use crate::validation::{self, GuardRailWarning};

/// Knobs for [`ConfigLoader`].
#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    /// File to load ahead of the environment and the search path.
    pub config_path: Option<PathBuf>,
}

/// Resolves, parses and validates the meter configuration.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

/// A validated configuration and what is known about it.
#[derive(Debug)]
pub struct ConfigLoad {
    /// The effective configuration.
    pub config: MeterConfig,
    /// Where it came from.
    pub source: ConfigSource,
    /// Accepted but questionable settings, already logged.
    pub warnings: Vec<GuardRailWarning>,
}

impl ConfigLoader {
    /// Loader that looks at the environment and the search path only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with explicit options.
    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    /// Load `path` ahead of every other source.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Guard-rail warnings are logged and returned; guard-rail errors fail
    /// the load.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (config, source) =
            MeterConfig::resolve(self.options.config_path.as_deref())
                .map_err(ConfigLoadError::Source)?;
        debug!(%source, "meter configuration resolved");

        let warnings = validation::apply_guard_rails(&config)?;
        for warning in &warnings {
            warn!(hint = ?warning.hint(), "{warning}");
        }

        Ok(ConfigLoad {
            config,
            source,
            warnings,
        })
    }
}
