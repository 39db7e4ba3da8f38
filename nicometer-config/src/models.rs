//! The configuration document and where it is found.

use anyhow::{Context, anyhow};
use nicometer_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

/// Names a TOML or JSON file to load.
pub const CONFIG_PATH_ENV: &str = "NICOMETER_CONFIG_PATH";

/// Holds a whole configuration as inline JSON.
pub const CONFIG_JSON_ENV: &str = "NICOMETER_CONFIG_JSON";

/// Files tried, in order, when neither the caller nor the environment
/// names one.
pub const SEARCH_PATHS: [&str; 4] = [
    "nicometer.toml",
    "nicometer.json",
    "config/nicometer.toml",
    "config/nicometer.json",
];

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Nothing was found; built-in values apply.
    #[default]
    Defaults,
    /// `$NICOMETER_CONFIG_JSON`.
    InlineJson,
    /// A file, whether passed in, named by the environment or found on the
    /// search path.
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => f.write_str("built-in defaults"),
            ConfigSource::InlineJson => write!(f, "${CONFIG_JSON_ENV}"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML, the documented format.
    Toml,
    /// JSON, mainly for the inline environment variable.
    Json,
}

impl Format {
    /// Syntax implied by a `.toml` or `.json` extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Everything a host needs to run the meter.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Timings, volume and seed handed to the stage.
    pub engine: EngineConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset, for example
    /// `"info,nicometer_core=debug"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl MeterConfig {
    /// Find and parse the configuration for one run.
    ///
    /// `explicit` wins, then `$NICOMETER_CONFIG_PATH`, then
    /// `$NICOMETER_CONFIG_JSON`, then the first of [`SEARCH_PATHS`] that
    /// exists. With none of those the defaults apply. A source that is
    /// present but unreadable is an error, never a fallthrough.
    pub fn resolve(
        explicit: Option<&Path>,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_value(CONFIG_PATH_ENV).map(PathBuf::from));
        if let Some(path) = named {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        if let Some(raw) = env_value(CONFIG_JSON_ENV) {
            let config = Self::parse_json(&raw).with_context(|| {
                format!("${CONFIG_JSON_ENV} is not a valid meter config")
            })?;
            return Ok((config, ConfigSource::InlineJson));
        }

        let found = SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file());
        match found {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// [`MeterConfig::resolve`] with nothing passed in.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        Self::resolve(None)
    }

    /// Read a file, using its extension to pick the syntax when it has a
    /// known one.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let origin = path.display().to_string();
        match Format::from_path(path) {
            Some(format) => Self::parse_as(&contents, format)
                .with_context(|| format!("invalid meter config {origin}")),
            None => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Parse a document of unknown syntax, TOML first.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        Self::parse_as(contents, Format::Toml).or_else(|toml_err| {
            Self::parse_as(contents, Format::Json).map_err(|json_err| {
                anyhow!(
                    "{origin} is neither TOML ({toml_err}) \
                     nor JSON ({json_err})"
                )
            })
        })
    }

    /// Parse inline JSON.
    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        Self::parse_as(raw, Format::Json)
    }

    /// Parse a document in a known syntax. Missing keys take defaults.
    pub fn parse_as(contents: &str, format: Format) -> anyhow::Result<Self> {
        let config: Self = match format {
            Format::Toml => toml::from_str(contents)?,
            Format::Json => serde_json::from_str(contents)?,
        };
        Ok(config)
    }

    /// Render as TOML, the form `config check` prints.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to render meter config")
    }
}

/// A set, non-blank environment variable.
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
