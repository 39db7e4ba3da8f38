//! Command-line surface of `nicometerctl`.

pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nicometer_config::{ConfigLoad, ConfigLoader};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::simulation::{self, ScanOptions};

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "nicometerctl",
    version,
    about = "Headless driver for the Naughty-Nic-O-Meter engine"
)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select a zone, press start and print the resulting timeline
    Scan {
        /// Contact position on the zone strip, 0 (left) to 1 (right)
        #[arg(long)]
        zone: f32,
        /// Seed for the needle's random sweeps (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
        /// Request a soft reset this many milliseconds after start
        #[arg(long)]
        reset_after_ms: Option<u64>,
        /// Simulated frame length in milliseconds
        #[arg(long, default_value_t = 10)]
        frame_ms: u64,
        /// Give up after this many simulated milliseconds
        #[arg(long, default_value_t = 60_000)]
        limit_ms: u64,
        /// Configuration file (TOML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the zone table
    Zones,
    /// Configuration helpers
    Config {
        /// Which helper to run.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Load and validate the configuration, then print the effective values
    Check {
        /// Configuration file (TOML or JSON); defaults to the environment
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Execute one parsed invocation.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan {
            zone,
            seed,
            reset_after_ms,
            frame_ms,
            limit_ms,
            config,
            json,
        } => {
            let load = load_config(config)?;
            init_tracing(load.config.log_filter.as_deref());
            // Loading ran before the subscriber existed.
            for warning in &load.warnings {
                warn!(hint = ?warning.hint(), "{warning}");
            }

            let mut engine = load.config.engine;
            if let Some(seed) = seed {
                engine.rng_seed = Some(seed);
            }
            let options = ScanOptions {
                zone,
                reset_after: reset_after_ms.map(Duration::from_millis),
                frame: Duration::from_millis(frame_ms),
                limit: Duration::from_millis(limit_ms),
            };
            let report = simulation::run_scan(engine, &options)?;
            if json {
                let rendered = serde_json::to_string_pretty(&report)
                    .context("failed to render report")?;
                println!("{rendered}");
            } else {
                print!("{}", output::render_report(&report));
            }
            Ok(())
        }
        Command::Zones => {
            print!("{}", output::render_zones());
            Ok(())
        }
        Command::Config {
            action: ConfigAction::Check { config },
        } => {
            init_tracing(None);
            let load = load_config(config)?;
            println!("source: {}", load.source);
            if load.warnings.is_empty() {
                println!("warnings: none");
            } else {
                println!("warnings:");
                for warning in &load.warnings {
                    match warning.hint() {
                        Some(hint) => println!("  - {warning} (hint: {hint})"),
                        None => println!("  - {warning}"),
                    }
                }
            }
            println!();
            print!("{}", load.config.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ConfigLoad> {
    let loader = match path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("configuration rejected")
}

/// Log to stderr, honouring `RUST_LOG` before the configured filter.
pub fn init_tracing(configured: Option<&str>) {
    let fallback = configured.unwrap_or("info").to_owned();
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
