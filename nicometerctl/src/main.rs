//! `nicometerctl` entry point.

use anyhow::Result;
use clap::Parser;
use nicometerctl::cli::{self, Cli};

fn main() -> Result<()> {
    cli::run(Cli::parse())
}
