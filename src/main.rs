//! # smartwatch-health entry point
//!
//! Runs the whole pipeline once: load the CSV, clean and validate it, print
//! the statistics and write the charts.
//!
//! ```bash
//! smartwatch-health                          # defaults
//! smartwatch-health --input week1.csv --debug
//! smartwatch-health --config pipeline.json --no-plots
//! ```
//!
//! Set `RUST_LOG=debug` for more detailed logs. Any fatal error (missing
//! file, malformed CSV, non-integer user id) ends the process with a
//! non-zero exit code.

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.resolve_config()?;

    smartwatch_health::logging::init(config.log_dir.as_deref())?;

    cli::run(&config)
}
