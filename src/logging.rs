//! Logging setup for the pipeline binary.
//!
//! Console output always goes to stdout. When a log directory is configured,
//! every record is also written to a daily rotating `smartwatch-health.*.log`
//! file in that directory.
//!
//! ```no_run
//! use smartwatch_health::logging;
//!
//! logging::init(None).expect("Failed to initialize logging");
//! tracing::info!("pipeline started");
//! ```

use anyhow::{Context as _, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Initializes the global subscriber.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
///
/// # Errors
///
/// Returns error if the log directory cannot be created, the file appender
/// fails, or a global subscriber is already installed.
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .compact();

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(10)
                .filename_prefix("smartwatch-health")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create file appender")?;
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = log_dir {
        tracing::debug!("Logging initialized, log directory: {}", dir.display());
    }

    Ok(())
}
