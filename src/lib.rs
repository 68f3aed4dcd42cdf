//! # smartwatch-health
//!
//! Cleaning, validation and reporting for smartwatch health telemetry.
//!
//! A CSV of readings (heart rate, blood oxygen, steps, sleep, activity and
//! stress level per user) goes through a fixed sequence of table transforms
//! built on Polars, then gets summarised and charted.
//!
//! ```no_run
//! use smartwatch_health::{analysis, config::PipelineConfig, pipeline, render};
//!
//! let config = PipelineConfig::default();
//! let outcome = pipeline::run_pipeline(&config)?;
//!
//! let stats = analysis::analyze_simple(&outcome.table)?;
//! println!("{stats}");
//!
//! render::render_all(&outcome.table, &config.plot_dir)?;
//! # Ok::<(), smartwatch_health::error::PipelineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: column names, types, range checks and label corrections
//! - [`pipeline`]: load, clean, deduplicate, coerce and validate
//! - [`analysis`]: means, median, mode and grouped averages
//! - [`render`]: SVG charts
//! - [`config`]: run settings
//! - [`error`]: error type and context helpers
//! - [`logging`]: tracing subscriber setup

#![warn(clippy::all, rust_2018_idioms)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod schema;
