//! The cleaning pipeline: load, clean, deduplicate, coerce, validate.
//!
//! Each stage takes the table by value and hands back a new table together
//! with a report of what it removed, so stages can be run and tested on their
//! own:
//!
//! ```no_run
//! use smartwatch_health::config::PipelineConfig;
//! use smartwatch_health::pipeline::run_pipeline;
//!
//! let outcome = run_pipeline(&PipelineConfig::default())?;
//! println!("{}", outcome.summary());
//! # Ok::<(), smartwatch_health::error::PipelineError>(())
//! ```
//!
//! Stage order:
//! 1. **load**: every column read as text, missing tokens as null
//! 2. **clean**: drop nulls and `ERROR` rows, correct Activity Level typos
//! 3. **dedup**: drop exact duplicate rows
//! 4. **coerce**: cast to the schema types; optionally drop rows that failed
//! 5. **validate**: heart rate, blood oxygen and non-negative range checks

pub mod cleaner;
pub mod coerce;
pub mod dedup;
pub mod loader;
pub mod report;
pub mod validate;

pub use cleaner::clean_table;
pub use coerce::{coerce_types, drop_unparseable};
pub use dedup::drop_duplicates;
pub use loader::load_table;
pub use report::{CleaningReport, NullCounts, StageReport, print_table};
pub use validate::validate_ranges;

use crate::config::{PipelineConfig, ReportOptions};
use crate::error::Result;
use polars::prelude::DataFrame;

/// The cleaned table and what every stage did to get there.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub table: DataFrame,
    pub cleaning: CleaningReport,
    pub duplicates: StageReport,
    /// Present when unparseable rows were dropped after coercion
    pub coercion: Option<StageReport>,
    pub range_checks: Vec<StageReport>,
    pub duration: std::time::Duration,
}

impl PipelineOutcome {
    /// Rows read from the input.
    pub fn rows_loaded(&self) -> usize {
        self.cleaning.rows_before
    }

    /// Every filtering stage after the cleaner, in the order they ran.
    pub fn stages(&self) -> impl Iterator<Item = &StageReport> {
        std::iter::once(&self.duplicates)
            .chain(self.coercion.iter())
            .chain(self.range_checks.iter())
    }

    pub fn summary(&self) -> String {
        format!(
            "Pipeline completed: {} -> {} rows, {} columns, {:.2}s",
            self.rows_loaded(),
            self.table.height(),
            self.table.width(),
            self.duration.as_secs_f64()
        )
    }
}

/// Loads the configured input and runs every stage on it.
///
/// # Errors
///
/// Returns the first error raised by loading or by any stage.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let df = load_table(&config.input)?;
    process_table(df, config.report_options(), config.drop_unparseable)
}

/// Runs every stage after loading on an already loaded table of raw text.
///
/// # Errors
///
/// Returns the first error raised by any stage.
pub fn process_table(
    df: DataFrame,
    options: ReportOptions,
    drop_unparseable_rows: bool,
) -> Result<PipelineOutcome> {
    let start = std::time::Instant::now();
    print_table(&df, options, false);

    let (df, cleaning) = clean_table(df, options)?;
    print_table(&df, options, false);

    let (df, duplicates) = drop_duplicates(df)?;

    let df = coerce_types(df)?;
    let (df, coercion) = if drop_unparseable_rows {
        let (df, report) = drop_unparseable(df)?;
        (df, Some(report))
    } else {
        (df, None)
    };

    let (df, range_checks) = validate_ranges(df)?;

    Ok(PipelineOutcome {
        table: df,
        cleaning,
        duplicates,
        coercion,
        range_checks,
        duration: start.elapsed(),
    })
}
