//! Diagnostics produced while the table moves through the pipeline.

use crate::config::ReportOptions;
use polars::prelude::*;
use std::fmt;

/// Row and column counts around one filtering stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub label: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
}

impl StageReport {
    pub fn new(label: impl Into<String>, rows_before: usize, after: &DataFrame) -> Self {
        Self {
            label: label.into(),
            rows_before,
            rows_after: after.height(),
            columns: after.width(),
        }
    }

    pub fn removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn log(&self) {
        tracing::info!("{}: rows removed: {}", self.label, self.removed());
        tracing::info!("{}: shape: ({}, {})", self.label, self.rows_after, self.columns);
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: rows removed: {} ({} -> {}), shape: ({}, {})",
            self.label,
            self.removed(),
            self.rows_before,
            self.rows_after,
            self.rows_after,
            self.columns
        )
    }
}

/// Missing values per column, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullCounts(pub Vec<(String, usize)>);

impl NullCounts {
    pub fn of(df: &DataFrame) -> Self {
        Self(
            df.get_columns()
                .iter()
                .map(|c| (c.name().to_string(), c.null_count()))
                .collect(),
        )
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, n)| *n)
    }

    /// Columns of `after` holding more nulls than recorded here, with the increase.
    pub fn introduced_in(&self, after: &DataFrame) -> Vec<(String, usize)> {
        self.0
            .iter()
            .filter_map(|(name, before)| {
                let now = after.column(name).ok()?.null_count();
                (now > *before).then(|| (name.clone(), now - before))
            })
            .collect()
    }
}

impl fmt::Display for NullCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.0.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, count) in &self.0 {
            writeln!(f, "{name:<width$}  {count}")?;
        }
        Ok(())
    }
}

/// Everything the cleaner observed, kept for the final report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub nulls_before: NullCounts,
    pub nulls_after: NullCounts,
    pub rows_before: usize,
    /// Rows of the input table holding the error token in any column
    pub error_rows: usize,
    pub rows_after: usize,
    pub columns: usize,
    /// Activity Level values after correction, in order of first appearance
    pub activity_levels: Vec<String>,
}

impl CleaningReport {
    pub fn removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Prints `df` as a table when debugging is enabled or `force` is set.
#[expect(clippy::print_stdout)]
pub fn print_table(df: &DataFrame, options: ReportOptions, force: bool) {
    if options.debug || force {
        println!("{df}");
    }
}
