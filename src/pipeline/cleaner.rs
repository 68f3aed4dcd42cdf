use super::report::{CleaningReport, NullCounts, print_table};
use crate::config::ReportOptions;
use crate::error::{PipelineError, Result, ResultExt as _};
use crate::schema::{ACTIVITY_CORRECTIONS, ACTIVITY_LEVEL, ERROR_TOKEN, KNOWN_ACTIVITY_LEVELS};
use polars::prelude::*;

/// Drops rows with missing values or the error token, then fixes known
/// Activity Level misspellings.
///
/// Running it on its own output changes nothing. An empty result is valid.
///
/// # Errors
///
/// [`PipelineError::Schema`] if the Activity Level column is missing, or a
/// data processing error from Polars.
pub fn clean_table(df: DataFrame, options: ReportOptions) -> Result<(DataFrame, CleaningReport)> {
    if !df.schema().contains(ACTIVITY_LEVEL) {
        return Err(PipelineError::schema(ACTIVITY_LEVEL, "required column is missing"));
    }

    let rows_before = df.height();
    let nulls_before = NullCounts::of(&df);
    tracing::info!("Null values before cleaning:\n{nulls_before}");

    let error_mask = token_mask(&df, ERROR_TOKEN);
    let error_rows = match &error_mask {
        Some(mask) => {
            let rows = df
                .clone()
                .lazy()
                .filter(mask.clone())
                .collect()
                .context("Failed to collect rows holding the error token")?;
            print_table(&rows, options, false);
            rows.height()
        }
        None => 0,
    };
    tracing::info!("Rows with '{ERROR_TOKEN}': {error_rows}");

    let mut lf = df.lazy().drop_nulls(None);
    if let Some(mask) = error_mask {
        lf = lf.filter(mask.not());
    }
    let cleaned = lf
        .with_column(correct_activity_levels(col(ACTIVITY_LEVEL)).alias(ACTIVITY_LEVEL))
        .collect()
        .context("Failed to collect cleaned table")?;

    let nulls_after = NullCounts::of(&cleaned);
    tracing::info!("Null values after cleaning:\n{nulls_after}");
    tracing::info!(
        "Shape before removing missing and '{ERROR_TOKEN}' rows: ({rows_before}, {})",
        cleaned.width()
    );
    tracing::info!(
        "Shape after removing missing and '{ERROR_TOKEN}' rows: ({}, {})",
        cleaned.height(),
        cleaned.width()
    );

    let activity_levels = distinct_in_order(&cleaned, ACTIVITY_LEVEL)?;
    tracing::info!("Unique activity levels after cleaning: {activity_levels:?}");
    for level in &activity_levels {
        if !KNOWN_ACTIVITY_LEVELS.contains(&level.as_str()) {
            tracing::warn!("Unrecognised activity level '{level}' kept as is");
        }
    }

    let report = CleaningReport {
        nulls_before,
        nulls_after,
        rows_before,
        error_rows,
        rows_after: cleaned.height(),
        columns: cleaned.width(),
        activity_levels,
    };
    Ok((cleaned, report))
}

/// True for rows where any text column equals `token`. `None` when the table
/// has no text columns.
pub fn token_mask(df: &DataFrame, token: &str) -> Option<Expr> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| col(c.name().as_str()).eq(lit(token)).fill_null(lit(false)))
        .reduce(|acc, e| acc.or(e))
}

/// Rewrites each misspelled label to its correction; other values pass through.
pub fn correct_activity_levels(expr: Expr) -> Expr {
    ACTIVITY_CORRECTIONS
        .iter()
        .fold(expr, |expr, (typo, fixed)| {
            when(expr.clone().eq(lit(*typo)))
                .then(lit(*fixed))
                .otherwise(expr)
        })
}

fn distinct_in_order(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df.column(column)?.as_materialized_series();
    let mut seen: Vec<String> = Vec::new();
    for value in series.str()?.into_iter().flatten() {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_owned());
        }
    }
    Ok(seen)
}
