use super::report::StageReport;
use crate::error::{Result, ResultExt as _};
use polars::prelude::*;

pub const DUPLICATE_CHECK: &str = "DUPLICATE CHECK";

/// Removes rows identical to an earlier row, keeping first occurrences in order.
///
/// # Errors
///
/// Returns error if Polars fails to compute the distinct rows.
pub fn drop_duplicates(df: DataFrame) -> Result<(DataFrame, StageReport)> {
    let rows_before = df.height();
    let deduped = df
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .context("Failed to remove duplicate rows")?;

    let report = StageReport::new(DUPLICATE_CHECK, rows_before, &deduped);
    tracing::info!("Duplicate rows removed: {}", report.removed());
    tracing::info!("DataFrame shape no duplicates: ({}, {})", deduped.height(), deduped.width());
    Ok((deduped, report))
}
