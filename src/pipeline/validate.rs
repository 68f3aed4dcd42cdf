use super::report::StageReport;
use crate::error::{Result, ResultExt as _};
use crate::schema::{RANGE_CHECKS, RangeCheck};
use polars::prelude::*;

/// Applies every range check in order, each on the survivors of the last.
///
/// Expects the checked columns to be Float64 already. Nulls never match a
/// rule, so a row is only removed for a value that is present and out of range.
///
/// # Errors
///
/// Returns error if a checked column is missing or not numeric.
pub fn validate_ranges(df: DataFrame) -> Result<(DataFrame, Vec<StageReport>)> {
    let mut df = df;
    let mut reports = Vec::with_capacity(RANGE_CHECKS.len());
    for check in RANGE_CHECKS {
        let (kept, report) = apply_range_check(df, check)?;
        report.log();
        reports.push(report);
        df = kept;
    }
    Ok((df, reports))
}

/// Drops the rows violating any rule of `check` and reports the removal.
///
/// # Errors
///
/// Returns error if a rule's column is missing or not numeric.
pub fn apply_range_check(df: DataFrame, check: &RangeCheck) -> Result<(DataFrame, StageReport)> {
    let rows_before = df.height();
    let kept = match violation_mask(check) {
        Some(mask) => df
            .lazy()
            .filter(mask.not())
            .collect()
            .with_context(|| format!("Failed to apply {}", check.label))?,
        None => df,
    };
    let report = StageReport::new(check.label, rows_before, &kept);
    Ok((kept, report))
}

/// True for rows breaking any rule of `check`.
fn violation_mask(check: &RangeCheck) -> Option<Expr> {
    check
        .rules
        .iter()
        .flat_map(|rule| {
            let value = col(rule.column);
            [
                rule.min.map(|min| value.clone().lt(lit(min))),
                rule.max.map(|max| value.clone().gt(lit(max))),
            ]
        })
        .flatten()
        .map(|e| e.fill_null(lit(false)))
        .reduce(|acc, e| acc.or(e))
}
