use super::report::{NullCounts, StageReport};
use crate::error::{PipelineError, Result, ResultExt as _};
use crate::schema::{COLUMNS, CoercionPolicy, ColumnSpec, SemanticType};
use polars::prelude::*;

pub const COERCION_CHECK: &str = "COERCION CHECK";

/// Casts every schema column to its semantic type.
///
/// Float columns follow [`CoercionPolicy::Coerce`]: values that do not parse
/// become null. The integer `User ID` column is strict: `"12"` and `"12.0"`
/// both become `12`, anything else fails the whole run.
///
/// # Errors
///
/// [`PipelineError::Schema`] for a `User ID` that is not a whole number in
/// `i64` range.
pub fn coerce_types(df: DataFrame) -> Result<DataFrame> {
    let mut exprs = Vec::with_capacity(COLUMNS.len());
    for spec in COLUMNS {
        if spec.kind == SemanticType::Integer {
            check_integral(&df, spec)?;
        }
        if let Some(expr) = cast_expr(spec) {
            exprs.push(expr);
        }
    }

    let before = NullCounts::of(&df);
    let coerced = df
        .lazy()
        .with_columns(exprs)
        .collect()
        .context("Failed to coerce column types")?;

    for (name, count) in before.introduced_in(&coerced) {
        tracing::warn!("{count} value(s) in '{name}' could not be parsed and were set to null");
    }
    Ok(coerced)
}

/// Removes rows left holding a null after coercion.
///
/// # Errors
///
/// Returns error if Polars fails to filter the table.
pub fn drop_unparseable(df: DataFrame) -> Result<(DataFrame, StageReport)> {
    let rows_before = df.height();
    let kept = df
        .lazy()
        .drop_nulls(None)
        .collect()
        .context("Failed to drop unparseable rows")?;
    let report = StageReport::new(COERCION_CHECK, rows_before, &kept);
    report.log();
    Ok((kept, report))
}

fn cast_expr(spec: &ColumnSpec) -> Option<Expr> {
    let column = col(spec.name);
    match (spec.kind, spec.policy) {
        (_, CoercionPolicy::Keep) | (SemanticType::Categorical, _) => None,
        (SemanticType::Float, CoercionPolicy::Coerce) => Some(column.cast(DataType::Float64)),
        (SemanticType::Float, CoercionPolicy::Strict) => {
            Some(column.strict_cast(DataType::Float64))
        }
        (SemanticType::Integer, _) => Some(
            column
                .cast(DataType::Float64)
                .strict_cast(DataType::Int64),
        ),
    }
}

/// Whole numbers that survive a cast to `i64` unchanged. `i64::MAX as f64`
/// rounds up to 2^63, hence the exclusive upper bound.
fn fits_i64(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64
}

/// Fails unless every non-null value of `spec.name` is a whole number in
/// `i64` range.
fn check_integral(df: &DataFrame, spec: &ColumnSpec) -> Result<()> {
    let raw = df.column(spec.name)?.as_materialized_series();
    let as_float = raw
        .cast(&DataType::Float64)
        .with_context(|| format!("Failed to read '{}' as a number", spec.name))?;
    let floats = as_float.f64()?;

    let mut bad = 0usize;
    let mut first_bad: Option<String> = None;
    for (idx, value) in floats.into_iter().enumerate() {
        let ok = match value {
            Some(v) => fits_i64(v),
            None => raw.get(idx).map(|v| v.is_null()).unwrap_or(true),
        };
        if !ok {
            bad += 1;
            if first_bad.is_none() {
                first_bad = Some(raw.get(idx).map(|v| v.to_string()).unwrap_or_default());
            }
        }
    }

    match first_bad {
        Some(value) => Err(PipelineError::schema(
            spec.name,
            format!("{bad} value(s) are not integers, first: {value}"),
        )),
        None => Ok(()),
    }
}
