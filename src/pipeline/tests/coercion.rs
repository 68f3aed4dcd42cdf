use super::{f64_values, raw_table, row, str_values};
use crate::error::PipelineError;
use crate::pipeline::coerce::{coerce_types, drop_unparseable};
use crate::schema::{ACTIVITY_LEVEL, BLOOD_OXYGEN, HEART_RATE, STRESS_LEVEL, USER_ID};
use anyhow::Result;
use polars::prelude::*;

fn user_ids(df: &DataFrame) -> Result<Vec<Option<i64>>> {
    Ok(df
        .column(USER_ID)?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .collect())
}

#[test]
fn test_columns_get_semantic_types() -> Result<()> {
    let df = raw_table(&[row("4174", "58.94", "98.8", "5450", "7.17", "Active", "1")])?;

    let coerced = coerce_types(df)?;
    assert_eq!(coerced.column(USER_ID)?.dtype(), &DataType::Int64);
    assert_eq!(coerced.column(HEART_RATE)?.dtype(), &DataType::Float64);
    assert_eq!(coerced.column(STRESS_LEVEL)?.dtype(), &DataType::Float64);
    assert_eq!(coerced.column(ACTIVITY_LEVEL)?.dtype(), &DataType::String);
    assert_eq!(f64_values(&coerced, HEART_RATE)?, vec![Some(58.94)]);
    assert_eq!(user_ids(&coerced)?, vec![Some(4174)]);
    assert_eq!(str_values(&coerced, ACTIVITY_LEVEL)?, vec!["Active"]);
    Ok(())
}

#[test]
fn test_unparseable_numbers_become_null() -> Result<()> {
    let df = raw_table(&[
        row("1", "fast", "98.8", "5450", "7.17", "Active", "1"),
        row("2", "70", "high", "5450", "7.17", "Active", "1"),
    ])?;

    let coerced = coerce_types(df)?;
    assert_eq!(coerced.height(), 2);
    assert_eq!(f64_values(&coerced, HEART_RATE)?, vec![None, Some(70.0)]);
    assert_eq!(f64_values(&coerced, BLOOD_OXYGEN)?, vec![Some(98.8), None]);
    Ok(())
}

#[test]
fn test_integral_float_user_id_is_accepted() -> Result<()> {
    let df = raw_table(&[
        row("12.0", "70", "98", "5000", "7", "Active", "4"),
        row("13", "70", "98", "5000", "7", "Active", "4"),
    ])?;

    let coerced = coerce_types(df)?;
    assert_eq!(user_ids(&coerced)?, vec![Some(12), Some(13)]);
    Ok(())
}

#[test]
fn test_fractional_user_id_is_fatal() -> Result<()> {
    let df = raw_table(&[
        row("12.5", "70", "98", "5000", "7", "Active", "4"),
        row("abc", "70", "98", "5000", "7", "Active", "4"),
        row("14", "70", "98", "5000", "7", "Active", "4"),
    ])?;

    let err = coerce_types(df).unwrap_err();
    match err {
        PipelineError::Schema { column, detail } => {
            assert_eq!(column, USER_ID);
            assert!(detail.starts_with("2 value(s)"), "detail: {detail}");
            assert!(detail.contains("12.5"), "detail: {detail}");
        }
        other => panic!("expected schema error, got {other}"),
    }
    Ok(())
}

#[test]
fn test_user_id_beyond_i64_is_fatal() -> Result<()> {
    let df = raw_table(&[
        row("99999999999999999999", "70", "98", "5000", "7", "Active", "4"),
        row("14", "70", "98", "5000", "7", "Active", "4"),
    ])?;

    let err = coerce_types(df).unwrap_err();
    match err {
        PipelineError::Schema { column, detail } => {
            assert_eq!(column, USER_ID);
            assert!(detail.starts_with("1 value(s)"), "detail: {detail}");
        }
        other => panic!("expected schema error, got {other}"),
    }
    Ok(())
}

#[test]
fn test_drop_unparseable_reports_removed_rows() -> Result<()> {
    let df = raw_table(&[
        row("1", "fast", "98.8", "5450", "7.17", "Active", "1"),
        row("2", "70", "97.5", "5450", "7.17", "Active", "1"),
        row("3", "71", "97.5", "5450", "7.17", "Active", "calm"),
    ])?;

    let (kept, report) = drop_unparseable(coerce_types(df)?)?;
    assert_eq!(user_ids(&kept)?, vec![Some(2)]);
    assert_eq!(report.removed(), 2);
    assert_eq!(report.rows_after, 1);
    Ok(())
}
