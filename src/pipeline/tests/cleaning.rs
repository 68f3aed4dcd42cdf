use super::{raw_table, row, str_values};
use crate::config::ReportOptions;
use crate::pipeline::cleaner::{clean_table, correct_activity_levels, token_mask};
use crate::schema::{ACTIVITY_LEVEL, ERROR_TOKEN, HEART_RATE, STRESS_LEVEL};
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_drops_missing_and_error_rows() -> Result<()> {
    let mut missing_hr = row("2", "", "97.0", "3000", "6.5", "Active", "2");
    missing_hr[1] = None;

    let df = raw_table(&[
        row("1", "72.5", "98.1", "5000", "7.25", "Active", "4"),
        missing_hr,
        row("3", "88", "99.0", "12000", "8", "Sedentary", ERROR_TOKEN),
        row("4", "64", "95.5", "2000", "5.5", "Actve", "9"),
    ])?;

    let (cleaned, report) = clean_table(df, ReportOptions::default())?;

    assert_eq!(cleaned.height(), 2);
    assert_eq!(report.rows_before, 4);
    assert_eq!(report.rows_after, 2);
    assert_eq!(report.removed(), 2);
    assert_eq!(report.error_rows, 1);
    assert_eq!(report.nulls_before.get(HEART_RATE), Some(1));
    assert_eq!(report.nulls_after.total(), 0);
    assert_eq!(str_values(&cleaned, STRESS_LEVEL)?, vec!["4", "9"]);
    Ok(())
}

#[test]
fn test_error_token_must_match_whole_value() -> Result<()> {
    let df = raw_table(&[
        row("1", "72.5", "98.1", "5000", "7.25", "ERRORS", "4"),
        row("2", "70", "98.1", "5000", "7.25", "error", "4"),
    ])?;

    let (cleaned, report) = clean_table(df, ReportOptions::default())?;
    assert_eq!(cleaned.height(), 2);
    assert_eq!(report.error_rows, 0);
    Ok(())
}

#[test]
fn test_activity_level_corrections() -> Result<()> {
    let df = raw_table(&[
        row("1", "70", "98", "5000", "7", "Actve", "4"),
        row("2", "70", "98", "5000", "7", "Highly Active", "4"),
        row("3", "70", "98", "5000", "7", "Seddentary", "4"),
        row("4", "70", "98", "5000", "7", "Active", "4"),
        row("5", "70", "98", "5000", "7", "Jogging", "4"),
    ])?;

    let (cleaned, report) = clean_table(df, ReportOptions::default())?;

    assert_eq!(
        str_values(&cleaned, ACTIVITY_LEVEL)?,
        vec!["Active", "Highly_Active", "Sedentary", "Active", "Jogging"]
    );
    assert_eq!(
        report.activity_levels,
        vec!["Active", "Highly_Active", "Sedentary", "Jogging"]
    );
    Ok(())
}

#[test]
fn test_cleaning_is_idempotent() -> Result<()> {
    let mut missing = row("2", "70", "97.0", "3000", "6.5", "Active", "2");
    missing[6] = None;
    let df = raw_table(&[
        row("1", "72.5", "98.1", "5000", "7.25", "Seddentary", "4"),
        missing,
        row("3", ERROR_TOKEN, "99.0", "12000", "8", "Highly Active", "6"),
        row("4", "64", "95.5", "2000", "5.5", "Highly Active", "9"),
    ])?;

    let (once, _) = clean_table(df, ReportOptions::default())?;
    let (twice, report) = clean_table(once.clone(), ReportOptions::default())?;

    assert!(once.equals_missing(&twice));
    assert_eq!(report.removed(), 0);
    assert_eq!(report.error_rows, 0);
    Ok(())
}

#[test]
fn test_all_rows_invalid_gives_empty_table() -> Result<()> {
    let df = raw_table(&[
        row("1", ERROR_TOKEN, "98.1", "5000", "7.25", "Active", "4"),
        row("2", "70", ERROR_TOKEN, "5000", "7.25", "Active", "4"),
    ])?;

    let (cleaned, report) = clean_table(df, ReportOptions::default())?;
    assert_eq!(cleaned.height(), 0);
    assert_eq!(cleaned.width(), 7);
    assert_eq!(report.error_rows, 2);
    assert!(report.activity_levels.is_empty());
    Ok(())
}

#[test]
fn test_missing_activity_column_is_rejected() -> Result<()> {
    let df = df!("User ID" => &["1"])?;
    assert!(clean_table(df, ReportOptions::default()).is_err());
    Ok(())
}

#[test]
fn test_token_mask_ignores_non_text_columns() -> Result<()> {
    let df = df!(
        "reading" => &[1.0, 2.0],
        "label" => &["ok", "ERROR"]
    )?;
    let mask = token_mask(&df, ERROR_TOKEN).expect("one text column");
    let flagged = df.lazy().filter(mask).collect()?;
    assert_eq!(flagged.height(), 1);

    let numeric_only = df!("reading" => &[1.0])?;
    assert!(token_mask(&numeric_only, ERROR_TOKEN).is_none());
    Ok(())
}

#[test]
fn test_correction_expression_keeps_nulls() -> Result<()> {
    let df = df!("level" => &[Some("Actve"), None, Some("Sedentary")])?;
    let out = df
        .lazy()
        .select([correct_activity_levels(col("level")).alias("level")])
        .collect()?;
    let values: Vec<Option<&str>> = out
        .column("level")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .collect();
    assert_eq!(values, vec![Some("Active"), None, Some("Sedentary")]);
    Ok(())
}
