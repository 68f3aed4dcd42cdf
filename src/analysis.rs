//! Descriptive statistics over the cleaned table.
//!
//! Everything here only reads the table. Statistics over an empty table come
//! back as `None` (or an empty group list) rather than an error.

use crate::error::{Result, ResultExt as _};
use crate::schema::{
    ACTIVITY_LEVEL, BLOOD_OXYGEN, HEART_RATE, SLEEP_DURATION, STEP_COUNT, STRESS_LEVEL,
};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Headline metrics for the whole table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimpleStats {
    pub mean_heart_rate: Option<f64>,
    pub mean_step_count: Option<f64>,
    pub mean_blood_oxygen: Option<f64>,
    /// Most frequent sleep duration after rounding to 2 decimals
    pub sleep_mode: Option<f64>,
    pub median_stress: Option<f64>,
}

impl fmt::Display for SimpleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average Metrics:")?;
        match self.mean_heart_rate {
            Some(v) => writeln!(f, "Heart Rate: {v:.1} BPM")?,
            None => writeln!(f, "Heart Rate: n/a")?,
        }
        match self.mean_step_count {
            Some(v) => writeln!(f, "Step Count: {} steps", thousands(v))?,
            None => writeln!(f, "Step Count: n/a")?,
        }
        match self.mean_blood_oxygen {
            Some(v) => writeln!(f, "Blood Oxygen: {v:.1}%")?,
            None => writeln!(f, "Blood Oxygen: n/a")?,
        }
        match self.sleep_mode {
            Some(v) => writeln!(f, "Most common sleep duration (rounded): {v:.2} hours")?,
            None => writeln!(f, "Most common sleep duration (rounded): n/a")?,
        }
        match self.median_stress {
            Some(v) => write!(f, "Typical stress level: {v} (median)"),
            None => write!(f, "Typical stress level: n/a"),
        }
    }
}

/// One group of a grouped average.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
}

/// Mean of `value_column` per distinct value of `key_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeans {
    pub title: String,
    pub key_column: String,
    pub value_column: String,
    pub groups: Vec<GroupMean>,
}

impl fmt::Display for GroupedMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.title)?;
        let width = self
            .groups
            .iter()
            .map(|g| g.group.len())
            .chain(std::iter::once(self.key_column.len()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:<width$}  {}", self.key_column, self.value_column)?;
        for g in &self.groups {
            writeln!(f, "{:<width$}  {:.6}", g.group, g.mean)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// Ascending by group key
    ByKey,
    /// Largest mean first
    ByMeanDescending,
}

/// The three grouped views of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedStats {
    pub sleep_by_stress: GroupedMeans,
    pub steps_by_activity: GroupedMeans,
    pub heart_rate_by_stress: GroupedMeans,
}

impl fmt::Display for AdvancedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.sleep_by_stress)?;
        writeln!(f, "{}", self.steps_by_activity)?;
        write!(f, "{}", self.heart_rate_by_stress)
    }
}

/// Headline means, rounded sleep mode and median stress.
///
/// # Errors
///
/// Returns error if one of the metric columns is missing or not numeric.
pub fn analyze_simple(df: &DataFrame) -> Result<SimpleStats> {
    Ok(SimpleStats {
        mean_heart_rate: float_values(df, HEART_RATE)?.mean(),
        mean_step_count: float_values(df, STEP_COUNT)?.mean(),
        mean_blood_oxygen: float_values(df, BLOOD_OXYGEN)?.mean(),
        sleep_mode: rounded_mode(&float_values(df, SLEEP_DURATION)?, 2),
        median_stress: float_values(df, STRESS_LEVEL)?.median(),
    })
}

/// # Errors
///
/// Returns error if a grouped column is missing or cannot be aggregated.
pub fn analyze_advanced(df: &DataFrame) -> Result<AdvancedStats> {
    Ok(AdvancedStats {
        sleep_by_stress: grouped_mean(
            df,
            "Average Sleep Duration by Stress Level",
            STRESS_LEVEL,
            SLEEP_DURATION,
            GroupOrder::ByKey,
        )?,
        steps_by_activity: grouped_mean(
            df,
            "Average Steps by Activity Level",
            ACTIVITY_LEVEL,
            STEP_COUNT,
            GroupOrder::ByMeanDescending,
        )?,
        heart_rate_by_stress: grouped_mean(
            df,
            "Average Heart Rate by Stress Level",
            STRESS_LEVEL,
            HEART_RATE,
            GroupOrder::ByKey,
        )?,
    })
}

/// Mean of `value` per `key`. Rows with a null key are left out.
///
/// # Errors
///
/// Returns error if either column is missing or the aggregation fails.
pub fn grouped_mean(
    df: &DataFrame,
    title: &str,
    key: &str,
    value: &str,
    order: GroupOrder,
) -> Result<GroupedMeans> {
    const MEAN: &str = "mean";

    let grouped = df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([col(value).cast(DataType::Float64).mean().alias(MEAN)]);
    let sorted = match order {
        GroupOrder::ByKey => grouped.sort_by_exprs([col(key)], SortMultipleOptions::default()),
        GroupOrder::ByMeanDescending => grouped.sort_by_exprs(
            [col(MEAN)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        ),
    };
    let out = sorted
        .collect()
        .with_context(|| format!("Failed to group '{value}' by '{key}'"))?;

    let keys = out.column(key)?.as_materialized_series().clone();
    let means = out.column(MEAN)?.as_materialized_series().f64()?.clone();

    let mut groups = Vec::with_capacity(out.height());
    for (idx, mean) in means.into_iter().enumerate() {
        let Some(mean) = mean else { continue };
        groups.push(GroupMean {
            group: key_label(keys.get(idx)?),
            mean,
        });
    }

    Ok(GroupedMeans {
        title: title.to_owned(),
        key_column: key.to_owned(),
        value_column: value.to_owned(),
        groups,
    })
}

/// Most frequent value after rounding half-to-even to `decimals` places.
/// Ties go to the smallest value.
pub fn rounded_mode(values: &Float64Chunked, decimals: i32) -> Option<f64> {
    let scale = 10f64.powi(decimals);
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for v in values.into_iter().flatten().filter(|v| v.is_finite()) {
        *counts.entry((v * scale).round_ties_even() as i64).or_default() += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (&bucket, &count) in &counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((bucket, count));
        }
    }
    best.map(|(bucket, _)| bucket as f64 / scale)
}

fn float_values(df: &DataFrame, column: &str) -> Result<Float64Chunked> {
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{column}' is not numeric"))?;
    Ok(series.f64()?.clone())
}

fn key_label(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::String(s) => s.to_owned(),
        AnyValue::Float64(v) => format_number(v),
        AnyValue::Float32(v) => format_number(f64::from(v)),
        other => other.to_string(),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

/// Rounds to a whole number and groups the digits with commas.
fn thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}
