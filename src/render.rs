//! Static charts of the cleaned table, written as SVG files.
//!
//! - `activity_stress_bar.svg`: mean stress level per activity level, log y axis
//! - `heart_rate_histogram.svg`: heart rate distribution
//! - `sleep_steps_scatter.svg`: sleep duration against step count

use crate::analysis::{GroupOrder, grouped_mean};
use crate::error::{PipelineError, Result, ResultExt as _};
use crate::schema::{ACTIVITY_LEVEL, HEART_RATE, SLEEP_DURATION, STEP_COUNT, STRESS_LEVEL};
use plotters::prelude::*;
use polars::prelude::{ChunkQuantile as _, DataFrame, DataType, NamedFrom as _, QuantileMethod};
use std::path::{Path, PathBuf};

pub const BAR_CHART_FILE: &str = "activity_stress_bar.svg";
pub const HISTOGRAM_FILE: &str = "heart_rate_histogram.svg";
pub const SCATTER_FILE: &str = "sleep_steps_scatter.svg";

const CHART_SIZE: (u32, u32) = (1024, 768);

/// Writes all three charts into `dir`, creating it if needed.
///
/// Returns the paths written. An empty table produces no files, and a chart
/// with nothing plottable is skipped with a warning.
///
/// # Errors
///
/// Returns error if the directory cannot be created, a plotted column is
/// missing, or the SVG backend fails to write a file.
pub fn render_all(df: &DataFrame, dir: &Path) -> Result<Vec<PathBuf>> {
    if df.height() == 0 {
        tracing::warn!("Table is empty, skipping charts");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create plot directory {}", dir.display()))?;

    let paths: Vec<PathBuf> = [
        render_activity_stress_bar(df, &dir.join(BAR_CHART_FILE))?,
        render_heart_rate_histogram(df, &dir.join(HISTOGRAM_FILE))?,
        render_sleep_steps_scatter(df, &dir.join(SCATTER_FILE))?,
    ]
    .into_iter()
    .flatten()
    .collect();
    for path in &paths {
        tracing::info!("Chart written to {}", path.display());
    }
    Ok(paths)
}

/// Mean stress per activity level on a log axis. Groups with a non-positive
/// mean cannot be drawn; `Ok(None)` when no group is left.
///
/// # Errors
///
/// Returns error if a column is missing or the chart cannot be written.
pub fn render_activity_stress_bar(df: &DataFrame, path: &Path) -> Result<Option<PathBuf>> {
    let grouped = grouped_mean(
        df,
        "Mean Stress Level by Activity Level",
        ACTIVITY_LEVEL,
        STRESS_LEVEL,
        GroupOrder::ByKey,
    )?;
    let bars: Vec<(String, f64)> = grouped
        .groups
        .into_iter()
        .filter(|g| g.mean > 0.0)
        .map(|g| (g.group, g.mean))
        .collect();
    if bars.is_empty() {
        tracing::warn!(
            "No positive stress means to draw on a log axis, skipping {}",
            path.display()
        );
        return Ok(None);
    }

    let (lo, hi) = bars
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, m)| (lo.min(*m), hi.max(*m)));
    let y_range = (lo / 2.0)..(hi * 2.0);
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Stress Level by Activity Level", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..bars.len()).into_segmented(), y_range.log_scale())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(ACTIVITY_LEVEL)
        .y_desc(STRESS_LEVEL)
        .x_label_formatter(&label_for)
        .draw()
        .map_err(render_err)?;

    let base = lo / 2.0;
    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, mean))| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), base), (SegmentValue::Exact(i + 1), *mean)],
                BLUE.mix(0.6).filled(),
            );
            bar.set_margin(0, 0, 15, 15);
            bar
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(Some(path.to_path_buf()))
}

/// # Errors
///
/// Returns error if the column is missing or the chart cannot be written.
pub fn render_heart_rate_histogram(df: &DataFrame, path: &Path) -> Result<Option<PathBuf>> {
    let values = float_column(df, HEART_RATE)?;
    let (bin_width, bins) = histogram_bins(&values);
    let Some(&(first_edge, _)) = bins.first() else {
        tracing::warn!("No heart rate values to bin, skipping {}", path.display());
        return Ok(None);
    };
    let x_max = first_edge + bin_width * bins.len() as f64;
    let y_max = bins.iter().map(|(_, n)| *n).max().unwrap_or(0) + 1;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Heart Rate Distribution", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first_edge..x_max, 0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(HEART_RATE)
        .y_desc("Count")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(bins.iter().map(|&(start, count)| {
            Rectangle::new(
                [(start, 0), (start + bin_width, count)],
                BLUE.mix(0.5).filled(),
            )
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(Some(path.to_path_buf()))
}

/// # Errors
///
/// Returns error if a column is missing or the chart cannot be written.
pub fn render_sleep_steps_scatter(df: &DataFrame, path: &Path) -> Result<Option<PathBuf>> {
    let sleep = float_column(df, SLEEP_DURATION)?;
    let steps = float_column(df, STEP_COUNT)?;
    let points: Vec<(f64, f64)> = sleep
        .into_iter()
        .zip(steps)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if points.is_empty() {
        tracing::warn!("No complete sleep and step pairs, skipping {}", path.display());
        return Ok(None);
    }

    let x_range = padded_range(points.iter().map(|(x, _)| *x));
    let y_range = padded_range(points.iter().map(|(_, y)| *y));

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Sleep Duration vs Step Count", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(SLEEP_DURATION)
        .y_desc(STEP_COUNT)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.7).filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(Some(path.to_path_buf()))
}

/// Equal-width bins as `(left edge, count)` plus the bin width.
///
/// Width follows the Freedman-Diaconis rule (falling back to a square-root
/// rule when the IQR is zero), clamped to 5..=50 bins. A single distinct
/// value gets one unit-wide bin.
pub fn histogram_bins(values: &[f64]) -> (f64, Vec<(f64, usize)>) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return (0.0, Vec::new());
    };

    if (max - min).abs() < f64::EPSILON {
        return (1.0, vec![(min - 0.5, finite.len())]);
    }

    let n = finite.len() as f64;
    let iqr = match (quantile(&finite, 0.25), quantile(&finite, 0.75)) {
        (Some(q1), Some(q3)) => q3 - q1,
        _ => 0.0,
    };
    let h = if iqr > 0.0 {
        2.0 * iqr / n.cbrt()
    } else {
        (max - min) / n.sqrt()
    };

    let num_bins = (((max - min) / h).ceil() as usize).clamp(5, 50);
    let bin_width = (max - min) / num_bins as f64;

    let mut counts = vec![0usize; num_bins];
    for v in &finite {
        let idx = (((v - min) / bin_width).floor() as usize).min(num_bins - 1);
        if let Some(slot) = counts.get_mut(idx) {
            *slot += 1;
        }
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min + i as f64 * bin_width, count))
        .collect();
    (bin_width, bins)
}

fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let series = polars::prelude::Series::new("q".into(), values);
    series
        .f64()
        .ok()?
        .quantile(q, QuantileMethod::Linear)
        .ok()
        .flatten()
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn float_column(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = df
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn render_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn cleaned_table() -> PolarsResult<DataFrame> {
        df!(
            HEART_RATE => &[58.0, 64.0, 72.0, 72.5, 80.0, 95.0, 120.0],
            STEP_COUNT => &[500.0, 2500.0, 4000.0, 5200.0, 8000.0, 12000.0, 15000.0],
            SLEEP_DURATION => &[9.0, 8.0, 7.5, 7.0, 6.5, 6.0, 5.0],
            STRESS_LEVEL => &[1.0, 2.0, 4.0, 4.0, 6.0, 8.0, 10.0],
            ACTIVITY_LEVEL => &["Sedentary", "Sedentary", "Active", "Active", "Active", "Highly_Active", "Highly_Active"]
        )
    }

    #[test]
    fn test_render_all_writes_three_svgs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = render_all(&cleaned_table()?, dir.path())?;

        assert_eq!(paths.len(), 3);
        for (path, name) in paths.iter().zip([BAR_CHART_FILE, HISTOGRAM_FILE, SCATTER_FILE]) {
            assert!(path.ends_with(name));
            let content = std::fs::read_to_string(path)?;
            assert!(content.contains("<svg"), "{name} is not an SVG");
        }
        Ok(())
    }

    #[test]
    fn test_empty_table_renders_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let empty = cleaned_table()?.head(Some(0));
        let paths = render_all(&empty, &dir.path().join("plots"))?;
        assert!(paths.is_empty());
        assert!(!dir.path().join("plots").exists());
        Ok(())
    }

    #[test]
    fn test_all_zero_stress_skips_only_the_bar_chart() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let table = df!(
            HEART_RATE => &[70.0, 80.0],
            STEP_COUNT => &[4000.0, 6000.0],
            SLEEP_DURATION => &[7.0, 8.0],
            STRESS_LEVEL => &[0.0, 0.0],
            ACTIVITY_LEVEL => &["Active", "Sedentary"]
        )?;

        let paths = render_all(&table, dir.path())?;

        assert_eq!(
            paths,
            vec![dir.path().join(HISTOGRAM_FILE), dir.path().join(SCATTER_FILE)]
        );
        assert!(!dir.path().join(BAR_CHART_FILE).exists());
        Ok(())
    }

    #[test]
    fn test_all_null_column_skips_its_charts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let table = df!(
            HEART_RATE => &[None::<f64>, None],
            STEP_COUNT => &[4000.0, 6000.0],
            SLEEP_DURATION => &[None::<f64>, None],
            STRESS_LEVEL => &[2.0, 3.0],
            ACTIVITY_LEVEL => &["Active", "Sedentary"]
        )?;

        let paths = render_all(&table, dir.path())?;

        assert_eq!(paths, vec![dir.path().join(BAR_CHART_FILE)]);
        Ok(())
    }

    #[test]
    fn test_histogram_bins_cover_every_value() {
        let values = [58.0, 64.0, 72.0, 72.5, 80.0, 95.0, 120.0, f64::NAN];
        let (width, bins) = histogram_bins(&values);

        assert!(width > 0.0);
        assert!((5..=50).contains(&bins.len()));
        assert_eq!(bins.iter().map(|(_, n)| n).sum::<usize>(), 7);
        assert_eq!(bins.first().map(|(edge, _)| *edge), Some(58.0));
    }

    #[test]
    fn test_histogram_single_value() {
        let (width, bins) = histogram_bins(&[70.0, 70.0, 70.0]);
        assert_eq!(width, 1.0);
        assert_eq!(bins, vec![(69.5, 3)]);
    }

    #[test]
    fn test_histogram_of_nothing() {
        let (width, bins) = histogram_bins(&[]);
        assert_eq!(width, 0.0);
        assert!(bins.is_empty());
    }
}
