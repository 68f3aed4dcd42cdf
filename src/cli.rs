use anyhow::{Context as _, Result};
use clap::Parser;
use smartwatch_health::analysis::{analyze_advanced, analyze_simple};
use smartwatch_health::config::PipelineConfig;
use smartwatch_health::pipeline::{PipelineOutcome, print_table, run_pipeline};
use smartwatch_health::render::render_all;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "smartwatch-health",
    about = "Clean, validate and summarise smartwatch health telemetry"
)]
pub struct Cli {
    /// JSON config file. Flags given here override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV file to read. Defaults to unclean_smartwatch_health_data.csv
    #[arg(short, long, env = "SMARTWATCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory the charts are written to
    #[arg(long, env = "SMARTWATCH_PLOT_DIR")]
    pub plot_dir: Option<PathBuf>,

    /// Print intermediate tables
    #[arg(long, env = "SMARTWATCH_DEBUG")]
    pub debug: bool,

    /// Skip chart rendering
    #[arg(long)]
    pub no_plots: bool,

    /// Keep rows whose numbers failed to parse (their values stay null)
    #[arg(long)]
    pub keep_unparseable: bool,

    /// Also write rotating log files to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then flags and environment.
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be read or parsed.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input.clone_from(input);
        }
        if let Some(dir) = &self.plot_dir {
            config.plot_dir.clone_from(dir);
        }
        if self.debug {
            config.debug = true;
        }
        if self.no_plots {
            config.render_plots = false;
        }
        if self.keep_unparseable {
            config.drop_unparseable = false;
        }
        if self.log_dir.is_some() {
            config.log_dir.clone_from(&self.log_dir);
        }
        Ok(config)
    }
}

/// Runs the pipeline, prints the statistics and renders the charts.
///
/// # Errors
///
/// Returns error if the pipeline fails or a chart cannot be written.
pub fn run(config: &PipelineConfig) -> Result<()> {
    tracing::info!("Reading {}", config.input.display());
    let outcome = run_pipeline(config)
        .with_context(|| format!("Pipeline failed for {}", config.input.display()))?;

    print_outcome(&outcome);
    print_table(&outcome.table, config.report_options(), true);

    let simple = analyze_simple(&outcome.table).context("Failed to compute summary statistics")?;
    let advanced =
        analyze_advanced(&outcome.table).context("Failed to compute grouped statistics")?;
    print_stats(&simple, &advanced);

    if config.render_plots {
        render_all(&outcome.table, &config.plot_dir).context("Failed to render charts")?;
    }

    tracing::info!("{}", outcome.summary());
    Ok(())
}

#[expect(clippy::print_stdout)]
fn print_outcome(outcome: &PipelineOutcome) {
    let cleaning = &outcome.cleaning;
    println!("Null Values Before Cleaning:\n{}", cleaning.nulls_before);
    println!("Null Values After Cleaning:\n{}", cleaning.nulls_after);
    println!("Rows with 'ERROR': {}", cleaning.error_rows);
    println!(
        "Rows after removing missing and 'ERROR' rows: {} -> {}",
        cleaning.rows_before, cleaning.rows_after
    );
    println!(
        "Unique activity levels after cleaning: {}",
        cleaning.activity_levels.join(", ")
    );
    for stage in outcome.stages() {
        println!("{stage}");
    }
    println!();
}

#[expect(clippy::print_stdout)]
fn print_stats(
    simple: &smartwatch_health::analysis::SimpleStats,
    advanced: &smartwatch_health::analysis::AdvancedStats,
) {
    println!("\n{simple}\n");
    println!("{advanced}");
}
