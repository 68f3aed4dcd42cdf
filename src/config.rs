use crate::error::{PipelineError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_FILE: &str = "unclean_smartwatch_health_data.csv";
pub const DEFAULT_PLOT_DIR: &str = "plots";

/// Settings for one pipeline run.
///
/// Every field has a default, so an empty JSON object is a valid config file
/// and running without one reproduces the default behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV file to read
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory the charts are written to
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,

    /// Print intermediate tables, not just the final one
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_true")]
    pub render_plots: bool,

    /// Drop rows whose numeric values failed to parse during coercion
    #[serde(default = "default_true")]
    pub drop_unparseable: bool,

    /// Directory for rotating log files. Console only when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_FILE)
}

fn default_plot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PLOT_DIR)
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            plot_dir: default_plot_dir(),
            debug: false,
            render_plots: true,
            drop_unparseable: true,
            log_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidPath`] if the file does not exist, otherwise
    /// an I/O or [`PipelineError::Config`] error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::InvalidPath(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse a config from a JSON string
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] for malformed JSON or unknown value types.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// [`PipelineError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions { debug: self.debug }
    }
}

/// Options handed to the reporting routines at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() -> Result<()> {
        let config = PipelineConfig::from_json("{}")?;
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT_FILE));
        assert!(config.render_plots);
        assert!(config.drop_unparseable);
        assert!(!config.report_options().debug);
        Ok(())
    }

    #[test]
    fn test_partial_json_overrides_fields() -> Result<()> {
        let config = PipelineConfig::from_json(
            r#"{ "input": "week1.csv", "debug": true, "render_plots": false }"#,
        )?;
        assert_eq!(config.input, PathBuf::from("week1.csv"));
        assert!(config.debug);
        assert!(!config.render_plots);
        assert_eq!(config.plot_dir, PathBuf::from(DEFAULT_PLOT_DIR));
        Ok(())
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = PipelineConfig::from_json("{ input: }").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PipelineConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPath(_)));
    }

    #[test]
    fn test_config_round_trips_through_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pipeline.json");
        let config = PipelineConfig {
            debug: true,
            log_dir: Some(PathBuf::from("logs")),
            ..Default::default()
        };
        std::fs::write(&path, config.to_json()?)?;
        assert_eq!(PipelineConfig::from_file(&path)?, config);
        Ok(())
    }
}
