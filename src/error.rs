//! Error types for the smartwatch-health pipeline.
//!
//! Library code returns [`Result`], whose error side is [`PipelineError`].
//! Conversions from the underlying crates are provided through `From`, so the
//! `?` operator works across Polars, I/O and JSON calls:
//!
//! ```no_run
//! use smartwatch_health::error::{Result, ResultExt as _};
//!
//! fn read_header(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path).context("Failed to read telemetry file")?;
//!     Ok(content.lines().next().unwrap_or_default().to_owned())
//! }
//! ```
//!
//! The binary wraps these errors in `anyhow` at its outer boundary.

use std::fmt;

/// Main error type for pipeline operations.
#[derive(Debug)]
pub enum PipelineError {
    /// I/O errors (opening the CSV, writing charts or logs)
    Io(std::io::Error),

    /// Dataframe errors raised by Polars
    DataProcessing(String),

    /// Configuration file or flag errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// The table does not have the shape or values the pipeline requires
    Schema { column: String, detail: String },

    /// Chart rendering errors
    Render(String),

    /// Generic error with context
    Other(String),
}

impl PipelineError {
    pub fn schema(column: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Schema { column, detail } => write!(f, "Column '{column}': {detail}"),
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Adds a context message to the error side of a result.
///
/// The error keeps its variant, so callers can still match on
/// [`PipelineError::Schema`] or [`PipelineError::InvalidPath`] after context
/// has been attached.
pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], building the message only on error.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&msg.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}

impl PipelineError {
    fn prefixed(self, prefix: &str) -> Self {
        let join = |msg: String| format!("{prefix}: {msg}");
        match self {
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), join(e.to_string()))),
            Self::DataProcessing(msg) => Self::DataProcessing(join(msg)),
            Self::Config(msg) => Self::Config(join(msg)),
            Self::InvalidPath(msg) => Self::InvalidPath(join(msg)),
            Self::Schema { column, detail } => Self::Schema {
                column,
                detail: join(detail),
            },
            Self::Render(msg) => Self::Render(join(msg)),
            Self::Other(msg) => Self::Other(join(msg)),
        }
    }
}
