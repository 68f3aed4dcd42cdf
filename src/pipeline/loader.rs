use crate::error::{PipelineError, Result, ResultExt as _};
use crate::schema::{self, MISSING_TOKENS};
use polars::prelude::*;
use std::path::Path;

/// Reads the telemetry CSV with every column as raw text.
///
/// Typing is left to the coercer so that the cleaner sees tokens like
/// `ERROR` exactly as they appear in the file. Fails if the file is missing,
/// is not valid CSV, or lacks one of the required columns.
///
/// # Errors
///
/// [`PipelineError::InvalidPath`] for a missing file, [`PipelineError::Schema`]
/// for a missing column, and a data processing error for malformed CSV.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::InvalidPath(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    let null_values = NullValues::AllColumns(MISSING_TOKENS.iter().map(|t| (*t).into()).collect());

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_null_values(Some(null_values))
        .finish()
        .with_context(|| format!("Failed to scan CSV {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read CSV {}", path.display()))?;

    check_columns(&df)?;

    tracing::info!(
        "Loaded {} rows, {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Fails with the first required column absent from `df`.
///
/// # Errors
///
/// [`PipelineError::Schema`] naming the absent column.
pub fn check_columns(df: &DataFrame) -> Result<()> {
    let schema = df.schema();
    for name in schema::column_names() {
        if !schema.contains(name) {
            return Err(PipelineError::schema(name, "required column is missing"));
        }
    }
    Ok(())
}
