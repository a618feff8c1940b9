//! Assembly and writing of the transformed tables.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Build an output table: the index column, the feature block, then the
/// label column.
pub fn assemble_table(index: &Column, features: &DataFrame, label: &Column) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(features.width() + 2);
    columns.push(index.clone());
    columns.extend(features.get_columns().iter().cloned());
    columns.push(label.clone());
    DataFrame::new(columns).context("Failed to assemble output table")
}

/// Write `frame` as comma-separated text with a header row, creating
/// parent directories as needed.
pub fn write_table(frame: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(frame)
        .context(format!("Failed to write {}", path.display()))?;

    info!(
        "Wrote {} ({} rows x {} columns)",
        path.display(),
        frame.height(),
        frame.width()
    );
    Ok(())
}

/// Render `frame` as comma-separated text without a header.
pub fn table_to_csv(frame: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(false)
        .with_separator(b',')
        .finish(frame)
        .context("Failed to encode CSV")?;

    String::from_utf8(buffer)
        .map_err(|e| PreprocessingError::Internal(format!("CSV output is not UTF-8: {}", e)))
}
