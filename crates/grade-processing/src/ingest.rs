//! Ingestion of the raw survey tables.
//!
//! Sources are read with the Polars CSV reader and concatenated in the order
//! they were given. Every source must share the column layout of the first
//! one; the first source's rows come first, then the second's, and so on.

use crate::error::{PreprocessingError, Result, ResultExt};
use crate::schema::INDEX_COLUMN;
use crate::types::SourceSummary;
use crate::utils::is_numeric_dtype;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw rows of every source, concatenated.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// All rows, with a leading [`INDEX_COLUMN`] holding each row's position
    /// in the concatenated collection.
    pub frame: DataFrame,
    /// Per-source row counts, in concatenation order.
    pub sources: Vec<SourceSummary>,
}

/// Expand the given inputs into the list of files to read.
///
/// A directory contributes every regular file directly inside it, sorted by
/// path so that the concatenation order is stable across runs.
pub fn resolve_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)
                .context(format!("Failed to list {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file())
                .collect();
            entries.sort();
            debug!("{} contains {} files", input.display(), entries.len());
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }

    if files.is_empty() {
        let location = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(PreprocessingError::NoInputFiles(if location.is_empty() {
            "<no input given>".to_string()
        } else {
            location
        }));
    }

    Ok(files)
}

/// Read one delimited file with a header row.
pub fn read_source(path: &Path, separator: u8) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PreprocessingError::NoInputFiles(path.display().to_string()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to read {}", path.display()))
}

/// Resolve, read and concatenate every input source.
pub fn load_sources(inputs: &[PathBuf], separator: u8) -> Result<LoadedData> {
    let files = resolve_sources(inputs)?;
    let mut frames = Vec::with_capacity(files.len());

    for path in files {
        let frame = read_source(&path, separator)?;
        info!(
            "Loaded {} ({} rows x {} columns)",
            path.display(),
            frame.height(),
            frame.width()
        );
        frames.push((path, frame));
    }

    concat_sources(frames)
}

/// Concatenate already-read sources in order.
///
/// Fails with [`PreprocessingError::SchemaMismatch`] when a source's column
/// names differ from the first source's.
pub fn concat_sources(frames: Vec<(PathBuf, DataFrame)>) -> Result<LoadedData> {
    let mut iter = frames.into_iter();
    let Some((first_path, first)) = iter.next() else {
        return Err(PreprocessingError::NoInputFiles("<no input given>".to_string()));
    };

    let expected: Vec<String> = column_names(&first);
    let mut sources = vec![SourceSummary::new(&first_path, first.height())];
    let mut combined = first;

    for (path, frame) in iter {
        let found = column_names(&frame);
        if found != expected {
            return Err(PreprocessingError::SchemaMismatch {
                source_name: path.display().to_string(),
                reason: describe_mismatch(&expected, &found),
            });
        }

        let frame = align_dtypes(&mut combined, frame, &path)?;
        sources.push(SourceSummary::new(&path, frame.height()));
        combined
            .vstack_mut(&frame)
            .context(format!("Failed to append {}", path.display()))?;
    }

    if combined.height() == 0 {
        return Err(PreprocessingError::EmptyDataset(
            "the input sources contain no rows".to_string(),
        ));
    }

    combined.align_chunks();
    let frame = combined
        .with_row_index(INDEX_COLUMN.into(), None)
        .context("Failed to add row index")?;

    info!(
        "Concatenated {} sources into {} rows",
        sources.len(),
        frame.height()
    );

    Ok(LoadedData { frame, sources })
}

/// Split the designated target column off the remaining columns.
///
/// Returns `(features, target)`, both keeping every row in order.
pub fn separate_target(frame: &DataFrame, target: &str) -> Result<(DataFrame, DataFrame)> {
    if frame.column(target).is_err() {
        return Err(PreprocessingError::ColumnNotFound(target.to_string()));
    }

    let target_frame = frame.select([target])?;
    let features = frame.drop(target)?;
    Ok((features, target_frame))
}

fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn describe_mismatch(expected: &[String], found: &[String]) -> String {
    let missing: Vec<&String> = expected.iter().filter(|c| !found.contains(c)).collect();
    let extra: Vec<&String> = found.iter().filter(|c| !expected.contains(c)).collect();

    if missing.is_empty() && extra.is_empty() {
        "columns are in a different order".to_string()
    } else {
        format!(
            "expected {} columns, found {} (missing: {:?}, unexpected: {:?})",
            expected.len(),
            found.len(),
            missing,
            extra
        )
    }
}

/// Reconcile column types that inference resolved differently per source,
/// e.g. a column that is integral in one file and fractional in another.
fn align_dtypes(combined: &mut DataFrame, mut frame: DataFrame, path: &Path) -> Result<DataFrame> {
    let names = column_names(combined);

    for name in &names {
        let left = combined.column(name)?.dtype().clone();
        let right = frame.column(name)?.dtype().clone();
        if left == right {
            continue;
        }

        let unified = if is_numeric_dtype(&left) && is_numeric_dtype(&right) {
            DataType::Float64
        } else if matches!(left, DataType::String) || matches!(right, DataType::String) {
            DataType::String
        } else {
            return Err(PreprocessingError::SchemaMismatch {
                source_name: path.display().to_string(),
                reason: format!("column '{}' is {} here but {} before", name, right, left),
            });
        };

        debug!("Unifying column '{}' ({} vs {}) as {}", name, left, right, unified);
        let cast_left = combined.column(name)?.cast(&unified)?;
        combined.replace(name, cast_left.take_materialized_series())?;
        let cast_right = frame.column(name)?.cast(&unified)?;
        frame.replace(name, cast_right.take_materialized_series())?;
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(rows: &[(i64, &str, i64)]) -> DataFrame {
        df![
            "age" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            "higher" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            "G3" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        ]
        .unwrap()
    }

    #[test]
    fn test_concat_keeps_source_order() {
        let math = source(&[(15, "yes", 10), (16, "no", 12)]);
        let portuguese = source(&[(17, "yes", 14)]);

        let loaded = concat_sources(vec![
            (PathBuf::from("math.csv"), math),
            (PathBuf::from("por.csv"), portuguese),
        ])
        .unwrap();

        assert_eq!(loaded.frame.height(), 3);
        assert_eq!(loaded.sources[0].rows, 2);
        assert_eq!(loaded.sources[1].rows, 1);

        let ages: Vec<i64> = loaded
            .frame
            .column("age")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(ages, vec![15, 16, 17]);

        let first = loaded.frame.get_column_names()[0].to_string();
        assert_eq!(first, INDEX_COLUMN);
    }

    #[test]
    fn test_concat_rejects_mismatched_columns() {
        let math = source(&[(15, "yes", 10)]);
        let other = df![
            "age" => [16i64],
            "romantic" => ["no"],
            "G3" => [11i64],
        ]
        .unwrap();

        let result = concat_sources(vec![
            (PathBuf::from("math.csv"), math),
            (PathBuf::from("other.csv"), other),
        ]);

        let err = result.unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
        assert!(err.to_string().contains("other.csv"));
    }

    #[test]
    fn test_concat_unifies_numeric_types() {
        let math = source(&[(15, "yes", 10)]);
        let fractional = df![
            "age" => [16.0f64],
            "higher" => ["no"],
            "G3" => [11i64],
        ]
        .unwrap();

        let loaded = concat_sources(vec![
            (PathBuf::from("math.csv"), math),
            (PathBuf::from("frac.csv"), fractional),
        ])
        .unwrap();

        assert_eq!(loaded.frame.column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(loaded.frame.height(), 2);
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let err = concat_sources(Vec::new()).unwrap_err();
        assert_eq!(err.error_code(), "NO_INPUT_FILES");

        let err = resolve_sources(&[]).unwrap_err();
        assert_eq!(err.error_code(), "NO_INPUT_FILES");
    }

    #[test]
    fn test_empty_directory_has_no_files() {
        let dir = std::env::temp_dir().join(format!("grade-ingest-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let err = resolve_sources(std::slice::from_ref(&dir)).unwrap_err();
        assert!(matches!(err, PreprocessingError::NoInputFiles(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_separate_target() {
        let frame = source(&[(15, "yes", 10), (16, "no", 12)]);
        let (features, target) = separate_target(&frame, "G3").unwrap();

        assert_eq!(features.width(), 2);
        assert!(features.column("G3").is_err());
        assert_eq!(target.width(), 1);
        assert_eq!(target.height(), 2);
    }

    #[test]
    fn test_separate_target_missing() {
        let frame = source(&[(15, "yes", 10)]);
        let err = separate_target(&frame, "final_grade").unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(c) if c == "final_grade"));
    }
}
