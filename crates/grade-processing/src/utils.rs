//! Shared helpers for pulling typed values out of Polars frames.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Try to parse a string field as a number.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Column Extraction
// =============================================================================

fn lookup<'a>(frame: &'a DataFrame, column: &str) -> Result<&'a Column> {
    frame
        .column(column)
        .map_err(|_| PreprocessingError::ColumnNotFound(column.to_string()))
}

/// Read a column as `f64` values.
///
/// Integer and float columns are widened; string columns (as produced by
/// header-less served requests) are parsed field by field. A null, empty or
/// NaN field fails with [`PreprocessingError::MissingValue`].
pub fn numeric_values(frame: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = lookup(frame, column)?.as_materialized_series();
    let missing = |row: usize| PreprocessingError::MissingValue {
        column: column.to_string(),
        row,
    };

    match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Err(missing(row)),
                Some(raw) if raw.trim().is_empty() => Err(missing(row)),
                Some(raw) => {
                    parse_numeric_string(raw).ok_or_else(|| PreprocessingError::NotNumeric {
                        column: column.to_string(),
                        reason: format!("'{}' at row {} is not a number", raw, row),
                    })
                }
            })
            .collect(),
        dtype if is_numeric_dtype(dtype) => {
            let widened = series.cast(&DataType::Float64)?;
            widened
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| match value {
                    Some(v) if !v.is_nan() => Ok(v),
                    _ => Err(missing(row)),
                })
                .collect()
        }
        DataType::Null if series.is_empty() => Ok(Vec::new()),
        DataType::Null => Err(missing(0)),
        other => Err(PreprocessingError::NotNumeric {
            column: column.to_string(),
            reason: format!("values have type {}", other),
        }),
    }
}

/// Read a column as category labels.
///
/// Non-string columns are rendered with their display form, so an integer
/// coded category `2` becomes the label `"2"`.
pub fn string_values(frame: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = lookup(frame, column)?.as_materialized_series();
    let labels = if matches!(series.dtype(), DataType::String) {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };

    labels
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| PreprocessingError::MissingValue {
                    column: column.to_string(),
                    row,
                })
        })
        .collect()
}

/// Collect an all-numeric frame into row-major vectors.
pub fn frame_rows(frame: &DataFrame) -> Result<Vec<Vec<f64>>> {
    let columns = frame
        .get_column_names()
        .iter()
        .map(|name| numeric_values(frame, name.as_str()))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..frame.height())
        .map(|row| columns.iter().map(|values| values[row]).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" 1.5 "), Some(1.5));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("teacher"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
    }

    #[test]
    fn test_numeric_values_widens_integers() {
        let frame = df!["age" => [15i64, 18, 22]].unwrap();
        assert_eq!(numeric_values(&frame, "age").unwrap(), vec![15.0, 18.0, 22.0]);
    }

    #[test]
    fn test_numeric_values_parses_strings() {
        let frame = df!["age" => ["15", "18"]].unwrap();
        assert_eq!(numeric_values(&frame, "age").unwrap(), vec![15.0, 18.0]);

        let frame = df!["age" => ["15", "old"]].unwrap();
        let err = numeric_values(&frame, "age").unwrap_err();
        assert_eq!(err.error_code(), "NOT_NUMERIC");
    }

    #[test]
    fn test_numeric_values_rejects_nulls() {
        let frame = df!["absences" => [Some(1i64), None, Some(4)]].unwrap();
        let err = numeric_values(&frame, "absences").unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::MissingValue { ref column, row: 1 } if column == "absences"
        ));
    }

    #[test]
    fn test_string_values_renders_codes() {
        let frame = df!["Medu" => [1i64, 4]].unwrap();
        assert_eq!(string_values(&frame, "Medu").unwrap(), vec!["1", "4"]);
    }

    #[test]
    fn test_unknown_column() {
        let frame = df!["age" => [15i64]].unwrap();
        let err = string_values(&frame, "sex").unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_frame_rows() {
        let frame = df![
            "a" => [0.0f64, 1.0],
            "b" => [0.5f64, 0.25],
        ]
        .unwrap();
        assert_eq!(
            frame_rows(&frame).unwrap(),
            vec![vec![0.0, 0.5], vec![1.0, 0.25]]
        );
    }
}
