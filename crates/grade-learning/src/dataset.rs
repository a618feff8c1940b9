//! Loading preprocessed tables into feature matrices.

use crate::config::{LabelPosition, TrainerConfig};
use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Features and targets of one preprocessed table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    pub features: Array2<f64>,
    pub targets: Array1<f64>,
    /// Column names in feature order. Positional (`feature_0`, ...) for
    /// header-less tables.
    pub feature_names: Vec<String>,
}

impl TrainingData {
    /// Read a comma-separated table written by the preprocessor.
    ///
    /// With [`LabelPosition::Named`] the file has a header and the target is
    /// taken by name; with [`LabelPosition::First`] the file has no header and
    /// the first field of each row is the target.
    pub fn from_csv(path: impl AsRef<Path>, config: &TrainerConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }

        let has_header = config.label_position == LabelPosition::Named;
        let frame = CsvReadOptions::default()
            .with_has_header(has_header)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        debug!(
            "Read {} rows x {} columns from {}",
            frame.height(),
            frame.width(),
            path.display()
        );
        Self::from_frame(&frame, config)
    }

    /// Split an in-memory table into targets and features.
    pub fn from_frame(frame: &DataFrame, config: &TrainerConfig) -> Result<Self> {
        if frame.height() == 0 {
            return Err(LearningError::InvalidData("table has no rows".to_string()));
        }

        let (target, feature_columns): (&Column, Vec<&Column>) = match config.label_position {
            LabelPosition::Named => {
                let target = frame
                    .column(&config.target_column)
                    .map_err(|_| LearningError::TargetNotFound(config.target_column.clone()))?;
                let features = frame
                    .get_columns()
                    .iter()
                    .filter(|c| {
                        c.name().as_str() != config.target_column
                            && c.name().as_str() != config.index_column
                    })
                    .collect();
                (target, features)
            }
            LabelPosition::First => {
                let columns = frame.get_columns();
                (&columns[0], columns[1..].iter().collect())
            }
        };

        if feature_columns.is_empty() {
            return Err(LearningError::InvalidData(
                "table has no feature columns".to_string(),
            ));
        }

        let feature_names = match config.label_position {
            LabelPosition::Named => feature_columns
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            LabelPosition::First => (0..feature_columns.len())
                .map(|i| format!("feature_{i}"))
                .collect(),
        };

        let targets = Array1::from_vec(column_values(target)?);
        let columns = feature_columns
            .iter()
            .map(|c| column_values(c))
            .collect::<Result<Vec<_>>>()?;
        let features =
            Array2::from_shape_fn((frame.height(), columns.len()), |(row, col)| columns[col][row]);

        Ok(Self {
            features,
            targets,
            feature_names,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Read one column as `f64`, rejecting nulls and non-numeric cells.
fn column_values(column: &Column) -> Result<Vec<f64>> {
    let name = column.name().to_string();
    let widened = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|_| LearningError::InvalidData(format!("column '{name}' is not numeric")))?;

    widened
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(LearningError::InvalidData(format!(
                "column '{name}' has a missing value at row {row}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_layout_drops_index() {
        let frame = df![
            "row_index" => [7u32, 3],
            "age" => [0.0, 1.0],
            "school_MS" => [1.0, 0.0],
            "G3" => [12i64, 15],
        ]
        .unwrap();
        let data = TrainingData::from_frame(&frame, &TrainerConfig::default()).unwrap();

        assert_eq!(data.feature_names, vec!["age", "school_MS"]);
        assert_eq!(data.n_rows(), 2);
        assert_eq!(data.features[[1, 0]], 1.0);
        assert_eq!(data.targets.to_vec(), vec![12.0, 15.0]);
    }

    #[test]
    fn test_first_layout() {
        let frame = df![
            "column_1" => [9i64, 11],
            "column_2" => [0.5, 0.25],
            "column_3" => [1.0, 0.0],
        ]
        .unwrap();
        let config = TrainerConfig::builder()
            .label_position(LabelPosition::First)
            .build()
            .unwrap();
        let data = TrainingData::from_frame(&frame, &config).unwrap();

        assert_eq!(data.feature_names, vec!["feature_0", "feature_1"]);
        assert_eq!(data.targets.to_vec(), vec![9.0, 11.0]);
        assert_eq!(data.features[[0, 0]], 0.5);
    }

    #[test]
    fn test_missing_target() {
        let frame = df!["age" => [0.0, 1.0]].unwrap();
        let err = TrainingData::from_frame(&frame, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, LearningError::TargetNotFound(name) if name == "G3"));
    }

    #[test]
    fn test_null_feature_rejected() {
        let frame = df![
            "age" => [Some(0.0), None],
            "G3" => [10i64, 11],
        ]
        .unwrap();
        let err = TrainingData::from_frame(&frame, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(msg) if msg.contains("age")));
    }

    #[test]
    fn test_string_feature_rejected() {
        let frame = df![
            "school" => ["GP", "MS"],
            "G3" => [10i64, 11],
        ]
        .unwrap();
        let err = TrainingData::from_frame(&frame, &TrainerConfig::default()).unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
    }
}
