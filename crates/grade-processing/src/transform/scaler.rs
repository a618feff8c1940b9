use super::{FittedTransformer, Transformer};
use crate::error::{PreprocessingError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Min-max scaler over a fixed list of numeric columns.
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    columns: Vec<String>,
}

impl MinMaxScaler {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Observed range of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// Map `value` to `(value - min) / (max - min)`.
    ///
    /// A constant column scales with a divisor of 1, so every training value
    /// maps to 0. Values outside the fitted range are not clamped.
    pub fn scale(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        let divisor = if range == 0.0 { 1.0 } else { range };
        (value - self.min) / divisor
    }
}

/// Fitted per-column ranges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedMinMaxScaler {
    ranges: Vec<FeatureRange>,
}

impl FittedMinMaxScaler {
    pub fn from_ranges(ranges: Vec<FeatureRange>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[FeatureRange] {
        &self.ranges
    }

    pub fn range(&self, column: &str) -> Option<&FeatureRange> {
        self.ranges.iter().find(|r| r.column == column)
    }
}

impl Transformer for MinMaxScaler {
    type Fitted = FittedMinMaxScaler;

    fn fit(&self, frame: &DataFrame) -> Result<FittedMinMaxScaler> {
        let ranges = self
            .columns
            .iter()
            .map(|column| {
                let values = numeric_values(frame, column)?;
                if values.is_empty() {
                    return Err(PreprocessingError::EmptyDataset(format!(
                        "cannot fit range of '{}' on zero rows",
                        column
                    )));
                }

                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                debug!("Range of '{}': [{}, {}]", column, min, max);

                Ok(FeatureRange {
                    column: column.clone(),
                    min,
                    max,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FittedMinMaxScaler { ranges })
    }
}

impl FittedTransformer for FittedMinMaxScaler {
    fn feature_names(&self) -> Vec<String> {
        self.ranges.iter().map(|r| r.column.clone()).collect()
    }

    fn apply(&self, frame: &DataFrame) -> Result<Vec<Column>> {
        self.ranges
            .iter()
            .map(|range| {
                let scaled: Vec<f64> = numeric_values(frame, &range.column)?
                    .into_iter()
                    .map(|v| range.scale(v))
                    .collect();
                Ok(Column::new(range.column.as_str().into(), scaled))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(column: &Column) -> Vec<f64> {
        column.f64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_fit_records_min_and_max() {
        let frame = df![
            "age" => [15i64, 22, 17],
            "absences" => [0i64, 75, 4],
        ]
        .unwrap();

        let fitted = MinMaxScaler::new(vec!["age".into(), "absences".into()])
            .fit(&frame)
            .unwrap();

        assert_eq!(
            fitted.range("age"),
            Some(&FeatureRange {
                column: "age".into(),
                min: 15.0,
                max: 22.0
            })
        );
        assert_eq!(fitted.range("absences").unwrap().max, 75.0);
        assert_eq!(fitted.feature_names(), vec!["age", "absences"]);
    }

    #[test]
    fn test_scaling_of_unseen_value() {
        let train = df!["age" => [15i64, 22]].unwrap();
        let fitted = MinMaxScaler::new(vec!["age".into()]).fit(&train).unwrap();

        let incoming = df!["age" => [18i64]].unwrap();
        let out = fitted.apply(&incoming).unwrap();
        let scaled = values(&out[0])[0];
        assert!((scaled - 3.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_training_values_land_in_unit_interval() {
        let train = df!["goout" => [1i64, 5, 3, 2, 4]].unwrap();
        let fitted = MinMaxScaler::new(vec!["goout".into()]).fit(&train).unwrap();

        let scaled = values(&fitted.apply(&train).unwrap()[0]);
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(scaled[0], 0.0);
        assert_eq!(scaled[1], 1.0);
    }

    #[test]
    fn test_out_of_range_values_are_not_clamped() {
        let train = df!["failures" => [0i64, 2]].unwrap();
        let fitted = MinMaxScaler::new(vec!["failures".into()])
            .fit(&train)
            .unwrap();

        let incoming = df!["failures" => [3i64]].unwrap();
        assert_eq!(values(&fitted.apply(&incoming).unwrap()[0]), vec![1.5]);
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let train = df!["Dalc" => [1i64, 1, 1]].unwrap();
        let fitted = MinMaxScaler::new(vec!["Dalc".into()]).fit(&train).unwrap();

        assert_eq!(values(&fitted.apply(&train).unwrap()[0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fit_rejects_missing_values() {
        let train = df!["age" => [Some(15i64), None]].unwrap();
        let err = MinMaxScaler::new(vec!["age".into()]).fit(&train).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_VALUE");
    }

    #[test]
    fn test_fit_rejects_unknown_column() {
        let train = df!["age" => [15i64]].unwrap();
        let err = MinMaxScaler::new(vec!["Medu".into()]).fit(&train).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
