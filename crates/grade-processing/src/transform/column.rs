use super::{FittedMinMaxScaler, FittedOneHotEncoder, FittedTransformer, MinMaxScaler, OneHotEncoder, Transformer};
use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::thread;
use tracing::info;

/// Routes numeric columns through a [`MinMaxScaler`] and nominal columns
/// through a [`OneHotEncoder`]. Columns in neither list are dropped.
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    scaler: MinMaxScaler,
    encoder: OneHotEncoder,
}

impl ColumnTransformer {
    pub fn new(numeric_columns: Vec<String>, nominal_columns: Vec<String>) -> Self {
        Self {
            scaler: MinMaxScaler::new(numeric_columns),
            encoder: OneHotEncoder::new(nominal_columns),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.numeric_columns.clone(), config.nominal_columns.clone())
    }
}

impl Transformer for ColumnTransformer {
    type Fitted = FittedColumnTransformer;

    /// Fit both sub-transformers on `frame`.
    ///
    /// The two fits read disjoint columns, so they run on scoped threads.
    fn fit(&self, frame: &DataFrame) -> Result<FittedColumnTransformer> {
        let (numeric, nominal) = thread::scope(|scope| {
            let numeric = scope.spawn(|| self.scaler.fit(frame));
            let nominal = scope.spawn(|| self.encoder.fit(frame));
            (numeric.join(), nominal.join())
        });

        let numeric = numeric
            .map_err(|_| PreprocessingError::Internal("numeric fit thread panicked".to_string()))??;
        let nominal = nominal
            .map_err(|_| PreprocessingError::Internal("nominal fit thread panicked".to_string()))??;

        let fitted = FittedColumnTransformer { numeric, nominal };
        info!(
            "Fitted transformer on {} rows: {} numeric + {} indicator features",
            frame.height(),
            fitted.numeric.n_features_out(),
            fitted.nominal.n_features_out()
        );
        Ok(fitted)
    }
}

/// Fitted scaler and encoder. Immutable after fit; share it freely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    pub numeric: FittedMinMaxScaler,
    pub nominal: FittedOneHotEncoder,
}

impl FittedColumnTransformer {
    /// Transform `frame` into its feature matrix: scaled numeric columns in
    /// configured order, then indicator columns grouped by source column.
    pub fn transform(&self, frame: &DataFrame) -> Result<DataFrame> {
        let columns = self.apply(frame)?;
        DataFrame::new(columns).context("Failed to assemble feature matrix")
    }

    /// Raw columns the transformer reads.
    pub fn input_columns(&self) -> Vec<String> {
        self.numeric
            .ranges()
            .iter()
            .map(|r| r.column.clone())
            .chain(self.nominal.encodings().iter().map(|e| e.column.clone()))
            .collect()
    }
}

impl FittedTransformer for FittedColumnTransformer {
    fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric.feature_names();
        names.extend(self.nominal.feature_names());
        names
    }

    fn apply(&self, frame: &DataFrame) -> Result<Vec<Column>> {
        let mut columns = self.numeric.apply(frame)?;
        columns.extend(self.nominal.apply(frame)?);
        Ok(columns)
    }
}
