//! Result and payload types shared by training, scoring and the CLI.

use crate::error::{LearningError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Regression quality on one set of rows.
///
/// Every field is `None` when the set was not scored (for example a run
/// without a test table).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of scored rows.
    pub n_samples: usize,

    /// Mean Squared Error. Lower is better.
    pub mse: Option<f64>,

    /// Root Mean Squared Error, in grade points. Lower is better.
    pub rmse: Option<f64>,

    /// Mean Absolute Error, in grade points. Lower is better.
    pub mae: Option<f64>,

    /// Coefficient of determination. Range: (-inf, 1.0], where 1.0 is perfect.
    pub r2: Option<f64>,
}

/// Summary of one `train` run, printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub target_column: String,
    pub n_features: usize,
    pub train_rows: usize,
    pub intercept: f64,
    pub train_metrics: Metrics,
    pub test_metrics: Option<Metrics>,
    pub model_path: String,
    pub duration_ms: u64,
}

/// One served response row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub features: Vec<f64>,
}

/// The served adapter's JSON payload: `{"instances":[{"features":[..]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instances {
    pub instances: Vec<Instance>,
}

impl Instances {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Collect the rows into a feature matrix of `n_features` columns.
    ///
    /// A row of exactly `n_features` values is taken as-is. A row of
    /// `n_features + 1` values came from a labelled request, so its leading
    /// label is dropped. Any other width fails with
    /// [`LearningError::FeatureMismatch`].
    pub fn to_features(&self, n_features: usize) -> Result<Array2<f64>> {
        let mut values = Vec::with_capacity(self.instances.len() * n_features);

        for instance in &self.instances {
            let row = &instance.features;
            if row.len() == n_features {
                values.extend_from_slice(row);
            } else if row.len() == n_features + 1 {
                values.extend_from_slice(&row[1..]);
            } else {
                return Err(LearningError::FeatureMismatch {
                    expected: n_features,
                    found: row.len(),
                });
            }
        }

        Array2::from_shape_vec((self.instances.len(), n_features), values)
            .map_err(|e| LearningError::InvalidData(e.to_string()))
    }
}
