//! Regressors and fitted grade models.
//!
//! [`Regressor`] turns a [`TrainingData`] into something implementing
//! [`GradeModel`]. The only estimator shipped is [`ElasticNetRegressor`],
//! backed by `linfa-elasticnet`, which yields a [`LinearGradeModel`]:
//! an intercept plus one coefficient per feature, saved as plain JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use grade_learning::{ElasticNetRegressor, GradeModel, Regressor, TrainerConfig, TrainingData};
//!
//! let config = TrainerConfig::default();
//! let data = TrainingData::from_csv("out/data/train.csv", &config)?;
//! let model = ElasticNetRegressor::new(config).fit(&data)?;
//! model.save("out/model/model.json")?;
//!
//! let predictions = model.predict(&data.features.view())?;
//! ```

use crate::config::TrainerConfig;
use crate::dataset::TrainingData;
use crate::error::{LearningError, Result};
use linfa::Dataset;
use linfa::traits::Fit;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default file name of a saved model inside the model directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Something that can be fit on a feature matrix and a target vector.
pub trait Regressor {
    type Model: GradeModel;

    fn fit(&self, data: &TrainingData) -> Result<Self::Model>;
}

/// A fitted model that maps feature rows to predicted grades.
pub trait GradeModel: Send + Sync {
    /// Number of features every row must have.
    fn n_features(&self) -> usize;

    /// Predict one value per row.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::FeatureMismatch`] when the rows do not have
    /// [`n_features()`](Self::n_features) columns.
    fn predict(&self, features: &ArrayView2<'_, f64>) -> Result<Array1<f64>>;
}

/// Elastic net regression via coordinate descent.
#[derive(Debug, Clone, Default)]
pub struct ElasticNetRegressor {
    config: TrainerConfig,
}

impl ElasticNetRegressor {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}

impl Regressor for ElasticNetRegressor {
    type Model = LinearGradeModel;

    fn fit(&self, data: &TrainingData) -> Result<LinearGradeModel> {
        if data.n_rows() == 0 {
            return Err(LearningError::InvalidData(
                "cannot fit on an empty table".to_string(),
            ));
        }

        let config = &self.config;
        debug!(
            "Fitting elastic net (penalty={}, l1_ratio={}) on {} rows x {} features",
            config.penalty,
            config.l1_ratio,
            data.n_rows(),
            data.n_features()
        );

        let dataset = Dataset::new(data.features.clone(), data.targets.clone());
        let fitted = ElasticNet::params()
            .penalty(config.penalty)
            .l1_ratio(config.l1_ratio)
            .with_intercept(config.with_intercept)
            .tolerance(config.tolerance)
            .max_iterations(config.max_iterations)
            .fit(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;

        let model = LinearGradeModel {
            target_column: config.target_column.clone(),
            feature_names: data.feature_names.clone(),
            coefficients: fitted.hyperplane().to_vec(),
            intercept: fitted.intercept(),
        };

        info!(
            "Fitted {} coefficients ({} non-zero), intercept {:.4}",
            model.coefficients.len(),
            model.n_nonzero(),
            model.intercept
        );
        Ok(model)
    }
}

/// A linear model: `prediction = intercept + coefficients . row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradeModel {
    pub target_column: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

static_assertions::assert_impl_all!(LinearGradeModel: Send, Sync);

impl LinearGradeModel {
    /// Number of coefficients that survived the L1 penalty.
    pub fn n_nonzero(&self) -> usize {
        self.coefficients.iter().filter(|c| **c != 0.0).count()
    }

    /// Coefficient of a named feature.
    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|name| name == feature)
            .map(|i| self.coefficients[i])
    }

    /// Write the model as pretty JSON, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Read a model written by [`save()`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`LearningError::ModelNotFound`] if the file does not exist
    /// - [`LearningError::Json`] if it is not a model file
    /// - [`LearningError::InvalidData`] if the coefficient and feature name
    ///   counts disagree
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LearningError::ModelNotFound {
                path: path.display().to_string(),
            });
        }

        let model: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        if model.coefficients.len() != model.feature_names.len() {
            return Err(LearningError::InvalidData(format!(
                "model has {} coefficients for {} features",
                model.coefficients.len(),
                model.feature_names.len()
            )));
        }
        Ok(model)
    }
}

impl GradeModel for LinearGradeModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if features.ncols() != self.n_features() {
            return Err(LearningError::FeatureMismatch {
                expected: self.n_features(),
                found: features.ncols(),
            });
        }

        let coefficients = Array1::from_vec(self.coefficients.clone());
        Ok(features.dot(&coefficients) + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    fn linear_data() -> TrainingData {
        // target = 10 + 4 * x0 - 2 * x1
        let features = Array2::from_shape_fn((40, 2), |(row, col)| {
            let r = row as f64;
            if col == 0 {
                (r % 10.0) / 10.0
            } else {
                (r % 7.0) / 7.0
            }
        });
        let targets = features
            .rows()
            .into_iter()
            .map(|row| 10.0 + 4.0 * row[0] - 2.0 * row[1])
            .collect();

        TrainingData {
            features,
            targets,
            feature_names: vec!["studytime".into(), "failures".into()],
        }
    }

    fn near_ols() -> TrainerConfig {
        TrainerConfig::builder()
            .penalty(1e-6)
            .tolerance(1e-8)
            .max_iterations(10_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_fit_recovers_linear_relation() {
        let model = ElasticNetRegressor::new(near_ols())
            .fit(&linear_data())
            .unwrap();

        assert_abs_diff_eq!(model.intercept, 10.0, epsilon = 1e-2);
        assert_abs_diff_eq!(model.coefficient("studytime").unwrap(), 4.0, epsilon = 1e-2);
        assert_abs_diff_eq!(model.coefficient("failures").unwrap(), -2.0, epsilon = 1e-2);
        assert_eq!(model.target_column, "G3");
    }

    #[test]
    fn test_predict() {
        let model = LinearGradeModel {
            target_column: "G3".into(),
            feature_names: vec!["a".into(), "b".into()],
            coefficients: vec![2.0, -1.0],
            intercept: 5.0,
        };
        let x = array![[1.0, 0.0], [0.5, 1.0]];
        let predictions = model.predict(&x.view()).unwrap();

        assert_abs_diff_eq!(predictions[0], 7.0);
        assert_abs_diff_eq!(predictions[1], 5.0);
    }

    #[test]
    fn test_predict_width_mismatch() {
        let model = LinearGradeModel {
            target_column: "G3".into(),
            feature_names: vec!["a".into()],
            coefficients: vec![1.0],
            intercept: 0.0,
        };
        let x = array![[1.0, 2.0]];
        let err = model.predict(&x.view()).unwrap_err();
        assert!(matches!(
            err,
            LearningError::FeatureMismatch {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("grade-learning-model-{}", std::process::id()));
        let path = dir.join("nested").join(MODEL_FILE_NAME);
        let model = LinearGradeModel {
            target_column: "G3".into(),
            feature_names: vec!["age".into(), "sex_M".into()],
            coefficients: vec![0.0, 1.25],
            intercept: 11.5,
        };

        model.save(&path).unwrap();
        let loaded = LinearGradeModel::load(&path).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.n_nonzero(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_model() {
        let err = LinearGradeModel::load("/definitely/not/here/model.json").unwrap_err();
        assert!(matches!(err, LearningError::ModelNotFound { .. }));
    }
}
