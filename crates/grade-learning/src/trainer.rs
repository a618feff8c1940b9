//! End-to-end training run: load, fit, score, save.

use crate::config::TrainerConfig;
use crate::dataset::TrainingData;
use crate::error::{LearningError, Result};
use crate::metrics::evaluate;
use crate::model::{ElasticNetRegressor, GradeModel, LinearGradeModel, MODEL_FILE_NAME, Regressor};
use crate::types::TrainingReport;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Fits an [`ElasticNetRegressor`] on the train table and scores it on the
/// optional test table.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on `train_path`, score on `test_path` when given, and save the
    /// model as `model_dir/model.json`.
    pub fn run(
        &self,
        train_path: &Path,
        test_path: Option<&Path>,
        model_dir: &Path,
    ) -> Result<(LinearGradeModel, TrainingReport)> {
        let start = Instant::now();

        let train = TrainingData::from_csv(train_path, &self.config)?;
        info!(
            "Loaded {} training rows with {} features",
            train.n_rows(),
            train.n_features()
        );

        let model = ElasticNetRegressor::new(self.config.clone()).fit(&train)?;
        let train_metrics = evaluate(&model, &train)?;

        let test_metrics = match test_path {
            Some(path) => {
                let test = TrainingData::from_csv(path, &self.config)?;
                check_same_features(&train, &test)?;
                let metrics = evaluate(&model, &test)?;
                if let (Some(train_r2), Some(test_r2)) = (train_metrics.r2, metrics.r2) {
                    if train_r2 - test_r2 > 0.2 {
                        warn!(
                            "Test R2 {:.3} is well below train R2 {:.3}; the model may be overfitting",
                            test_r2, train_r2
                        );
                    }
                }
                Some(metrics)
            }
            None => None,
        };

        let model_path = model_dir.join(MODEL_FILE_NAME);
        model.save(&model_path)?;

        let report = TrainingReport {
            target_column: model.target_column.clone(),
            n_features: model.n_features(),
            train_rows: train.n_rows(),
            intercept: model.intercept,
            train_metrics,
            test_metrics,
            model_path: model_path.display().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        Ok((model, report))
    }
}

/// The test table must carry the training features, in the same order.
fn check_same_features(train: &TrainingData, test: &TrainingData) -> Result<()> {
    if test.n_features() != train.n_features() {
        return Err(LearningError::FeatureMismatch {
            expected: train.n_features(),
            found: test.n_features(),
        });
    }

    match train
        .feature_names
        .iter()
        .zip(&test.feature_names)
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        Some((position, (expected, found))) => Err(LearningError::InvalidData(format!(
            "test column {} is '{}' but the model was trained on '{}'",
            position, found, expected
        ))),
        None => Ok(()),
    }
}
