//! Scoring a fitted model against labelled rows.

use crate::dataset::TrainingData;
use crate::error::{LearningError, Result};
use crate::model::GradeModel;
use crate::types::Metrics;
use linfa::prelude::SingleTargetRegression;

/// Predict every row of `data` and compare against its targets.
///
/// Returns R², MSE, RMSE and MAE. R² is `None` when fewer than two rows
/// were scored, since it is undefined for a single sample.
pub fn evaluate<M: GradeModel + ?Sized>(model: &M, data: &TrainingData) -> Result<Metrics> {
    if data.n_rows() == 0 {
        return Err(LearningError::InvalidData(
            "cannot score an empty table".to_string(),
        ));
    }

    let predictions = model.predict(&data.features.view())?;
    let scoring = |e: linfa::Error| LearningError::InferenceError(e.to_string());

    let mse = predictions.mean_squared_error(&data.targets).map_err(scoring)?;
    let mae = predictions.mean_absolute_error(&data.targets).map_err(scoring)?;
    let r2 = if data.n_rows() > 1 {
        Some(predictions.r2(&data.targets).map_err(scoring)?)
    } else {
        None
    };

    Ok(Metrics {
        n_samples: data.n_rows(),
        mse: Some(mse),
        rmse: Some(mse.sqrt()),
        mae: Some(mae),
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearGradeModel;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn identity_model() -> LinearGradeModel {
        LinearGradeModel {
            target_column: "G3".into(),
            feature_names: vec!["x".into()],
            coefficients: vec![1.0],
            intercept: 0.0,
        }
    }

    #[test]
    fn test_perfect_fit() {
        let data = TrainingData {
            features: array![[1.0], [2.0], [3.0]],
            targets: array![1.0, 2.0, 3.0],
            feature_names: vec!["x".into()],
        };
        let metrics = evaluate(&identity_model(), &data).unwrap();

        assert_eq!(metrics.n_samples, 3);
        assert_abs_diff_eq!(metrics.mse.unwrap(), 0.0);
        assert_abs_diff_eq!(metrics.mae.unwrap(), 0.0);
        assert_abs_diff_eq!(metrics.r2.unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_errors() {
        // predictions 1, 2, 3 against targets 2, 2, 5
        let data = TrainingData {
            features: array![[1.0], [2.0], [3.0]],
            targets: array![2.0, 2.0, 5.0],
            feature_names: vec!["x".into()],
        };
        let metrics = evaluate(&identity_model(), &data).unwrap();

        assert_abs_diff_eq!(metrics.mae.unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mse.unwrap(), 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse.unwrap(), (5.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(metrics.r2.unwrap() < 1.0);
    }

    #[test]
    fn test_single_row_has_no_r2() {
        let data = TrainingData {
            features: array![[4.0]],
            targets: array![4.5],
            feature_names: vec!["x".into()],
        };
        let metrics = evaluate(&identity_model(), &data).unwrap();
        assert!(metrics.r2.is_none());
        assert_abs_diff_eq!(metrics.mae.unwrap(), 0.5);
    }

    #[test]
    fn test_width_mismatch_propagates() {
        let data = TrainingData {
            features: array![[1.0, 2.0]],
            targets: array![1.0],
            feature_names: vec!["x".into(), "y".into()],
        };
        assert!(matches!(
            evaluate(&identity_model(), &data),
            Err(LearningError::FeatureMismatch { .. })
        ));
    }
}
