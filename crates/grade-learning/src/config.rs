//! Configuration for the grade regressor.
//!
//! # Example
//!
//! ```
//! use grade_learning::{LabelPosition, TrainerConfig};
//!
//! let config = TrainerConfig::builder()
//!     .target_column("G3")
//!     .penalty(0.05)
//!     .l1_ratio(0.9)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.label_position, LabelPosition::Named);
//! ```

use crate::error::LearningError;
use serde::{Deserialize, Serialize};

/// Where the label lives in a preprocessed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    /// The table has a header and the label is the column named
    /// [`TrainerConfig::target_column`]. This is the batch output layout.
    #[default]
    Named,
    /// The table has no header and the label is the first field of every
    /// row. This is the served adapter's CSV layout for labelled requests.
    First,
}

/// Configuration for fitting and scoring the grade regressor.
///
/// Use [`TrainerConfig::builder()`] to construct one; [`build()`](TrainerConfigBuilder::build)
/// checks the hyperparameter ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Name of the label column (default: `G3`).
    pub target_column: String,

    /// Name of the row identity column, dropped before fitting (default: `row_index`).
    pub index_column: String,

    /// Layout of the input tables (default: [`LabelPosition::Named`]).
    pub label_position: LabelPosition,

    /// Overall regularization strength (default: 0.1). Must not be negative.
    pub penalty: f64,

    /// Share of the L1 term in the penalty (default: 0.5). Must be in `[0, 1]`.
    pub l1_ratio: f64,

    /// Coordinate descent iteration cap (default: 1000). Must be at least 1.
    pub max_iterations: u32,

    /// Convergence tolerance (default: 1e-4). Must be positive.
    pub tolerance: f64,

    /// Whether to fit an intercept (default: true).
    pub with_intercept: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            target_column: "G3".to_string(),
            index_column: "row_index".to_string(),
            label_position: LabelPosition::Named,
            penalty: 0.1,
            l1_ratio: 0.5,
            max_iterations: 1000,
            tolerance: 1e-4,
            with_intercept: true,
        }
    }
}

impl TrainerConfig {
    #[must_use]
    pub fn builder() -> TrainerConfigBuilder {
        TrainerConfigBuilder::default()
    }

    /// Check every hyperparameter range.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] naming the first field out of range.
    pub fn validate(&self) -> Result<(), LearningError> {
        if self.target_column.trim().is_empty() {
            return Err(LearningError::InvalidConfig(
                "target_column must not be empty".to_string(),
            ));
        }

        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(LearningError::InvalidConfig(
                "penalty must be a non-negative number".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(LearningError::InvalidConfig(
                "l1_ratio must be between 0.0 and 1.0 (inclusive)".to_string(),
            ));
        }

        if self.max_iterations == 0 {
            return Err(LearningError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(LearningError::InvalidConfig(
                "tolerance must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    /// Set the label column name.
    #[must_use]
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.config.target_column = column.into();
        self
    }

    /// Set the row identity column name.
    #[must_use]
    pub fn index_column(mut self, column: impl Into<String>) -> Self {
        self.config.index_column = column.into();
        self
    }

    #[must_use]
    pub fn label_position(mut self, position: LabelPosition) -> Self {
        self.config.label_position = position;
        self
    }

    /// Set the regularization strength (default: 0.1).
    #[must_use]
    pub fn penalty(mut self, penalty: f64) -> Self {
        self.config.penalty = penalty;
        self
    }

    /// Set the L1 share of the penalty (default: 0.5).
    ///
    /// `0.0` is ridge, `1.0` is lasso.
    #[must_use]
    pub fn l1_ratio(mut self, ratio: f64) -> Self {
        self.config.l1_ratio = ratio;
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, iterations: u32) -> Self {
        self.config.max_iterations = iterations;
        self
    }

    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.config.with_intercept = with_intercept;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if:
    /// - `target_column` is empty
    /// - `penalty` is negative or not finite
    /// - `l1_ratio` is outside `[0.0, 1.0]`
    /// - `max_iterations` is 0
    /// - `tolerance` is not positive
    pub fn build(self) -> Result<TrainerConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.target_column, "G3");
        assert_eq!(config.index_column, "row_index");
        assert_eq!(config.label_position, LabelPosition::Named);
        assert_eq!(config.penalty, 0.1);
        assert_eq!(config.max_iterations, 1000);
        assert!(config.with_intercept);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrainerConfig::builder()
            .target_column("grade")
            .label_position(LabelPosition::First)
            .l1_ratio(1.0)
            .with_intercept(false)
            .build()
            .unwrap();

        assert_eq!(config.target_column, "grade");
        assert_eq!(config.label_position, LabelPosition::First);
        assert_eq!(config.l1_ratio, 1.0);
        assert!(!config.with_intercept);
    }

    #[test]
    fn test_invalid_l1_ratio() {
        let err = TrainerConfig::builder().l1_ratio(1.5).build().unwrap_err();
        assert!(matches!(err, LearningError::InvalidConfig(msg) if msg.contains("l1_ratio")));
    }

    #[test]
    fn test_invalid_penalty_and_tolerance() {
        assert!(TrainerConfig::builder().penalty(-0.1).build().is_err());
        assert!(TrainerConfig::builder().tolerance(0.0).build().is_err());
        assert!(TrainerConfig::builder().max_iterations(0).build().is_err());
        assert!(TrainerConfig::builder().target_column(" ").build().is_err());
    }

    #[test]
    fn test_label_position_serde() {
        let json = serde_json::to_string(&LabelPosition::First).unwrap();
        assert_eq!(json, "\"first\"");
    }
}
