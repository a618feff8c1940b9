//! Error types for the grade-learning crate.
//!
//! All public API functions return [`Result<T>`], an alias over
//! [`LearningError`].

use thiserror::Error;

/// The main error type for grade-learning operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the trainer.
    ///
    /// The message names the offending field and the accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data provided for training or evaluation.
    ///
    /// Common causes:
    /// - A feature or target cell is null or not numeric
    /// - The table has no rows or no feature columns
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The configured target column was not found in the table.
    ///
    /// Column names are case-sensitive.
    #[error("Target column '{0}' not found")]
    TargetNotFound(String),

    /// The estimator failed to converge or rejected the training data.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// The specified model file was not found.
    #[error("Model not found: {path}")]
    ModelNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An error occurred during prediction or scoring.
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// Rows handed to a model do not have the width it was trained on.
    #[error("Expected {expected} features per row, found {found}")]
    FeatureMismatch { expected: usize, found: usize },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by Polars while reading a table.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Malformed model or instance JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for grade-learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
