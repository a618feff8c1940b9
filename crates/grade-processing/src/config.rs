//! Configuration types for the preprocessing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::schema::{DEFAULT_NOMINAL_COLUMNS, DEFAULT_NUMERIC_COLUMNS, LABEL_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use grade_processing::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .test_fraction(0.2)
///     .seed(7)
///     .output_dir("out")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field separator of the raw input files.
    /// Default: ';'
    pub separator: char,

    /// Name of the label column.
    /// Default: "G3"
    pub target_column: String,

    /// Columns that are min-max scaled, in output order.
    /// Default: age, Medu, traveltime, studytime, failures, goout, Dalc, absences
    pub numeric_columns: Vec<String>,

    /// Columns that are one-hot expanded, in output order.
    /// Default: address, Fjob, guardian, higher, internet, romantic
    pub nominal_columns: Vec<String>,

    /// Fraction of rows held out for the test partition (exclusive 0.0 - 1.0).
    /// Default: 0.1
    pub test_fraction: f64,

    /// Seed of the shuffling random generator.
    /// Default: 42
    pub seed: u64,

    /// Whether rows are shuffled before partitioning.
    /// When false, the last rows form the test partition.
    /// Default: true
    pub shuffle: bool,

    /// Directory receiving the transformed train and test tables.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Directory receiving the fitted transformer artifact.
    /// Default: "model"
    pub model_dir: PathBuf,

    /// File name of the transformed training table.
    /// Default: "train.csv"
    pub train_file_name: String,

    /// File name of the transformed test table.
    /// Default: "test.csv"
    pub test_file_name: String,

    /// File name of the fitted transformer artifact.
    /// Default: "transformer.json"
    pub artifact_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            separator: ';',
            target_column: LABEL_COLUMN.to_string(),
            numeric_columns: DEFAULT_NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            nominal_columns: DEFAULT_NOMINAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            test_fraction: 0.1,
            seed: 42,
            shuffle: true,
            output_dir: PathBuf::from("output"),
            model_dir: PathBuf::from("model"),
            train_file_name: "train.csv".to_string(),
            test_file_name: "test.csv".to_string(),
            artifact_name: "transformer.json".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a configuration from a JSON file.
    ///
    /// Missing fields take their default values. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::PreprocessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Separator as the single byte expected by the CSV reader.
    pub fn separator_byte(&self) -> u8 {
        self.separator as u8
    }

    /// Path of the transformed training table.
    pub fn train_path(&self) -> PathBuf {
        self.output_dir.join(&self.train_file_name)
    }

    /// Path of the transformed test table.
    pub fn test_path(&self) -> PathBuf {
        self.output_dir.join(&self.test_file_name)
    }

    /// Path of the fitted transformer artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.model_dir.join(&self.artifact_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.separator.is_ascii() {
            return Err(ConfigValidationError::InvalidSeparator(self.separator));
        }

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidTestFraction(
                self.test_fraction,
            ));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("target_column".to_string()));
        }

        if self.numeric_columns.is_empty() && self.nominal_columns.is_empty() {
            return Err(ConfigValidationError::EmptySelection);
        }

        let mut seen = HashSet::new();
        for column in self.numeric_columns.iter().chain(&self.nominal_columns) {
            if column == &self.target_column {
                return Err(ConfigValidationError::TargetSelected(column.clone()));
            }
            if !seen.insert(column.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn(column.clone()));
            }
        }

        for (field, value) in [
            ("train_file_name", &self.train_file_name),
            ("test_file_name", &self.test_file_name),
            ("artifact_name", &self.artifact_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyField(field.to_string()));
            }
        }

        if self.output_dir.join(&self.train_file_name) == self.output_dir.join(&self.test_file_name)
        {
            return Err(ConfigValidationError::SameOutputFile(
                self.train_file_name.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid test fraction: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestFraction(f64),

    #[error("Invalid separator {0:?} (must be a single ASCII character)")]
    InvalidSeparator(char),

    #[error("Field '{0}' must not be empty")]
    EmptyField(String),

    #[error("At least one numeric or nominal column must be selected")]
    EmptySelection,

    #[error("Column '{0}' is selected more than once")]
    DuplicateColumn(String),

    #[error("Target column '{0}' cannot also be a feature")]
    TargetSelected(String),

    #[error("Train and test tables would both be written to '{0}'")]
    SameOutputFile(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    separator: Option<char>,
    target_column: Option<String>,
    numeric_columns: Option<Vec<String>>,
    nominal_columns: Option<Vec<String>>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    shuffle: Option<bool>,
    output_dir: Option<PathBuf>,
    model_dir: Option<PathBuf>,
    train_file_name: Option<String>,
    test_file_name: Option<String>,
    artifact_name: Option<String>,
}

impl PipelineConfigBuilder {
    /// Set the field separator of the raw input files.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Set the label column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the min-max scaled columns.
    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the one-hot expanded columns.
    pub fn nominal_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nominal_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the fraction of rows held out for testing.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.1 = 10%)
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }

    /// Set the seed of the shuffling random generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable shuffling before partitioning.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = Some(shuffle);
        self
    }

    /// Set the output directory for the transformed tables.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the directory for the fitted transformer artifact.
    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(path.into());
        self
    }

    /// Set the file name of the transformed training table.
    pub fn train_file_name(mut self, name: impl Into<String>) -> Self {
        self.train_file_name = Some(name.into());
        self
    }

    /// Set the file name of the transformed test table.
    pub fn test_file_name(mut self, name: impl Into<String>) -> Self {
        self.test_file_name = Some(name.into());
        self
    }

    /// Set the file name of the fitted transformer artifact.
    pub fn artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            separator: self.separator.unwrap_or(defaults.separator),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            numeric_columns: self.numeric_columns.unwrap_or(defaults.numeric_columns),
            nominal_columns: self.nominal_columns.unwrap_or(defaults.nominal_columns),
            test_fraction: self.test_fraction.unwrap_or(defaults.test_fraction),
            seed: self.seed.unwrap_or(defaults.seed),
            shuffle: self.shuffle.unwrap_or(defaults.shuffle),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            model_dir: self.model_dir.unwrap_or(defaults.model_dir),
            train_file_name: self.train_file_name.unwrap_or(defaults.train_file_name),
            test_file_name: self.test_file_name.unwrap_or(defaults.test_file_name),
            artifact_name: self.artifact_name.unwrap_or(defaults.artifact_name),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.separator, ';');
        assert_eq!(config.target_column, "G3");
        assert_eq!(config.numeric_columns.len(), 8);
        assert_eq!(config.nominal_columns.len(), 6);
        assert_eq!(config.test_fraction, 0.1);
        assert!(config.shuffle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .test_fraction(0.25)
            .seed(7)
            .shuffle(false)
            .numeric_columns(["age", "absences"])
            .nominal_columns(["higher"])
            .output_dir("out")
            .build()
            .unwrap();

        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.seed, 7);
        assert!(!config.shuffle);
        assert_eq!(config.numeric_columns, vec!["age", "absences"]);
        assert_eq!(config.train_path(), PathBuf::from("out/train.csv"));
        assert_eq!(config.artifact_path(), PathBuf::from("model/transformer.json"));
    }

    #[test]
    fn test_validation_invalid_fraction() {
        for fraction in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let result = PipelineConfig::builder().test_fraction(fraction).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidTestFraction(_)
            ));
        }
    }

    #[test]
    fn test_validation_rejects_overlapping_selection() {
        let result = PipelineConfig::builder()
            .numeric_columns(["age"])
            .nominal_columns(["age"])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn(c) if c == "age"
        ));
    }

    #[test]
    fn test_validation_rejects_target_as_feature() {
        let result = PipelineConfig::builder().numeric_columns(["G3"]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::TargetSelected(_)
        ));
    }

    #[test]
    fn test_validation_rejects_same_output_file() {
        let result = PipelineConfig::builder()
            .train_file_name("all.csv")
            .test_file_name("all.csv")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::SameOutputFile(_)
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "test_fraction": 0.2,
            "seed": 11,
            "nominal_columns": ["higher", "internet"]
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).expect("partial config");

        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 11);
        assert_eq!(config.nominal_columns, vec!["higher", "internet"]);
        assert_eq!(config.separator, ';');
        assert_eq!(config.numeric_columns.len(), 8);
    }
}
