//! Custom error types for the grade preprocessing pipeline.
//!
//! This module provides a single error hierarchy using `thiserror`
//! shared by the batch pipeline and the served inference adapter.
//!
//! Errors are serializable as `{code, message}` so a hosting layer can
//! hand them to a client unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the preprocessing pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PreprocessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No input files were found at the given location.
    #[error(
        "There are no files in {0}. This usually indicates that the input location was \
         incorrectly specified or is not readable"
    )]
    NoInputFiles(String),

    /// Two input sources do not share the same columns.
    #[error("Source '{source_name}' does not match the schema of the first source: {reason}")]
    SchemaMismatch { source_name: String, reason: String },

    /// The dataset has no rows to work with.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// The requested train/test split cannot produce two non-empty partitions.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// A selected column contains a missing value.
    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    /// A numeric column holds a value that cannot be read as a number.
    #[error("Column '{column}' is not numeric: {reason}")]
    NotNumeric { column: String, reason: String },

    /// A nominal value was not observed when the transformer was fit.
    #[error("Found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    /// An inference row has a column count matching neither schema.
    #[error(
        "Invalid number of columns: expected {expected} (unlabelled) or {} (labelled), found {found}",
        .expected + 1
    )]
    InvalidRowWidth { expected: usize, found: usize },

    /// A later inference row does not have the field count of the first row.
    #[error("Record {record} has {found} fields, but the first record has {expected}")]
    RaggedRows {
        record: usize,
        expected: usize,
        found: usize,
    },

    /// The request body could not be parsed.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The request content type is not accepted by the adapter.
    #[error("{0} not supported by this handler")]
    UnsupportedContentType(String),

    /// The requested response encoding is not supported.
    #[error("{0} accept type is not supported by this handler")]
    UnsupportedAccept(String),

    /// The persisted transformer could not be understood.
    #[error("Invalid transformer artifact: {0}")]
    ArtifactFormat(String),

    /// Internal error (e.g., thread join failure).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that dispatch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoInputFiles(_) => "NO_INPUT_FILES",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::InvalidSplit(_) => "INVALID_SPLIT",
            Self::MissingValue { .. } => "MISSING_VALUE",
            Self::NotNumeric { .. } => "NOT_NUMERIC",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::InvalidRowWidth { .. } | Self::RaggedRows { .. } => "INVALID_ROW_WIDTH",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::UnsupportedContentType(_) => "UNSUPPORTED_CONTENT_TYPE",
            Self::UnsupportedAccept(_) => "UNSUPPORTED_ACCEPT",
            Self::ArtifactFormat(_) => "ARTIFACT_FORMAT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the caller's input rather than by
    /// the handler itself.
    ///
    /// A served request failing with one of these must be reported to the
    /// client and never retried: the transform is deterministic, so a retry
    /// reproduces the same failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::SchemaMismatch { .. }
            | Self::MissingValue { .. }
            | Self::NotNumeric { .. }
            | Self::UnknownCategory { .. }
            | Self::InvalidRowWidth { .. }
            | Self::RaggedRows { .. }
            | Self::MalformedRequest(_)
            | Self::UnsupportedContentType(_)
            | Self::UnsupportedAccept(_) => true,
            Self::WithContext { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

/// Serialize implementation for handing errors to a client.
///
/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Io(e).with_context(context))
    }
}
