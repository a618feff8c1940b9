//! Student Performance Preprocessing Library
//!
//! Turns the raw math and Portuguese course survey tables into model-ready
//! numeric features, and serves the same fitted transform per request.
//!
//! # Overview
//!
//! - **Ingestion**: semicolon-delimited sources concatenated into one table
//! - **Splitting**: seeded train/test partitioning with `ceil` test sizing
//! - **Transformation**: min-max scaling of numeric columns and one-hot
//!   encoding of nominal columns, fit on the training partition only
//! - **Persistence**: the fitted transformer saved as a JSON artifact
//! - **Serving**: a per-request adapter that parses CSV rows, transforms
//!   them and encodes the result as JSON or CSV
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use grade_processing::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .output_dir("out/data")
//!     .model_dir("out/model")
//!     .seed(42)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&["data/".into()])?;
//!
//! println!("{} features", result.n_features());
//! ```
//!
//! # Serving
//!
//! ```rust,ignore
//! use grade_processing::InferenceHandler;
//!
//! let handler = InferenceHandler::load("out/model/transformer.json")?;
//! let response = handler.handle(body, "text/csv", "application/json")?;
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod schema;
pub mod serve;
pub mod split;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use artifact::{ARTIFACT_FILE_NAME, ARTIFACT_FORMAT_VERSION, TransformerArtifact};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use ingest::{LoadedData, load_sources};
pub use pipeline::{
    BatchOutput, ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use schema::{INDEX_COLUMN, LABEL_COLUMN, RawSchema};
pub use serve::{EncodedResponse, Encoding, InferenceHandler, InferenceRequest, Instances};
pub use split::{SplitIndices, train_test_indices};
pub use transform::{
    ColumnTransformer, FittedColumnTransformer, FittedTransformer, Transformer,
};
pub use types::{PipelineResult, SourceSummary};
