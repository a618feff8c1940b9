//! Pipeline module.
//!
//! This module provides the batch preprocessing pipeline and related components.

mod builder;
pub mod output;
pub mod progress;

pub use builder::{BatchOutput, Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
