//! Progress reporting for the batch pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use grade_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&inputs)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the batch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading and concatenating the input sources
    Loading,
    /// Partitioning rows into train and test
    Splitting,
    /// Fitting the scaler and encoder on the training partition
    Fitting,
    /// Applying the fitted transformer to both partitions
    Transforming,
    /// Saving the fitted transformer
    Persisting,
    /// Writing the output tables
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Sources",
            Self::Splitting => "Splitting Rows",
            Self::Fitting => "Fitting Transformer",
            Self::Transforming => "Transforming Partitions",
            Self::Persisting => "Saving Transformer",
            Self::Writing => "Writing Outputs",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the share of the overall run this stage accounts for.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Splitting => 0.05,
            Self::Fitting => 0.25,
            Self::Transforming => 0.25,
            Self::Persisting => 0.05,
            Self::Writing => 0.25,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Splitting => 0.15,
            Self::Fitting => 0.20,
            Self::Transforming => 0.45,
            Self::Persisting => 0.70,
            Self::Writing => 0.75,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receiver of progress updates.
///
/// Implementations must be `Send + Sync` so a pipeline running on a worker
/// thread can report to a listener owned elsewhere.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Fitting, 0.5, "Fitting");
        assert_eq!(update.stage, PipelineStage::Fitting);
        assert!((update.progress - 0.325).abs() < 1e-6);
        assert_eq!(update.stage_progress, 0.5);
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done");
        assert_eq!(update.stage, PipelineStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let stages = [
            PipelineStage::Loading,
            PipelineStage::Splitting,
            PipelineStage::Fitting,
            PipelineStage::Transforming,
            PipelineStage::Persisting,
            PipelineStage::Writing,
        ];

        let total_weight: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");

        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&PipelineStage::Transforming).unwrap();
        assert_eq!(json, "\"transforming\"");
        let json = serde_json::to_string(&PipelineStage::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }

    #[test]
    fn test_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                PipelineStage::Loading,
                0.5,
                "Test from background thread",
            ));
        });

        handle.join().expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
