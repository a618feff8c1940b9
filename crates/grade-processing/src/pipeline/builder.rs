//! Batch pipeline orchestration.
//!
//! A run loads the sources, partitions the rows, fits the column transformer
//! on the training rows only, transforms both partitions and finally writes
//! the two tables and the artifact. Every output is computed before the
//! first file is written, so a failing run leaves no partial output behind.

use crate::artifact::TransformerArtifact;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::ingest::{self, LoadedData};
use crate::pipeline::output::{assemble_table, write_table};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::schema::{INDEX_COLUMN, RawSchema};
use crate::split::{partition, train_test_indices};
use crate::transform::{ColumnTransformer, FittedTransformer, Transformer};
use crate::types::{PipelineResult, SourceSummary};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The batch preprocessing pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use grade_processing::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .output_dir("out/data")
///     .model_dir("out/model")
///     .build()?;
///
/// let result = Pipeline::builder()
///     .config(config)
///     .build()?
///     .run(&["data/student-mat.csv".into(), "data/student-por.csv".into()])?;
///
/// println!("{} train rows, {} test rows", result.train_rows, result.test_rows);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

/// Everything a run produces, held in memory until written.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub train: DataFrame,
    pub test: DataFrame,
    pub artifact: TransformerArtifact,
    pub sources: Vec<SourceSummary>,
}

impl BatchOutput {
    pub fn total_rows(&self) -> usize {
        self.train.height() + self.test.height()
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline on the given files or directories.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<PipelineResult> {
        match self.run_internal(inputs) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Compute the transformed tables and the artifact without touching the
    /// filesystem.
    pub fn process(&self, loaded: LoadedData) -> Result<BatchOutput> {
        let config = &self.config;
        let target = config.target_column.as_str();

        let (features, labels) = ingest::separate_target(&loaded.frame, target)?;
        let schema = raw_schema(&features, target);

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            0.0,
            "Partitioning rows...",
        ));
        let indices = train_test_indices(
            features.height(),
            config.test_fraction,
            config.shuffle,
            config.seed,
        )?;
        let feature_parts = partition(&features, &indices)?;
        let label_parts = partition(&labels, &indices)?;
        info!(
            "Split {} rows into {} train and {} test",
            features.height(),
            indices.train.len(),
            indices.test.len()
        );

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Fitting,
            0.0,
            format!("Fitting transformer on {} rows...", indices.train.len()),
        ));
        let fitted = ColumnTransformer::from_config(config)
            .fit(&feature_parts.train)
            .context("While fitting on the training partition")?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Transforming,
            0.0,
            format!("Transforming into {} features...", fitted.n_features_out()),
        ));
        let train_matrix = fitted
            .transform(&feature_parts.train)
            .context("While transforming the training partition")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Transforming,
            0.5,
            "Training partition transformed",
        ));
        let test_matrix = fitted
            .transform(&feature_parts.test)
            .context("While transforming the test partition")?;

        let train = assemble_table(
            feature_parts.train.column(INDEX_COLUMN)?,
            &train_matrix,
            label_parts.train.column(target)?,
        )?;
        let test = assemble_table(
            feature_parts.test.column(INDEX_COLUMN)?,
            &test_matrix,
            label_parts.test.column(target)?,
        )?;

        Ok(BatchOutput {
            train,
            test,
            artifact: TransformerArtifact::new(schema, fitted),
            sources: loaded.sources,
        })
    }

    /// Write a computed run to the configured locations.
    pub fn write(&self, output: &mut BatchOutput) -> Result<()> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Persisting,
            0.0,
            "Saving transformer...",
        ));
        output.artifact.save(self.config.artifact_path())?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            0.0,
            "Writing training table...",
        ));
        write_table(&mut output.train, &self.config.train_path())?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            0.5,
            "Writing test table...",
        ));
        write_table(&mut output.test, &self.config.test_path())?;
        Ok(())
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, inputs: &[PathBuf]) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting preprocessing pipeline...");

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            "Loading input sources...",
        ));
        let loaded = ingest::load_sources(inputs, self.config.separator_byte())?;

        let mut output = self.process(loaded)?;
        self.write(&mut output)?;

        let result = PipelineResult {
            success: true,
            total_rows: output.total_rows(),
            train_rows: output.train.height(),
            test_rows: output.test.height(),
            feature_names: output.artifact.transformer.feature_names(),
            sources: output.sources,
            train_path: self.config.train_path().display().to_string(),
            test_path: self.config.test_path().display().to_string(),
            artifact_path: self.config.artifact_path().display().to_string(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Pipeline finished in {} ms: {} train / {} test rows, {} features",
            result.duration_ms,
            result.train_rows,
            result.test_rows,
            result.n_features()
        );
        Ok(result)
    }
}

/// Raw layout of the input: every column except the index and the label.
fn raw_schema(features: &DataFrame, target: &str) -> RawSchema {
    let columns = features
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| name != INDEX_COLUMN)
        .collect();
    RawSchema::new(columns, target)
}

/// Builder for creating a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| println!("{:?}: {}", update.stage, update.message))
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::concat_sources;
    use crate::pipeline::progress::PipelineStage;
    use std::sync::Mutex;

    fn loaded(rows: usize) -> LoadedData {
        let ages: Vec<i64> = (0..rows).map(|i| 15 + (i % 8) as i64).collect();
        let higher: Vec<&str> = (0..rows).map(|i| if i % 2 == 0 { "yes" } else { "no" }).collect();
        let grades: Vec<i64> = (0..rows).map(|i| (i % 20) as i64).collect();
        let frame = df![
            "age" => ages,
            "higher" => higher,
            "G3" => grades,
        ]
        .unwrap();
        concat_sources(vec![(PathBuf::from("mem.csv"), frame)]).unwrap()
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig::builder()
            .numeric_columns(["age"])
            .nominal_columns(["higher"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().target_column, "G3");
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_process_layout() {
        let pipeline = Pipeline::builder().config(small_config()).build().unwrap();
        let output = pipeline.process(loaded(40)).unwrap();

        assert_eq!(output.test.height(), 4);
        assert_eq!(output.train.height(), 36);

        let names: Vec<String> = output
            .train
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["row_index", "age", "higher_yes", "G3"]);
        assert_eq!(output.artifact.schema.feature_columns, vec!["age", "higher"]);
    }

    #[test]
    fn test_process_missing_target() {
        let config = PipelineConfig::builder()
            .target_column("G2")
            .numeric_columns(["age"])
            .nominal_columns(["higher"])
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();

        let err = pipeline.process(loaded(10)).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_progress_stages_are_reported_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let pipeline = Pipeline::builder()
            .config(small_config())
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();
        pipeline.process(loaded(20)).unwrap();

        let seen = stages.lock().unwrap();
        assert_eq!(seen.first(), Some(&PipelineStage::Splitting));
        assert!(seen.contains(&PipelineStage::Fitting));
        assert_eq!(seen.last(), Some(&PipelineStage::Transforming));
    }
}
