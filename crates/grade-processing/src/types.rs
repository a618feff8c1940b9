use serde::{Deserialize, Serialize};
use std::path::Path;

/// Row count contributed by one input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub path: String,
    pub rows: usize,
}

impl SourceSummary {
    pub fn new(path: &Path, rows: usize) -> Self {
        Self {
            path: path.display().to_string(),
            rows,
        }
    }
}

/// Summary of a completed batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub success: bool,
    pub sources: Vec<SourceSummary>,
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Names of the transformed feature columns, in output order.
    pub feature_names: Vec<String>,
    pub train_path: String,
    pub test_path: String,
    pub artifact_path: String,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Width of the transformed feature block (index and label excluded).
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}
