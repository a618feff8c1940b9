//! Persistence of the fitted transformer.
//!
//! The artifact is a self-describing JSON document: a format version, the
//! creation time, the raw column layout served requests are read against,
//! and the fitted scaler/encoder state. Loading it back yields a transformer
//! that produces output identical to the one that was saved.

use crate::error::{PreprocessingError, Result, ResultExt};
use crate::schema::RawSchema;
use crate::transform::FittedColumnTransformer;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Format version written by this build.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Default artifact file name inside the model directory.
pub const ARTIFACT_FILE_NAME: &str = "transformer.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerArtifact {
    pub format_version: u32,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub schema: RawSchema,
    pub transformer: FittedColumnTransformer,
}

impl TransformerArtifact {
    pub fn new(schema: RawSchema, transformer: FittedColumnTransformer) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: Utc::now().to_rfc3339(),
            schema,
            transformer,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        match value.get("format_version").and_then(|v| v.as_u64()) {
            Some(version) if version == u64::from(ARTIFACT_FORMAT_VERSION) => {}
            Some(version) => {
                return Err(PreprocessingError::ArtifactFormat(format!(
                    "unsupported format version {} (expected {})",
                    version, ARTIFACT_FORMAT_VERSION
                )));
            }
            None => {
                return Err(PreprocessingError::ArtifactFormat(
                    "missing format_version".to_string(),
                ));
            }
        }

        serde_json::from_value(value)
            .map_err(|e| PreprocessingError::ArtifactFormat(e.to_string()))
    }

    /// Write the artifact, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }

        fs::write(path, self.to_json()?).context(format!("Failed to write {}", path.display()))?;
        info!("Saved transformer artifact to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json =
            fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).context(format!("Failed to load {}", path.display()))
    }
}
