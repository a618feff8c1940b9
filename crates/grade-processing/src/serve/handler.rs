use super::content::Encoding;
use super::request::InferenceRequest;
use super::response::{EncodedResponse, Prediction};
use crate::artifact::TransformerArtifact;
use crate::error::{Result, ResultExt};
use polars::prelude::DataFrame;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Per-request entry point of the served adapter.
///
/// Holds the fitted transformer behind an `Arc`; every stage only reads it,
/// so one handler can serve concurrent requests from any number of threads.
#[derive(Debug, Clone)]
pub struct InferenceHandler {
    artifact: Arc<TransformerArtifact>,
}

static_assertions::assert_impl_all!(InferenceHandler: Send, Sync);

impl InferenceHandler {
    pub fn new(artifact: Arc<TransformerArtifact>) -> Self {
        Self { artifact }
    }

    pub fn from_artifact(artifact: TransformerArtifact) -> Self {
        Self::new(Arc::new(artifact))
    }

    /// Load the artifact from disk once and wrap it in a handler.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_artifact(TransformerArtifact::load(path)?))
    }

    pub fn artifact(&self) -> &TransformerArtifact {
        &self.artifact
    }

    /// Parse a request body.
    pub fn input(&self, body: &str, content_type: &str) -> Result<InferenceRequest> {
        Encoding::from_content_type(content_type)?;
        InferenceRequest::from_csv(body, &self.artifact.schema)
    }

    /// Transform the request rows, putting the label back in front when the
    /// request carried one.
    pub fn predict(&self, request: &InferenceRequest) -> Result<Prediction> {
        let features = self
            .artifact
            .transformer
            .transform(request.features())
            .context("While transforming request rows")?;

        let frame = match request.labels() {
            Some(labels) => {
                let mut columns = Vec::with_capacity(features.width() + 1);
                columns.push(labels.clone());
                columns.extend(features.get_columns().iter().cloned());
                DataFrame::new(columns)?
            }
            None => features,
        };

        debug!(
            "Transformed {} rows (labelled: {})",
            frame.height(),
            request.is_labelled()
        );
        Ok(Prediction { frame })
    }

    /// Encode a prediction for the requested media type.
    pub fn output(&self, prediction: &Prediction, accept: &str) -> Result<EncodedResponse> {
        prediction.encode(Encoding::from_accept(accept)?)
    }

    /// Run one request through parsing, transform and encoding.
    pub fn handle(&self, body: &str, content_type: &str, accept: &str) -> Result<EncodedResponse> {
        let encoding = Encoding::from_accept(accept)?;
        let request = self.input(body, content_type)?;
        let prediction = self.predict(&request)?;
        prediction.encode(encoding)
    }
}
