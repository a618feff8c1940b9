use super::content::Encoding;
use crate::error::Result;
use crate::pipeline::output::table_to_csv;
use crate::utils::frame_rows;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// One transformed row in the JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub features: Vec<f64>,
}

/// JSON response body: `{"instances": [{"features": [..]}, ..]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instances {
    pub instances: Vec<Instance>,
}

impl Instances {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self {
            instances: rows
                .into_iter()
                .map(|features| Instance { features })
                .collect(),
        }
    }
}

/// Transformed rows of one request, label first when the request had one.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub frame: DataFrame,
}

/// An encoded response body and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub body: String,
    pub content_type: &'static str,
}

impl Prediction {
    pub fn encode(&self, encoding: Encoding) -> Result<EncodedResponse> {
        let body = match encoding {
            Encoding::Json => serde_json::to_string(&Instances::from_rows(frame_rows(&self.frame)?))?,
            Encoding::Csv => table_to_csv(&mut self.frame.clone())?,
        };

        Ok(EncodedResponse {
            body,
            content_type: encoding.mime_type(),
        })
    }
}
