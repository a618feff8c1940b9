//! Served inference adapter.
//!
//! Wraps a persisted [`TransformerArtifact`](crate::artifact::TransformerArtifact)
//! behind the three hosting stages: parse a request body, transform its rows
//! and encode the response.
//!
//! ```rust,ignore
//! use grade_processing::serve::InferenceHandler;
//!
//! let handler = InferenceHandler::load("model/transformer.json")?;
//! let response = handler.handle(body, "text/csv", "application/json")?;
//! ```

mod content;
mod handler;
mod request;
mod response;

pub use content::{CSV_CONTENT_TYPE, Encoding, JSON_CONTENT_TYPE};
pub use handler::InferenceHandler;
pub use request::InferenceRequest;
pub use response::{EncodedResponse, Instance, Instances, Prediction};
