//! Final-grade regression on preprocessed student performance features.
//!
//! Consumes the tables written by `grade-processing` (or the rows returned
//! by its served adapter), fits an elastic net on them and predicts grades.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use grade_learning::{Trainer, TrainerConfig};
//! use std::path::Path;
//!
//! let config = TrainerConfig::builder().penalty(0.05).build()?;
//! let (model, report) = Trainer::new(config).run(
//!     Path::new("out/data/train.csv"),
//!     Some(Path::new("out/data/test.csv")),
//!     Path::new("out/model"),
//! )?;
//!
//! println!("test R2: {:?}", report.test_metrics.and_then(|m| m.r2));
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod model;
pub mod trainer;
pub mod types;

pub use config::{LabelPosition, TrainerConfig, TrainerConfigBuilder};
pub use dataset::TrainingData;
pub use error::{LearningError, Result};
pub use metrics::evaluate;
pub use model::{ElasticNetRegressor, GradeModel, LinearGradeModel, MODEL_FILE_NAME, Regressor};
pub use trainer::Trainer;
pub use types::{Instance, Instances, Metrics, TrainingReport};
