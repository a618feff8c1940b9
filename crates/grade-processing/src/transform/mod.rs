//! Feature transformers.
//!
//! Each transformer follows a fit/apply split: [`Transformer::fit`] learns
//! parameters from the training partition and returns an immutable fitted
//! value, which is then applied to any number of frames (test partition,
//! served requests) without changing.
//!
//! - [`MinMaxScaler`] rescales numeric columns by their observed range.
//! - [`OneHotEncoder`] expands nominal columns into indicator columns.
//! - [`ColumnTransformer`] runs both on their column subsets and
//!   concatenates the outputs, numeric block first.

mod column;
mod encoder;
mod scaler;

pub use column::{ColumnTransformer, FittedColumnTransformer};
pub use encoder::{CategoryEncoding, FittedOneHotEncoder, OneHotEncoder};
pub use scaler::{FeatureRange, FittedMinMaxScaler, MinMaxScaler};

use crate::error::Result;
use polars::prelude::{Column, DataFrame};

/// An unfitted transformer: a column selection plus the fitting procedure.
pub trait Transformer {
    type Fitted: FittedTransformer;

    /// Learn the transformer's parameters from `frame`.
    fn fit(&self, frame: &DataFrame) -> Result<Self::Fitted>;
}

/// Learned transformer state that maps raw columns to feature columns.
pub trait FittedTransformer {
    /// Names of the produced columns, in output order.
    fn feature_names(&self) -> Vec<String>;

    /// Produce the output columns for every row of `frame`.
    fn apply(&self, frame: &DataFrame) -> Result<Vec<Column>>;

    fn n_features_out(&self) -> usize {
        self.feature_names().len()
    }
}
