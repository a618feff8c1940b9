//! Seeded train/test partitioning.
//!
//! The test partition holds `ceil(n * test_fraction)` rows. With shuffling
//! enabled the rows are drawn from a permutation of `0..n` produced by a
//! `StdRng` seeded with the configured seed, so the same seed on the same
//! input always yields the same partitions. Without shuffling the final
//! rows of the concatenated input form the test partition.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Row positions of each partition, in the order rows are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<IdxSize>,
    pub test: Vec<IdxSize>,
}

/// Rows of one input frame, divided into a training and a test frame.
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Number of rows assigned to the test partition.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    (n_rows as f64 * test_fraction).ceil() as usize
}

/// Compute the row positions of both partitions.
///
/// Fails with [`PreprocessingError::InvalidSplit`] when either partition
/// would be empty or the fraction lies outside `(0, 1)`.
pub fn train_test_indices(
    n_rows: usize,
    test_fraction: f64,
    shuffle: bool,
    seed: u64,
) -> Result<SplitIndices> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PreprocessingError::InvalidSplit(format!(
            "test fraction must lie strictly between 0 and 1, got {}",
            test_fraction
        )));
    }

    let n_test = test_size(n_rows, test_fraction);
    if n_test == 0 || n_test >= n_rows {
        return Err(PreprocessingError::InvalidSplit(format!(
            "{} rows with test fraction {} leaves an empty partition",
            n_rows, test_fraction
        )));
    }

    let mut order: Vec<IdxSize> = (0..n_rows as IdxSize).collect();
    let (train, test) = if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        let train = order.split_off(n_test);
        (train, order)
    } else {
        let test = order.split_off(n_rows - n_test);
        (order, test)
    };

    debug!(
        "Split {} rows into {} train / {} test (shuffle={}, seed={})",
        n_rows,
        train.len(),
        test.len(),
        shuffle,
        seed
    );

    Ok(SplitIndices { train, test })
}

/// Take the rows of each partition out of `frame`.
pub fn partition(frame: &DataFrame, indices: &SplitIndices) -> Result<Partitions> {
    let take = |positions: &[IdxSize]| -> Result<DataFrame> {
        let idx = IdxCa::from_vec("idx".into(), positions.to_vec());
        frame.take(&idx).context("Failed to gather partition rows")
    };

    Ok(Partitions {
        train: take(&indices.train)?,
        test: take(&indices.test)?,
    })
}
