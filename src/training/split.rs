//! Train/test and k-fold splitting
//!
//! Both splitters only produce index partitions; [`TrainTestSplit::take`]
//! materializes the rows. Randomness comes from the caller's generator so a
//! seeded run reproduces the same partitions.

use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Disjoint train and test indices covering every sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Materialized train/test partition
#[derive(Debug, Clone)]
pub struct TrainTestSplit<T> {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<T>,
    pub y_test: Array1<T>,
}

impl<T: Clone> TrainTestSplit<T> {
    /// Gather rows of `x` and `y` according to `indices`
    pub fn take(x: &Array2<f64>, y: &Array1<T>, indices: &SplitIndices) -> Self {
        Self {
            x_train: x.select(Axis(0), &indices.train),
            x_test: x.select(Axis(0), &indices.test),
            y_train: indices.train.iter().map(|&i| y[i].clone()).collect(),
            y_test: indices.test.iter().map(|&i| y[i].clone()).collect(),
        }
    }
}

/// Cut a (possibly shuffled) permutation at `floor(n * (1 - test_size))`
///
/// The cut is clamped to `1..n` so neither side is ever empty.
pub fn train_test_indices<R: Rng + ?Sized>(
    n_samples: usize,
    test_size: f64,
    shuffle: bool,
    rng: &mut R,
) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeveaError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }
    if n_samples < 2 {
        return Err(HeveaError::ValidationError(format!(
            "need at least 2 samples to split, got {}",
            n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    if shuffle {
        indices.shuffle(rng);
    }

    let cut = ((n_samples as f64 * (1.0 - test_size)).floor() as usize).clamp(1, n_samples - 1);
    let test = indices.split_off(cut);

    Ok(SplitIndices {
        train: indices,
        test,
    })
}

/// Split features and labels into train and test partitions
pub fn train_test_split<T: Clone, R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array1<T>,
    test_size: f64,
    shuffle: bool,
    rng: &mut R,
) -> Result<TrainTestSplit<T>> {
    if x.nrows() != y.len() {
        return Err(HeveaError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    let indices = train_test_indices(x.nrows(), test_size, shuffle, rng)?;
    Ok(TrainTestSplit::take(x, y, &indices))
}

/// One fold of a k-fold partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub fold_idx: usize,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl Fold {
    pub fn as_split(&self) -> SplitIndices {
        SplitIndices {
            train: self.train_indices.clone(),
            test: self.test_indices.clone(),
        }
    }
}

/// Partition `n_samples` indices into `k` contiguous blocks
///
/// Every block holds `floor(n / k)` indices except the last, which also
/// takes the `n mod k` remainder. A fold's training set is every other
/// block concatenated in order.
pub fn k_fold_split<R: Rng + ?Sized>(
    n_samples: usize,
    k: usize,
    shuffle: bool,
    rng: &mut R,
) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(HeveaError::InvalidParameter {
            name: "k".to_string(),
            value: k.to_string(),
            reason: "must be at least 2".to_string(),
        });
    }
    if n_samples < k {
        return Err(HeveaError::ValidationError(format!(
            "n_samples ({}) must be >= k ({})",
            n_samples, k
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    if shuffle {
        indices.shuffle(rng);
    }

    let block = n_samples / k;
    let bounds: Vec<(usize, usize)> = (0..k)
        .map(|i| {
            let start = i * block;
            let end = if i == k - 1 { n_samples } else { start + block };
            (start, end)
        })
        .collect();

    let folds = bounds
        .iter()
        .enumerate()
        .map(|(fold_idx, &(start, end))| Fold {
            fold_idx,
            test_indices: indices[start..end].to_vec(),
            train_indices: indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .copied()
                .collect(),
        })
        .collect();

    Ok(folds)
}
