//! K-Nearest Neighbors classifier
//!
//! Euclidean distance, uniform majority vote. Also serves as the stand-in
//! for SVM (k = 3).

use super::models::Classifier;
use super::random_forest::majority_vote;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
}

impl Default for KNNClassifier {
    fn default() -> Self {
        Self::with_k(5)
    }
}

impl KNNClassifier {
    pub fn with_k(k: usize) -> Self {
        Self {
            n_neighbors: k,
            x_train: None,
            y_train: None,
        }
    }

    /// Store the training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(HeveaError::ValidationError("empty training set".to_string()));
        }
        if self.n_neighbors == 0 {
            return Err(HeveaError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(HeveaError::ValidationError(
                "KNN inputs must be finite".to_string(),
            ));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(self)
    }

    /// Predict class labels (parallelized over test samples)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(xt), Some(yt)) => (xt, yt),
            _ => return Err(HeveaError::ModelNotFitted),
        };
        if x.ncols() != x_train.ncols() {
            return Err(HeveaError::ShapeError {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.n_neighbors.min(x_train.nrows());
        let predictions: Vec<usize> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, k);
                majority_vote(neighbors.into_iter().map(|idx| (y_train[idx], 1.0))) as usize
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

impl Classifier for KNNClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        KNNClassifier::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        KNNClassifier::predict(self, x)
    }
}

/// Max-heap entry keyed on distance, then training index
#[derive(PartialEq)]
struct Neighbor(f64, usize);

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

/// Indices of the k nearest training rows; equal distances favour earlier rows
fn find_k_nearest(point: ArrayView1<f64>, x_train: &Array2<f64>, k: usize) -> Vec<usize> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let candidate = Neighbor(euclidean(point, row), i);
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().map_or(false, |top| candidate < *top) {
            heap.pop();
            heap.push(candidate);
        }
    }

    heap.into_iter().map(|n| n.1).collect()
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi).powi(2))
        .sum::<f64>()
        .sqrt()
}
