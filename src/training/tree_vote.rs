//! Weighted vote over independently grown decision trees
//!
//! Stands in for gradient boosting. Each tree is fit on its own bootstrap
//! sample; its vote is weighted by its accuracy on the full training set.
//! There is no residual fitting, so this is not boosting.

use super::decision_tree::DecisionTree;
use super::models::Classifier;
use super::random_forest::majority_vote;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTreeVote {
    trees: Vec<DecisionTree>,
    /// Training accuracy of each tree, used as its vote weight
    weights: Vec<f64>,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub random_state: Option<u64>,
}

impl Default for WeightedTreeVote {
    fn default() -> Self {
        Self::new(20)
    }
}

impl WeightedTreeVote {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            weights: Vec::new(),
            n_estimators,
            max_depth: 5,
            random_state: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || self.n_estimators == 0 {
            return Err(HeveaError::ValidationError(
                "weighted tree vote needs samples and at least one tree".to_string(),
            ));
        }

        let y_float = y.mapv(|v| v as f64);
        let base_seed = self.random_state.unwrap_or_else(rand::random);

        let fitted: Vec<(DecisionTree, f64)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<(DecisionTree, f64)> {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let mut tree = DecisionTree::new_classifier()
                    .with_max_depth(self.max_depth)
                    .with_random_state(rng.next_u64());
                let y_boot: Array1<f64> = sample.iter().map(|&i| y_float[i]).collect();
                tree.fit(&x.select(Axis(0), &sample), &y_boot)?;

                let train_pred = tree.predict(x)?;
                let correct = train_pred
                    .iter()
                    .zip(y_float.iter())
                    .filter(|(p, t)| p == t)
                    .count();
                Ok((tree, correct as f64 / n_samples as f64))
            })
            .collect::<Result<_>>()?;

        let (trees, weights) = fitted.into_iter().unzip();
        self.trees = trees;
        self.weights = weights;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(HeveaError::ModelNotFitted);
        }

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        Ok((0..x.nrows())
            .map(|i| {
                let votes = per_tree
                    .iter()
                    .zip(&self.weights)
                    .map(|(pred, &w)| (pred[i] as usize, w));
                majority_vote(votes) as usize
            })
            .collect())
    }

    /// Vote weight of every fitted tree
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Classifier for WeightedTreeVote {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        WeightedTreeVote::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        WeightedTreeVote::predict(self, x)
    }
}
