//! CART decision tree
//!
//! One tree type serves both tasks. Classification trees split on Gini
//! impurity and store the majority label in each leaf; regression trees
//! minimise the size-weighted within-child variance and store the mean.

use super::models::{Classifier, Regressor};
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Population variance (regression)
    Variance,
}

/// Running sums for one side of a candidate split
#[derive(Debug, Clone)]
struct SideStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
    class_counts: Vec<usize>,
}

impl SideStats {
    fn empty(n_classes: usize) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sq_sum: 0.0,
            class_counts: vec![0; n_classes],
        }
    }

    fn add(&mut self, target: f64, class_idx: Option<usize>) {
        self.count += 1;
        self.sum += target;
        self.sq_sum += target * target;
        if let Some(c) = class_idx {
            self.class_counts[c] += 1;
        }
    }

    fn remove(&mut self, target: f64, class_idx: Option<usize>) {
        self.count -= 1;
        self.sum -= target;
        self.sq_sum -= target * target;
        if let Some(c) = class_idx {
            self.class_counts[c] -= 1;
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        match criterion {
            Criterion::Gini => {
                1.0 - self
                    .class_counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Variance => (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0),
        }
    }
}

/// Targets as seen by the builder: raw values plus, for classification,
/// each sample's position in the sorted class list
struct Targets<'a> {
    values: &'a Array1<f64>,
    class_idx: Vec<usize>,
    n_classes: usize,
}

impl Targets<'_> {
    fn class_of(&self, i: usize) -> Option<usize> {
        self.class_idx.get(i).copied()
    }

    fn stats(&self, indices: &[usize]) -> SideStats {
        let mut stats = SideStats::empty(self.n_classes);
        for &i in indices {
            stats.add(self.values[i], self.class_of(i));
        }
        stats
    }
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at random at every node; `None` scans all of them
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: Option<u64>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
    is_classification: bool,
    /// Sorted distinct labels seen during fit (classification only)
    classes: Vec<usize>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: None,
            n_features: 0,
            feature_importances: None,
            is_classification: true,
            classes: Vec::new(),
        }
    }

    /// Create a new regressor tree
    pub fn new_regressor() -> Self {
        Self {
            criterion: Criterion::Variance,
            is_classification: false,
            ..Self::new_classifier()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree
    ///
    /// For classifier trees `y` holds integer class labels stored as `f64`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(HeveaError::ValidationError(format!(
                "cannot fit a tree on a {}x{} matrix",
                n_samples, n_features
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(HeveaError::ValidationError(
                "tree inputs must be finite".to_string(),
            ));
        }

        let class_idx = if self.is_classification {
            if y.iter().any(|&v| v < 0.0 || v.fract() != 0.0) {
                return Err(HeveaError::ValidationError(
                    "class labels must be non-negative integers".to_string(),
                ));
            }
            let mut classes: Vec<usize> = y.iter().map(|&v| v as usize).collect();
            classes.sort_unstable();
            classes.dedup();
            let encoded = y
                .iter()
                .map(|&v| classes.binary_search(&(v as usize)).unwrap_or(0))
                .collect();
            self.classes = classes;
            encoded
        } else {
            Vec::new()
        };

        let targets = Targets {
            values: y,
            class_idx,
            n_classes: self.classes.len(),
        };

        self.n_features = n_features;
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_tree(x, &targets, &indices, 0, &mut importances, &mut rng);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.root = Some(root);
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        targets: &Targets<'_>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let stats = targets.stats(indices);
        let parent_impurity = stats.impurity(self.criterion);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || parent_impurity <= 1e-12;

        if should_stop {
            return self.leaf(&stats);
        }

        let candidates = self.candidate_features(rng);
        let Some((feature_idx, threshold, gain)) =
            self.find_best_split(x, targets, indices, &stats, &candidates)
        else {
            return self.leaf(&stats);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, targets, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, targets, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k > 0 && k < self.n_features => {
                let mut picked = index::sample(rng, self.n_features, k).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..self.n_features).collect(),
        }
    }

    /// Best (feature, midpoint threshold, impurity decrease) over `features`
    ///
    /// Each feature is scanned once in sorted order, moving samples from the
    /// right-hand statistics to the left-hand ones.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        targets: &Targets<'_>,
        indices: &[usize],
        parent: &SideStats,
        features: &[usize],
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len() as f64;
        let parent_impurity = parent.impurity(self.criterion);

        let per_feature: Vec<Option<(usize, f64, f64)>> = features
            .par_iter()
            .map(|&feature_idx| {
                let mut order: Vec<(f64, usize)> =
                    indices.iter().map(|&i| (x[[i, feature_idx]], i)).collect();
                order.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut left = SideStats::empty(targets.n_classes);
                let mut right = parent.clone();
                let mut best: Option<(f64, f64)> = None;

                for k in 0..order.len() - 1 {
                    let (value, i) = order[k];
                    left.add(targets.values[i], targets.class_of(i));
                    right.remove(targets.values[i], targets.class_of(i));

                    let next = order[k + 1].0;
                    if next <= value {
                        continue;
                    }
                    if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                        continue;
                    }

                    let weighted = (left.count as f64 * left.impurity(self.criterion)
                        + right.count as f64 * right.impurity(self.criterion))
                        / n;
                    let gain = parent_impurity - weighted;
                    if gain > 1e-12 && best.map_or(true, |(g, _)| gain > g) {
                        best = Some((gain, (value + next) / 2.0));
                    }
                }

                best.map(|(gain, threshold)| (feature_idx, threshold, gain))
            })
            .collect();

        // Ties keep the lowest feature index
        per_feature.into_iter().flatten().fold(None, |acc, cand| match acc {
            Some(best) if best.2 >= cand.2 => Some(best),
            _ => Some(cand),
        })
    }

    fn leaf(&self, stats: &SideStats) -> TreeNode {
        let value = if self.is_classification {
            // Majority class, smallest label on ties
            let mut best = 0;
            for (c, &count) in stats.class_counts.iter().enumerate() {
                if count > stats.class_counts[best] {
                    best = c;
                }
            }
            self.classes.get(best).copied().unwrap_or(0) as f64
        } else if stats.count > 0 {
            stats.sum / stats.count as f64
        } else {
            0.0
        };
        TreeNode::Leaf {
            value,
            n_samples: stats.count,
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(HeveaError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(HeveaError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value, .. } => break *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if row[*feature_idx] <= *threshold { &**left } else { &**right };
                        }
                    }
                }
            })
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Sorted labels seen during a classification fit
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of node levels, counting the leaf level
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        DecisionTree::fit(self, x, &y.mapv(|v| v as f64)).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        Ok(DecisionTree::predict(self, x)?.mapv(|v| v as usize))
    }
}

impl Regressor for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        DecisionTree::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        DecisionTree::predict(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separable() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.get_n_leaves(), 2);
        assert_eq!(tree.classes(), &[0, 1]);
    }

    #[test]
    fn test_classifier_keeps_label_values() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![3usize, 3, 3, 8, 8, 8];

        let mut tree = DecisionTree::new_classifier();
        Classifier::fit(&mut tree, &x, &y).unwrap();
        let pred = Classifier::predict(&tree, &array![[0.0], [20.0]]).unwrap();
        assert_eq!(pred, array![3usize, 8]);
    }

    #[test]
    fn test_regressor_fits_steps() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTree::new_regressor();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 1e-12, "MSE too high: {}", mse);
    }

    #[test]
    fn test_regressor_min_samples_split_gives_mean_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 2.0, 3.0, 6.0];

        let mut tree = DecisionTree::new_regressor().with_min_samples_split(5);
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.get_n_leaves(), 1);
        assert_eq!(tree.predict(&array![[100.0]]).unwrap()[0], 3.0);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new_classifier().with_max_depth(2);
        tree.fit(&x, &y).unwrap();
        assert!(tree.get_depth() <= 3);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert_eq!(importances[0], 1.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_feature_subsampling_is_seeded() {
        let x = array![
            [1.0, 5.0, 2.0],
            [2.0, 3.0, 1.0],
            [3.0, 4.0, 7.0],
            [4.0, 1.0, 3.0],
            [5.0, 2.0, 9.0],
            [6.0, 6.0, 4.0],
        ];
        let y = array![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];

        let fit = || {
            let mut tree = DecisionTree::new_regressor()
                .with_max_features(1)
                .with_random_state(11);
            tree.fit(&x, &y).unwrap();
            tree.predict(&x).unwrap()
        };
        assert_eq!(fit(), fit());
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut tree = DecisionTree::new_classifier();
        assert!(tree.fit(&array![[1.0], [f64::NAN]], &array![0.0, 1.0]).is_err());
        assert!(tree.fit(&array![[1.0], [2.0]], &array![0.5, 1.0]).is_err());
        assert!(tree.fit(&array![[1.0], [2.0]], &array![0.0]).is_err());
        assert!(matches!(
            DecisionTree::new_regressor().predict(&array![[1.0]]),
            Err(HeveaError::ModelNotFitted)
        ));
    }
}
