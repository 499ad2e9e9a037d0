//! Gaussian Naive Bayes classifier

use super::models::Classifier;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Smallest per-feature standard deviation used in the density
pub const STD_FLOOR: f64 = 1e-6;
/// Added to every density before taking its log
pub const LOG_EPSILON: f64 = 1e-10;

/// Gaussian Naive Bayes Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    /// Per-class feature means, one row per class
    means: Option<Array2<f64>>,
    /// Per-class population standard deviations, floored at `std_floor`
    stds: Option<Array2<f64>>,
    /// Training-sample fraction of each class
    priors: Vec<f64>,
    classes: Vec<usize>,
    pub std_floor: f64,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            means: None,
            stds: None,
            priors: Vec::new(),
            classes: Vec::new(),
            std_floor: STD_FLOOR,
        }
    }

    pub fn with_std_floor(mut self, floor: f64) -> Self {
        self.std_floor = floor;
        self
    }

    /// Fit the classifier
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(HeveaError::ValidationError("empty training set".to_string()));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(HeveaError::ValidationError(
                "naive Bayes inputs must be finite".to_string(),
            ));
        }

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut means = Array2::<f64>::zeros((classes.len(), x.ncols()));
        let mut stds = Array2::<f64>::zeros((classes.len(), x.ncols()));
        let mut priors = Vec::with_capacity(classes.len());

        for (c, &class) in classes.iter().enumerate() {
            let rows: Vec<usize> = (0..n_samples).filter(|&i| y[i] == class).collect();
            let subset = x.select(Axis(0), &rows);

            // rows is never empty: every class came from y
            if let Some(mean) = subset.mean_axis(Axis(0)) {
                means.row_mut(c).assign(&mean);
            }
            let std = subset.std_axis(Axis(0), 0.0).mapv(|s| s.max(self.std_floor));
            stds.row_mut(c).assign(&std);
            priors.push(rows.len() as f64 / n_samples as f64);
        }

        self.means = Some(means);
        self.stds = Some(stds);
        self.priors = priors;
        self.classes = classes;
        Ok(self)
    }

    /// Log prior plus summed log densities, one column per class
    pub fn joint_log_likelihood(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (means, stds) = match (&self.means, &self.stds) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(HeveaError::ModelNotFitted),
        };
        if x.ncols() != means.ncols() {
            return Err(HeveaError::ShapeError {
                expected: format!("{} features", means.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut scores = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            for c in 0..self.classes.len() {
                scores[[i, c]] =
                    self.priors[c].ln() + log_density(row, means.row(c), stds.row(c));
            }
        }
        Ok(scores)
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let scores = self.joint_log_likelihood(x)?;
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| self.classes[super::linear_models::argmax(row.iter().copied())])
            .collect())
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }
}

fn log_density(row: ArrayView1<f64>, mean: ArrayView1<f64>, std: ArrayView1<f64>) -> f64 {
    row.iter()
        .zip(mean.iter().zip(std.iter()))
        .map(|(&v, (&m, &s))| {
            let z = (v - m) / s;
            let pdf = (-0.5 * z * z).exp() / (s * (2.0 * PI).sqrt());
            (pdf + LOG_EPSILON).ln()
        })
        .sum()
}

impl Classifier for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        GaussianNaiveBayes::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        GaussianNaiveBayes::predict(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gaussian_nb_separable() {
        let x = array![
            [1.0, 2.0],
            [1.2, 1.8],
            [0.8, 2.1],
            [6.0, 7.0],
            [6.3, 6.8],
            [5.9, 7.2],
        ];
        let y = array![0usize, 0, 0, 1, 1, 1];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        assert_eq!(nb.predict(&x).unwrap(), y);
        assert_eq!(nb.predict(&array![[1.1, 2.0], [6.1, 7.1]]).unwrap(), array![0usize, 1]);
    }

    #[test]
    fn test_priors_break_ties() {
        // identical feature distributions, class 2 is three times as common
        let x = array![[0.0], [1.0], [0.0], [1.0], [0.0], [1.0], [0.0], [1.0]];
        let y = array![5usize, 5, 2, 2, 2, 2, 2, 2];
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();
        assert_eq!(nb.classes(), &[2, 5]);
        assert_eq!(nb.predict(&array![[0.5]]).unwrap(), array![2usize]);
    }

    #[test]
    fn test_constant_feature_stays_finite() {
        let x = array![[1.0, 3.0], [1.0, 4.0], [1.0, 10.0], [1.0, 11.0]];
        let y = array![0usize, 0, 1, 1];
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let scores = nb.joint_log_likelihood(&array![[2.0, 3.5]]).unwrap();
        assert!(scores.iter().all(|s| s.is_finite()));
        assert_eq!(nb.predict(&array![[1.0, 3.5]]).unwrap(), array![0usize]);
    }

    #[test]
    fn test_unfitted_and_nan() {
        let nb = GaussianNaiveBayes::new();
        assert!(matches!(nb.predict(&array![[1.0]]), Err(HeveaError::ModelNotFitted)));

        let mut nb = GaussianNaiveBayes::new();
        assert!(nb.fit(&array![[f64::NAN]], &array![0usize]).is_err());
    }
}
