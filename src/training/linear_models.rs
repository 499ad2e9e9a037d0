//! Linear model implementations
//!
//! All three models are trained with full-batch gradient descent for a fixed
//! number of iterations; there is no convergence check or early stop.

use super::models::{Classifier, Regressor};
use super::scaler::StandardScaler;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Default step size shared by the gradient-descent models
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
/// Default iteration budget shared by the gradient-descent models
pub const DEFAULT_ITERATIONS: usize = 1000;

fn check_shapes(n_samples: usize, y_len: usize) -> Result<()> {
    if n_samples != y_len {
        return Err(HeveaError::ShapeError {
            expected: format!("y length = {}", n_samples),
            actual: format!("y length = {}", y_len),
        });
    }
    if n_samples == 0 {
        return Err(HeveaError::ValidationError("empty training set".to_string()));
    }
    Ok(())
}

/// Minimise mean squared error, optionally with an L2 penalty on the weights
///
/// Weight gradient is `Xᵀ(ŷ − y)/m + 2·alpha·w/m`; the bias is never
/// penalised.
fn squared_loss_descent(
    x: &Array2<f64>,
    y: &Array1<f64>,
    learning_rate: f64,
    n_iterations: usize,
    alpha: f64,
) -> Result<(Array1<f64>, f64)> {
    let m = x.nrows() as f64;
    let mut weights = Array1::<f64>::zeros(x.ncols());
    let mut bias = 0.0;

    for _ in 0..n_iterations {
        let errors = x.dot(&weights) + bias - y;
        let dw = x.t().dot(&errors) / m + &weights * (2.0 * alpha / m);
        let db = errors.sum() / m;

        weights.scaled_add(-learning_rate, &dw);
        bias -= learning_rate * db;
    }

    if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
        return Err(HeveaError::TrainingError(format!(
            "gradient descent diverged (learning rate {}, {} iterations)",
            learning_rate, n_iterations
        )));
    }

    Ok((weights, bias))
}

/// Linear regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    pub learning_rate: f64,
    pub n_iterations: usize,
    pub is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            learning_rate: DEFAULT_LEARNING_RATE,
            n_iterations: DEFAULT_ITERATIONS,
            is_fitted: false,
        }
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_shapes(x.nrows(), y.len())?;

        let (weights, bias) =
            squared_loss_descent(x, y, self.learning_rate, self.n_iterations, 0.0)?;

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;
        Ok(self)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) if self.is_fitted => {
                Ok(x.dot(coefficients) + intercept)
            }
            _ => Err(HeveaError::ModelNotFitted),
        }
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LinearRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LinearRegression::predict(self, x)
    }
}

/// Ridge Regression (L2-regularized linear regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// L2 regularization strength
    pub alpha: f64,
    pub learning_rate: f64,
    pub n_iterations: usize,
    pub is_fitted: bool,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha,
            learning_rate: DEFAULT_LEARNING_RATE,
            n_iterations: DEFAULT_ITERATIONS,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_shapes(x.nrows(), y.len())?;
        if self.alpha < 0.0 {
            return Err(HeveaError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }

        let (weights, bias) =
            squared_loss_descent(x, y, self.learning_rate, self.n_iterations, self.alpha)?;

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) if self.is_fitted => {
                Ok(x.dot(coefficients) + intercept)
            }
            _ => Err(HeveaError::ModelNotFitted),
        }
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RidgeRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RidgeRegression::predict(self, x)
    }
}

/// One-vs-rest logistic regression
///
/// Features are standardized with training statistics before fitting, and
/// the same transform is applied at prediction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One row of weights per class
    pub coefficients: Option<Array2<f64>>,
    /// One bias per class
    pub intercepts: Option<Array1<f64>>,
    pub classes: Vec<usize>,
    pub max_iter: usize,
    pub learning_rate: f64,
    scaler: StandardScaler,
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercepts: None,
            classes: Vec::new(),
            max_iter: DEFAULT_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            scaler: StandardScaler::new(),
            is_fitted: false,
        }
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Fit one binary model per class
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        check_shapes(x.nrows(), y.len())?;

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            return Err(HeveaError::TrainingError(format!(
                "logistic regression needs at least 2 classes, got {}",
                classes.len()
            )));
        }

        let xs = self.scaler.fit_transform(x)?;
        let m = xs.nrows() as f64;

        let mut coefficients = Array2::<f64>::zeros((classes.len(), xs.ncols()));
        let mut intercepts = Array1::<f64>::zeros(classes.len());

        for (c, &class) in classes.iter().enumerate() {
            let target: Array1<f64> = y.mapv(|label| if label == class { 1.0 } else { 0.0 });
            let mut weights = Array1::<f64>::zeros(xs.ncols());
            let mut bias = 0.0;

            for _ in 0..self.max_iter {
                let probs = (xs.dot(&weights) + bias).mapv(Self::sigmoid);
                let errors = probs - &target;
                let dw = xs.t().dot(&errors) / m;
                let db = errors.sum() / m;

                weights.scaled_add(-self.learning_rate, &dw);
                bias -= self.learning_rate * db;
            }

            coefficients.row_mut(c).assign(&weights);
            intercepts[c] = bias;
        }

        if coefficients.iter().chain(intercepts.iter()).any(|v| !v.is_finite()) {
            return Err(HeveaError::TrainingError(
                "logistic regression produced non-finite weights".to_string(),
            ));
        }

        self.coefficients = Some(coefficients);
        self.intercepts = Some(intercepts);
        self.classes = classes;
        self.is_fitted = true;
        Ok(self)
    }

    /// Sigmoid score of every class for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (coefficients, intercepts) = match (&self.coefficients, &self.intercepts) {
            (Some(c), Some(i)) if self.is_fitted => (c, i),
            _ => return Err(HeveaError::ModelNotFitted),
        };
        let xs = self.scaler.transform(x)?;
        let logits = xs.dot(&coefficients.t()) + &intercepts.view().insert_axis(Axis(0));
        Ok(logits.mapv(Self::sigmoid))
    }

    /// Class with the highest one-vs-rest score
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let scores = self.predict_proba(x)?;
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        LogisticRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        LogisticRegression::predict(self, x)
    }
}

/// Index of the largest value; the first one wins ties
pub(crate) fn argmax<I: IntoIterator<Item = f64>>(values: I) -> usize {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_simple() {
        // y = 2*x + 1
        let x = array![[0.0], [0.5], [1.0], [1.5], [2.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut model = LinearRegression::new().with_learning_rate(0.1);
        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted);

        let pred = model.predict(&array![[3.0]]).unwrap();
        assert!((pred[0] - 7.0).abs() < 0.1, "got {}", pred[0]);
    }

    #[test]
    fn test_linear_regression_runs_full_budget_from_zero() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut model = LinearRegression::new().with_iterations(0);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.coefficients.as_ref().unwrap()[0], 0.0);
        assert_eq!(model.intercept, Some(0.0));
    }

    #[test]
    fn test_ridge_shrinks_weights() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let mut plain = LinearRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut ridge = RidgeRegression::new(10.0);
        ridge.fit(&x, &y).unwrap();

        let norm = |w: &Array1<f64>| w.mapv(|v| v * v).sum();
        assert!(norm(ridge.coefficients.as_ref().unwrap()) < norm(plain.coefficients.as_ref().unwrap()));
        assert_eq!(ridge.predict(&x).unwrap().len(), 4);
    }

    #[test]
    fn test_ridge_zero_alpha_matches_linear() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![1.0, 3.0, 5.0];
        let mut plain = LinearRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut ridge = RidgeRegression::new(0.0);
        ridge.fit(&x, &y).unwrap();
        assert_eq!(plain.coefficients, ridge.coefficients);
        assert_eq!(plain.intercept, ridge.intercept);
    }

    #[test]
    fn test_divergence_is_a_training_error() {
        let x = array![[1e6], [2e6], [3e6]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = LinearRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(HeveaError::TrainingError(_))));
    }

    #[test]
    fn test_unfitted_predict() {
        let model = LinearRegression::new();
        assert!(matches!(model.predict(&array![[1.0]]), Err(HeveaError::ModelNotFitted)));
    }

    #[test]
    fn test_logistic_regression_multiclass() {
        let x = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [5.0, 5.0],
            [5.2, 4.9],
            [4.8, 5.1],
            [0.0, 5.0],
            [0.2, 5.2],
            [0.1, 4.8],
        ];
        let y = array![0usize, 0, 0, 1, 1, 1, 2, 2, 2];

        let mut model = LogisticRegression::new().with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert_eq!(pred, y);
        assert_eq!(model.classes, vec![0, 1, 2]);
    }

    #[test]
    fn test_logistic_regression_non_contiguous_labels() {
        let x = array![[0.0], [0.1], [0.2], [3.0], [3.1], [3.2]];
        let y = array![4usize, 4, 4, 9, 9, 9];
        let mut model = LogisticRegression::new().with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&array![[0.05], [3.15]]).unwrap(), array![4usize, 9]);
    }

    #[test]
    fn test_logistic_regression_single_class_fails() {
        let x = array![[0.0], [1.0]];
        let y = array![1usize, 1];
        let mut model = LogisticRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(HeveaError::TrainingError(_))));
    }
}
