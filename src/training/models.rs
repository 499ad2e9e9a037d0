//! Estimator traits and result value objects

use super::metrics::{ClassificationMetrics, RegressionMetrics};
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A classifier the orchestrator can fit and query
///
/// Tree, forest and nearest-neighbour primitives all sit behind this trait,
/// so any of them can be swapped without touching the orchestrator.
pub trait Classifier: Send {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one label per row
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;
}

/// A regressor the orchestrator can fit and query
pub trait Regressor: Send {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Outcome of training and scoring one classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    /// Short id the model was requested with
    pub model_id: String,
    /// Human readable name, flags substitute algorithms
    pub name: String,
    pub accuracy: f64,
    pub balanced_accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    /// Rows = true class, columns = predicted class
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Labels of the confusion-matrix axes
    pub classes: Vec<usize>,
    /// Wall-clock milliseconds spent splitting, fitting and predicting
    #[serde(rename = "trainingTime")]
    pub training_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cv_scores: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cv_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cv_std: Option<f64>,
}

impl ModelResult {
    pub fn from_metrics(
        model_id: &str,
        name: &str,
        metrics: ClassificationMetrics,
        training_time_ms: f64,
    ) -> Self {
        Self {
            model_id: model_id.to_string(),
            name: name.to_string(),
            accuracy: metrics.accuracy,
            balanced_accuracy: metrics.balanced_accuracy,
            f1_score: metrics.f1_score,
            precision: metrics.precision,
            recall: metrics.recall,
            confusion_matrix: metrics.confusion_matrix,
            classes: metrics.classes,
            training_time_ms,
            cv_scores: None,
            cv_mean: None,
            cv_std: None,
        }
    }

    /// Number of scored test samples
    pub fn n_test(&self) -> usize {
        self.confusion_matrix.iter().flatten().sum()
    }
}

/// Outcome of training and scoring one regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    pub name: String,
    pub r2_score: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Test-set predictions, kept for residual plots
    pub predictions: Vec<f64>,
    /// Test-set ground truth aligned with `predictions`
    pub actual: Vec<f64>,
    #[serde(rename = "trainingTime")]
    pub training_time_ms: f64,
}

impl RegressionResult {
    pub fn new(
        name: &str,
        metrics: RegressionMetrics,
        predictions: Vec<f64>,
        actual: Vec<f64>,
        training_time_ms: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            r2_score: metrics.r2,
            rmse: metrics.rmse,
            mae: metrics.mae,
            predictions,
            actual,
            training_time_ms,
        }
    }

    /// Actual minus predicted, per test sample
    pub fn residuals(&self) -> Vec<f64> {
        self.actual
            .iter()
            .zip(&self.predictions)
            .map(|(a, p)| a - p)
            .collect()
    }
}
