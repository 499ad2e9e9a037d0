//! Cross-validation runner

use super::config::{ModelType, TrainingConfig};
use super::engine::{elapsed_ms, fit_and_score, report, ProgressCallback, TrainEngine, PROGRESS_DONE};
use super::models::ModelResult;
use super::split::{k_fold_split, TrainTestSplit};
use crate::dataset::validate_classification;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CVResults {
    pub model_name: String,
    /// Scored result of every fold, in fold order
    pub fold_results: Vec<ModelResult>,
    /// Accuracy of each fold
    pub scores: Vec<f64>,
    pub mean_score: f64,
    /// Population standard deviation of `scores`
    pub std_score: f64,
    pub n_folds: usize,
}

impl CVResults {
    /// Aggregate per-fold results
    pub fn from_folds(model_name: &str, fold_results: Vec<ModelResult>) -> Self {
        let scores: Vec<f64> = fold_results.iter().map(|r| r.accuracy).collect();
        let (mean_score, std_score) = mean_and_std(&scores);

        Self {
            model_name: model_name.to_string(),
            n_folds: scores.len(),
            fold_results,
            scores,
            mean_score,
            std_score,
        }
    }
}

/// Mean and population standard deviation; zeros for an empty slice
pub fn mean_and_std(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

impl TrainEngine {
    /// Evaluate one model on `k` folds
    ///
    /// Every fold trains on its whole train partition and scores on its
    /// test partition, for every model id. Progress is reported before each
    /// fold as `(model_id, fold / k * 100)` and finally as `("completed", 100)`.
    pub fn cross_validate(
        &self,
        model_id: &str,
        x: &Array2<f64>,
        y: &Array1<usize>,
        k: usize,
        mut on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<CVResults> {
        let model = ModelType::from_id(model_id).ok_or_else(|| {
            HeveaError::ValidationError(format!("unknown model id: {}", model_id))
        })?;
        TrainingConfig::validate_folds(k)?;
        validate_classification(x, y)?;

        let mut rng = self.config().rng();
        let folds = k_fold_split(x.nrows(), k, self.config().shuffle, &mut rng)?;

        let mut fold_results = Vec::with_capacity(folds.len());
        for fold in &folds {
            report(&mut on_progress, model_id, fold.fold_idx as f64 / k as f64 * 100.0);

            let start = Instant::now();
            let data = TrainTestSplit::take(x, y, &fold.as_split());
            let metrics = fit_and_score(model, &data, rng.next_u64())?;
            let result = ModelResult::from_metrics(
                model.id(),
                model.display_name(),
                metrics,
                elapsed_ms(start),
            );

            debug!(
                model = %model_id,
                fold = fold.fold_idx,
                accuracy = result.accuracy,
                "fold scored"
            );
            fold_results.push(result);
        }

        let results = CVResults::from_folds(model.display_name(), fold_results);
        info!(
            model = %model_id,
            folds = results.n_folds,
            mean = results.mean_score,
            std = results.std_score,
            "cross-validation finished"
        );
        report(&mut on_progress, PROGRESS_DONE, 100.0);
        Ok(results)
    }
}
