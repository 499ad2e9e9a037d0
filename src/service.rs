//! Training-service contract
//!
//! Request and response shapes shared by the HTTP server and any other
//! front end, plus the [`TrainingBackend`] seam. A remote service is just
//! another backend returning the same [`ModelResult`] list.

use crate::dataset::matrix_from_rows;
use crate::error::{HeveaError, Result};
use crate::training::{ModelResult, ModelType, TrainEngine, TrainingConfig};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn default_test_size() -> f64 {
    0.3
}

fn default_cv_folds() -> usize {
    5
}

/// Body of a training request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRequest {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub models: Vec<String>,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Folds for the per-model cross-validation; below 2 skips it
    #[serde(default = "default_cv_folds")]
    pub cross_validation: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl TrainRequest {
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>, models: Vec<String>) -> Self {
        Self {
            features,
            labels,
            models,
            test_size: default_test_size(),
            cross_validation: default_cv_folds(),
            random_seed: None,
        }
    }

    /// Reject empty or mismatched input before any model runs
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() || self.labels.is_empty() {
            return Err(HeveaError::ValidationError("empty features or labels".to_string()));
        }
        if self.features.len() != self.labels.len() {
            return Err(HeveaError::ValidationError(format!(
                "features and labels must have the same length ({} vs {})",
                self.features.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }
}

/// One entry of the model catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub available: bool,
    /// Served by a substitute algorithm
    pub approximation: bool,
}

/// Every classification model the service accepts
pub fn model_catalogue() -> Vec<ModelInfo> {
    ModelType::ALL
        .iter()
        .map(|m| ModelInfo {
            id: m.id().to_string(),
            name: m.display_name().to_string(),
            available: true,
            approximation: m.is_approximation(),
        })
        .collect()
}

/// Anything that can answer a training request
pub trait TrainingBackend: Send + Sync {
    fn train(&self, request: &TrainRequest) -> Result<Vec<ModelResult>>;
}

/// Backend running the orchestrator in-process
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    base: TrainingConfig,
}

impl LocalBackend {
    pub fn new(base: TrainingConfig) -> Self {
        Self { base }
    }

    fn engine_for(&self, request: &TrainRequest) -> TrainEngine {
        let mut config = self.base.clone().with_test_size(request.test_size);
        if let Some(seed) = request.random_seed {
            config = config.with_random_seed(seed);
        }
        TrainEngine::new(config)
    }
}

impl TrainingBackend for LocalBackend {
    fn train(&self, request: &TrainRequest) -> Result<Vec<ModelResult>> {
        request.validate()?;
        let x = matrix_from_rows(&request.features)?;
        let y = Array1::from_vec(request.labels.clone());
        let engine = self.engine_for(request);

        let mut results = engine.train_models(&request.models, &x, &y, None)?;

        if request.cross_validation >= 2 {
            for result in results.iter_mut() {
                match engine.cross_validate(&result.model_id, &x, &y, request.cross_validation, None) {
                    Ok(cv) => {
                        result.cv_mean = Some(cv.mean_score);
                        result.cv_std = Some(cv.std_score);
                        result.cv_scores = Some(cv.scores);
                    }
                    Err(e) => debug!(model = %result.model_id, error = %e, "cross-validation skipped"),
                }
            }
        }

        info!(
            requested = request.models.len(),
            trained = results.len(),
            samples = x.nrows(),
            "training request served"
        );
        Ok(results)
    }
}
