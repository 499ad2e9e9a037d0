//! Model orchestrator
//!
//! Runs a list of requested models over one dataset, one after another, and
//! collects a scored result per model. A model that fails is logged and
//! left out; only invalid input aborts the whole run.

use super::config::{ModelType, RegressionModelType, TrainingConfig};
use super::decision_tree::DecisionTree;
use super::knn::KNNClassifier;
use super::linear_models::{LinearRegression, LogisticRegression, RidgeRegression};
use super::metrics::{ClassificationMetrics, RegressionMetrics};
use super::models::{Classifier, ModelResult, RegressionResult, Regressor};
use super::naive_bayes::GaussianNaiveBayes;
use super::neural_network::RandomProjectionMlp;
use super::random_forest::{MaxFeatures, RandomForest};
use super::split::{train_test_indices, TrainTestSplit};
use super::tree_vote::WeightedTreeVote;
use crate::dataset::{validate_classification, validate_regression};
use crate::error::Result;
use ndarray::{Array1, Array2};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Observer for `(model id, percent complete)` updates
pub type ProgressCallback<'a> = &'a mut dyn FnMut(&str, f64);

/// Id reported with the final progress update
pub const PROGRESS_DONE: &str = "completed";

pub(crate) fn report(on_progress: &mut Option<ProgressCallback<'_>>, id: &str, percent: f64) {
    if let Some(callback) = on_progress {
        callback(id, percent);
    }
}

/// Instantiate the estimator behind a classification model id
///
/// `seed` feeds every random draw the estimator makes.
pub fn build_classifier(model: ModelType, seed: u64) -> Box<dyn Classifier> {
    match model {
        ModelType::Svm => Box::new(KNNClassifier::with_k(3)),
        ModelType::Knn => Box::new(KNNClassifier::with_k(5)),
        ModelType::RandomForest => Box::new(
            RandomForest::new_classifier(100)
                .with_max_features(MaxFeatures::Fraction(0.8))
                .with_bootstrap(true)
                .with_random_state(seed),
        ),
        ModelType::XGBoost => Box::new(
            RandomForest::new_classifier(150)
                .with_max_features(MaxFeatures::All)
                .with_bootstrap(false)
                .with_random_state(seed),
        ),
        ModelType::AdaBoost => Box::new(
            RandomForest::new_classifier(50)
                .with_max_features(MaxFeatures::Fraction(0.5))
                .with_bootstrap(true)
                .with_random_state(seed),
        ),
        ModelType::Mlp => Box::new(RandomProjectionMlp::new().with_random_state(seed)),
        ModelType::DecisionTree => Box::new(
            DecisionTree::new_classifier()
                .with_max_depth(10)
                .with_random_state(seed),
        ),
        ModelType::LogisticRegression => Box::new(LogisticRegression::new()),
        ModelType::NaiveBayes => Box::new(GaussianNaiveBayes::new()),
        ModelType::GradientBoosting => Box::new(WeightedTreeVote::new(20).with_random_state(seed)),
    }
}

/// Instantiate a named regression model
pub fn build_regressor(model: RegressionModelType, seed: u64) -> Box<dyn Regressor> {
    match model {
        RegressionModelType::LinearRegression => Box::new(LinearRegression::new()),
        RegressionModelType::RidgeRegression => Box::new(RidgeRegression::default()),
        RegressionModelType::RandomForest => {
            Box::new(RandomForest::new_regressor(10).with_random_state(seed))
        }
    }
}

/// Fit on the train partition and score on the test partition
pub fn fit_and_score(
    model: ModelType,
    data: &TrainTestSplit<usize>,
    seed: u64,
) -> Result<ClassificationMetrics> {
    let mut estimator = build_classifier(model, seed);
    estimator.fit(&data.x_train, &data.y_train)?;
    let y_pred = estimator.predict(&data.x_test)?;
    ClassificationMetrics::compute(&data.y_test.to_vec(), &y_pred.to_vec())
}

/// Runs classification and regression model batches
#[derive(Debug, Clone, Default)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train and score every requested classification model
    ///
    /// Each model draws its own train/test split from the full dataset, so
    /// partitions only coincide across models in a seeded run. Unknown ids
    /// and failing models are skipped. Results come back sorted by
    /// descending accuracy.
    pub fn train_models<S: AsRef<str>>(
        &self,
        model_ids: &[S],
        x: &Array2<f64>,
        y: &Array1<usize>,
        mut on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<ModelResult>> {
        self.config.validate()?;
        validate_classification(x, y)?;

        let mut master = self.config.rng();
        let mut results = Vec::with_capacity(model_ids.len());

        for (i, id) in model_ids.iter().enumerate() {
            let id = id.as_ref();
            report(&mut on_progress, id, i as f64 / model_ids.len() as f64 * 100.0);
            let seed = master.next_u64();

            let Some(model) = ModelType::from_id(id) else {
                debug!(model = %id, "unknown model id, skipping");
                continue;
            };

            match self.train_one(model, x, y, seed) {
                Ok(result) => {
                    info!(
                        model = %id,
                        accuracy = result.accuracy,
                        elapsed_ms = result.training_time_ms,
                        "model trained"
                    );
                    results.push(result);
                }
                Err(e) => warn!(model = %id, error = %e, "model failed, skipping"),
            }
        }

        results.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
        report(&mut on_progress, PROGRESS_DONE, 100.0);
        Ok(results)
    }

    /// Split, fit and score a single model; the time covers all three
    pub fn train_one(
        &self,
        model: ModelType,
        x: &Array2<f64>,
        y: &Array1<usize>,
        seed: u64,
    ) -> Result<ModelResult> {
        let start = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let indices = train_test_indices(x.nrows(), self.config.test_size, self.config.shuffle, &mut rng)?;
        let data = TrainTestSplit::take(x, y, &indices);
        let metrics = fit_and_score(model, &data, rng.next_u64())?;

        Ok(ModelResult::from_metrics(
            model.id(),
            model.display_name(),
            metrics,
            elapsed_ms(start),
        ))
    }

    /// Train every named regression model on one shared split
    ///
    /// Results keep the order of `model_names`; unknown names and failing
    /// models are skipped.
    pub fn train_regression_models<S: AsRef<str>>(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        model_names: &[S],
    ) -> Result<Vec<RegressionResult>> {
        self.config.validate()?;
        validate_regression(x, y, self.config.min_regression_samples)?;

        let mut master = self.config.rng();
        let indices = train_test_indices(x.nrows(), self.config.test_size, self.config.shuffle, &mut master)?;
        let data = TrainTestSplit::take(x, y, &indices);

        let mut results = Vec::with_capacity(model_names.len());
        for name in model_names {
            let name = name.as_ref();
            let seed = master.next_u64();

            let Some(model) = RegressionModelType::from_name(name) else {
                debug!(model = %name, "unknown regression model, skipping");
                continue;
            };

            match fit_and_score_regression(model, &data, seed) {
                Ok(result) => {
                    info!(
                        model = %name,
                        r2 = result.r2_score,
                        rmse = result.rmse,
                        elapsed_ms = result.training_time_ms,
                        "regression model trained"
                    );
                    results.push(result);
                }
                Err(e) => warn!(model = %name, error = %e, "regression model failed, skipping"),
            }
        }

        Ok(results)
    }
}

fn fit_and_score_regression(
    model: RegressionModelType,
    data: &TrainTestSplit<f64>,
    seed: u64,
) -> Result<RegressionResult> {
    let start = Instant::now();
    let mut estimator = build_regressor(model, seed);
    estimator.fit(&data.x_train, &data.y_train)?;
    let predictions = estimator.predict(&data.x_test)?.to_vec();
    let actual = data.y_test.to_vec();
    let metrics = RegressionMetrics::compute(&actual, &predictions)?;

    Ok(RegressionResult::new(
        model.name(),
        metrics,
        predictions,
        actual,
        elapsed_ms(start),
    ))
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
