//! Training configuration and model identifiers

use crate::error::{HeveaError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration shared by the orchestrator and the cross-validation runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of samples held out for evaluation, in (0, 1)
    pub test_size: f64,
    /// Seed for every random draw of a run; `None` draws from entropy
    pub random_seed: Option<u64>,
    /// Minimum number of samples accepted by the regression path
    pub min_regression_samples: usize,
    /// Shuffle before splitting
    pub shuffle: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.3,
            random_seed: None,
            min_regression_samples: 10,
            shuffle: true,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_min_regression_samples(mut self, min_samples: usize) -> Self {
        self.min_regression_samples = min_samples;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Check the train/test parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(HeveaError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in (0, 1)".to_string(),
            });
        }
        Ok(())
    }

    /// Check a fold count for cross-validation
    pub fn validate_folds(k: usize) -> Result<()> {
        if k < 2 {
            return Err(HeveaError::InvalidParameter {
                name: "k".to_string(),
                value: k.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        Ok(())
    }

    /// Master generator for one run
    pub fn rng(&self) -> ChaCha8Rng {
        match self.random_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// Classification models reachable by id
///
/// Several entries are deliberate stand-ins for algorithms without a
/// lightweight implementation here; their display names say so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// 3-nearest-neighbours standing in for an SVM
    Svm,
    RandomForest,
    /// Random forest with all features and no bootstrap standing in for XGBoost
    XGBoost,
    Knn,
    /// Untrained random-weight forward pass, a placeholder for an MLP
    Mlp,
    /// Random forest with half the features standing in for AdaBoost
    AdaBoost,
    DecisionTree,
    LogisticRegression,
    NaiveBayes,
    /// Weighted vote of independent trees standing in for gradient boosting
    GradientBoosting,
}

impl ModelType {
    pub const ALL: [ModelType; 10] = [
        ModelType::Svm,
        ModelType::RandomForest,
        ModelType::XGBoost,
        ModelType::Knn,
        ModelType::Mlp,
        ModelType::AdaBoost,
        ModelType::DecisionTree,
        ModelType::LogisticRegression,
        ModelType::NaiveBayes,
        ModelType::GradientBoosting,
    ];

    /// Parse a short model id such as `"rf"` or `"knn"`
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "svm" => Some(ModelType::Svm),
            "rf" => Some(ModelType::RandomForest),
            "xgboost" => Some(ModelType::XGBoost),
            "knn" => Some(ModelType::Knn),
            "mlp" => Some(ModelType::Mlp),
            "ada" => Some(ModelType::AdaBoost),
            "dt" => Some(ModelType::DecisionTree),
            "lr" => Some(ModelType::LogisticRegression),
            "nb" => Some(ModelType::NaiveBayes),
            "gb" => Some(ModelType::GradientBoosting),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ModelType::Svm => "svm",
            ModelType::RandomForest => "rf",
            ModelType::XGBoost => "xgboost",
            ModelType::Knn => "knn",
            ModelType::Mlp => "mlp",
            ModelType::AdaBoost => "ada",
            ModelType::DecisionTree => "dt",
            ModelType::LogisticRegression => "lr",
            ModelType::NaiveBayes => "nb",
            ModelType::GradientBoosting => "gb",
        }
    }

    /// Name reported in results
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Svm => "SVM (KNN approximation)",
            ModelType::RandomForest => "Random Forest",
            ModelType::XGBoost => "XGBoost (RF approximation)",
            ModelType::Knn => "K-Nearest Neighbors (k=5)",
            ModelType::Mlp => "MLP (untrained forward pass)",
            ModelType::AdaBoost => "AdaBoost (RF approximation)",
            ModelType::DecisionTree => "Decision Tree",
            ModelType::LogisticRegression => "Logistic Regression",
            ModelType::NaiveBayes => "Naive Bayes",
            ModelType::GradientBoosting => "Gradient Boosting (weighted tree vote)",
        }
    }

    /// Whether the id is served by a substitute algorithm
    pub fn is_approximation(&self) -> bool {
        matches!(
            self,
            ModelType::Svm
                | ModelType::XGBoost
                | ModelType::Mlp
                | ModelType::AdaBoost
                | ModelType::GradientBoosting
        )
    }
}

/// Regression models reachable by display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegressionModelType {
    LinearRegression,
    RidgeRegression,
    RandomForest,
}

impl RegressionModelType {
    pub const ALL: [RegressionModelType; 3] = [
        RegressionModelType::LinearRegression,
        RegressionModelType::RidgeRegression,
        RegressionModelType::RandomForest,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Linear Regression" => Some(RegressionModelType::LinearRegression),
            "Ridge Regression" => Some(RegressionModelType::RidgeRegression),
            "Random Forest" => Some(RegressionModelType::RandomForest),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RegressionModelType::LinearRegression => "Linear Regression",
            RegressionModelType::RidgeRegression => "Ridge Regression",
            RegressionModelType::RandomForest => "Random Forest",
        }
    }
}
