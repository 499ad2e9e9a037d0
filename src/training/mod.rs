//! Model training module
//!
//! Provides the evaluation core:
//! - Classification and regression metrics
//! - Train/test and k-fold splitting
//! - Base estimators (linear models, naive Bayes, decision trees, random
//!   forests, KNN, a weighted tree vote and a small neural network)
//! - The model orchestrator and the cross-validation runner

mod config;
mod engine;
mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod knn;
pub mod linear_models;
pub mod metrics;
pub mod naive_bayes;
pub mod neural_network;
pub mod random_forest;
pub mod scaler;
pub mod split;
pub mod tree_vote;

pub use config::{ModelType, RegressionModelType, TrainingConfig};
pub use cross_validation::{mean_and_std, CVResults};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use engine::{
    build_classifier, build_regressor, fit_and_score, ProgressCallback, TrainEngine, PROGRESS_DONE,
};
pub use knn::KNNClassifier;
pub use linear_models::{LinearRegression, LogisticRegression, RidgeRegression};
pub use metrics::{class_set, confusion_matrix, ClassificationMetrics, RegressionMetrics};
pub use models::{Classifier, ModelResult, RegressionResult, Regressor};
pub use naive_bayes::GaussianNaiveBayes;
pub use neural_network::{
    Activation, EpochMetrics, LayerConfig, NetworkConfig, NetworkExport, NeuralNetwork,
    RandomProjectionMlp,
};
pub use random_forest::{MaxFeatures, RandomForest};
pub use scaler::StandardScaler;
pub use split::{k_fold_split, train_test_indices, train_test_split, Fold, SplitIndices, TrainTestSplit};
pub use tree_vote::WeightedTreeVote;
