//! Hevea ML - evaluation engine for SNP marker data
//!
//! This crate trains and scores classical machine-learning models over
//! numeric marker matrices:
//! - Classification and regression metrics
//! - Train/test and k-fold splitting
//! - A catalogue of base estimators behind common traits
//! - A model orchestrator and a cross-validation runner
//! - An HTTP training service and a command-line front end
//!
//! # Modules
//!
//! - [`training`] - Metrics, splitting, estimators, orchestration
//! - [`dataset`] - Input validation and data preparation
//! - [`service`] - Training-service request/response contract
//! - [`server`] - HTTP server exposing the training service
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod dataset;
pub mod training;

// Services
pub mod service;
pub mod server;
pub mod cli;

pub use error::{HeveaError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HeveaError, Result};

    pub use crate::dataset::{matrix_from_rows, Dataset};

    pub use crate::training::{
        CVResults, Classifier, ClassificationMetrics, ModelResult, ModelType, RegressionMetrics,
        RegressionModelType, RegressionResult, Regressor, TrainEngine, TrainingConfig,
    };

    pub use crate::service::{LocalBackend, TrainRequest, TrainingBackend};
}
