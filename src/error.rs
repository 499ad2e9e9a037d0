//! Error types for the hevea-ml engine

use thiserror::Error;

/// Result type alias for hevea-ml operations
pub type Result<T> = std::result::Result<T, HeveaError>;

/// Main error type for the engine
///
/// The split between [`HeveaError::ValidationError`] and
/// [`HeveaError::TrainingError`] is what the orchestrator relies on:
/// validation errors abort a whole request, training errors only drop the
/// model that raised them.
#[derive(Error, Debug)]
pub enum HeveaError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HeveaError {
    /// True for errors the caller has to fix before retrying.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            HeveaError::ValidationError(_)
                | HeveaError::ShapeError { .. }
                | HeveaError::InvalidParameter { .. }
        )
    }
}

impl From<serde_json::Error> for HeveaError {
    fn from(err: serde_json::Error) -> Self {
        HeveaError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HeveaError {
    fn from(err: ndarray::ShapeError) -> Self {
        HeveaError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeveaError::ValidationError("insufficient classes".to_string());
        assert_eq!(err.to_string(), "Validation error: insufficient classes");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HeveaError = io_err.into();
        assert!(matches!(err, HeveaError::IoError(_)));
    }

    #[test]
    fn test_validation_classification() {
        assert!(HeveaError::ValidationError("x".into()).is_validation());
        assert!(HeveaError::ShapeError { expected: "3".into(), actual: "2".into() }.is_validation());
        assert!(!HeveaError::TrainingError("diverged".into()).is_validation());
        assert!(!HeveaError::ModelNotFitted.is_validation());
    }
}
