//! Error types for the finhealth pipeline

use thiserror::Error;

/// Result type alias for finhealth operations
pub type Result<T> = std::result::Result<T, FinHealthError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum FinHealthError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Artifact not found: {0} (run training first)")]
    MissingArtifact(String),

    #[error("Schema mismatch: expected columns [{}], got [{}]", expected.join(", "), actual.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Artifact mismatch: model was trained against encoder {model_encoder}, stored encoder is {stored_encoder}")]
    ArtifactMismatch {
        model_encoder: String,
        stored_encoder: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for FinHealthError {
    fn from(err: polars::error::PolarsError) -> Self {
        FinHealthError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FinHealthError {
    fn from(err: serde_json::Error) -> Self {
        FinHealthError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for FinHealthError {
    fn from(err: bincode::Error) -> Self {
        FinHealthError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FinHealthError {
    fn from(err: ndarray::ShapeError) -> Self {
        FinHealthError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
