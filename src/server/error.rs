//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::FinHealthError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FinHealthError> for ServerError {
    fn from(err: FinHealthError) -> Self {
        match err {
            FinHealthError::SchemaMismatch { .. }
            | FinHealthError::InvalidInput(_)
            | FinHealthError::ValidationError(_)
            | FinHealthError::FeatureNotFound(_)
            | FinHealthError::ShapeError { .. }
            | FinHealthError::DataError(_) => ServerError::BadRequest(err.to_string()),
            FinHealthError::MissingArtifact(_) => ServerError::Unavailable(err.to_string()),
            FinHealthError::ArtifactMismatch { .. } => ServerError::Conflict(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Unavailable(msg) => {
                tracing::warn!(detail = %msg, "Model artifacts unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            ServerError::Conflict(msg) => {
                tracing::error!(detail = %msg, "Model and encoder out of step");
                (StatusCode::CONFLICT, msg.clone())
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred".to_string())
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
