//! HTTP request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::artifacts::ArtifactKey;
use crate::inference::{FinancialRequest, FinancialResponse, IrisRequest, IrisResponse};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Malformed bodies get the same JSON error shape as every other failure
fn parse<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

/// Run a CPU-bound prediction on the blocking pool
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))?
        .map_err(ServerError::from)
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.predictor.store();
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
        "artifacts": {
            "categorical_encoder": store.exists(ArtifactKey::CategoricalEncoder),
            "financial_model": store.exists(ArtifactKey::FinancialModel),
            "iris_model": store.exists(ArtifactKey::IrisModel),
        },
    }))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<FinancialRequest>, JsonRejection>,
) -> Result<Json<FinancialResponse>> {
    let request = parse(payload)?;
    let predictor = state.predictor.clone();
    let response = blocking(move || predictor.predict(&request)).await?;
    info!(prediction = response.prediction, "Scored financial request");
    Ok(Json(response))
}

pub async fn predict_iris(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<IrisRequest>, JsonRejection>,
) -> Result<Json<IrisResponse>> {
    let request = parse(payload)?;
    let predictor = state.predictor.clone();
    let mut responses = blocking(move || predictor.predict_iris(&[request])).await?;
    let response = responses
        .pop()
        .ok_or_else(|| ServerError::Internal("model returned no prediction".to_string()))?;
    Ok(Json(response))
}
