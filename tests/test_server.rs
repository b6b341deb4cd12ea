//! Integration test: Server API endpoints

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use finhealth::artifacts::{ArtifactStore, MemoryArtifactStore};
use finhealth::config::PipelineConfig;
use finhealth::server::{create_router, AppState, ServerConfig};
use finhealth::training::{GradientBoostingConfig, TrainEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_dir: PathBuf::from("unused"),
    }
}

fn app_with(store: Arc<dyn ArtifactStore>) -> axum::Router {
    create_router(Arc::new(AppState::with_store(test_config(), store)))
}

fn trained_store() -> Arc<dyn ArtifactStore> {
    let store: Arc<dyn ArtifactStore> = Arc::new(MemoryArtifactStore::new());
    let config = PipelineConfig::default()
        .with_test_size(0.3)
        .with_seed(12)
        .with_boosting(GradientBoostingConfig {
            n_estimators: 20,
            ..Default::default()
        });
    let engine = TrainEngine::new(config, store.clone());
    engine.train_financial(&common::synthetic_table(100)).unwrap();
    engine.train_iris().unwrap();
    store
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(Arc::new(MemoryArtifactStore::new()));
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["artifacts"]["financial_model"], false);
}

#[tokio::test]
async fn test_predict_before_training_is_unavailable() {
    let app = app_with(Arc::new(MemoryArtifactStore::new()));
    let response = app
        .oneshot(post_json("/api/predict", &common::sample_request_json()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("categorical_encoder"));
}

#[tokio::test]
async fn test_predict_after_training() {
    let app = app_with(trained_store());
    let response = app
        .oneshot(post_json("/api/predict", &common::sample_request_json()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let prediction = body["prediction"].as_u64().unwrap();
    assert!(prediction <= 1);
    let label = body["status_label"].as_str().unwrap();
    assert_eq!(label, if prediction == 1 { "Good" } else { "Needs Improvement" });
}

#[tokio::test]
async fn test_predict_without_loan_type_uses_default() {
    let app = app_with(trained_store());
    let mut request = common::sample_request_json();
    request.as_object_mut().unwrap().remove("loan_type");

    let response = app.oneshot(post_json("/api/predict", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_missing_field_is_bad_request() {
    let app = app_with(trained_store());
    let mut request = common::sample_request_json();
    request.as_object_mut().unwrap().remove("region");

    let response = app.oneshot(post_json("/api/predict", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_predict_iris() {
    let app = app_with(trained_store());
    let request = serde_json::json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2,
    });
    let response = app.oneshot(post_json("/api/predict/iris", &request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["species"], "setosa");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app_with(Arc::new(MemoryArtifactStore::new()));
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
