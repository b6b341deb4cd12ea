//! Scoring against persisted artifacts

use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use std::sync::Arc;
use tracing::debug;

use super::request::{requests_to_dataframe, FinancialRequest, FinancialResponse, IrisRequest, IrisResponse};
use crate::artifacts::{ArtifactKey, ArtifactStore};
use crate::error::{FinHealthError, Result};
use crate::features::{frame_to_matrix, Server};
use crate::training::ModelArtifact;

/// Loads artifacts on every call, so a retrain is picked up without restart
#[derive(Clone)]
pub struct Predictor {
    store: Arc<dyn ArtifactStore>,
}

impl Predictor {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn ArtifactStore> {
        self.store.clone()
    }

    /// Raw 0/1 predictions for a table of raw records
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let batch = Server::new(self.store.clone()).prepare(df)?;

        let artifact = ModelArtifact::load(self.store.as_ref(), ArtifactKey::FinancialModel)?;
        artifact.verify_encoder(&batch.encoder_fingerprint)?;

        let x = frame_to_matrix(&batch.features, &artifact.feature_columns)?;
        let predictions = artifact.predict(&x)?;
        debug!(rows = predictions.len(), "Scored financial batch");
        Ok(predictions)
    }

    pub fn predict(&self, request: &FinancialRequest) -> Result<FinancialResponse> {
        let mut responses = self.predict_batch(std::slice::from_ref(request))?;
        responses
            .pop()
            .ok_or_else(|| FinHealthError::InferenceError("model returned no prediction".into()))
    }

    pub fn predict_batch(&self, requests: &[FinancialRequest]) -> Result<Vec<FinancialResponse>> {
        let df = requests_to_dataframe(requests)?;
        Ok(self
            .predict_frame(&df)?
            .iter()
            .map(|&p| FinancialResponse::from_prediction(p))
            .collect())
    }

    pub fn predict_iris(&self, requests: &[IrisRequest]) -> Result<Vec<IrisResponse>> {
        if requests.is_empty() {
            return Err(FinHealthError::InvalidInput("no measurements to classify".into()));
        }

        let artifact = ModelArtifact::load(self.store.as_ref(), ArtifactKey::IrisModel)?;
        let flat: Vec<f64> = requests.iter().flat_map(|r| r.to_row()).collect();
        let x = Array2::from_shape_vec((requests.len(), 4), flat)?;

        artifact
            .predict(&x)?
            .iter()
            .map(|&class| IrisResponse::from_class(class.round().max(0.0) as usize))
            .collect()
    }
}
