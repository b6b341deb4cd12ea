//! Trained model artifacts

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{DecisionTree, GradientBoostedTrees};
use crate::artifacts::{self, ArtifactKey, ArtifactStore};
use crate::error::{FinHealthError, Result};

/// Common surface of the fitted classifiers
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
    fn n_features(&self) -> usize;
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        DecisionTree::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        DecisionTree::predict(self, x)
    }

    fn n_features(&self) -> usize {
        DecisionTree::n_features(self)
    }
}

impl Classifier for GradientBoostedTrees {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        GradientBoostedTrees::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        GradientBoostedTrees::predict(self, x)
    }

    fn n_features(&self) -> usize {
        GradientBoostedTrees::n_features(self)
    }
}

/// Fitted model variants that can be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    DecisionTree(DecisionTree),
    GradientBoostedTrees(GradientBoostedTrees),
}

impl TrainedModel {
    pub fn name(&self) -> &'static str {
        match self {
            TrainedModel::DecisionTree(_) => "decision_tree",
            TrainedModel::GradientBoostedTrees(_) => "gradient_boosted_trees",
        }
    }

    fn classifier(&self) -> &dyn Classifier {
        match self {
            TrainedModel::DecisionTree(m) => m,
            TrainedModel::GradientBoostedTrees(m) => m,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.classifier().predict(x)
    }

    pub fn n_features(&self) -> usize {
        self.classifier().n_features()
    }
}

/// A fitted model plus what it needs to be served safely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: TrainedModel,
    /// Input columns in the order the model was fitted on
    pub feature_columns: Vec<String>,
    /// Fingerprint of the encoder whose output the model was fitted on.
    /// `None` for models trained on raw numeric input.
    pub encoder_fingerprint: Option<String>,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(model: TrainedModel, feature_columns: Vec<String>, encoder_fingerprint: Option<String>) -> Self {
        Self {
            model,
            feature_columns,
            encoder_fingerprint,
            trained_at: Utc::now(),
        }
    }

    /// Fail with `ArtifactMismatch` unless `fingerprint` is the encoder this
    /// model was trained against
    pub fn verify_encoder(&self, fingerprint: &str) -> Result<()> {
        match &self.encoder_fingerprint {
            Some(expected) if expected == fingerprint => Ok(()),
            Some(expected) => Err(FinHealthError::ArtifactMismatch {
                model_encoder: expected.clone(),
                stored_encoder: fingerprint.to_string(),
            }),
            None => Err(FinHealthError::ArtifactMismatch {
                model_encoder: "<none>".to_string(),
                stored_encoder: fingerprint.to_string(),
            }),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.feature_columns.len() {
            return Err(FinHealthError::ShapeError {
                expected: format!("{} features", self.feature_columns.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        self.model.predict(x)
    }

    pub fn save(&self, store: &dyn ArtifactStore, key: ArtifactKey) -> Result<()> {
        artifacts::save_artifact(store, key, self)?;
        info!(key = %key, model = self.model.name(), features = self.feature_columns.len(), "Saved model");
        Ok(())
    }

    pub fn load(store: &dyn ArtifactStore, key: ArtifactKey) -> Result<Self> {
        artifacts::load_artifact(store, key)
    }
}
