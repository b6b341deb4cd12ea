//! Training and batch evaluation entry points

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::{
    train_test_split, ClassificationReport, DecisionTree, GradientBoostedTrees, ModelArtifact,
    TrainedModel,
};
use crate::artifacts::{ArtifactKey, ArtifactStore, FsArtifactStore};
use crate::config::PipelineConfig;
use crate::dataset::{load_iris, DataLoader, IRIS_FEATURES};
use crate::error::Result;
use crate::features::{derive_labels, frame_to_matrix, Server, Trainer};

/// Outcome of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model: String,
    pub n_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_columns: Vec<String>,
    /// Held-out metrics for the freshly fitted model
    pub test_report: ClassificationReport,
    pub training_time_secs: f64,
}

/// Trains, persists and evaluates the pipeline's models
#[derive(Clone)]
pub struct TrainEngine {
    config: PipelineConfig,
    store: Arc<dyn ArtifactStore>,
}

impl TrainEngine {
    pub fn new(config: PipelineConfig, store: Arc<dyn ArtifactStore>) -> Self {
        Self { config, store }
    }

    /// Engine persisting to `config.model_dir`
    pub fn from_config(config: PipelineConfig) -> Self {
        let store = Arc::new(FsArtifactStore::new(config.model_dir.clone()));
        Self::new(config, store)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn ArtifactStore> {
        self.store.clone()
    }

    fn load_training_data(&self) -> Result<DataFrame> {
        DataLoader::new().load_auto(&self.config.data_path)
    }

    /// Train on the configured CSV
    pub fn train_financial_from_path(&self) -> Result<TrainingSummary> {
        let df = self.load_training_data()?;
        self.train_financial(&df)
    }

    /// Fit the encoder and booster on `df`, persisting both.
    ///
    /// Nothing is written until the booster has been fitted and scored, so a
    /// failed run leaves the previously deployed pair untouched.
    pub fn train_financial(&self, df: &DataFrame) -> Result<TrainingSummary> {
        self.config.validate()?;
        let start = Instant::now();

        let batch = Trainer::new().engineer(df)?;
        let feature_columns = batch.encoder.feature_columns().to_vec();
        let x = frame_to_matrix(&batch.features, &feature_columns)?;

        let split = train_test_split(&x, &batch.labels, self.config.test_size, self.config.random_seed)?;

        let mut model = GradientBoostedTrees::new(self.config.boosting.clone());
        model.fit(&split.x_train, &split.y_train)?;
        let test_report = ClassificationReport::compute(&split.y_test, &model.predict(&split.x_test)?)?;

        let artifact = ModelArtifact::new(
            TrainedModel::GradientBoostedTrees(model),
            feature_columns.clone(),
            Some(batch.encoder.fingerprint()?),
        );
        batch.encoder.save(self.store.as_ref())?;
        artifact.save(self.store.as_ref(), ArtifactKey::FinancialModel)?;

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            rows = x.nrows(),
            train_rows = split.x_train.nrows(),
            test_rows = split.x_test.nrows(),
            accuracy = test_report.accuracy,
            secs = training_time_secs,
            "Trained financial model"
        );

        Ok(TrainingSummary {
            model: artifact.model.name().to_string(),
            n_rows: x.nrows(),
            train_rows: split.x_train.nrows(),
            test_rows: split.x_test.nrows(),
            feature_columns,
            test_report,
            training_time_secs,
        })
    }

    /// Evaluate the persisted model on the configured CSV
    pub fn evaluate_financial_from_path(&self) -> Result<ClassificationReport> {
        let df = self.load_training_data()?;
        self.evaluate_financial(&df)
    }

    /// Rebuild features through the serving path, reproduce the split and
    /// score the persisted model on the held-out rows
    pub fn evaluate_financial(&self, df: &DataFrame) -> Result<ClassificationReport> {
        self.config.validate()?;

        let labels = derive_labels(df)?;
        let batch = Server::new(self.store.clone()).prepare(df)?;

        let artifact = ModelArtifact::load(self.store.as_ref(), ArtifactKey::FinancialModel)?;
        artifact.verify_encoder(&batch.encoder_fingerprint)?;

        let x = frame_to_matrix(&batch.features, &artifact.feature_columns)?;
        let split = train_test_split(&x, &labels, self.config.test_size, self.config.random_seed)?;

        let report = ClassificationReport::compute(&split.y_test, &artifact.predict(&split.x_test)?)?;
        info!(
            test_rows = split.x_test.nrows(),
            accuracy = report.accuracy,
            "Evaluated financial model"
        );
        Ok(report)
    }

    /// Fit the Iris decision tree on the bundled dataset
    pub fn train_iris(&self) -> Result<TrainingSummary> {
        self.config.validate()?;
        let start = Instant::now();

        let (x, y) = load_iris()?;
        let split = train_test_split(&x, &y, self.config.test_size, self.config.random_seed)?;

        let mut tree = DecisionTree::new().with_max_depth(self.config.iris_max_depth);
        tree.fit(&split.x_train, &split.y_train)?;
        let test_report = ClassificationReport::compute(&split.y_test, &tree.predict(&split.x_test)?)?;

        let feature_columns: Vec<String> = IRIS_FEATURES.iter().map(|s| s.to_string()).collect();
        let artifact = ModelArtifact::new(TrainedModel::DecisionTree(tree), feature_columns.clone(), None);
        artifact.save(self.store.as_ref(), ArtifactKey::IrisModel)?;

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(accuracy = test_report.accuracy, "Trained iris model");

        Ok(TrainingSummary {
            model: artifact.model.name().to_string(),
            n_rows: x.nrows(),
            train_rows: split.x_train.nrows(),
            test_rows: split.x_test.nrows(),
            feature_columns,
            test_report,
            training_time_secs,
        })
    }
}
