//! finhealth - financial condition classifier
//!
//! Trains a binary classifier that flags whether an individual is in good
//! financial condition, and serves it behind a CLI and an HTTP API. The core
//! of the crate is the feature gateway in [`features`]: training and serving
//! run the same selection and encoding rules, so a model never sees features
//! shaped differently from the ones it was fitted on.
//!
//! # Modules
//!
//! - [`features`] - Label derivation, column selection, categorical encoding
//! - [`training`] - Decision tree, boosted trees, metrics, training engine
//! - [`inference`] - Request payloads and the artifact-backed predictor
//! - [`artifacts`] - Persisted encoder and model storage
//! - [`dataset`] - CSV loading and the bundled Iris dataset
//! - [`config`] - Pipeline configuration
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

pub mod error;

pub use error::{FinHealthError, Result};

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod features;
pub mod inference;
pub mod training;

pub mod cli;
pub mod server;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{FinHealthError, Result};

    pub use crate::artifacts::{ArtifactKey, ArtifactStore, FsArtifactStore, MemoryArtifactStore};
    pub use crate::config::PipelineConfig;
    pub use crate::features::{
        derive_labels, engineer, CategoricalEncoder, FeatureSelector, LabelDeriver, Mode, Server,
        Trainer,
    };
    pub use crate::inference::{FinancialRequest, FinancialResponse, Predictor};
    pub use crate::training::{
        train_test_split, ClassificationReport, Classifier, DecisionTree, GradientBoostedTrees,
        GradientBoostingConfig, ModelArtifact, TrainEngine,
    };
}
