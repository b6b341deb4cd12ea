//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::training::GradientBoostingConfig;

/// Configuration shared by the training, evaluation and inference entry points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Training CSV location
    pub data_path: PathBuf,

    /// Directory holding the persisted artifacts
    pub model_dir: PathBuf,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test shuffle
    pub random_seed: u64,

    /// Booster settings for the financial model
    pub boosting: GradientBoostingConfig,

    /// Depth limit for the Iris decision tree
    pub iris_max_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: std::env::var("FINHEALTH_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/final_data.csv")),
            model_dir: std::env::var("FINHEALTH_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model")),
            test_size: std::env::var("FINHEALTH_TEST_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.3),
            random_seed: std::env::var("FINHEALTH_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(12),
            boosting: GradientBoostingConfig::default(),
            iris_max_depth: 3,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the training data path
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Builder method to set the artifact directory
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the split seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Builder method to replace the booster settings
    pub fn with_boosting(mut self, boosting: GradientBoostingConfig) -> Self {
        self.boosting = boosting;
        self
    }

    /// Check value ranges before a run starts
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(crate::FinHealthError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.iris_max_depth == 0 {
            return Err(crate::FinHealthError::ConfigError(
                "iris_max_depth must be at least 1".to_string(),
            ));
        }
        self.boosting.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_data_path("/tmp/data.csv")
            .with_model_dir("/tmp/models")
            .with_test_size(0.25)
            .with_seed(7);

        assert_eq!(config.data_path, PathBuf::from("/tmp/data.csv"));
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_test_size() {
        let config = PipelineConfig::new().with_test_size(1.0);
        assert!(config.validate().is_err());
    }
}
