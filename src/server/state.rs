//! Application state management

use std::sync::Arc;

use crate::artifacts::{ArtifactStore, FsArtifactStore};
use crate::inference::Predictor;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Holds no model: every request reloads the persisted artifacts.
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Predictor,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// State serving artifacts from `config.model_dir`
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(FsArtifactStore::new(config.model_dir.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            config,
            predictor: Predictor::new(store),
            started_at: chrono::Utc::now(),
        }
    }
}
