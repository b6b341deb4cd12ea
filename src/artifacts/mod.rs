//! Artifact persistence
//!
//! Every output of training that inference depends on (the categorical
//! encoding table, the financial model, the Iris model) goes through an
//! [`ArtifactStore`]. Stores are injected, so tests can swap the filesystem
//! for [`MemoryArtifactStore`].

mod envelope;
mod store;

pub use envelope::{decode, encode, fingerprint};
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Well-known artifact names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKey {
    CategoricalEncoder,
    FinancialModel,
    IrisModel,
}

impl ArtifactKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKey::CategoricalEncoder => "categorical_encoder",
            ArtifactKey::FinancialModel => "financial_model",
            ArtifactKey::IrisModel => "iris_model",
        }
    }

    /// File name used by [`FsArtifactStore`]
    pub fn file_name(&self) -> String {
        format!("{}.bin", self.as_str())
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize `value` into an envelope and hand it to the store
pub fn save_artifact<T: Serialize>(
    store: &dyn ArtifactStore,
    key: ArtifactKey,
    value: &T,
) -> Result<()> {
    let blob = encode(key, value)?;
    store.save(key, &blob)
}

/// Read an envelope from the store and deserialize its payload
pub fn load_artifact<T: DeserializeOwned>(store: &dyn ArtifactStore, key: ArtifactKey) -> Result<T> {
    let blob = store.load(key)?;
    decode(key, &blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinHealthError;

    #[test]
    fn test_key_names() {
        assert_eq!(ArtifactKey::CategoricalEncoder.as_str(), "categorical_encoder");
        assert_eq!(ArtifactKey::FinancialModel.file_name(), "financial_model.bin");
        assert_eq!(ArtifactKey::IrisModel.to_string(), "iris_model");
    }

    #[test]
    fn test_save_then_load_through_store() {
        let store = MemoryArtifactStore::new();
        let value = vec!["a".to_string(), "b".to_string()];
        save_artifact(&store, ArtifactKey::IrisModel, &value).unwrap();

        let loaded: Vec<String> = load_artifact(&store, ArtifactKey::IrisModel).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_load_missing_artifact() {
        let store = MemoryArtifactStore::new();
        let result: Result<Vec<String>> = load_artifact(&store, ArtifactKey::FinancialModel);
        assert!(matches!(result, Err(FinHealthError::MissingArtifact(ref k)) if k == "financial_model"));
    }
}
