//! Artifact store implementations

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ArtifactKey;
use crate::error::{FinHealthError, Result};

/// Durable storage for training outputs
pub trait ArtifactStore: Send + Sync {
    /// Read the full blob for `key`; `MissingArtifact` if it was never saved
    fn load(&self, key: ArtifactKey) -> Result<Vec<u8>>;

    /// Replace the blob for `key`
    fn save(&self, key: ArtifactKey, blob: &[u8]) -> Result<()>;

    /// Whether `key` has been saved
    fn exists(&self, key: ArtifactKey) -> bool;
}

/// Store backed by one file per artifact under a model directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn load(&self, key: ArtifactKey) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(artifact = %key, path = %path.display(), bytes = bytes.len(), "Loaded artifact");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FinHealthError::MissingArtifact(key.as_str().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: ArtifactKey, blob: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Readers must never see a half-written artifact
        let tmp = self.root.join(format!(".{}.tmp", key.file_name()));
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        debug!(artifact = %key, path = %path.display(), bytes = blob.len(), "Saved artifact");
        Ok(())
    }

    fn exists(&self, key: ArtifactKey) -> bool {
        self.path_for(key).is_file()
    }
}

/// In-process store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RwLock<HashMap<ArtifactKey, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn load(&self, key: ArtifactKey) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| FinHealthError::MissingArtifact(key.as_str().to_string()))
    }

    fn save(&self, key: ArtifactKey, blob: &[u8]) -> Result<()> {
        self.blobs.write().insert(key, blob.to_vec());
        Ok(())
    }

    fn exists(&self, key: ArtifactKey) -> bool {
        self.blobs.read().contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_store_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().join("model"));

        assert!(!store.exists(ArtifactKey::CategoricalEncoder));
        store.save(ArtifactKey::CategoricalEncoder, b"first").unwrap();
        store.save(ArtifactKey::CategoricalEncoder, b"second").unwrap();

        assert!(store.exists(ArtifactKey::CategoricalEncoder));
        assert_eq!(store.load(ArtifactKey::CategoricalEncoder).unwrap(), b"second");
        assert!(dir.path().join("model/categorical_encoder.bin").is_file());
    }

    #[test]
    fn test_fs_store_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        let err = store.load(ArtifactKey::IrisModel).unwrap_err();
        assert!(matches!(err, FinHealthError::MissingArtifact(_)));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryArtifactStore::new();
        assert!(!store.exists(ArtifactKey::FinancialModel));
        store.save(ArtifactKey::FinancialModel, &[1, 2, 3]).unwrap();
        assert_eq!(store.load(ArtifactKey::FinancialModel).unwrap(), vec![1, 2, 3]);
    }
}
