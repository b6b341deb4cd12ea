//! Binary artifact envelope
//!
//! Payloads are `bincode`-encoded and wrapped with magic bytes, a format
//! version, the artifact name and an FNV-1a checksum. Any mismatch on load is
//! a `SerializationError`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactKey;
use crate::error::{FinHealthError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactEnvelope {
    magic: [u8; 4],
    format_version: u32,
    key: String,
    checksum: u64,
    payload: Vec<u8>,
}

impl ArtifactEnvelope {
    const MAGIC: [u8; 4] = [b'F', b'H', b'A', b'F'];
    const VERSION: u32 = 1;

    fn new(key: ArtifactKey, payload: Vec<u8>) -> Self {
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            key: key.as_str().to_string(),
            checksum: fnv1a(&payload),
            payload,
        }
    }

    fn verify(&self, key: ArtifactKey) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(FinHealthError::SerializationError(format!(
                "{} is not a finhealth artifact",
                key
            )));
        }
        if self.format_version != Self::VERSION {
            return Err(FinHealthError::SerializationError(format!(
                "{} has format version {}, expected {}",
                key,
                self.format_version,
                Self::VERSION
            )));
        }
        if self.key != key.as_str() {
            return Err(FinHealthError::SerializationError(format!(
                "expected artifact {}, found {}",
                key, self.key
            )));
        }
        if fnv1a(&self.payload) != self.checksum {
            return Err(FinHealthError::SerializationError(format!(
                "checksum mismatch in {}",
                key
            )));
        }
        Ok(())
    }
}

fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Encode a value as an enveloped artifact blob
pub fn encode<T: Serialize>(key: ArtifactKey, value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    let envelope = ArtifactEnvelope::new(key, payload);
    Ok(bincode::serialize(&envelope)?)
}

/// Decode an artifact blob produced by [`encode`]
pub fn decode<T: DeserializeOwned>(key: ArtifactKey, blob: &[u8]) -> Result<T> {
    let envelope: ArtifactEnvelope = bincode::deserialize(blob).map_err(|e| {
        FinHealthError::SerializationError(format!("corrupt artifact {}: {}", key, e))
    })?;
    envelope.verify(key)?;
    Ok(bincode::deserialize(&envelope.payload)?)
}

/// Hex SHA-256 of a value's serialized form
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String> {
    let bytes = bincode::serialize(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_key_rejected() {
        let blob = encode(ArtifactKey::IrisModel, &42u32).unwrap();
        let result: Result<u32> = decode(ArtifactKey::FinancialModel, &blob);
        assert!(matches!(result, Err(FinHealthError::SerializationError(_))));
    }

    #[test]
    fn test_corrupt_payload_rejected() {
        let mut blob = encode(ArtifactKey::IrisModel, &vec![1u64, 2, 3]).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        let result: Result<Vec<u64>> = decode(ArtifactKey::IrisModel, &blob);
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let result: Result<u32> = decode(ArtifactKey::IrisModel, b"not an artifact");
        assert!(result.is_err());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&vec!["x", "y"]).unwrap();
        let b = fingerprint(&vec!["x", "y"]).unwrap();
        let c = fingerprint(&vec!["y", "x"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
