use hvl_types::ContentHash;

use crate::canonical::canonical_bytes;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag (`"hvl-batch-v1"`) and a `:` are hashed ahead of the
/// data, so a record digest never equals a plain BLAKE3 of the same bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for batch records.
    pub const BATCH: Self = Self {
        domain: "hvl-batch-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_digest(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value through its canonical JSON encoding.
    pub fn hash_canonical<T: serde::Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<ContentHash, HasherError> {
        Ok(self.hash(&canonical_bytes(value)?))
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
