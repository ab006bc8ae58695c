use std::fmt;

use serde::{Deserialize, Serialize};

/// Hex digest sealing a [`BatchRecord`](crate::BatchRecord).
///
/// Stored as the lowercase hex string found in the ledger document rather
/// than as raw bytes: a tampered or malformed value must still load so that
/// integrity verification can report it, instead of failing the whole ledger.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Number of hex characters in a well-formed digest.
    pub const HEX_LEN: usize = 64;

    /// Build from a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// The placeholder carried by a record that has not been sealed yet.
    pub fn unsealed() -> Self {
        Self(String::new())
    }

    /// Returns `true` if no digest has been written.
    pub fn is_unsealed(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> &str {
        let end = self.0.len().min(8);
        &self.0[..end]
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
