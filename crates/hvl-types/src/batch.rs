use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of one traceable batch.
///
/// A `BatchId` is opaque: it is a lookup key into the ledger and the payload
/// carried by the batch's visual code. Freshly generated identifiers are
/// [`BatchId::GENERATED_LEN`] lowercase hex characters, but any non-empty
/// string read from a code or typed by a user is a valid key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Length in characters of a generated identifier.
    pub const GENERATED_LEN: usize = 8;

    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyBatchId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a random identifier (32 random bits, hex-encoded).
    ///
    /// Uniqueness is not guaranteed by construction; callers check the
    /// candidate against the ledger and re-roll on collision.
    pub fn random() -> Self {
        let mut bytes = [0u8; Self::GENERATED_LEN / 2];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({})", self.0)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BatchId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
