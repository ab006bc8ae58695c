use hvl_crypto::HasherError;
use hvl_store::StoreError;
use hvl_types::{BatchId, ContentHash};

use crate::codec::CodecError;

/// Errors produced by traceability operations.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("batch not found: {0}")]
    BatchNotFound(BatchId),

    #[error("no identifier code found in image")]
    NoCodeFound,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("no unique batch identifier after {attempts} attempts")]
    DuplicateIdentifier { attempts: usize },

    #[error("batch {batch_id} failed integrity check: stored hash {stored}, computed {computed}")]
    IntegrityViolation {
        batch_id: BatchId,
        stored: ContentHash,
        computed: ContentHash,
    },

    #[error("hashing failed: {0}")]
    Hashing(#[from] HasherError),

    #[error("identifier codec failure: {0}")]
    Codec(CodecError),
}

/// Caller-facing classification of a [`TraceError`].
///
/// Every failure maps to exactly one kind, so presentation layers can give a
/// specific message without matching on every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced batch is not in the ledger.
    BatchNotFound,
    /// Nothing readable was found in a scanned image.
    NoCodeFound,
    /// Durable storage (or image file) I/O failed.
    StorageIo,
    /// Identifier allocation kept colliding.
    DuplicateIdentifier,
    /// A stored record no longer matches its content hash.
    Integrity,
}

impl TraceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BatchNotFound(_) => ErrorKind::BatchNotFound,
            Self::NoCodeFound => ErrorKind::NoCodeFound,
            Self::Storage(_) | Self::Hashing(_) => ErrorKind::StorageIo,
            Self::DuplicateIdentifier { .. } => ErrorKind::DuplicateIdentifier,
            Self::IntegrityViolation { .. } => ErrorKind::Integrity,
            Self::Codec(CodecError::InvalidPayload(_)) => ErrorKind::NoCodeFound,
            Self::Codec(_) => ErrorKind::StorageIo,
        }
    }
}

impl From<CodecError> for TraceError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::NoCodeFound => Self::NoCodeFound,
            other => Self::Codec(other),
        }
    }
}
