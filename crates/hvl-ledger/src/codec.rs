//! Boundary to the external visual-code collaborator.
//!
//! The ledger never renders or reads images itself. It hands a batch
//! identifier to an [`IdentifierCodec`] for encoding and receives one back
//! from decoding. The only semantic requirement is round-trip fidelity:
//! `decode(encode(id)) == id`.

use hvl_types::BatchId;

/// Encodes batch identifiers into a scannable image and back.
pub trait IdentifierCodec {
    /// The codec's image representation.
    type Image;

    /// Produce a scannable encoding of `id`.
    fn encode(&self, id: &BatchId) -> Result<Self::Image, CodecError>;

    /// Extract the identifier carried by `image`.
    ///
    /// Returns [`CodecError::NoCodeFound`] if nothing readable is present.
    fn decode(&self, image: &Self::Image) -> Result<BatchId, CodecError>;
}

/// Errors from encoding or decoding visual codes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The image contains no readable code.
    #[error("no identifier code found in image")]
    NoCodeFound,

    /// A code was read but its payload is not a usable identifier.
    #[error("decoded payload is not a batch identifier: {0:?}")]
    InvalidPayload(String),

    /// Reading or writing the image failed.
    #[error("image I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The encoder rejected the identifier or could not render it.
    #[error("encoding failed: {0}")]
    Encoding(String),
}
