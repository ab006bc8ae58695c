//! Content hashing for the Harvest Ledger.
//!
//! Provides canonical (key-sorted) JSON serialization, domain-separated
//! BLAKE3 hashing, and the sealing/verification of batch records.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod canonical;
pub mod hasher;
pub mod seal;

pub use canonical::canonical_bytes;
pub use hasher::{ContentHasher, HasherError};
pub use seal::{RecordCheck, RecordHasher};
