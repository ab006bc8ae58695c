//! Traceability service for the Harvest Ledger (HVL).
//!
//! This crate is the heart of HVL. It provides:
//! - [`TraceabilityService`]: batch creation, custody updates and journey
//!   queries, each run as one serialized load-mutate-save cycle
//! - The [`IdentifierCodec`] boundary to external visual-code encoders
//! - Integrity verification of single batches and the whole ledger
//! - A classified error taxonomy ([`TraceError`], [`ErrorKind`])

pub mod clock;
pub mod codec;
pub mod error;
pub mod ids;
pub mod service;
pub mod verify;

pub use clock::{Clock, SystemClock};
pub use codec::{CodecError, IdentifierCodec};
pub use error::{ErrorKind, TraceError};
pub use ids::{IdGenerator, RandomIds};
pub use service::{BatchSummary, TraceabilityService, MAX_ID_ATTEMPTS};
pub use verify::{IntegrityReport, LedgerReport, Violation, ViolationKind};
