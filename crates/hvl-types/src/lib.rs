//! Foundation types for the Harvest Ledger (HVL).
//!
//! This crate provides the identity, provenance and custody types used
//! throughout the HVL workspace. Every other HVL crate depends on `hvl-types`.
//!
//! # Key Types
//!
//! - [`BatchId`] -- Opaque identifier of one traceable batch
//! - [`Origin`] -- Immutable creation-time snapshot (crop, quantity, location, date)
//! - [`CustodyEvent`] -- One ownership/price transfer in the custody chain
//! - [`BatchRecord`] -- Full provenance record with its content hash
//! - [`ContentHash`] -- Hex digest sealing a record's fields
//! - [`EventTime`] -- RFC 3339 custody timestamp, parsed on demand
//! - [`Ledger`] -- The complete `BatchId → BatchRecord` collection

pub mod batch;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod record;
pub mod temporal;

pub use batch::BatchId;
pub use error::TypeError;
pub use hash::ContentHash;
pub use ledger::Ledger;
pub use record::{BatchRecord, CustodyEvent, ExtraFields, HashableRecord, Origin};
pub use temporal::{next_event_time, EventTime};
