//! Durable ledger storage for the Harvest Ledger.
//!
//! The ledger is a single document mapping batch identifiers to batch
//! records. It is read whole with [`LedgerStore::load`] and replaced whole
//! with [`LedgerStore::save`].
//!
//! # Storage Backends
//!
//! All backends implement the [`LedgerStore`] trait:
//!
//! - [`JsonFileStore`] -- pretty-printed JSON file, atomic replace, `fs2` writer lock
//! - [`InMemoryLedgerStore`] -- `RwLock`-guarded ledger for tests and embedding
//!
//! # Design Rules
//!
//! 1. A missing document is an empty ledger, not an error.
//! 2. A save either fully replaces the document or leaves the previous one intact.
//! 3. Mutating callers hold the [`WriterLock`] across load, mutate and save.
//! 4. The store never interprets records -- integrity checks live above it.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use lock::WriterLock;
pub use memory::InMemoryLedgerStore;
pub use traits::LedgerStore;
