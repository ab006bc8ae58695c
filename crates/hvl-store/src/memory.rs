use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use hvl_types::Ledger;

use crate::error::{StoreError, StoreResult};
use crate::lock::WriterLock;
use crate::traits::LedgerStore;

/// In-memory ledger store.
///
/// Intended for tests and embedding. The "durable" ledger is a cloned
/// snapshot behind a `RwLock`, so callers mutate their own copy and only
/// [`save`](LedgerStore::save) publishes it, exactly like the file backend.
pub struct InMemoryLedgerStore {
    ledger: RwLock<Ledger>,
    read_only: AtomicBool,
}

impl InMemoryLedgerStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_ledger(Ledger::new())
    }

    /// Create a store pre-populated with `ledger`.
    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            read_only: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail with [`StoreError::ReadOnly`], simulating a
    /// backend that refuses writes.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Clone of the currently published ledger.
    pub fn snapshot(&self) -> StoreResult<Ledger> {
        self.load()
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> StoreResult<Ledger> {
        let ledger = self.ledger.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(ledger.clone())
    }

    fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        let mut current = self.ledger.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = ledger.clone();
        Ok(())
    }

    fn lock_exclusive(&self) -> StoreResult<WriterLock> {
        Ok(WriterLock::unlocked())
    }
}

impl std::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.ledger.read().map(|l| l.len()).unwrap_or_default();
        f.debug_struct("InMemoryLedgerStore")
            .field("batch_count", &count)
            .finish()
    }
}
