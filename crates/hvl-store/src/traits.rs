use hvl_types::Ledger;

use crate::error::StoreResult;
use crate::lock::WriterLock;

/// Durable home of the ledger.
///
/// All implementations must satisfy these invariants:
/// - `load()` on a store that has never been saved returns an empty ledger.
/// - `save()` replaces the whole document atomically: a concurrent or later
///   `load()` sees either the previous document or the new one, never a mix.
/// - A failed `save()` leaves the previous document intact.
/// - `save()` followed by `load()` yields an equal ledger (no field loss, no
///   reordering of custody history).
pub trait LedgerStore: Send + Sync {
    /// Read the current ledger.
    ///
    /// Returns an empty ledger if nothing has been saved yet.
    /// Returns `Err` on I/O failure or an undecodable document.
    fn load(&self) -> StoreResult<Ledger>;

    /// Atomically overwrite the durable ledger with `ledger`.
    fn save(&self, ledger: &Ledger) -> StoreResult<()>;

    /// Acquire the exclusive writer lock.
    ///
    /// Blocks until no other writer holds it. The lock is released when the
    /// returned guard is dropped.
    fn lock_exclusive(&self) -> StoreResult<WriterLock>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<S> {
    fn load(&self) -> StoreResult<Ledger> {
        (**self).load()
    }

    fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        (**self).save(ledger)
    }

    fn lock_exclusive(&self) -> StoreResult<WriterLock> {
        (**self).lock_exclusive()
    }
}
