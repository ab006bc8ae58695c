//! Batch creation, custody updates and journey queries.
//!
//! Every mutating operation runs as one load-mutate-save cycle while holding
//! both an in-process write gate and the store's exclusive writer lock, so
//! two racing updates are applied one after the other and neither custody
//! event is lost. Reads take no lock: they see the last completed save.

use std::sync::{Mutex, PoisonError};

use hvl_crypto::RecordHasher;
use hvl_store::LedgerStore;
use hvl_types::{next_event_time, BatchId, BatchRecord, CustodyEvent, Ledger, Origin};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::codec::IdentifierCodec;
use crate::error::TraceError;
use crate::ids::{IdGenerator, RandomIds};
use crate::verify::{inspect_ledger, inspect_record, IntegrityReport, LedgerReport};

/// Identifier candidates drawn before giving up with
/// [`TraceError::DuplicateIdentifier`].
pub const MAX_ID_ATTEMPTS: usize = 16;

/// One line of a ledger listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub crop: String,
    pub events: usize,
    pub current_owner: Option<String>,
    pub intact: bool,
}

/// Orchestrates batch operations against a [`LedgerStore`].
pub struct TraceabilityService<S> {
    store: S,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    write_gate: Mutex<()>,
}

impl<S: LedgerStore> TraceabilityService<S> {
    /// Service with random identifiers and the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: Box::new(RandomIds),
            clock: Box::new(SystemClock),
            write_gate: Mutex::new(()),
        }
    }

    /// Replace the identifier source.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new batch and return its identifier.
    ///
    /// Origin values are stored verbatim. On success the batch is durably
    /// recorded with an empty history and a fresh seal.
    pub fn create_batch(
        &self,
        crop: &str,
        quantity: &str,
        location: &str,
        date: &str,
    ) -> Result<BatchId, TraceError> {
        let origin = Origin::new(crop, quantity, location, date);
        let record = self.write_cycle(|ledger| {
            let batch_id = self.allocate_id(ledger)?;
            let mut record = BatchRecord::new(batch_id, origin);
            RecordHasher::seal(&mut record)?;
            ledger.insert(record.clone());
            Ok(record)
        })?;

        info!(
            batch_id = %record.batch_id(),
            crop = %record.origin().crop,
            hash = record.content_hash().short_hex(),
            "batch created"
        );
        Ok(record.batch_id().clone())
    }

    /// Create a batch and encode its identifier with `codec`.
    ///
    /// The batch is already durable when encoding runs; an encoding failure
    /// is reported but does not roll the batch back.
    pub fn issue_batch<C: IdentifierCodec>(
        &self,
        crop: &str,
        quantity: &str,
        location: &str,
        date: &str,
        codec: &C,
    ) -> Result<(BatchId, C::Image), TraceError> {
        let batch_id = self.create_batch(crop, quantity, location, date)?;
        let image = codec.encode(&batch_id)?;
        Ok((batch_id, image))
    }

    /// Append a custody event to an existing batch and reseal it.
    ///
    /// Fails with [`TraceError::BatchNotFound`] without touching storage if
    /// the batch does not exist, and with [`TraceError::IntegrityViolation`]
    /// if the stored record no longer matches its hash (resealing it would
    /// hide the tampering).
    pub fn update_batch(
        &self,
        batch_id: &BatchId,
        owner: &str,
        price: &str,
    ) -> Result<BatchRecord, TraceError> {
        let record = self.write_cycle(|ledger| {
            let record = ledger
                .get_mut(batch_id)
                .ok_or_else(|| TraceError::BatchNotFound(batch_id.clone()))?;

            let check = RecordHasher::check(record)?;
            if !check.is_intact() {
                warn!(
                    batch_id = %batch_id,
                    stored = check.stored.short_hex(),
                    computed = check.computed.short_hex(),
                    "refusing to update tampered batch"
                );
                return Err(TraceError::IntegrityViolation {
                    batch_id: batch_id.clone(),
                    stored: check.stored,
                    computed: check.computed,
                });
            }

            let previous = record.latest_event().map(|e| &e.timestamp);
            let timestamp = next_event_time(previous, self.clock.now());
            record.append(CustodyEvent::new(owner, price, timestamp));
            RecordHasher::seal(record)?;
            Ok(record.clone())
        })?;

        info!(
            batch_id = %batch_id,
            owner,
            events = record.history().len(),
            hash = record.content_hash().short_hex(),
            "batch updated"
        );
        Ok(record)
    }

    /// The full stored record of a batch, unchanged.
    pub fn get_journey(&self, batch_id: &BatchId) -> Result<BatchRecord, TraceError> {
        self.store
            .load()?
            .get(batch_id)
            .cloned()
            .ok_or_else(|| TraceError::BatchNotFound(batch_id.clone()))
    }

    /// Decode an identifier from `image`, then return that batch's journey.
    ///
    /// The ledger is not read if nothing readable is found.
    pub fn scan<C: IdentifierCodec>(
        &self,
        codec: &C,
        image: &C::Image,
    ) -> Result<BatchRecord, TraceError> {
        let batch_id = codec.decode(image)?;
        debug!(batch_id = %batch_id, "scanned batch identifier");
        self.get_journey(&batch_id)
    }

    /// Recompute and check one batch's seal.
    pub fn verify_batch(&self, batch_id: &BatchId) -> Result<IntegrityReport, TraceError> {
        let record = self.get_journey(batch_id)?;
        let report = inspect_record(batch_id, &record)?;
        if !report.is_intact() {
            warn!(batch_id = %batch_id, violations = report.violations.len(), "batch failed verification");
        }
        Ok(report)
    }

    /// Check every batch in the ledger.
    pub fn verify_ledger(&self) -> Result<LedgerReport, TraceError> {
        let report = inspect_ledger(&self.store.load()?)?;
        let failed = report.failures().count();
        if failed > 0 {
            warn!(failed, batches = report.batch_count, "ledger failed verification");
        }
        Ok(report)
    }

    /// One summary line per batch, in identifier order.
    pub fn list_batches(&self) -> Result<Vec<BatchSummary>, TraceError> {
        let ledger = self.store.load()?;
        ledger
            .iter()
            .map(|(key, record)| -> Result<BatchSummary, TraceError> {
                Ok(BatchSummary {
                    batch_id: key.clone(),
                    crop: record.origin().crop.clone(),
                    events: record.history().len(),
                    current_owner: record.current_owner().map(str::to_owned),
                    intact: RecordHasher::verify(record)?,
                })
            })
            .collect()
    }

    /// Run `mutate` against a freshly loaded ledger and save the result.
    ///
    /// Nothing is saved if `mutate` fails.
    fn write_cycle<T>(
        &self,
        mutate: impl FnOnce(&mut Ledger) -> Result<T, TraceError>,
    ) -> Result<T, TraceError> {
        // The gate guards no data, so a poisoned gate is still usable.
        let _gate = self
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _lock = self.store.lock_exclusive()?;

        let mut ledger = self.store.load()?;
        let out = mutate(&mut ledger)?;
        self.store.save(&ledger)?;
        Ok(out)
    }

    fn allocate_id(&self, ledger: &Ledger) -> Result<BatchId, TraceError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.generate();
            if !ledger.contains(&candidate) {
                return Ok(candidate);
            }
            debug!(candidate = %candidate, attempt, "batch identifier collision, re-rolling");
        }
        Err(TraceError::DuplicateIdentifier {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for TraceabilityService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceabilityService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
