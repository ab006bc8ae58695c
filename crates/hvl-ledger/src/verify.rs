//! Integrity verification of stored batch records.

use chrono::{DateTime, Utc};
use hvl_crypto::{HasherError, RecordHasher};
use hvl_types::{BatchId, BatchRecord, ContentHash, Ledger};
use serde::Serialize;

/// Result of verifying one batch record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub batch_id: BatchId,
    pub event_count: usize,
    pub stored_hash: ContentHash,
    pub computed_hash: ContentHash,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    /// Returns `true` if all checks passed.
    pub fn is_intact(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    /// The record carries no content hash at all.
    Unsealed,
    /// The stored content hash differs from the recomputed one.
    HashMismatch,
    /// The ledger key and the record's own `BatchID` disagree.
    KeyMismatch,
    /// A custody event is timestamped before its predecessor.
    TimestampRegression,
    /// A custody event's timestamp is not RFC 3339.
    MalformedTimestamp,
}

/// Result of verifying every batch in the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LedgerReport {
    pub batch_count: usize,
    pub reports: Vec<IntegrityReport>,
}

impl LedgerReport {
    /// Returns `true` if every batch passed.
    pub fn is_intact(&self) -> bool {
        self.reports.iter().all(IntegrityReport::is_intact)
    }

    /// Reports of batches that failed at least one check.
    pub fn failures(&self) -> impl Iterator<Item = &IntegrityReport> {
        self.reports.iter().filter(|r| !r.is_intact())
    }
}

/// Verify one record stored under `key`.
pub fn inspect_record(key: &BatchId, record: &BatchRecord) -> Result<IntegrityReport, HasherError> {
    let check = RecordHasher::check(record)?;
    let mut violations = Vec::new();

    if check.stored.is_unsealed() {
        violations.push(Violation {
            kind: ViolationKind::Unsealed,
            description: "record has no content hash".into(),
        });
    } else if !check.is_intact() {
        violations.push(Violation {
            kind: ViolationKind::HashMismatch,
            description: format!(
                "stored hash {} does not match computed {}",
                check.stored.short_hex(),
                check.computed.short_hex()
            ),
        });
    }

    if key != record.batch_id() {
        violations.push(Violation {
            kind: ViolationKind::KeyMismatch,
            description: format!(
                "stored under key {key} but record names {}",
                record.batch_id()
            ),
        });
    }

    let mut previous: Option<(usize, DateTime<Utc>)> = None;
    for (index, event) in record.history().iter().enumerate() {
        let Some(at) = event.timestamp.instant() else {
            violations.push(Violation {
                kind: ViolationKind::MalformedTimestamp,
                description: format!("event {index} has unreadable timestamp {:?}", event.timestamp.as_str()),
            });
            continue;
        };
        if let Some((prev_index, prev_at)) = previous {
            if at < prev_at {
                violations.push(Violation {
                    kind: ViolationKind::TimestampRegression,
                    description: format!(
                        "event {index} ({}) is earlier than event {prev_index} ({})",
                        event.timestamp,
                        record.history()[prev_index].timestamp
                    ),
                });
            }
        }
        previous = Some((index, at));
    }

    Ok(IntegrityReport {
        batch_id: key.clone(),
        event_count: record.history().len(),
        stored_hash: check.stored,
        computed_hash: check.computed,
        violations,
    })
}

/// Verify every record in `ledger`, in key order.
pub fn inspect_ledger(ledger: &Ledger) -> Result<LedgerReport, HasherError> {
    let reports = ledger
        .iter()
        .map(|(key, record)| inspect_record(key, record))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LedgerReport {
        batch_count: ledger.len(),
        reports,
    })
}
