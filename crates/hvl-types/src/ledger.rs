use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::batch::BatchId;
use crate::record::BatchRecord;

/// The full collection of batch records, keyed by [`BatchId`].
///
/// Backed by a `BTreeMap` so that the serialized document is byte-stable
/// across load/save cycles. Keys carry no ordering semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    batches: BTreeMap<BatchId, BatchRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &BatchId) -> Option<&BatchRecord> {
        self.batches.get(id)
    }

    pub fn get_mut(&mut self, id: &BatchId) -> Option<&mut BatchRecord> {
        self.batches.get_mut(id)
    }

    pub fn contains(&self, id: &BatchId) -> bool {
        self.batches.contains_key(id)
    }

    /// Insert a record under its own identifier, returning any record it
    /// replaced.
    pub fn insert(&mut self, record: BatchRecord) -> Option<BatchRecord> {
        self.batches.insert(record.batch_id().clone(), record)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Iterate `(key, record)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&BatchId, &BatchRecord)> {
        self.batches.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &BatchRecord> {
        self.batches.values()
    }
}
