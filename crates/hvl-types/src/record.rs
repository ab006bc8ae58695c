use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::BatchId;
use crate::hash::ContentHash;
use crate::temporal::EventTime;

/// Fields present in a stored object that this crate does not model.
///
/// They are kept verbatim, written back on save and covered by the content
/// hash, so an injected field breaks the seal instead of vanishing.
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

/// Creation-time facts about a batch, recorded by the producer.
///
/// Values are kept verbatim: callers hand in already-validated strings and
/// empty values are accepted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Harvested")]
    pub harvested: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Origin {
    pub fn new(
        crop: impl Into<String>,
        quantity: impl Into<String>,
        location: impl Into<String>,
        harvested: impl Into<String>,
    ) -> Self {
        Self {
            crop: crop.into(),
            quantity: quantity.into(),
            location: location.into(),
            harvested: harvested.into(),
            extra: ExtraFields::new(),
        }
    }
}

/// One transfer of custody: who took the batch, at what price, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEvent {
    #[serde(rename = "Owner")]
    pub owner: String,
    /// Free-form, currency-tagged price label (e.g. `"₹20/kg"`).
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: EventTime,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl CustodyEvent {
    pub fn new(owner: impl Into<String>, price: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            owner: owner.into(),
            price: price.into(),
            timestamp: timestamp.into(),
            extra: ExtraFields::new(),
        }
    }
}

/// Full provenance record of one batch.
///
/// The identifier and origin are fixed at construction. The custody history
/// only grows: there is no API that removes, replaces or reorders events.
/// `content_hash` seals every other field and must be rewritten after each
/// mutation (see `hvl_crypto::RecordHasher::seal`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    #[serde(rename = "BatchID")]
    batch_id: BatchId,
    #[serde(rename = "Farmer")]
    origin: Origin,
    #[serde(rename = "History", default)]
    history: Vec<CustodyEvent>,
    #[serde(rename = "Hash", default)]
    content_hash: ContentHash,
    #[serde(flatten)]
    extra: ExtraFields,
}

/// Borrowed view of the fields covered by a record's content hash.
///
/// Serializes with the same field names as the stored record, minus `Hash`.
/// Unmodelled top-level fields are included.
#[derive(Debug, Serialize)]
pub struct HashableRecord<'a> {
    #[serde(rename = "BatchID")]
    pub batch_id: &'a BatchId,
    #[serde(rename = "Farmer")]
    pub origin: &'a Origin,
    #[serde(rename = "History")]
    pub history: &'a [CustodyEvent],
    #[serde(flatten)]
    pub extra: &'a ExtraFields,
}

impl BatchRecord {
    /// A fresh record with an empty history and no seal yet.
    pub fn new(batch_id: BatchId, origin: Origin) -> Self {
        Self {
            batch_id,
            origin,
            history: Vec::new(),
            content_hash: ContentHash::unsealed(),
            extra: ExtraFields::new(),
        }
    }

    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Custody events in chronological (insertion) order.
    pub fn history(&self) -> &[CustodyEvent] {
        &self.history
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// Top-level fields this crate does not model, as loaded.
    pub fn extra(&self) -> &ExtraFields {
        &self.extra
    }

    /// The most recent custody event, if any.
    pub fn latest_event(&self) -> Option<&CustodyEvent> {
        self.history.last()
    }

    /// Current custodian: the last event's owner, if the batch has moved.
    pub fn current_owner(&self) -> Option<&str> {
        self.latest_event().map(|e| e.owner.as_str())
    }

    /// Append a custody event. The previous seal becomes stale until the
    /// record is sealed again.
    pub fn append(&mut self, event: CustodyEvent) {
        self.history.push(event);
    }

    /// Overwrite the stored content hash.
    pub fn set_content_hash(&mut self, hash: ContentHash) {
        self.content_hash = hash;
    }

    /// The fields covered by the content hash.
    pub fn hashable(&self) -> HashableRecord<'_> {
        HashableRecord {
            batch_id: &self.batch_id,
            origin: &self.origin,
            history: &self.history,
            extra: &self.extra,
        }
    }
}
