//! Sealing and verification of batch records.
//!
//! A record is sealed by hashing its [`HashableRecord`](hvl_types::HashableRecord)
//! view (identifier, origin and full history, never the stored hash) and
//! writing the digest into `content_hash`. Verification recomputes the
//! digest from the loaded fields and compares it with the stored one.

use hvl_types::{BatchRecord, ContentHash};

use crate::hasher::{ContentHasher, HasherError};

/// Outcome of checking one record's seal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordCheck {
    pub stored: ContentHash,
    pub computed: ContentHash,
}

impl RecordCheck {
    /// Returns `true` if the stored digest matches the recomputed one.
    pub fn is_intact(&self) -> bool {
        self.stored == self.computed
    }
}

/// Computes, writes and checks batch record digests.
pub struct RecordHasher;

impl RecordHasher {
    const HASHER: ContentHasher = ContentHasher::BATCH;

    /// Digest over every field of the record except the stored hash.
    pub fn digest(record: &BatchRecord) -> Result<ContentHash, HasherError> {
        Self::HASHER.hash_canonical(&record.hashable())
    }

    /// Recompute the digest and overwrite the stored one.
    pub fn seal(record: &mut BatchRecord) -> Result<ContentHash, HasherError> {
        let digest = Self::digest(record)?;
        record.set_content_hash(digest.clone());
        Ok(digest)
    }

    /// Recompute the digest and compare it with the stored one.
    pub fn check(record: &BatchRecord) -> Result<RecordCheck, HasherError> {
        Ok(RecordCheck {
            stored: record.content_hash().clone(),
            computed: Self::digest(record)?,
        })
    }

    /// Shorthand for `check(record)?.is_intact()`.
    pub fn verify(record: &BatchRecord) -> Result<bool, HasherError> {
        Ok(Self::check(record)?.is_intact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hvl_types::{BatchId, CustodyEvent, Origin};
    use proptest::prelude::*;

    fn sealed_record() -> BatchRecord {
        let mut record = BatchRecord::new(
            BatchId::new("3f9a0c1e").unwrap(),
            Origin::new("Wheat", "100kg", "Odisha", "2025-09-10"),
        );
        let ts = Utc.with_ymd_and_hms(2025, 9, 11, 8, 0, 0).unwrap();
        record.append(CustodyEvent::new("Distributor A", "₹20/kg", ts));
        RecordHasher::seal(&mut record).unwrap();
        record
    }

    /// Apply `edit` to the record's stored JSON and load it back.
    fn tamper(record: &BatchRecord, edit: impl FnOnce(&mut serde_json::Value)) -> BatchRecord {
        let mut value = serde_json::to_value(record).unwrap();
        edit(&mut value);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn sealed_record_verifies() {
        let record = sealed_record();
        assert!(!record.content_hash().is_unsealed());
        assert!(RecordHasher::verify(&record).unwrap());
    }

    #[test]
    fn unsealed_record_fails_verification() {
        let record = BatchRecord::new(
            BatchId::new("b1").unwrap(),
            Origin::new("Rice", "1kg", "Puri", "2025-01-01"),
        );
        assert!(!RecordHasher::verify(&record).unwrap());
    }

    #[test]
    fn digest_ignores_stored_hash() {
        let mut record = sealed_record();
        let before = RecordHasher::digest(&record).unwrap();
        record.set_content_hash(ContentHash::from_digest([0; 32]));
        assert_eq!(RecordHasher::digest(&record).unwrap(), before);
    }

    #[test]
    fn seal_is_idempotent() {
        let mut record = sealed_record();
        let first = record.content_hash().clone();
        let second = RecordHasher::seal(&mut record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn append_invalidates_seal_until_resealed() {
        let mut record = sealed_record();
        let ts = Utc.with_ymd_and_hms(2025, 9, 12, 8, 0, 0).unwrap();
        record.append(CustodyEvent::new("Retailer B", "₹25/kg", ts));
        assert!(!RecordHasher::verify(&record).unwrap());
        RecordHasher::seal(&mut record).unwrap();
        assert!(RecordHasher::verify(&record).unwrap());
    }

    #[test]
    fn flipped_owner_character_detected() {
        let record = sealed_record();
        let tampered = tamper(&record, |v| {
            v["History"][0]["Owner"] = "Distributor B".into();
        });
        let check = RecordHasher::check(&tampered).unwrap();
        assert!(!check.is_intact());
        assert_eq!(check.stored, *record.content_hash());
    }

    #[test]
    fn origin_and_timestamp_edits_detected() {
        let record = sealed_record();
        let crop = tamper(&record, |v| v["Farmer"]["Crop"] = "Barley".into());
        let time = tamper(&record, |v| {
            v["History"][0]["Timestamp"] = "2025-09-11T09:00:00Z".into();
        });
        assert!(!RecordHasher::verify(&crop).unwrap());
        assert!(!RecordHasher::verify(&time).unwrap());
    }

    #[test]
    fn injected_fields_detected() {
        let record = sealed_record();
        let top = tamper(&record, |v| v["Certified"] = "organic".into());
        let origin = tamper(&record, |v| v["Farmer"]["Grade"] = "A".into());
        let event = tamper(&record, |v| v["History"][0]["Receipt"] = "none".into());
        assert!(!RecordHasher::verify(&top).unwrap());
        assert!(!RecordHasher::verify(&origin).unwrap());
        assert!(!RecordHasher::verify(&event).unwrap());
    }

    #[test]
    fn sealed_unknown_fields_verify() {
        let mut record = tamper(&sealed_record(), |v| v["Certified"] = "organic".into());
        RecordHasher::seal(&mut record).unwrap();
        let reloaded = tamper(&record, |_| {});
        assert!(RecordHasher::verify(&reloaded).unwrap());
    }

    #[test]
    fn reordered_json_keys_still_verify() {
        let record = sealed_record();
        let json = format!(
            r#"{{"Hash":"{}","History":[{{"Timestamp":"2025-09-11T08:00:00Z","Price":"₹20/kg","Owner":"Distributor A"}}],"Farmer":{{"Harvested":"2025-09-10","Location":"Odisha","Quantity":"100kg","Crop":"Wheat"}},"BatchID":"3f9a0c1e"}}"#,
            record.content_hash()
        );
        let parsed: BatchRecord = serde_json::from_str(&json).unwrap();
        assert!(RecordHasher::verify(&parsed).unwrap());
    }

    proptest! {
        #[test]
        fn any_owner_change_changes_digest(
            owner in "[A-Za-z ]{1,24}",
            price in "[0-9]{1,4}/kg",
            suffix in "[a-z]",
        ) {
            let ts = Utc.with_ymd_and_hms(2025, 9, 11, 8, 0, 0).unwrap();
            let mut record = BatchRecord::new(
                BatchId::new("p1").unwrap(),
                Origin::new("Maize", "10kg", "Khordha", "2025-08-01"),
            );
            record.append(CustodyEvent::new(owner.clone(), price.clone(), ts));
            let original = RecordHasher::seal(&mut record).unwrap();

            let tampered = tamper(&record, |v| {
                v["History"][0]["Owner"] = format!("{owner}{suffix}").into();
            });
            prop_assert_ne!(RecordHasher::digest(&tampered).unwrap(), original);
        }

        #[test]
        fn json_roundtrip_preserves_seal(
            crop in "\\PC{0,16}",
            quantity in "\\PC{0,8}",
            owners in proptest::collection::vec("\\PC{0,12}", 0..6),
        ) {
            let ts = Utc.with_ymd_and_hms(2025, 9, 11, 8, 0, 0).unwrap();
            let mut record = BatchRecord::new(
                BatchId::new("p2").unwrap(),
                Origin::new(crop, quantity, "", ""),
            );
            for owner in owners {
                record.append(CustodyEvent::new(owner, "", ts));
            }
            RecordHasher::seal(&mut record).unwrap();
            let json = serde_json::to_string_pretty(&record).unwrap();
            let loaded: BatchRecord = serde_json::from_str(&json).unwrap();
            prop_assert!(RecordHasher::verify(&loaded).unwrap());
        }
    }
}
