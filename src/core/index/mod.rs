//! # Index Module
//!
//! Maps identity keys to every raw file that carries them.
//!
//! ## Build
//! Each source root is walked and inspected in parallel into its own
//! partial index; partials are then merged. Merging only appends candidate
//! lists, so it is associative and never drops or duplicates a record.
//! After the build the index is read-only and shared freely between workers.

mod batch;
mod builder;

pub use batch::{BatchPlan, DEFAULT_AVG_RAW_SIZE_BYTES, DEFAULT_MEMORY_BUDGET_BYTES};
pub use builder::{IndexReport, RawIndexBuilder};

use crate::core::metadata::CaptureTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One indexed raw file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Where the raw file lives
    pub path: PathBuf,
    /// Shot counter taken from the file name
    pub identity_key: String,
    /// Capture time read from the file
    pub captured_at: CaptureTime,
}

/// Identity key to raw candidates, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIndex {
    entries: HashMap<String, Vec<RawRecord>>,
}

impl RawIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the candidate list of its own identity key
    pub fn insert(&mut self, record: RawRecord) {
        self.entries
            .entry(record.identity_key.clone())
            .or_default()
            .push(record);
    }

    /// Union of two indexes; `other`'s candidates follow `self`'s per key
    pub fn merge(mut self, other: RawIndex) -> RawIndex {
        for (key, records) in other.entries {
            self.entries.entry(key).or_default().extend(records);
        }
        self
    }

    /// All raw files sharing an identity key (empty if none)
    pub fn candidates(&self, identity_key: &str) -> &[RawRecord] {
        self.entries
            .get(identity_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct identity keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of indexed raw files
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl FromIterator<RawRecord> for RawIndex {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        let mut index = RawIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(path: &str, key: &str, secs: u32) -> RawRecord {
        RawRecord {
            path: PathBuf::from(path),
            identity_key: key.to_string(),
            captured_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, secs)
                .unwrap(),
        }
    }

    #[test]
    fn insert_groups_by_identity_key() {
        let index: RawIndex = vec![
            record("/a/_DSC0001.ARW", "0001", 0),
            record("/a/_DSC0002.ARW", "0002", 1),
            record("/b/_DSC0002.ARW", "0002", 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(index.key_count(), 2);
        assert_eq!(index.record_count(), 3);
        assert_eq!(index.candidates("0002").len(), 2);
    }

    #[test]
    fn missing_key_has_no_candidates() {
        assert!(RawIndex::new().candidates("0001").is_empty());
    }

    #[test]
    fn merge_concatenates_in_order() {
        let left: RawIndex = vec![record("/a/_DSC0002.ARW", "0002", 0)].into_iter().collect();
        let right: RawIndex = vec![
            record("/b/_DSC0002.ARW", "0002", 5),
            record("/b/_DSC0003.ARW", "0003", 6),
        ]
        .into_iter()
        .collect();

        let merged = left.merge(right);

        let paths: Vec<_> = merged
            .candidates("0002")
            .iter()
            .map(|r| r.path.clone())
            .collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/a/_DSC0002.ARW"), PathBuf::from("/b/_DSC0002.ARW")]
        );
        assert_eq!(merged.record_count(), 3);
    }

    #[test]
    fn merge_is_associative() {
        let a: RawIndex = vec![record("/a/_DSC0001.ARW", "0001", 0)].into_iter().collect();
        let b: RawIndex = vec![record("/b/_DSC0001.ARW", "0001", 1)].into_iter().collect();
        let c: RawIndex = vec![record("/c/_DSC0001.ARW", "0001", 2)].into_iter().collect();

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));

        assert_eq!(left, right);
    }

    #[test]
    fn merging_empty_partial_changes_nothing() {
        let a: RawIndex = vec![record("/a/_DSC0001.ARW", "0001", 0)].into_iter().collect();
        assert_eq!(a.clone().merge(RawIndex::new()), a);
        assert_eq!(RawIndex::new().merge(a.clone()), a);
    }
}
