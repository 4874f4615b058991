use serde::Serialize;
use std::collections::BTreeMap;

use crate::feeds::BucketKey;

/// Aggregated state of one bucket after its latest completed fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub count: usize,
    /// Feed generation time, epoch milliseconds. `None` until recorded or
    /// when the feed did not report one.
    pub generated_at: Option<i64>,
}

pub type LedgerSnapshot = BTreeMap<BucketKey, LedgerEntry>;

/// Running count and last-updated time per bucket.
#[derive(Debug, Clone)]
pub struct AggregationLedger {
    entries: LedgerSnapshot,
}

impl Default for AggregationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationLedger {
    /// Every bucket starts at a zero count with no generation time.
    pub fn new() -> Self {
        Self {
            entries: BucketKey::ALL
                .into_iter()
                .map(|b| (b, LedgerEntry::default()))
                .collect(),
        }
    }

    /// Overwrites the entry for `bucket`. Last write wins.
    pub fn record(&mut self, bucket: BucketKey, count: usize, generated_at: Option<i64>) {
        self.entries.insert(bucket, LedgerEntry { count, generated_at });
    }

    pub fn get(&self, bucket: BucketKey) -> LedgerEntry {
        self.entries.get(&bucket).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.entries.clone()
    }
}

/// Latest generation time across all buckets.
pub fn latest_update(snapshot: &LedgerSnapshot) -> Option<i64> {
    snapshot.values().filter_map(|e| e.generated_at).max()
}
