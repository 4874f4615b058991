use std::collections::BTreeMap;

use crate::feeds::BucketKey;
use crate::normalize::Quake;

/// One quake layer per bucket. Buckets exist for the whole lifetime of the
/// registry and never affect one another.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    buckets: BTreeMap<BucketKey, Vec<Quake>>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self {
            buckets: BucketKey::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
        }
    }

    /// Adds `quake` to the bucket it was normalized into.
    pub fn assign(&mut self, quake: Quake) {
        self.buckets.entry(quake.bucket).or_default().push(quake);
    }

    pub fn clear(&mut self, bucket: BucketKey) {
        if let Some(quakes) = self.buckets.get_mut(&bucket) {
            quakes.clear();
        }
    }

    pub fn get(&self, bucket: BucketKey) -> &[Quake] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }

    /// Clears `bucket` and refills it with `quakes` in one step, so no
    /// reader ever observes a half-filled bucket.
    ///
    /// Quakes normalized into a different bucket go to their own bucket.
    pub fn replace(&mut self, bucket: BucketKey, quakes: Vec<Quake>) {
        self.clear(bucket);
        for quake in quakes {
            self.assign(quake);
        }
    }

    pub fn len(&self, bucket: BucketKey) -> usize {
        self.get(bucket).len()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketKey, &[Quake])> {
        self.buckets.iter().map(|(b, q)| (*b, q.as_slice()))
    }
}
