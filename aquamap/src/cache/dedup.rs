//! Feature fingerprint dedup cache.

use std::sync::Mutex;

use crate::cache::fifo::FifoSet;
use crate::config::MAX_DEDUP_FEATURES;

/// Records which features have already been materialized into render
/// objects, keyed by geometry fingerprint.
///
/// Both retrieval paths (bulk pagination and viewport tiles) consult this
/// cache before building a render object, which is what makes their
/// overlap harmless. Unlike the tile cache the capacity is generous
/// (250k entries) because an eviction here costs a duplicate render
/// object on screen rather than a redundant network call.
pub struct FeatureDedupCache {
    inner: Mutex<FifoSet>,
}

impl FeatureDedupCache {
    /// Creates a dedup cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(FifoSet::new(capacity)),
        }
    }

    /// Returns true if a feature with this fingerprint was already rendered.
    pub fn has(&self, fingerprint: &str) -> bool {
        self.inner.lock().unwrap().contains(fingerprint)
    }

    /// Marks a fingerprint as rendered.
    pub fn mark_seen(&self, fingerprint: &str) {
        self.inner.lock().unwrap().insert(fingerprint.to_string());
    }

    /// Current number of remembered fingerprints.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets all fingerprints (full layer reset).
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

impl Default for FeatureDedupCache {
    fn default() -> Self {
        Self::new(MAX_DEDUP_FEATURES)
    }
}
