//! Loading statistics for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the loader, processor and tile manager.
#[derive(Debug, Default)]
pub struct LoaderStats {
    /// Render objects added to layer groups.
    pub features_added: AtomicU64,
    /// Features skipped because their fingerprint was already seen.
    pub duplicates_skipped: AtomicU64,
    /// Features skipped because of malformed or unsupported geometry.
    pub invalid_skipped: AtomicU64,
    /// Pagination pages fetched successfully.
    pub pages_fetched: AtomicU64,
    /// Viewport tiles fetched successfully.
    pub tiles_fetched: AtomicU64,
    /// Tiles skipped because the tile cache already had them.
    pub tile_cache_hits: AtomicU64,
    /// Tile-fetch cycles that passed the zoom guard.
    pub tile_cycles: AtomicU64,
    /// Backend requests that failed after retries.
    pub request_failures: AtomicU64,
    /// Cooperative yields performed while batch-processing features.
    pub cooperative_yields: AtomicU64,
}

impl LoaderStats {
    pub fn add_features(&self, n: u64) {
        self.features_added.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_duplicates(&self, n: u64) {
        self.duplicates_skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_invalid(&self, n: u64) {
        self.invalid_skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile_fetched(&self) {
        self.tiles_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile_cache_hit(&self) {
        self.tile_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile_cycle(&self) {
        self.tile_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_yield(&self) {
        self.cooperative_yields.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> LoaderStatsSnapshot {
        LoaderStatsSnapshot {
            features_added: self.features_added.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            invalid_skipped: self.invalid_skipped.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            tile_cache_hits: self.tile_cache_hits.load(Ordering::Relaxed),
            tile_cycles: self.tile_cycles.load(Ordering::Relaxed),
            request_failures: self.request_failures.load(Ordering::Relaxed),
            cooperative_yields: self.cooperative_yields.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of loading statistics.
#[derive(Debug, Clone, Default)]
pub struct LoaderStatsSnapshot {
    pub features_added: u64,
    pub duplicates_skipped: u64,
    pub invalid_skipped: u64,
    pub pages_fetched: u64,
    pub tiles_fetched: u64,
    pub tile_cache_hits: u64,
    pub tile_cycles: u64,
    pub request_failures: u64,
    pub cooperative_yields: u64,
}
