//! Default values and tuning knobs for the loading engine.

use std::time::Duration;

/// Zoom level at which viewport tiling takes over from bulk loading.
///
/// Below this zoom the bulk layer loader's full dataset is assumed
/// sufficient and tiling would be wasteful.
pub const TILE_ZOOM: u8 = 14;

/// Maximum number of tiles remembered by the tile cache.
pub const MAX_CACHE_TILES: usize = 200;

/// Maximum number of feature fingerprints remembered by the dedup cache.
pub const MAX_DEDUP_FEATURES: usize = 250_000;

/// Debounce window applied to viewport move events before tile fetching.
pub const MOVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Page size for the high-volume economy layer.
pub const ECONOMY_PAGE_SIZE: u32 = 50_000;

/// Processing chunk sizes; sparse line layers tolerate much larger chunks
/// than dense point layers before a chunk starts to feel like a stall.
pub const NETWORK_CHUNK_SIZE: usize = 2_000;
pub const POINT_CHUNK_SIZE: usize = 500;

/// Render sub-batch sizes, tuned separately because adding vector objects
/// to a live layer group is itself expensive.
pub const NETWORK_RENDER_BATCH: usize = 200;
pub const POINT_RENDER_BATCH: usize = 100;

/// Retry policy defaults for backend requests.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the loading engine.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Zoom threshold for the tile manager.
    pub tile_zoom: u8,
    /// Debounce window for viewport move events.
    pub debounce: Duration,
    /// Tile cache capacity.
    pub tile_cache_capacity: usize,
    /// Feature dedup cache capacity.
    pub dedup_capacity: usize,
    /// Maximum attempts per backend request.
    pub max_attempts: u32,
    /// Base delay for exponential retry backoff.
    pub retry_base_delay: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            tile_zoom: TILE_ZOOM,
            debounce: MOVE_DEBOUNCE,
            tile_cache_capacity: MAX_CACHE_TILES,
            dedup_capacity: MAX_DEDUP_FEATURES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl LoaderConfig {
    /// Set the debounce window for viewport move events.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the tile-manager zoom threshold.
    pub fn with_tile_zoom(mut self, zoom: u8) -> Self {
        self.tile_zoom = zoom;
        self
    }

    /// Set the tile cache capacity.
    pub fn with_tile_cache_capacity(mut self, capacity: usize) -> Self {
        self.tile_cache_capacity = capacity;
        self
    }

    /// Set the retry policy for backend requests.
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_base_delay = base_delay;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.tile_zoom, 14);
        assert_eq!(config.tile_cache_capacity, 200);
        assert_eq!(config.debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::default()
            .with_debounce(Duration::from_millis(50))
            .with_tile_zoom(12)
            .with_retry(5, Duration::from_millis(10));
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.tile_zoom, 12);
        assert_eq!(config.max_attempts, 5);
    }
}
