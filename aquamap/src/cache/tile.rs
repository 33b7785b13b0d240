//! Tile fetch cache.

use std::sync::Mutex;

use crate::cache::fifo::FifoSet;
use crate::config::MAX_CACHE_TILES;
use crate::coord::TileCoord;

/// Records which tiles have already been fetched for the current dataset.
///
/// Keys are `"z/x/y"` strings. The cache holds at most
/// [`MAX_CACHE_TILES`] entries; at capacity the oldest-inserted tile is
/// evicted, so a long pan across a city can re-fetch a tile it visited
/// long ago. That re-fetch is wasted network, not wrong rendering - the
/// feature dedup cache still suppresses duplicate render objects.
///
/// A tile is marked only after its fetch settles. A concurrent duplicate
/// request for the same tile can therefore slip through; the dedup cache
/// resolves that race harmlessly.
pub struct TileCache {
    inner: Mutex<FifoSet>,
}

impl TileCache {
    /// Creates a tile cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(FifoSet::new(capacity)),
        }
    }

    /// Returns true if the tile has already been fetched.
    pub fn has(&self, tile: &TileCoord) -> bool {
        self.inner.lock().unwrap().contains(&tile.cache_key())
    }

    /// Marks a tile as fetched, evicting the oldest entry if full.
    pub fn mark_fetched(&self, tile: &TileCoord) {
        self.inner.lock().unwrap().insert(tile.cache_key());
    }

    /// Current number of cached tiles.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets all fetched tiles (full layer reset).
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_TILES)
    }
}
