//! Viewport-scoped tile fetching for the economy layer.
//!
//! Once the map is zoomed in past the tile threshold, the bulk dataset is
//! supplemented by bbox queries for the tiles visible in the viewport.
//! Move events arrive over a channel and are debounced: only the cycle
//! scheduled after the last event in a burst actually runs.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiError, AsyncHttpClient, AuthContext, GeodataClient};
use crate::cache::TileCache;
use crate::config::{MOVE_DEBOUNCE, TILE_ZOOM};
use crate::coord::{tile_to_bbox, visible_tiles};
use crate::layer::{LayerGroup, LayerType};
use crate::processor::FeatureProcessor;
use crate::stats::LoaderStats;
use crate::viewport::{MoveEnd, Viewport};

/// Tile manager configuration.
#[derive(Debug, Clone)]
pub struct TileManagerConfig {
    /// Zoom level tiles are fetched at; cycles below it do nothing.
    pub tile_zoom: u8,
    /// Debounce window applied to move events.
    pub debounce: std::time::Duration,
}

impl Default for TileManagerConfig {
    fn default() -> Self {
        Self {
            tile_zoom: TILE_ZOOM,
            debounce: MOVE_DEBOUNCE,
        }
    }
}

/// Keeps the economy layer populated near the current viewport.
pub struct TileManager<C> {
    client: Arc<GeodataClient<C>>,
    processor: Arc<FeatureProcessor>,
    tile_cache: Arc<TileCache>,
    viewport: Arc<dyn Viewport>,
    group: Arc<dyn LayerGroup>,
    auth: AuthContext,
    stats: Arc<LoaderStats>,
    config: TileManagerConfig,
}

impl<C: AsyncHttpClient> TileManager<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<GeodataClient<C>>,
        processor: Arc<FeatureProcessor>,
        tile_cache: Arc<TileCache>,
        viewport: Arc<dyn Viewport>,
        group: Arc<dyn LayerGroup>,
        auth: AuthContext,
        stats: Arc<LoaderStats>,
        config: TileManagerConfig,
    ) -> Self {
        Self {
            client,
            processor,
            tile_cache,
            viewport,
            group,
            auth,
            stats,
            config,
        }
    }

    /// The tile cache (exposed for monitoring).
    pub fn tile_cache(&self) -> &Arc<TileCache> {
        &self.tile_cache
    }

    /// Runs the move-event loop until the channel closes or the token is
    /// cancelled.
    ///
    /// Each event opens (or restarts) a debounce window; a fetch cycle
    /// runs only when a window closes with no further events. A cycle
    /// already in progress is never interrupted - the debounce timer is
    /// the only cancellation point for pending work.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<MoveEnd>, cancel: CancellationToken) {
        info!(
            tile_zoom = self.config.tile_zoom,
            debounce_ms = self.config.debounce.as_millis() as u64,
            "tile manager started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                event = events.recv() => {
                    if event.is_none() {
                        break;
                    }
                    // Debounce: restart the window on every further event.
                    loop {
                        tokio::select! {
                            biased;

                            _ = cancel.cancelled() => {
                                info!("tile manager shutting down");
                                return;
                            }

                            more = events.recv() => {
                                if more.is_none() {
                                    return;
                                }
                                // Window restarts
                            }

                            _ = tokio::time::sleep(self.config.debounce) => {
                                self.fetch_visible_tiles().await;
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("tile manager stopped");
    }

    /// Fetches every visible uncached tile, sequentially.
    ///
    /// One request is in flight at a time - deliberate backpressure that
    /// caps backend load at the cost of slower multi-tile fills. A tile is
    /// marked fetched only after its request settles, success or failure
    /// alike, so a slow request is never hidden by an eager mark.
    pub async fn fetch_visible_tiles(&self) {
        let zoom = self.viewport.zoom();
        if zoom < self.config.tile_zoom {
            debug!(
                zoom = zoom,
                tile_zoom = self.config.tile_zoom,
                "below tile zoom, skipping viewport fetch"
            );
            return;
        }

        self.stats.record_tile_cycle();
        let bounds = self.viewport.bounds();
        let tiles = match visible_tiles(&bounds, self.config.tile_zoom) {
            Ok(tiles) => tiles,
            Err(e) => {
                warn!(error = %e, "viewport bounds outside projectable range");
                return;
            }
        };

        debug!(tiles = tiles.len(), "starting viewport tile cycle");

        for tile in tiles {
            if self.tile_cache.has(&tile) {
                self.stats.record_tile_cache_hit();
                continue;
            }

            let bbox = tile_to_bbox(&tile);
            let mut auth_rejected = false;
            match self
                .client
                .fetch_bbox(&self.auth.city_id, &bbox, &self.auth.token)
                .await
            {
                Ok(page) => {
                    self.processor
                        .process(page.features, LayerType::Economy, self.group.as_ref())
                        .await;
                    self.stats.record_tile_fetched();
                }
                Err(ApiError::Unauthorized) => {
                    warn!(tile = %tile, "authentication rejected, aborting tile cycle");
                    auth_rejected = true;
                }
                Err(e) => {
                    warn!(tile = %tile, error = %e, "tile fetch failed");
                    self.stats.record_request_failure();
                }
            }

            // Marked after the request settles, success or failure alike.
            self.tile_cache.mark_fetched(&tile);

            if auth_rejected {
                break;
            }
        }
    }
}
