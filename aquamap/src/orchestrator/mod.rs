//! Loading orchestrator.
//!
//! Composition root for the engine: owns the caches, the processor, the
//! layer loader and the tile manager, and wires them to the host's
//! viewport, layer groups and notification surfaces. All shared state is
//! held here and passed down explicitly; nothing is ambient.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{AsyncHttpClient, AuthContext, GeodataClient};
use crate::cache::{FeatureDedupCache, TileCache};
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::layer::{LayerGroup, LayerRegistry, LayerType};
use crate::loader::{EconomyCursor, LayerLoader};
use crate::processor::FeatureProcessor;
use crate::progress::{Notifier, ProgressSink};
use crate::stats::{LoaderStats, LoaderStatsSnapshot};
use crate::tiles::{TileManager, TileManagerConfig};
use crate::viewport::{MoveEnd, Viewport};

/// The host's per-layer render destinations.
#[derive(Clone)]
pub struct LayerGroups {
    pub network: Arc<dyn LayerGroup>,
    pub economy: Arc<dyn LayerGroup>,
    pub occurrence: Arc<dyn LayerGroup>,
}

impl LayerGroups {
    /// The group owning a layer's render objects.
    pub fn get(&self, layer: LayerType) -> &Arc<dyn LayerGroup> {
        match layer {
            LayerType::Network => &self.network,
            LayerType::Economy => &self.economy,
            LayerType::Occurrence => &self.occurrence,
        }
    }

    /// Union of every group's bounds, `None` while all are empty.
    pub fn combined_bounds(&self) -> Option<crate::coord::GeoBounds> {
        let mut bounds = None;
        for layer in LayerType::ALL {
            if let Some(b) = self.get(layer).bounds() {
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        bounds
    }
}

/// Composes the layer loader and tile manager into the application's
/// startup and pan/zoom reaction sequence.
pub struct MapLoader<C> {
    loader: LayerLoader<C>,
    tiles: Arc<TileManager<C>>,
    groups: LayerGroups,
    viewport: Arc<dyn Viewport>,
    notifier: Arc<dyn Notifier>,
    auth: AuthContext,
    cursor: Arc<EconomyCursor>,
    stats: Arc<LoaderStats>,
    dedup: Arc<FeatureDedupCache>,
    tile_cache: Arc<TileCache>,
}

impl<C: AsyncHttpClient> MapLoader<C> {
    /// Wires the engine together.
    pub fn new(
        client: GeodataClient<C>,
        auth: AuthContext,
        viewport: Arc<dyn Viewport>,
        groups: LayerGroups,
        progress: Arc<dyn ProgressSink>,
        notifier: Arc<dyn Notifier>,
        config: LoaderConfig,
    ) -> Self {
        let client = Arc::new(
            client
                .with_retry(config.max_attempts, config.retry_base_delay)
                .with_request_timeout(config.request_timeout),
        );
        let stats = Arc::new(LoaderStats::default());
        let dedup = Arc::new(FeatureDedupCache::new(config.dedup_capacity));
        let tile_cache = Arc::new(TileCache::new(config.tile_cache_capacity));
        let registry = Arc::new(LayerRegistry::default());
        let cursor = Arc::new(EconomyCursor::new());

        let processor = Arc::new(FeatureProcessor::new(
            Arc::clone(&dedup),
            Arc::clone(&registry),
            Arc::clone(&stats),
        ));

        let loader = LayerLoader::new(
            Arc::clone(&client),
            Arc::clone(&processor),
            registry,
            progress,
            Arc::clone(&stats),
            Arc::clone(&cursor),
        );

        let tiles = Arc::new(TileManager::new(
            client,
            processor,
            Arc::clone(&tile_cache),
            Arc::clone(&viewport),
            Arc::clone(&groups.economy),
            auth.clone(),
            Arc::clone(&stats),
            TileManagerConfig {
                tile_zoom: config.tile_zoom,
                debounce: config.debounce,
            },
        ));

        Self {
            loader,
            tiles,
            groups,
            viewport,
            notifier,
            auth,
            cursor,
            stats,
            dedup,
            tile_cache,
        }
    }

    /// Loads the map's data.
    ///
    /// With `start_page <= 1` this is the startup sequence: the bulk
    /// layers load first, the viewport is fitted to everything loaded,
    /// then one tile cycle backfills the economy layer near the viewport.
    /// With `start_page > 1` it is the "load more" continuation: only the
    /// economy layer loads, from that page, with no bounds fit.
    ///
    /// Only credential problems surface as errors; any other failure is
    /// reported through the notifier and the method returns `Ok`.
    pub async fn load_map_data(&self, start_page: u32) -> Result<(), LoadError> {
        self.auth.validate()?;

        let mut any_failed = false;

        if start_page > 1 {
            info!(start_page = start_page, "resuming economy layer load");
            let summary = self
                .loader
                .load_layer(
                    &self.auth,
                    LayerType::Economy,
                    start_page,
                    self.groups.economy.as_ref(),
                )
                .await?;
            any_failed = !summary.completed;
        } else {
            info!("starting bulk layer load");
            for layer in [LayerType::Network, LayerType::Occurrence] {
                let summary = self
                    .loader
                    .load_layer(&self.auth, layer, 1, self.groups.get(layer).as_ref())
                    .await?;
                if !summary.completed {
                    any_failed = true;
                }
            }

            if let Some(bounds) = self.groups.combined_bounds() {
                self.viewport.fit_bounds(&bounds);
            }

            // Backfill the viewport's economy features immediately rather
            // than waiting for the first pan.
            self.tiles.fetch_visible_tiles().await;
        }

        if any_failed {
            warn!("map data load finished with failures");
            self.notifier.notify_error("Failed to load map data");
        }
        Ok(())
    }

    /// Continues the economy layer from wherever the last load stopped.
    pub async fn load_more_economy(&self) -> Result<(), LoadError> {
        let (next_page, has_more) = self.cursor.position();
        if !has_more {
            info!("economy layer already fully loaded");
            return Ok(());
        }
        self.load_map_data(next_page).await
    }

    /// Spawns the tile manager's move-event loop as a background task.
    ///
    /// Wire the sender to the map widget's `moveend` event.
    pub fn spawn_tile_manager(
        &self,
        events: mpsc::Receiver<MoveEnd>,
        cancel: CancellationToken,
    ) -> JoinHandle<()>
    where
        C: 'static,
    {
        let tiles = Arc::clone(&self.tiles);
        tokio::spawn(tiles.run(events, cancel))
    }

    /// Runs one tile cycle outside the event loop (e.g. after login).
    pub async fn refresh_viewport(&self) {
        self.tiles.fetch_visible_tiles().await;
    }

    /// Clears every layer group and both caches (full reset).
    pub fn reset(&self) {
        for layer in LayerType::ALL {
            self.groups.get(layer).clear();
        }
        self.dedup.clear();
        self.tile_cache.clear();
    }

    /// Snapshot of the engine's counters.
    pub fn stats(&self) -> LoaderStatsSnapshot {
        self.stats.snapshot()
    }

    /// Economy pagination position: `(next page, has_more)`.
    pub fn economy_position(&self) -> (u32, bool) {
        self.cursor.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHttpClient;
    use crate::coord::GeoBounds;
    use crate::layer::VectorLayerGroup;
    use crate::progress::tests::RecordingProgress;
    use std::time::Duration;

    use crate::viewport::FixedViewport;

    struct Fixture {
        map_loader: MapLoader<MockHttpClient>,
        mock: MockHttpClient,
        viewport: Arc<FixedViewport>,
        groups: LayerGroups,
        sink: Arc<RecordingProgress>,
    }

    fn fixture(zoom: u8, bounds: GeoBounds) -> Fixture {
        let mock = MockHttpClient::new();
        let client = GeodataClient::new(mock.clone(), "http://backend.test");
        let viewport = Arc::new(FixedViewport::new(zoom, bounds));
        let groups = LayerGroups {
            network: Arc::new(VectorLayerGroup::new()),
            economy: Arc::new(VectorLayerGroup::new()),
            occurrence: Arc::new(VectorLayerGroup::new()),
        };
        let sink = Arc::new(RecordingProgress::default());
        let config = LoaderConfig::default().with_retry(1, Duration::from_millis(1));
        let map_loader = MapLoader::new(
            client,
            AuthContext::new("sp-001", "tok"),
            Arc::clone(&viewport) as Arc<dyn Viewport>,
            groups.clone(),
            Arc::clone(&sink) as Arc<dyn ProgressSink>,
            Arc::clone(&sink) as Arc<dyn Notifier>,
            config,
        );
        Fixture {
            map_loader,
            mock,
            viewport,
            groups,
            sink,
        }
    }

    fn low_zoom_bounds() -> GeoBounds {
        GeoBounds::new(-47.0, -24.0, -46.0, -23.0)
    }

    fn point_page(lon: f64, lat: f64) -> String {
        format!(
            r#"{{"features":[{{"type":"Feature","geometry":{{"type":"Point","coordinates":[{lon},{lat}]}},"properties":{{}}}}],"metadata":{{"has_more":false}}}}"#
        )
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected_before_any_request() {
        let mock = MockHttpClient::new();
        let client = GeodataClient::new(mock.clone(), "http://backend.test");
        let viewport = Arc::new(FixedViewport::new(12, low_zoom_bounds()));
        let groups = LayerGroups {
            network: Arc::new(VectorLayerGroup::new()),
            economy: Arc::new(VectorLayerGroup::new()),
            occurrence: Arc::new(VectorLayerGroup::new()),
        };
        let sink = Arc::new(RecordingProgress::default());
        let map_loader = MapLoader::new(
            client,
            AuthContext::new("sp-001", ""),
            viewport,
            groups,
            Arc::clone(&sink) as Arc<dyn ProgressSink>,
            sink as Arc<dyn Notifier>,
            LoaderConfig::default(),
        );

        let result = map_loader.load_map_data(1).await;
        assert!(matches!(result, Err(LoadError::MissingCredentials(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_startup_loads_bulk_layers_and_fits_bounds() {
        let f = fixture(12, low_zoom_bounds());
        f.mock.push_json(200, &point_page(-46.60, -23.50)); // network
        f.mock.push_json(200, &point_page(-46.70, -23.60)); // occurrence

        f.map_loader.load_map_data(1).await.unwrap();

        // Two bulk requests, no tile requests at zoom 12
        assert_eq!(f.mock.request_count(), 2);
        assert!(f.mock.requests()[0].contains("type=network"));
        assert!(f.mock.requests()[1].contains("type=occurrence"));
        assert_eq!(f.groups.network.len(), 1);
        assert_eq!(f.groups.occurrence.len(), 1);

        // Viewport fitted to the union of loaded bounds
        let fitted = f.viewport.fitted_bounds().expect("bounds should be fitted");
        assert!(fitted.contains(-46.60, -23.50));
        assert!(fitted.contains(-46.70, -23.60));
    }

    #[tokio::test]
    async fn test_startup_backfills_viewport_when_zoomed_in() {
        // Viewport already zoomed into a single tile
        let tile = crate::coord::lon_lat_to_tile(-46.6333, -23.5505, 14).unwrap();
        let bbox = crate::coord::tile_to_bbox(&tile);
        let bounds = GeoBounds::new(
            bbox.min_lon + 1e-7,
            bbox.min_lat + 1e-7,
            bbox.max_lon - 1e-7,
            bbox.max_lat - 1e-7,
        );
        let f = fixture(15, bounds);
        f.mock.push_json(200, &point_page(-46.6333, -23.5505)); // network
        f.mock.push_json(200, &point_page(-46.6334, -23.5506)); // occurrence
        f.mock.set_default_json(200, &point_page(-46.6335, -23.5507)); // tiles

        f.map_loader.load_map_data(1).await.unwrap();

        // Bulk layers + at least one bbox request; fit_bounds moved the
        // viewport, so the exact tile count depends on the fitted bounds.
        assert!(f.mock.request_count() >= 3);
        assert!(f
            .mock
            .requests()
            .iter()
            .any(|url| url.contains("/bbox?bbox=")));
        assert!(f.groups.economy.len() >= 1);
    }

    #[tokio::test]
    async fn test_resume_mode_loads_only_economy() {
        let f = fixture(12, low_zoom_bounds());
        f.mock.push_json(200, &point_page(-46.61, -23.51));

        f.map_loader.load_map_data(3).await.unwrap();

        assert_eq!(f.mock.request_count(), 1);
        let url = &f.mock.requests()[0];
        assert!(url.contains("type=economy"));
        assert!(url.contains("page=3"));
        assert_eq!(f.groups.economy.len(), 1);
        // Resume mode never fits bounds
        assert_eq!(f.viewport.fitted_bounds(), None);
    }

    #[tokio::test]
    async fn test_load_more_continues_from_cursor() {
        let f = fixture(12, low_zoom_bounds());
        // Page 2 reports another page pending; page 3 fails, stopping the
        // chain with the cursor still pointing at page 3.
        f.mock.push_json(
            200,
            r#"{"features":[],"metadata":{"has_more":true}}"#,
        );
        f.mock.push_json(500, "{}");
        f.map_loader.load_map_data(2).await.unwrap();
        assert_eq!(f.map_loader.economy_position(), (3, true));

        f.mock.push_json(
            200,
            r#"{"features":[],"metadata":{"has_more":false}}"#,
        );
        f.map_loader.load_more_economy().await.unwrap();
        assert!(f.mock.requests()[2].contains("page=3"));
        assert_eq!(f.map_loader.economy_position(), (4, false));

        // Fully loaded: further calls are no-ops
        f.map_loader.load_more_economy().await.unwrap();
        assert_eq!(f.mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_propagates_from_startup() {
        let f = fixture(12, low_zoom_bounds());
        f.mock.push_json(401, "{}");

        let result = f.map_loader.load_map_data(1).await;
        assert!(matches!(result, Err(LoadError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_partial_failure_notifies_generic_message() {
        let f = fixture(12, low_zoom_bounds());
        // Network layer fails outright; occurrence succeeds
        f.mock.push_json(500, "{}");
        f.mock.push_json(200, &point_page(-46.70, -23.60));

        f.map_loader.load_map_data(1).await.unwrap();

        let errors = f.sink.errors.lock().unwrap();
        assert_eq!(errors.as_slice(), ["Failed to load map data"]);
    }

    #[tokio::test]
    async fn test_reset_clears_groups_and_caches() {
        let f = fixture(12, low_zoom_bounds());
        f.mock.push_json(200, &point_page(-46.60, -23.50));
        f.mock.push_json(200, &point_page(-46.70, -23.60));

        f.map_loader.load_map_data(1).await.unwrap();
        assert!(f.groups.network.len() > 0);

        f.map_loader.reset();
        assert_eq!(f.groups.network.len(), 0);
        assert_eq!(f.groups.occurrence.len(), 0);
    }

    #[tokio::test]
    async fn test_stats_snapshot_counts_pages() {
        let f = fixture(12, low_zoom_bounds());
        f.mock.push_json(200, &point_page(-46.60, -23.50));
        f.mock.push_json(200, &point_page(-46.70, -23.60));

        f.map_loader.load_map_data(1).await.unwrap();

        let stats = f.map_loader.stats();
        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(stats.features_added, 2);
    }
}
