//! Integration tests for the full loading pipeline.
//!
//! These tests verify the cross-component behavior the unit tests cannot:
//! - Bulk pagination and viewport tiles sharing one dedup cache
//! - The startup sequence (bulk layers, bounds fit, viewport backfill)
//! - Overlapping tile queries rendering each feature exactly once
//!
//! Run with: `cargo test --test pipeline_integration`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aquamap::api::{ApiError, AsyncHttpClient, AuthContext, GeodataClient, HttpResponse};
use aquamap::config::LoaderConfig;
use aquamap::coord::{lon_lat_to_tile, tile_to_bbox, GeoBounds, TileCoord};
use aquamap::layer::{LayerGroup, VectorLayerGroup};
use aquamap::orchestrator::{LayerGroups, MapLoader};
use aquamap::progress::{Notifier, ProgressSink};
use aquamap::viewport::{FixedViewport, Viewport};

// ============================================================================
// Test Helpers
// ============================================================================

/// HTTP client with scripted responses, served front-to-back; when the
/// script runs dry the default response is served instead.
#[derive(Clone, Default)]
struct ScriptedHttpClient {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    default_response: Arc<Mutex<Option<HttpResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttpClient {
    fn new() -> Self {
        Self::default()
    }

    fn push_json(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
    }

    fn set_default_json(&self, status: u16, body: &str) {
        *self.default_response.lock().unwrap() = Some(HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl AsyncHttpClient for ScriptedHttpClient {
    async fn get(&self, url: &str, _bearer_token: Option<&str>) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response);
        }
        if let Some(default) = self.default_response.lock().unwrap().clone() {
            return Ok(default);
        }
        Err(ApiError::Network("no scripted response".to_string()))
    }
}

struct Harness {
    loader: MapLoader<ScriptedHttpClient>,
    mock: ScriptedHttpClient,
    economy: Arc<VectorLayerGroup>,
    network: Arc<VectorLayerGroup>,
    occurrence: Arc<VectorLayerGroup>,
}

struct SilentSink;

impl ProgressSink for SilentSink {
    fn report(&self, _: aquamap::layer::LayerType, _: &str, _: u64, _: Option<u64>) {}
}

impl Notifier for SilentSink {
    fn notify_error(&self, _: &str) {}
}

fn harness(zoom: u8, bounds: GeoBounds) -> Harness {
    let mock = ScriptedHttpClient::new();
    let client = GeodataClient::new(mock.clone(), "http://backend.test");
    let viewport = Arc::new(FixedViewport::new(zoom, bounds));
    let network = Arc::new(VectorLayerGroup::new());
    let economy = Arc::new(VectorLayerGroup::new());
    let occurrence = Arc::new(VectorLayerGroup::new());
    let groups = LayerGroups {
        network: Arc::clone(&network) as Arc<dyn LayerGroup>,
        economy: Arc::clone(&economy) as Arc<dyn LayerGroup>,
        occurrence: Arc::clone(&occurrence) as Arc<dyn LayerGroup>,
    };

    let loader = MapLoader::new(
        client,
        AuthContext::new("sp-001", "tok"),
        viewport as Arc<dyn Viewport>,
        groups,
        Arc::new(SilentSink) as Arc<dyn ProgressSink>,
        Arc::new(SilentSink) as Arc<dyn Notifier>,
        LoaderConfig::default().with_retry(1, Duration::from_millis(1)),
    );

    Harness {
        loader,
        mock,
        economy,
        network,
        occurrence,
    }
}

/// Bounds strictly inside one zoom-14 tile around the given point.
fn one_tile_bounds(lon: f64, lat: f64) -> GeoBounds {
    let tile = lon_lat_to_tile(lon, lat, 14).unwrap();
    inset(&tile_to_bbox(&tile))
}

fn inset(bbox: &GeoBounds) -> GeoBounds {
    GeoBounds::new(
        bbox.min_lon + 1e-7,
        bbox.min_lat + 1e-7,
        bbox.max_lon - 1e-7,
        bbox.max_lat - 1e-7,
    )
}

fn point_feature(lon: f64, lat: f64) -> String {
    format!(
        r#"{{"type":"Feature","geometry":{{"type":"Point","coordinates":[{lon},{lat}]}},"properties":{{"code":"E-1"}}}}"#
    )
}

fn page(features: &[String], has_more: bool) -> String {
    format!(
        r#"{{"features":[{}],"metadata":{{"has_more":{}}}}}"#,
        features.join(","),
        has_more
    )
}

// ============================================================================
// Cross-path dedup
// ============================================================================

#[tokio::test]
async fn bulk_page_then_tile_query_renders_feature_once() {
    const LON: f64 = -46.6333;
    const LAT: f64 = -23.5505;
    let h = harness(15, one_tile_bounds(LON, LAT));

    // Resume-mode bulk load returns the feature first...
    h.mock
        .push_json(200, &page(&[point_feature(LON, LAT)], false));
    h.loader.load_map_data(2).await.unwrap();
    assert_eq!(h.economy.len(), 1);

    // ...then the same feature comes back from a viewport tile query.
    h.mock
        .push_json(200, &page(&[point_feature(LON, LAT)], false));
    h.loader.refresh_viewport().await;

    assert_eq!(h.economy.len(), 1, "feature must render exactly once");
    let stats = h.loader.stats();
    assert_eq!(stats.duplicates_skipped, 1);
    assert_eq!(stats.tiles_fetched, 1);
}

#[tokio::test]
async fn overlapping_tile_queries_render_feature_once() {
    const LON: f64 = -46.6333;
    const LAT: f64 = -23.5505;
    // Viewport spanning two adjacent tiles; both bbox responses return the
    // same boundary feature.
    let tile = lon_lat_to_tile(LON, LAT, 14).unwrap();
    let left = tile_to_bbox(&tile);
    let right = tile_to_bbox(&TileCoord {
        x: tile.x + 1,
        y: tile.y,
        zoom: 14,
    });
    let bounds = GeoBounds::new(
        left.min_lon + 1e-7,
        left.min_lat + 1e-7,
        right.max_lon - 1e-7,
        left.max_lat - 1e-7,
    );
    let h = harness(15, bounds);
    h.mock
        .set_default_json(200, &page(&[point_feature(LON, LAT)], false));

    h.loader.refresh_viewport().await;

    assert_eq!(h.mock.request_count(), 2, "both tiles fetched");
    assert_eq!(h.economy.len(), 1, "boundary feature rendered once");
    assert_eq!(h.loader.stats().duplicates_skipped, 1);
}

// ============================================================================
// Startup sequence
// ============================================================================

#[tokio::test]
async fn startup_loads_bulk_layers_then_backfills_viewport() {
    const LON: f64 = -46.6333;
    const LAT: f64 = -23.5505;
    let h = harness(15, one_tile_bounds(LON, LAT));

    // Network: one polyline; occurrence: one point; tiles: one economy point.
    h.mock.push_json(
        200,
        &page(
            &[format!(
                r#"{{"type":"Feature","geometry":{{"type":"LineString","coordinates":[[{LON},{LAT}],[{},{}]]}},"properties":{{}}}}"#,
                LON + 0.0001,
                LAT + 0.0001
            )],
            false,
        ),
    );
    h.mock
        .push_json(200, &page(&[point_feature(LON + 0.0002, LAT)], false));
    h.mock
        .set_default_json(200, &page(&[point_feature(LON, LAT)], false));

    h.loader.load_map_data(1).await.unwrap();

    assert_eq!(h.network.len(), 1);
    assert_eq!(h.occurrence.len(), 1);
    assert!(h.economy.len() >= 1, "viewport backfill ran");

    let requests = h.mock.requests();
    assert!(requests[0].contains("type=network"));
    assert!(requests[1].contains("type=occurrence"));
    assert!(requests[2].contains("/bbox?bbox="));
}

#[tokio::test]
async fn startup_at_low_zoom_skips_tile_backfill() {
    let h = harness(10, GeoBounds::new(-47.0, -24.0, -46.0, -23.0));
    h.mock.push_json(200, &page(&[], false));
    h.mock.push_json(200, &page(&[], false));

    h.loader.load_map_data(1).await.unwrap();

    assert_eq!(h.mock.request_count(), 2, "no bbox requests at low zoom");
    assert_eq!(h.loader.stats().tile_cycles, 0);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn malformed_features_do_not_poison_sibling_features() {
    let h = harness(10, GeoBounds::new(-47.0, -24.0, -46.0, -23.0));

    let bad = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":null},"properties":{}}"#
        .to_string();
    h.mock.push_json(
        200,
        &page(
            &[
                point_feature(-46.60, -23.50),
                bad,
                point_feature(-46.61, -23.51),
            ],
            false,
        ),
    );
    h.mock.push_json(200, &page(&[], false));

    h.loader.load_map_data(1).await.unwrap();

    assert_eq!(h.network.len(), 2);
    assert_eq!(h.loader.stats().invalid_skipped, 1);
}
