//! Bulk layer loading via page-based pagination.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::api::{ApiError, AsyncHttpClient, AuthContext, GeodataClient};
use crate::error::LoadError;
use crate::layer::{LayerGroup, LayerRegistry, LayerType};
use crate::processor::FeatureProcessor;
use crate::progress::ProgressSink;
use crate::stats::LoaderStats;

/// Pagination position of the economy layer, shared between the initial
/// load and later "load more" continuation calls.
#[derive(Debug)]
pub struct EconomyCursor {
    inner: Mutex<CursorState>,
}

#[derive(Debug, Clone, Copy)]
struct CursorState {
    /// Next page to request.
    next_page: u32,
    /// Whether the backend reported more pages after the last fetch.
    has_more: bool,
}

impl EconomyCursor {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CursorState {
                next_page: 1,
                has_more: true,
            }),
        }
    }

    /// Records the outcome of fetching `page`.
    fn advance(&self, page: u32, has_more: bool) {
        let mut state = self.inner.lock().unwrap();
        state.next_page = page + 1;
        state.has_more = has_more;
    }

    /// `(next page, has_more)` as of the last fetch.
    pub fn position(&self) -> (u32, bool) {
        let state = self.inner.lock().unwrap();
        (state.next_page, state.has_more)
    }
}

impl Default for EconomyCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one layer's load.
#[derive(Debug, Clone, Copy)]
pub struct LayerLoadSummary {
    pub layer: LayerType,
    /// Pages fetched during this call.
    pub pages: u32,
    /// Features handed to the processor during this call.
    pub features: u64,
    /// False when a request failure stopped the chain early.
    pub completed: bool,
}

/// Drives full-dataset retrieval for one layer at a time.
pub struct LayerLoader<C> {
    client: Arc<GeodataClient<C>>,
    processor: Arc<FeatureProcessor>,
    registry: Arc<LayerRegistry>,
    progress: Arc<dyn ProgressSink>,
    stats: Arc<LoaderStats>,
    cursor: Arc<EconomyCursor>,
}

impl<C: AsyncHttpClient> LayerLoader<C> {
    pub fn new(
        client: Arc<GeodataClient<C>>,
        processor: Arc<FeatureProcessor>,
        registry: Arc<LayerRegistry>,
        progress: Arc<dyn ProgressSink>,
        stats: Arc<LoaderStats>,
        cursor: Arc<EconomyCursor>,
    ) -> Self {
        Self {
            client,
            processor,
            registry,
            progress,
            stats,
            cursor,
        }
    }

    /// Loads a layer from `start_page` until the backend reports no more
    /// pages.
    ///
    /// Pages are fetched and processed strictly in order: page N's
    /// features are fully dispatched before page N+1 is requested.
    /// An authentication failure aborts the chain and propagates; any
    /// other request failure stops this layer only, so sibling layers
    /// keep loading.
    pub async fn load_layer(
        &self,
        auth: &AuthContext,
        layer: LayerType,
        start_page: u32,
        group: &dyn LayerGroup,
    ) -> Result<LayerLoadSummary, LoadError> {
        let page_size = layer.page_size();
        let mut page = start_page.max(1);
        let mut pages_fetched = 0u32;
        let mut features_seen = 0u64;
        let mut completed = false;

        loop {
            let fetched = self
                .client
                .fetch_layer_page(&auth.city_id, layer, page, page_size, &auth.token)
                .await;

            let layer_page = match fetched {
                Ok(layer_page) => layer_page,
                Err(ApiError::Unauthorized) => {
                    warn!(
                        layer = layer.as_query(),
                        page = page,
                        "authentication rejected, aborting load chain"
                    );
                    return Err(LoadError::Unauthorized);
                }
                Err(e) => {
                    warn!(
                        layer = layer.as_query(),
                        page = page,
                        error = %e,
                        "page fetch failed, stopping this layer"
                    );
                    self.stats.record_request_failure();
                    break;
                }
            };

            let in_page = layer_page.features.len() as u64;
            features_seen += in_page;
            pages_fetched += 1;
            self.stats.record_page();

            let description = layer_page
                .metadata
                .description
                .clone()
                .unwrap_or_else(|| self.registry.get(layer).description.clone());

            // Progress counts whole pages, not dedup survivors.
            let processed = match page_size {
                Some(size) => (page as u64 - 1) * size as u64 + in_page,
                None => features_seen,
            };
            self.progress
                .report(layer, &description, processed, layer_page.metadata.total_features);

            let has_more = layer_page.metadata.has_more;
            self.processor
                .process(layer_page.features, layer, group)
                .await;

            if layer == LayerType::Economy {
                self.cursor.advance(page, has_more);
            }

            if !has_more {
                completed = true;
                break;
            }
            page += 1;
        }

        info!(
            layer = layer.as_query(),
            pages = pages_fetched,
            features = features_seen,
            completed = completed,
            "layer load finished"
        );

        Ok(LayerLoadSummary {
            layer,
            pages: pages_fetched,
            features: features_seen,
            completed,
        })
    }
}
