//! Layer type enumeration and per-type loading policy.

use crate::config::{
    ECONOMY_PAGE_SIZE, NETWORK_CHUNK_SIZE, NETWORK_RENDER_BATCH, POINT_CHUNK_SIZE,
    POINT_RENDER_BATCH,
};

/// The three geodata layers served by the backend.
///
/// Each carries its own pagination and batching policy: the network layer
/// is sparse polylines the backend returns whole, economies are a large
/// point set fetched in fixed pages (and tiled near the viewport once
/// zoomed in), occurrences are a moderate point set fetched unpaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Water-network polylines.
    Network,
    /// Service-connection points ("economias"), high volume.
    Economy,
    /// Incident points ("ocorrencias"), moderate volume.
    Occurrence,
}

impl LayerType {
    /// All layer types, in startup load order.
    pub const ALL: [LayerType; 3] = [LayerType::Network, LayerType::Economy, LayerType::Occurrence];

    /// The `type` query-parameter value the backend expects.
    pub fn as_query(&self) -> &'static str {
        match self {
            LayerType::Network => "network",
            LayerType::Economy => "economy",
            LayerType::Occurrence => "occurrence",
        }
    }

    /// Pagination page size; `None` means the backend returns the whole
    /// dataset in one page.
    pub fn page_size(&self) -> Option<u32> {
        match self {
            LayerType::Network => None,
            LayerType::Economy => Some(ECONOMY_PAGE_SIZE),
            LayerType::Occurrence => None,
        }
    }

    /// Processing chunk size for the feature processor.
    pub fn chunk_size(&self) -> usize {
        match self {
            LayerType::Network => NETWORK_CHUNK_SIZE,
            LayerType::Economy | LayerType::Occurrence => POINT_CHUNK_SIZE,
        }
    }

    /// Render sub-batch size for layer-group additions.
    pub fn render_batch_size(&self) -> usize {
        match self {
            LayerType::Network => NETWORK_RENDER_BATCH,
            LayerType::Economy | LayerType::Occurrence => POINT_RENDER_BATCH,
        }
    }

    /// Whether the layer is kept populated by the viewport tile manager
    /// rather than bulk-loaded at startup.
    pub fn is_tiled(&self) -> bool {
        matches!(self, LayerType::Economy)
    }
}
