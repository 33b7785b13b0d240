//! AquaMap - Incremental geodata loading and caching for municipal map layers
//!
//! This library pulls large water-utility datasets (network polylines,
//! economy points, occurrence points) from a paginated, bbox-filtered
//! backend and turns them into renderable map objects exactly once each,
//! while keeping memory bounded and the caller's event loop responsive.
//!
//! # High-Level API
//!
//! The [`orchestrator`] module provides the composition root:
//!
//! ```ignore
//! use aquamap::api::{AuthContext, GeodataClient, ReqwestClient};
//! use aquamap::orchestrator::{LayerGroups, MapLoader};
//!
//! let client = GeodataClient::new(ReqwestClient::new()?, base_url);
//! let loader = MapLoader::new(client, auth, viewport, groups, progress, notifier, config);
//!
//! // Initial bulk load plus one viewport backfill cycle
//! loader.load_map_data(1).await?;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod coord;
pub mod error;
pub mod feature;
pub mod layer;
pub mod loader;
pub mod logging;
pub mod orchestrator;
pub mod processor;
pub mod progress;
pub mod stats;
pub mod tiles;
pub mod viewport;

/// Version of the AquaMap library and CLI.
///
/// Synchronized across all workspace members via `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
