//! Top-level error taxonomy for map loading.
//!
//! Failures are handled at the narrowest scope that can absorb them:
//! per-feature render failures and malformed geometries are logged and
//! skipped inside the processor, per-page and per-tile request failures
//! stop only their own chain, and only the variants here unwind as far
//! as the orchestrator's caller.

use thiserror::Error;

use crate::api::ApiError;
use crate::coord::CoordError;

/// Errors surfaced by the loading orchestrator.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required credential was absent before any network call.
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The backend rejected the bearer token (HTTP 401). Terminates the
    /// load chain; the caller is expected to redirect to re-authentication.
    #[error("authentication rejected by backend")]
    Unauthorized,

    /// A backend request failed in a way the loader chose to propagate.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Viewport bounds could not be converted to tiles.
    #[error(transparent)]
    Coord(#[from] CoordError),
}
