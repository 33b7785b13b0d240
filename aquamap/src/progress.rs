//! Progress and notification collaborator surfaces.
//!
//! The engine reports loading progress after every page and tile, and
//! raises a single generic notification when a load fails. Both surfaces
//! are traits so a host application can wire them to its own UI; the
//! tracing-backed implementations here are what the CLI uses.

use tracing::{error, info};

use crate::layer::LayerType;

/// Sink for per-page / per-tile loading progress.
pub trait ProgressSink: Send + Sync {
    /// Called after each page or tile with the running processed count and
    /// the backend-declared total, when known.
    fn report(&self, layer: LayerType, description: &str, processed: u64, total: Option<u64>);
}

/// Sink for user-visible failure notifications.
///
/// No structured error detail crosses this boundary; the host shows a
/// generic message and the logs carry the specifics.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Progress sink that logs through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, layer: LayerType, description: &str, processed: u64, total: Option<u64>) {
        match total {
            Some(total) => info!(
                layer = layer.as_query(),
                "Loading {} ({}/{})...",
                description,
                processed,
                total
            ),
            None => info!(
                layer = layer.as_query(),
                "Loading {} ({})...",
                description,
                processed
            ),
        }
    }
}

impl Notifier for TracingProgress {
    fn notify_error(&self, message: &str) {
        error!("{}", message);
    }
}
