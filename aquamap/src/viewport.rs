//! Map viewport collaborator interface.
//!
//! The actual map widget lives in the host application; the engine only
//! reads zoom and bounds, asks for a fit-to-bounds once after the bulk
//! load, and receives move events over a channel. [`FixedViewport`] is
//! the in-process implementation used by the CLI and tests.

use std::sync::Mutex;

use crate::coord::GeoBounds;

/// A viewport `moveend` event. Carries no payload; the tile manager reads
/// the viewport's current state when the debounce window closes.
#[derive(Debug, Clone, Copy)]
pub struct MoveEnd;

/// Read access to the map viewport, plus the one write the engine needs.
pub trait Viewport: Send + Sync {
    /// Current zoom level.
    fn zoom(&self) -> u8;

    /// Current viewport bounds.
    fn bounds(&self) -> GeoBounds;

    /// Pans/zooms the map to show the given bounds.
    fn fit_bounds(&self, bounds: &GeoBounds);
}

/// Viewport with explicitly settable state.
pub struct FixedViewport {
    state: Mutex<ViewportState>,
}

struct ViewportState {
    zoom: u8,
    bounds: GeoBounds,
    fitted: Option<GeoBounds>,
}

impl FixedViewport {
    pub fn new(zoom: u8, bounds: GeoBounds) -> Self {
        Self {
            state: Mutex::new(ViewportState {
                zoom,
                bounds,
                fitted: None,
            }),
        }
    }

    /// Moves the viewport, as a pan/zoom interaction would.
    pub fn set_view(&self, zoom: u8, bounds: GeoBounds) {
        let mut state = self.state.lock().unwrap();
        state.zoom = zoom;
        state.bounds = bounds;
    }

    /// The bounds last passed to `fit_bounds`, if any.
    pub fn fitted_bounds(&self) -> Option<GeoBounds> {
        self.state.lock().unwrap().fitted
    }
}

impl Viewport for FixedViewport {
    fn zoom(&self) -> u8 {
        self.state.lock().unwrap().zoom
    }

    fn bounds(&self) -> GeoBounds {
        self.state.lock().unwrap().bounds
    }

    fn fit_bounds(&self, bounds: &GeoBounds) {
        let mut state = self.state.lock().unwrap();
        state.bounds = *bounds;
        state.fitted = Some(*bounds);
    }
}
