//! Render objects: the drawables built from raw features.

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use super::style::LayerDescriptor;
use super::LayerType;
use crate::coord::GeoBounds;

/// Geometry of a drawable map object.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderGeometry {
    /// Circle marker at a point.
    Marker { lon: f64, lat: f64 },
    /// Polyline through a vertex chain.
    Polyline { vertices: Vec<(f64, f64)> },
}

/// A materialized drawable, owned by exactly one layer group.
///
/// Created once by the feature processor and never mutated afterwards;
/// removal only happens when the owning group is cleared wholesale.
#[derive(Debug)]
pub struct RenderObject {
    pub layer: LayerType,
    pub geometry: RenderGeometry,
    properties: serde_json::Map<String, Value>,
    descriptor: Arc<LayerDescriptor>,
    popup: OnceLock<String>,
}

impl RenderObject {
    /// Creates a render object carrying the layer's static style.
    pub fn new(
        layer: LayerType,
        geometry: RenderGeometry,
        properties: serde_json::Map<String, Value>,
        descriptor: Arc<LayerDescriptor>,
    ) -> Self {
        Self {
            layer,
            geometry,
            properties,
            descriptor,
            popup: OnceLock::new(),
        }
    }

    /// The layer's static style.
    pub fn style(&self) -> &super::LayerStyle {
        &self.descriptor.style
    }

    /// Raw backend properties.
    pub fn properties(&self) -> &serde_json::Map<String, Value> {
        &self.properties
    }

    /// The popup body, built from the properties on first access.
    ///
    /// Popups are opened for a tiny fraction of objects, so the HTML is
    /// deferred until a click instead of being built for every feature.
    pub fn popup_html(&self) -> &str {
        self.popup.get_or_init(|| {
            let mut html = format!("<b>{}</b>", self.descriptor.description);
            for (key, label) in &self.descriptor.popup_fields {
                if let Some(value) = self.properties.get(key) {
                    html.push_str(&format!("<br>{}: {}", label, render_value(value)));
                }
            }
            html
        })
    }

    /// Whether the popup body has been built yet.
    pub fn popup_built(&self) -> bool {
        self.popup.get().is_some()
    }

    /// Geographic envelope of this object.
    pub fn bounds(&self) -> GeoBounds {
        match &self.geometry {
            RenderGeometry::Marker { lon, lat } => GeoBounds::from_point(*lon, *lat),
            RenderGeometry::Polyline { vertices } => {
                let mut bounds = GeoBounds::from_point(vertices[0].0, vertices[0].1);
                for (lon, lat) in &vertices[1..] {
                    bounds = bounds.union(&GeoBounds::from_point(*lon, *lat));
                }
                bounds
            }
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
