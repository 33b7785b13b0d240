//! Static layer styles and popup field configuration.
//!
//! Styles and popup labels are read-only configuration supplied by the
//! host application; the defaults here match the backend's layer
//! vocabulary and are what the CLI uses.

use std::collections::HashMap;
use std::sync::Arc;

use super::LayerType;

/// Static stroke/fill style applied to every render object of a layer.
#[derive(Debug, Clone)]
pub struct LayerStyle {
    /// Stroke color as a CSS hex string.
    pub color: String,
    /// Stroke weight in pixels (polylines).
    pub weight: f32,
    /// Stroke opacity (0.0 to 1.0).
    pub opacity: f32,
    /// Fill color for markers; `None` inherits the stroke color.
    pub fill_color: Option<String>,
    /// Marker radius in pixels (ignored for polylines).
    pub radius: f32,
}

/// Per-layer configuration: style, display name, popup field labels.
#[derive(Debug, Clone)]
pub struct LayerDescriptor {
    pub style: LayerStyle,
    /// Human-readable layer description for progress messages.
    pub description: String,
    /// `(property key, display label)` pairs rendered into popups.
    pub popup_fields: Vec<(String, String)>,
}

/// Read-only lookup table of layer descriptors.
pub struct LayerRegistry {
    descriptors: HashMap<LayerType, Arc<LayerDescriptor>>,
}

impl LayerRegistry {
    /// Builds a registry from explicit descriptors.
    pub fn new(descriptors: HashMap<LayerType, Arc<LayerDescriptor>>) -> Self {
        Self { descriptors }
    }

    /// Returns the descriptor for a layer.
    ///
    /// Every layer type has a default descriptor, so this never fails.
    pub fn get(&self, layer: LayerType) -> Arc<LayerDescriptor> {
        self.descriptors
            .get(&layer)
            .cloned()
            .unwrap_or_else(|| Arc::new(default_descriptor(layer)))
    }

    /// Replaces the descriptor for a layer.
    pub fn insert(&mut self, layer: LayerType, descriptor: LayerDescriptor) {
        self.descriptors.insert(layer, Arc::new(descriptor));
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let mut descriptors = HashMap::new();
        for layer in LayerType::ALL {
            descriptors.insert(layer, Arc::new(default_descriptor(layer)));
        }
        Self { descriptors }
    }
}

fn default_descriptor(layer: LayerType) -> LayerDescriptor {
    match layer {
        LayerType::Network => LayerDescriptor {
            style: LayerStyle {
                color: "#1f6feb".to_string(),
                weight: 2.0,
                opacity: 0.9,
                fill_color: None,
                radius: 0.0,
            },
            description: "water network".to_string(),
            popup_fields: vec![
                ("material".to_string(), "Material".to_string()),
                ("diameter_mm".to_string(), "Diameter (mm)".to_string()),
                ("length_m".to_string(), "Length (m)".to_string()),
            ],
        },
        LayerType::Economy => LayerDescriptor {
            style: LayerStyle {
                color: "#2da44e".to_string(),
                weight: 1.0,
                opacity: 0.85,
                fill_color: Some("#2da44e".to_string()),
                radius: 4.0,
            },
            description: "economies".to_string(),
            popup_fields: vec![
                ("code".to_string(), "Code".to_string()),
                ("address".to_string(), "Address".to_string()),
                ("category".to_string(), "Category".to_string()),
            ],
        },
        LayerType::Occurrence => LayerDescriptor {
            style: LayerStyle {
                color: "#cf222e".to_string(),
                weight: 1.0,
                opacity: 0.9,
                fill_color: Some("#cf222e".to_string()),
                radius: 5.0,
            },
            description: "occurrences".to_string(),
            popup_fields: vec![
                ("kind".to_string(), "Type".to_string()),
                ("status".to_string(), "Status".to_string()),
                ("opened_at".to_string(), "Opened".to_string()),
            ],
        },
    }
}
