//! Layer types, styles, render objects and layer groups.

mod group;
mod render;
mod style;
mod types;

pub use group::{LayerGroup, VectorLayerGroup};
pub use render::{RenderGeometry, RenderObject};
pub use style::{LayerDescriptor, LayerRegistry, LayerStyle};
pub use types::LayerType;
