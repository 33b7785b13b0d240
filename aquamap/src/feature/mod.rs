//! Backend feature model and dedup fingerprinting.
//!
//! Features arrive as GeoJSON from the paginated backend. Geometry is kept
//! raw at deserialization time and validated lazily, so one malformed
//! feature never poisons the page it arrived in.

mod fingerprint;
mod types;

pub use fingerprint::fingerprint;
pub use types::{GeometryError, ParsedGeometry, RawFeature, RawGeometry};
