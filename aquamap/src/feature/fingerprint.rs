//! Geometry fingerprints for dedup.

use serde_json::Value;

use super::RawFeature;

/// Computes the dedup fingerprint for a feature, if its geometry can
/// produce one.
///
/// Points round to 5 decimal places (about 1.1 m on the ground) and join
/// as `"lon,lat"`; lines use the JSON form of their first vertex. Two
/// distinct features collapsing to the same key is an accepted trade-off:
/// at sub-meter density, suppressing the duplicate is cheaper than
/// rendering it.
///
/// Returns `None` when the geometry cannot yield a key; such features go
/// on to full validation, which rejects them without touching any cache.
pub fn fingerprint(feature: &RawFeature) -> Option<String> {
    let geometry = feature.geometry.as_ref()?;
    let coords = geometry.coordinates.as_array()?;
    if coords.is_empty() {
        return None;
    }

    match geometry.kind.as_str() {
        "Point" => {
            let lon = coords.first()?.as_f64()?;
            let lat = coords.get(1)?.as_f64()?;
            Some(format!("{:.5},{:.5}", lon, lat))
        }
        "LineString" => {
            let first: &Value = coords.first()?;
            serde_json::to_string(first).ok()
        }
        _ => None,
    }
}
