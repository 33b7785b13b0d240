//! Raw feature wire types and lazy geometry validation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A GeoJSON feature as returned by the backend.
///
/// `geometry.coordinates` stays an untyped JSON value until
/// [`RawFeature::parsed_geometry`] is called; a page containing one
/// malformed feature still deserializes, and the bad feature is rejected
/// individually during processing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    #[serde(rename = "type", default)]
    pub feature_type: String,
    #[serde(default)]
    pub geometry: Option<RawGeometry>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

/// Unvalidated geometry payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

/// Geometry after validation, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedGeometry {
    /// A single `[lon, lat]` position.
    Point { lon: f64, lat: f64 },
    /// An ordered `[[lon, lat], ...]` vertex chain.
    Line(Vec<(f64, f64)>),
}

/// Reasons a feature's geometry is rejected.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("feature has no geometry")]
    Missing,

    #[error("unsupported geometry type: {0}")]
    UnsupportedType(String),

    #[error("geometry has empty or missing coordinates")]
    EmptyCoordinates,

    #[error("malformed coordinates: {0}")]
    MalformedCoordinates(String),
}

impl RawFeature {
    /// Validates and parses the geometry.
    ///
    /// Accepts `Point` and `LineString`; anything else is rejected with an
    /// error the caller logs before skipping the feature.
    pub fn parsed_geometry(&self) -> Result<ParsedGeometry, GeometryError> {
        let geometry = self.geometry.as_ref().ok_or(GeometryError::Missing)?;
        let coords = match &geometry.coordinates {
            Value::Array(items) if !items.is_empty() => items,
            _ => return Err(GeometryError::EmptyCoordinates),
        };

        match geometry.kind.as_str() {
            "Point" => {
                let (lon, lat) = parse_position(coords)?;
                Ok(ParsedGeometry::Point { lon, lat })
            }
            "LineString" => {
                let mut vertices = Vec::with_capacity(coords.len());
                for item in coords {
                    let pair = item
                        .as_array()
                        .ok_or_else(|| GeometryError::MalformedCoordinates("vertex is not an array".into()))?;
                    vertices.push(parse_position(pair)?);
                }
                Ok(ParsedGeometry::Line(vertices))
            }
            other => Err(GeometryError::UnsupportedType(other.to_string())),
        }
    }
}

/// Parses a `[lon, lat, ...]` position, ignoring any trailing altitude.
fn parse_position(values: &[Value]) -> Result<(f64, f64), GeometryError> {
    if values.len() < 2 {
        return Err(GeometryError::MalformedCoordinates(format!(
            "position has {} ordinates, expected 2",
            values.len()
        )));
    }
    let lon = values[0]
        .as_f64()
        .ok_or_else(|| GeometryError::MalformedCoordinates("longitude is not a number".into()))?;
    let lat = values[1]
        .as_f64()
        .ok_or_else(|| GeometryError::MalformedCoordinates("latitude is not a number".into()))?;
    Ok((lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_from_json(json: &str) -> RawFeature {
        serde_json::from_str(json).expect("test feature should deserialize")
    }

    #[test]
    fn test_parse_point() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-46.6333,-23.5505]},"properties":{"code":"E-1"}}"#,
        );
        let geometry = feature.parsed_geometry().unwrap();
        assert_eq!(
            geometry,
            ParsedGeometry::Point {
                lon: -46.6333,
                lat: -23.5505
            }
        );
    }

    #[test]
    fn test_parse_line_string() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[[-46.6,-23.5],[-46.7,-23.6]]},"properties":{}}"#,
        );
        let geometry = feature.parsed_geometry().unwrap();
        assert_eq!(
            geometry,
            ParsedGeometry::Line(vec![(-46.6, -23.5), (-46.7, -23.6)])
        );
    }

    #[test]
    fn test_null_coordinates_rejected() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":null},"properties":{}}"#,
        );
        assert!(matches!(
            feature.parsed_geometry(),
            Err(GeometryError::EmptyCoordinates)
        ));
    }

    #[test]
    fn test_empty_coordinates_rejected() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{}}"#,
        );
        assert!(matches!(
            feature.parsed_geometry(),
            Err(GeometryError::EmptyCoordinates)
        ));
    }

    #[test]
    fn test_missing_geometry_rejected() {
        let feature = feature_from_json(r#"{"type":"Feature","properties":{}}"#);
        assert!(matches!(
            feature.parsed_geometry(),
            Err(GeometryError::Missing)
        ));
    }

    #[test]
    fn test_polygon_rejected() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{}}"#,
        );
        assert!(matches!(
            feature.parsed_geometry(),
            Err(GeometryError::UnsupportedType(t)) if t == "Polygon"
        ));
    }

    #[test]
    fn test_non_numeric_ordinate_rejected() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":["a","b"]},"properties":{}}"#,
        );
        assert!(matches!(
            feature.parsed_geometry(),
            Err(GeometryError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_altitude_ignored() {
        let feature = feature_from_json(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-46.6,-23.5,720.0]},"properties":{}}"#,
        );
        assert!(feature.parsed_geometry().is_ok());
    }
}
