//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (longitude/latitude)
//! and Web Mercator slippy-map tiles, plus enumeration of the tiles covering
//! a viewport. All functions are pure; the tile zoom used by the engine is
//! fixed at [`crate::config::TILE_ZOOM`].

mod types;

pub use types::{CoordError, GeoBounds, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `zoom` - Zoom level (0 to 19)
#[inline]
pub fn lon_lat_to_tile(lon: f64, lat: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (n - 1.0) as u32;

    let x = ((lon + 180.0) / 360.0 * n) as u32;

    // Web Mercator latitude transform
    let lat_rad = lat * PI / 180.0;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    Ok(TileCoord {
        x: x.min(max_index),
        y: y.min(max_index),
        zoom,
    })
}

/// Converts a tile to its geographic envelope.
///
/// The northern edge comes from the inverse-Mercator of `y`, the southern
/// edge from `y + 1` (tile rows grow southward).
#[inline]
pub fn tile_to_bbox(tile: &TileCoord) -> GeoBounds {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let min_lon = tile.x as f64 / n * 360.0 - 180.0;
    let max_lon = (tile.x + 1) as f64 / n * 360.0 - 180.0;

    let max_lat = inverse_mercator(tile.y as f64 / n);
    let min_lat = inverse_mercator((tile.y + 1) as f64 / n);

    GeoBounds {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    }
}

/// Enumerates the closed rectangle of tiles covering `bounds` at `zoom`.
///
/// Tiles are returned in row-major order (north to south, west to east).
/// The rectangle is already the minimal covering set, so no dedup is needed.
pub fn visible_tiles(bounds: &GeoBounds, zoom: u8) -> Result<Vec<TileCoord>, CoordError> {
    let north_west = lon_lat_to_tile(bounds.min_lon, bounds.max_lat, zoom)?;
    let south_east = lon_lat_to_tile(bounds.max_lon, bounds.min_lat, zoom)?;

    let columns = (south_east.x - north_west.x) as usize + 1;
    let rows = (south_east.y - north_west.y) as usize + 1;
    let mut tiles = Vec::with_capacity(rows * columns);
    for y in north_west.y..=south_east.y {
        for x in north_west.x..=south_east.x {
            tiles.push(TileCoord { x, y, zoom });
        }
    }
    Ok(tiles)
}

/// Inverse Web Mercator: fractional tile row (0.0..1.0) to latitude.
#[inline]
fn inverse_mercator(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}
