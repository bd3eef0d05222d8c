//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile addresses, plus the ground resolution
//! of a tile pixel used to turn pixel counts into square meters.

mod types;

pub use types::{
    CoordError, GeoCoordinate, TileAddress, MAX_LAT, MAX_LON, MAX_ZOOM, MERCATOR_MAX_LAT,
    MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Ground resolution of a zoom-0 tile pixel at the equator, in meters.
pub const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Converts a geographic coordinate to the slippy-map tile containing it.
///
/// Latitudes beyond the Web Mercator limit (±85.05112878°) are clamped onto
/// the edge rows, and `lng = 180` maps onto the last column, so the result
/// always lies inside the `2^zoom × 2^zoom` grid.
///
/// # Arguments
///
/// * `coord` - Validated coordinate
/// * `zoom` - Zoom level (0 to 22)
#[inline]
pub fn to_tile_address(coord: GeoCoordinate, zoom: u8) -> Result<TileAddress, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let lat = coord.lat().clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let lat_rad = lat * PI / 180.0;

    let x = ((coord.lng() + 180.0) / 360.0 * n).floor().clamp(0.0, max_index);
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max_index);

    Ok(TileAddress {
        zoom,
        x: x as u32,
        y: y as u32,
    })
}

/// Validates raw latitude/longitude and converts to a tile address.
pub fn lat_lng_to_tile(lat: f64, lng: f64, zoom: u8) -> Result<TileAddress, CoordError> {
    to_tile_address(GeoCoordinate::new(lat, lng)?, zoom)
}

/// Ground distance covered by one tile pixel, in meters.
///
/// `156543.03392 · cos(lat) / 2^zoom`. Area conversions use the square of
/// this value.
#[inline]
pub fn meters_per_pixel(lat: f64, zoom: u8) -> f64 {
    EQUATOR_METERS_PER_PIXEL * (lat * PI / 180.0).cos() / 2.0_f64.powi(zoom as i32)
}

/// Converts a tile address back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileAddress) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}
