//! Coordinate types and errors

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Minimum valid latitude.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude.
pub const MAX_LON: f64 = 180.0;

/// Latitude limit of the Web Mercator projection.
///
/// Latitudes beyond this project onto the first or last tile row.
pub const MERCATOR_MAX_LAT: f64 = 85.05112878;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level accepted for tile addressing.
pub const MAX_ZOOM: u8 = 22;

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// Zoom level above the supported maximum.
    #[error("Invalid zoom level: {0} (must be between 0 and 22)")]
    InvalidZoom(u8),
}

/// A validated geographic coordinate in degrees.
///
/// Construction through [`GeoCoordinate::new`] guarantees
/// `-90 ≤ lat ≤ 90` and `-180 ≤ lng ≤ 180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    lat: f64,
    lng: f64,
}

impl GeoCoordinate {
    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(MIN_LON..=MAX_LON).contains(&lng) {
            return Err(CoordError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Slippy-map tile address.
///
/// `x` increases eastward, `y` increases southward, both in `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
