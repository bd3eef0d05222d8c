//! Pixel-count to square-meter conversion and the plausibility clamp.

use crate::coord::meters_per_pixel;

/// Smallest area, in m², any estimate may report.
pub const MIN_PLAUSIBLE_AREA: f64 = 20.0;

/// Largest area, in m², any estimate may report.
pub const MAX_PLAUSIBLE_AREA: f64 = 2000.0;

/// Hard floor/ceiling applied to every area estimate.
///
/// One policy serves the direct region path, the center-sampling path and
/// the non-raster sources alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaClamp {
    pub min: f64,
    pub max: f64,
}

impl Default for AreaClamp {
    fn default() -> Self {
        Self {
            min: MIN_PLAUSIBLE_AREA,
            max: MAX_PLAUSIBLE_AREA,
        }
    }
}

impl AreaClamp {
    /// Clamps `area` into `[min, max]`. NaN maps to `min`.
    pub fn apply(&self, area: f64) -> f64 {
        if area.is_nan() {
            return self.min;
        }
        area.clamp(self.min, self.max)
    }
}

/// Converts pixel counts at a given latitude and zoom into m².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaConverter {
    square_meters_per_pixel: f64,
    clamp: AreaClamp,
}

impl AreaConverter {
    pub fn new(lat: f64, zoom: u8, clamp: AreaClamp) -> Self {
        let mpp = meters_per_pixel(lat, zoom);
        Self {
            square_meters_per_pixel: mpp * mpp,
            clamp,
        }
    }

    /// Ground area of a single pixel.
    pub fn square_meters_per_pixel(&self) -> f64 {
        self.square_meters_per_pixel
    }

    /// Unclamped area of `pixels` pixels. Fractional counts are allowed so
    /// extrapolated estimates convert the same way.
    pub fn raw_area(&self, pixels: f64) -> f64 {
        pixels * self.square_meters_per_pixel
    }

    /// Clamped area of `pixels` pixels.
    pub fn to_square_meters(&self, pixels: f64) -> f64 {
        self.clamp.apply(self.raw_area(pixels))
    }
}
