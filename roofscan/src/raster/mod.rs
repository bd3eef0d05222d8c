//! Raster footprint analysis
//!
//! Turns a decoded imagery tile into a roof area estimate:
//!
//! ```text
//! RasterTile ──► RoofMask ──► RegionSegmenter ──► largest Region ──► AreaConverter
//!   (RGBA)     (classifier)    (flood fill)            │                (clamped m²)
//!                                                       └─ none ──► CenterSampler
//! ```

mod area;
mod classify;
mod sampling;
mod segment;
mod tile;

pub use area::{AreaClamp, AreaConverter, MAX_PLAUSIBLE_AREA, MIN_PLAUSIBLE_AREA};
pub use classify::{is_roof_color, ClassifierThresholds, PixelClassifier, RoofMaterial};
pub use sampling::{
    CenterSample, CenterSampler, SampleWindow, DEFAULT_ROOF_SHARE, DEFAULT_WINDOWS,
};
pub use segment::{
    select_largest, Region, RegionSegmenter, RoofMask, SegmenterConfig, DEFAULT_COLOR_THRESHOLD,
    DEFAULT_NOISE_FLOOR,
};
pub use tile::RasterTile;

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during raster analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Pixel buffer length does not match `width × height × 4`.
    #[error("RGBA buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// Segmentation found no region above the noise floor.
    #[error("No roof region above the noise floor")]
    NoQualifyingRegion,

    /// Center sampling could not read a single pixel.
    #[error("Center sampling found no pixels to sample")]
    EmptySample,
}

/// How a raster estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterMethod {
    /// Area of the largest segmented region.
    Region(Region),
    /// Extrapolated from center sampling.
    CenterSample(CenterSample),
}

/// Outcome of analysing one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterAnalysis {
    /// Area before the plausibility clamp.
    pub raw_area: f64,
    /// Area after the plausibility clamp.
    pub area_square_meters: f64,
    pub method: RasterMethod,
    /// Material of the measured region, `None` for center sampling.
    pub material: Option<RoofMaterial>,
}

/// Classifier, segmenter and sampler bundled for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct RasterAnalyzer {
    classifier: PixelClassifier,
    segmenter: RegionSegmenter,
    sampler: CenterSampler,
    clamp: AreaClamp,
}

impl RasterAnalyzer {
    pub fn new(
        classifier: PixelClassifier,
        segmenter: RegionSegmenter,
        sampler: CenterSampler,
        clamp: AreaClamp,
    ) -> Self {
        Self {
            classifier,
            segmenter,
            sampler,
            clamp,
        }
    }

    /// Estimates the roof area in `tile`, imaged at `lat` and `zoom`.
    ///
    /// Uses the largest segmented region, or center sampling when no region
    /// clears the noise floor.
    pub fn analyze(
        &self,
        tile: &RasterTile,
        lat: f64,
        zoom: u8,
    ) -> Result<RasterAnalysis, RasterError> {
        let mask = RoofMask::classify(tile, &self.classifier);
        let converter = AreaConverter::new(lat, zoom, self.clamp);

        let (pixels, method, material) = match self.segmenter.largest_region(tile, &mask) {
            Ok(region) => {
                let [r, g, b] = region.representative_color;
                let material = self.classifier.classify(r, g, b);
                debug!(
                    pixels = region.pixel_count,
                    origin = ?region.origin,
                    ?material,
                    "Largest roof region selected"
                );
                (
                    region.pixel_count as f64,
                    RasterMethod::Region(region),
                    material,
                )
            }
            Err(RasterError::NoQualifyingRegion) => {
                let sample = self.sampler.sample(&mask)?;
                debug!(
                    roof = sample.roof_pixels,
                    sampled = sample.sampled_pixels,
                    "No qualifying region, using center sampling"
                );
                (
                    self.sampler.extrapolate(&sample, tile.pixel_count()),
                    RasterMethod::CenterSample(sample),
                    None,
                )
            }
            Err(e) => return Err(e),
        };

        let raw_area = converter.raw_area(pixels);
        Ok(RasterAnalysis {
            raw_area,
            area_square_meters: self.clamp.apply(raw_area),
            method,
            material,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: [u8; 3] = [40, 140, 40];
    const CLAY: [u8; 3] = [180, 90, 60];

    #[test]
    fn test_region_path() {
        let mut tile = RasterTile::filled(256, 256, GRASS);
        tile.fill_rect(100, 100, 40, 30, CLAY);

        let analysis = RasterAnalyzer::default().analyze(&tile, 28.6139, 19).unwrap();

        assert!(matches!(
            analysis.method,
            RasterMethod::Region(Region {
                pixel_count: 1200,
                ..
            })
        ));
        assert!((analysis.area_square_meters - 82.445_351).abs() < 1e-3);
        assert_eq!(analysis.material, Some(RoofMaterial::Terracotta));
    }

    #[test]
    fn test_center_sampling_path() {
        // Checkerboard of roof/non-roof: no 4-connected region survives
        let mut tile = RasterTile::filled(256, 256, GRASS);
        for y in 0..256 {
            for x in 0..256 {
                if (x + y) % 2 == 0 {
                    tile.set_rgb(x, y, CLAY);
                }
            }
        }

        let analysis = RasterAnalyzer::default().analyze(&tile, 0.0, 19).unwrap();

        match analysis.method {
            RasterMethod::CenterSample(sample) => {
                let ratio = sample.ratio();
                assert!(ratio > 0.4 && ratio < 0.6, "ratio {}", ratio);
            }
            other => panic!("expected center sampling, got {:?}", other),
        }
        assert_eq!(analysis.material, None);
        assert!(analysis.area_square_meters >= MIN_PLAUSIBLE_AREA);
        assert!(analysis.area_square_meters <= MAX_PLAUSIBLE_AREA);
    }

    #[test]
    fn test_bare_ground_is_floored() {
        let tile = RasterTile::filled(256, 256, GRASS);
        let analysis = RasterAnalyzer::default().analyze(&tile, 0.0, 19).unwrap();

        assert_eq!(analysis.raw_area, 0.0);
        assert_eq!(analysis.area_square_meters, MIN_PLAUSIBLE_AREA);
    }

    #[test]
    fn test_huge_region_is_capped() {
        let tile = RasterTile::filled(256, 256, CLAY);
        let analysis = RasterAnalyzer::default().analyze(&tile, 0.0, 19).unwrap();

        assert!(analysis.raw_area > MAX_PLAUSIBLE_AREA);
        assert_eq!(analysis.area_square_meters, MAX_PLAUSIBLE_AREA);
    }
}
