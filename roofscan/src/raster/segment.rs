//! Connected-component region growing over roof-classified pixels.
//!
//! Regions are 4-connected and color-coherent: a pixel joins the region
//! grown from a seed only if it is roof-classified and its RGB distance to
//! the seed color is below the similarity threshold. Seeds are visited in
//! row-major order, so discovery order is deterministic.

use super::classify::PixelClassifier;
use super::tile::RasterTile;
use super::RasterError;

/// Default Euclidean RGB distance a pixel may deviate from its seed color.
pub const DEFAULT_COLOR_THRESHOLD: f64 = 30.0;

/// Default noise floor: regions with this many pixels or fewer are dropped.
pub const DEFAULT_NOISE_FLOOR: usize = 50;

/// A maximal 4-connected, color-coherent set of roof pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Number of pixels in the region.
    pub pixel_count: usize,
    /// Color of the seed pixel the region grew from.
    pub representative_color: [u8; 3],
    /// `(x, y)` of the seed pixel.
    pub origin: (usize, usize),
}

/// Segmenter tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterConfig {
    /// Maximum RGB distance from the seed color (exclusive).
    pub color_threshold: f64,
    /// Regions must be strictly larger than this to qualify.
    pub noise_floor: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            color_threshold: DEFAULT_COLOR_THRESHOLD,
            noise_floor: DEFAULT_NOISE_FLOOR,
        }
    }
}

/// Per-pixel roof classification of a tile, row-major.
#[derive(Debug, Clone)]
pub struct RoofMask {
    width: usize,
    height: usize,
    roof: Vec<bool>,
}

impl RoofMask {
    /// Classifies every pixel of `tile`.
    pub fn classify(tile: &RasterTile, classifier: &PixelClassifier) -> Self {
        let roof = (0..tile.pixel_count())
            .map(|i| classifier.is_roof_rgb(tile.rgb_at(i)))
            .collect();
        Self {
            width: tile.width(),
            height: tile.height(),
            roof,
        }
    }

    /// Whether the pixel at `(x, y)` is roof-colored.
    #[inline]
    pub fn is_roof(&self, x: usize, y: usize) -> bool {
        self.roof[y * self.width + x]
    }

    /// Number of roof-classified pixels.
    pub fn roof_count(&self) -> usize {
        self.roof.iter().filter(|&&r| r).count()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[inline]
fn color_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = a[0] as f64 - b[0] as f64;
    let dg = a[1] as f64 - b[1] as f64;
    let db = a[2] as f64 - b[2] as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Flood-fill segmenter producing roof regions.
#[derive(Debug, Clone, Default)]
pub struct RegionSegmenter {
    config: SegmenterConfig,
}

impl RegionSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// All regions above the noise floor, in discovery order.
    pub fn find_regions(&self, tile: &RasterTile, mask: &RoofMask) -> Vec<Region> {
        let mut visited = vec![false; tile.pixel_count()];
        let mut stack = Vec::new();
        let mut regions = Vec::new();

        for y in 0..tile.height() {
            for x in 0..tile.width() {
                let index = y * tile.width() + x;
                if visited[index] || !mask.is_roof(x, y) {
                    continue;
                }

                let region = self.grow(tile, mask, &mut visited, &mut stack, (x, y));
                if region.pixel_count > self.config.noise_floor {
                    regions.push(region);
                }
            }
        }

        regions
    }

    /// The largest qualifying region.
    ///
    /// Returns [`RasterError::NoQualifyingRegion`] when nothing clears the
    /// noise floor.
    pub fn largest_region(
        &self,
        tile: &RasterTile,
        mask: &RoofMask,
    ) -> Result<Region, RasterError> {
        select_largest(&self.find_regions(tile, mask)).ok_or(RasterError::NoQualifyingRegion)
    }

    fn grow(
        &self,
        tile: &RasterTile,
        mask: &RoofMask,
        visited: &mut [bool],
        stack: &mut Vec<(usize, usize)>,
        seed: (usize, usize),
    ) -> Region {
        let width = tile.width();
        let height = tile.height();
        let seed_color = tile.rgb(seed.0, seed.1);
        let mut pixel_count = 0;

        stack.clear();
        stack.push(seed);

        while let Some((x, y)) = stack.pop() {
            let index = y * width + x;
            if visited[index] || !mask.is_roof(x, y) {
                continue;
            }
            if color_distance(seed_color, tile.rgb_at(index)) >= self.config.color_threshold {
                continue;
            }

            visited[index] = true;
            pixel_count += 1;

            if x + 1 < width {
                stack.push((x + 1, y));
            }
            if x > 0 {
                stack.push((x - 1, y));
            }
            if y + 1 < height {
                stack.push((x, y + 1));
            }
            if y > 0 {
                stack.push((x, y - 1));
            }
        }

        Region {
            pixel_count,
            representative_color: seed_color,
            origin: seed,
        }
    }
}

/// Picks the region with the greatest pixel count; the earliest wins ties.
pub fn select_largest(regions: &[Region]) -> Option<Region> {
    regions.iter().fold(None, |best: Option<Region>, region| match best {
        Some(current) if current.pixel_count >= region.pixel_count => Some(current),
        _ => Some(*region),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: [u8; 3] = [40, 140, 40];
    const CLAY: [u8; 3] = [180, 90, 60];
    const CONCRETE: [u8; 3] = [120, 120, 120];

    fn segment(tile: &RasterTile) -> Vec<Region> {
        let mask = RoofMask::classify(tile, &PixelClassifier::default());
        RegionSegmenter::default().find_regions(tile, &mask)
    }

    #[test]
    fn test_uniform_square_is_one_region() {
        let mut tile = RasterTile::filled(64, 64, GRASS);
        tile.fill_rect(10, 10, 20, 20, CLAY);

        let regions = segment(&tile);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 400);
        assert_eq!(regions[0].origin, (10, 10));
        assert_eq!(regions[0].representative_color, CLAY);
    }

    #[test]
    fn test_noise_floor_is_exclusive() {
        let mut tile = RasterTile::filled(32, 32, GRASS);
        // exactly 50 pixels: dropped
        tile.fill_rect(0, 0, 10, 5, CLAY);
        // 51 pixels: kept
        tile.fill_rect(0, 20, 17, 3, CONCRETE);

        let regions = segment(&tile);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].pixel_count, 51);
    }

    #[test]
    fn test_dissimilar_adjacent_roofs_split() {
        let mut tile = RasterTile::filled(40, 20, GRASS);
        tile.fill_rect(0, 0, 20, 10, CLAY);
        tile.fill_rect(20, 0, 20, 10, CONCRETE);

        let regions = segment(&tile);
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.pixel_count == 200));
    }

    #[test]
    fn test_diagonal_pixels_are_not_connected() {
        let mut tile = RasterTile::filled(4, 4, GRASS);
        tile.set_rgb(0, 0, CLAY);
        tile.set_rgb(1, 1, CLAY);

        let mask = RoofMask::classify(&tile, &PixelClassifier::default());
        let segmenter = RegionSegmenter::new(SegmenterConfig {
            noise_floor: 0,
            ..Default::default()
        });
        let regions = segmenter.find_regions(&tile, &mask);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn test_largest_region_selected() {
        let mut tile = RasterTile::filled(100, 100, GRASS);
        tile.fill_rect(0, 0, 10, 10, CLAY);
        tile.fill_rect(50, 50, 30, 30, CONCRETE);

        let mask = RoofMask::classify(&tile, &PixelClassifier::default());
        let largest = RegionSegmenter::default()
            .largest_region(&tile, &mask)
            .unwrap();
        assert_eq!(largest.pixel_count, 900);
        assert_eq!(largest.origin, (50, 50));
    }

    #[test]
    fn test_tie_resolves_to_first_in_scan_order() {
        let mut tile = RasterTile::filled(100, 100, GRASS);
        tile.fill_rect(60, 5, 10, 10, CONCRETE);
        tile.fill_rect(5, 40, 10, 10, CLAY);

        let mask = RoofMask::classify(&tile, &PixelClassifier::default());
        let largest = RegionSegmenter::default()
            .largest_region(&tile, &mask)
            .unwrap();
        assert_eq!(largest.origin, (60, 5));
        assert_eq!(largest.representative_color, CONCRETE);
    }

    #[test]
    fn test_no_region_reports_error() {
        let tile = RasterTile::filled(32, 32, GRASS);
        let mask = RoofMask::classify(&tile, &PixelClassifier::default());
        let result = RegionSegmenter::default().largest_region(&tile, &mask);
        assert_eq!(result, Err(RasterError::NoQualifyingRegion));
    }

    #[test]
    fn test_select_largest_empty() {
        assert_eq!(select_largest(&[]), None);
    }

    #[test]
    fn test_select_largest_prefers_earlier_on_tie() {
        let a = Region {
            pixel_count: 80,
            representative_color: CLAY,
            origin: (0, 0),
        };
        let b = Region {
            origin: (5, 5),
            ..a
        };
        assert_eq!(select_largest(&[a, b]), Some(a));
    }

    #[test]
    fn test_roof_mask_counts() {
        let mut tile = RasterTile::filled(10, 10, GRASS);
        tile.fill_rect(0, 0, 3, 3, CLAY);
        let mask = RoofMask::classify(&tile, &PixelClassifier::default());
        assert_eq!(mask.roof_count(), 9);
        assert!(mask.is_roof(2, 2));
        assert!(!mask.is_roof(3, 3));
    }
}
