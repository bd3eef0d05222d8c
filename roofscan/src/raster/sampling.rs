//! Center-sampling fallback for tiles with no qualifying region.
//!
//! A few fixed circular windows around the image center are scanned for
//! roof-classified pixels. The roof ratio found there is extrapolated to the
//! whole image, scaled down by the share of the visible ground a single
//! building is assumed to cover.

use super::segment::RoofMask;
use super::RasterError;

/// Share of the visible area attributed to the building under the cursor.
pub const DEFAULT_ROOF_SHARE: f64 = 0.3;

/// A circular sampling window, positioned relative to the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    /// Center x as a fraction of the image width.
    pub center_x: f64,
    /// Center y as a fraction of the image height.
    pub center_y: f64,
    /// Radius in pixels.
    pub radius: f64,
}

impl SampleWindow {
    pub const fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }
}

/// Default windows: a diagonal through the image center.
pub const DEFAULT_WINDOWS: [SampleWindow; 3] = [
    SampleWindow::new(0.4, 0.4, 30.0),
    SampleWindow::new(0.5, 0.5, 35.0),
    SampleWindow::new(0.6, 0.6, 30.0),
];

/// Counts gathered over all windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterSample {
    pub roof_pixels: usize,
    pub sampled_pixels: usize,
}

impl CenterSample {
    /// Fraction of sampled pixels that were roof-colored.
    pub fn ratio(&self) -> f64 {
        if self.sampled_pixels == 0 {
            0.0
        } else {
            self.roof_pixels as f64 / self.sampled_pixels as f64
        }
    }
}

/// Samples the windows and extrapolates a roof pixel count.
#[derive(Debug, Clone)]
pub struct CenterSampler {
    windows: Vec<SampleWindow>,
    roof_share: f64,
}

impl Default for CenterSampler {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOWS.to_vec(), DEFAULT_ROOF_SHARE)
    }
}

impl CenterSampler {
    pub fn new(windows: Vec<SampleWindow>, roof_share: f64) -> Self {
        Self {
            windows,
            roof_share,
        }
    }

    /// Scans every window over `mask`.
    ///
    /// Pixels of overlapping windows are counted once per window. Fails with
    /// [`RasterError::EmptySample`] if no window touches the image.
    pub fn sample(&self, mask: &RoofMask) -> Result<CenterSample, RasterError> {
        let mut total = CenterSample {
            roof_pixels: 0,
            sampled_pixels: 0,
        };

        for window in &self.windows {
            let cx = mask.width() as f64 * window.center_x;
            let cy = mask.height() as f64 * window.center_y;
            let reach = window.radius.floor() as i64;

            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let (fx, fy) = (dx as f64, dy as f64);
                    if (fx * fx + fy * fy).sqrt() > window.radius {
                        continue;
                    }

                    let x = cx + fx;
                    let y = cy + fy;
                    if x < 0.0 || y < 0.0 {
                        continue;
                    }
                    let (px, py) = (x.floor() as usize, y.floor() as usize);
                    if px >= mask.width() || py >= mask.height() {
                        continue;
                    }

                    total.sampled_pixels += 1;
                    if mask.is_roof(px, py) {
                        total.roof_pixels += 1;
                    }
                }
            }
        }

        if total.sampled_pixels == 0 {
            return Err(RasterError::EmptySample);
        }
        Ok(total)
    }

    /// Roof pixels extrapolated from a sample: `ratio × share × image area`.
    pub fn extrapolate(&self, sample: &CenterSample, image_pixels: usize) -> f64 {
        sample.ratio() * self.roof_share * image_pixels as f64
    }
}
