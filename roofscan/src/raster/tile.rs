//! Decoded RGBA raster owned by a single analysis call.

use image::RgbaImage;

use super::RasterError;

/// Bytes per RGBA pixel.
const CHANNELS: usize = 4;

/// A decoded imagery tile.
///
/// Pixels are stored row-major as RGBA bytes. The alpha channel is carried
/// along but never consulted by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterTile {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterTile {
    /// Wraps a raw RGBA buffer, checking that its length matches the
    /// dimensions.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width * height * CHANNELS;
        if pixels.len() != expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a tile filled with a single opaque color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let pixel = [rgb[0], rgb[1], rgb[2], 255];
        let pixels = pixel
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total pixel count.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB of the pixel at `(x, y)`.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        self.rgb_at(y * self.width + x)
    }

    /// RGB of the pixel at a row-major index.
    #[inline]
    pub fn rgb_at(&self, index: usize) -> [u8; 3] {
        let offset = index * CHANNELS;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ]
    }

    /// Overwrites the RGB of the pixel at `(x, y)`, leaving it opaque.
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let offset = (y * self.width + x) * CHANNELS;
        self.pixels[offset..offset + CHANNELS].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }

    /// Paints an axis-aligned rectangle, clipped to the tile.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize, rgb: [u8; 3]) {
        for y in y0..(y0 + h).min(self.height) {
            for x in x0..(x0 + w).min(self.width) {
                self.set_rgb(x, y, rgb);
            }
        }
    }
}

impl From<RgbaImage> for RasterTile {
    fn from(image: RgbaImage) -> Self {
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            pixels: image.into_raw(),
        }
    }
}
