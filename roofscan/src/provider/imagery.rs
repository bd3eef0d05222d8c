//! Satellite imagery tile sources.
//!
//! A [`TileImagery`] turns a slippy-map tile address into a decoded
//! [`RasterTile`]. Any imaging backend can satisfy it; the HTTP-backed
//! sources here fetch JPEG/PNG tiles and decode them with the `image` crate.
//!
//! # URL Patterns
//!
//! - ArcGIS World Imagery: `{base}/tile/{z}/{y}/{x}`
//! - Google satellite layer: `{base}?lyrs=s&x={x}&y={y}&z={z}`

use tracing::debug;

use crate::coord::TileAddress;
use crate::provider::{BoxFuture, HttpClient, ProviderError};
use crate::raster::RasterTile;

/// Base URL for ArcGIS World Imagery tiles.
pub const ARCGIS_BASE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile";

/// Base URL for Google satellite tiles.
pub const GOOGLE_BASE_URL: &str = "https://mt1.google.com/vt";

/// Capability: fetch and decode the imagery tile at an address.
pub trait TileImagery: Send + Sync {
    /// Fetches the tile and decodes it to RGBA.
    fn fetch_tile(&self, tile: TileAddress) -> BoxFuture<'_, Result<RasterTile, ProviderError>>;

    /// Human-readable source name.
    fn name(&self) -> &str;

    /// Minimum supported zoom level.
    fn min_zoom(&self) -> u8 {
        0
    }

    /// Maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Whether the source serves tiles at `zoom`.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }
}

/// Decodes encoded imagery bytes into an RGBA tile.
pub fn decode_tile(bytes: &[u8]) -> Result<RasterTile, ProviderError> {
    let image = image::load_from_memory(bytes).map_err(|e| ProviderError::Decode(e.to_string()))?;
    Ok(RasterTile::from(image.to_rgba8()))
}

/// Decodes on the blocking thread pool.
///
/// Keeps the calling task responsive so a stage timeout can abandon a slow
/// decode.
pub async fn decode_tile_blocking(bytes: Vec<u8>) -> Result<RasterTile, ProviderError> {
    tokio::task::spawn_blocking(move || decode_tile(&bytes))
        .await
        .map_err(|e| ProviderError::Decode(format!("Decode task failed: {}", e)))?
}

/// Esri World Imagery.
///
/// No API key or authentication is required for the public tier.
pub struct ArcGisImagery<C: HttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: HttpClient> ArcGisImagery<C> {
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, ARCGIS_BASE_URL)
    }

    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn build_url(&self, tile: TileAddress) -> String {
        format!("{}/{}/{}/{}", self.base_url, tile.zoom, tile.y, tile.x)
    }
}

impl<C: HttpClient> TileImagery for ArcGisImagery<C> {
    fn fetch_tile(&self, tile: TileAddress) -> BoxFuture<'_, Result<RasterTile, ProviderError>> {
        Box::pin(async move {
            if !self.supports_zoom(tile.zoom) {
                return Err(ProviderError::UnsupportedZoom(tile.zoom));
            }
            let url = self.build_url(tile);
            let bytes = self.http_client.get(&url).await?;
            decode_tile_blocking(bytes).await
        })
    }

    fn name(&self) -> &str {
        "ArcGIS"
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

/// Google satellite layer via the public tile servers.
pub struct GoogleImagery<C: HttpClient> {
    http_client: C,
    base_url: String,
}

impl<C: HttpClient> GoogleImagery<C> {
    pub fn new(http_client: C) -> Self {
        Self::with_base_url(http_client, GOOGLE_BASE_URL)
    }

    pub fn with_base_url(http_client: C, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn build_url(&self, tile: TileAddress) -> String {
        format!(
            "{}?lyrs=s&x={}&y={}&z={}",
            self.base_url, tile.x, tile.y, tile.zoom
        )
    }
}

impl<C: HttpClient> TileImagery for GoogleImagery<C> {
    fn fetch_tile(&self, tile: TileAddress) -> BoxFuture<'_, Result<RasterTile, ProviderError>> {
        Box::pin(async move {
            if !self.supports_zoom(tile.zoom) {
                return Err(ProviderError::UnsupportedZoom(tile.zoom));
            }
            let url = self.build_url(tile);
            let bytes = self.http_client.get(&url).await?;
            decode_tile_blocking(bytes).await
        })
    }

    fn name(&self) -> &str {
        "Google"
    }

    fn max_zoom(&self) -> u8 {
        22
    }
}

/// Tries several imagery sources in order and returns the first tile.
///
/// Sources that do not serve the requested zoom are skipped.
pub struct ImageryChain {
    sources: Vec<Box<dyn TileImagery>>,
}

impl ImageryChain {
    pub fn new(sources: Vec<Box<dyn TileImagery>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl TileImagery for ImageryChain {
    fn fetch_tile(&self, tile: TileAddress) -> BoxFuture<'_, Result<RasterTile, ProviderError>> {
        Box::pin(async move {
            let mut last = ProviderError::UnsupportedZoom(tile.zoom);
            let mut attempted = 0;
            for source in &self.sources {
                if !source.supports_zoom(tile.zoom) {
                    continue;
                }
                attempted += 1;
                match source.fetch_tile(tile).await {
                    Ok(raster) => return Ok(raster),
                    Err(e) => {
                        debug!(source = source.name(), tile = %tile, error = %e, "Imagery source failed");
                        last = e;
                    }
                }
            }
            Err(ProviderError::AllSourcesFailed {
                count: attempted,
                last: last.to_string(),
            })
        })
    }

    fn name(&self) -> &str {
        "Imagery chain"
    }

    fn min_zoom(&self) -> u8 {
        self.sources.iter().map(|s| s.min_zoom()).min().unwrap_or(0)
    }

    fn max_zoom(&self) -> u8 {
        self.sources.iter().map(|s| s.max_zoom()).max().unwrap_or(0)
    }
}
