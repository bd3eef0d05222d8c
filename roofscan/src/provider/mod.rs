//! External data provider abstraction
//!
//! This module provides the three capabilities the estimator consumes, and
//! HTTP-backed implementations of each:
//!
//! | Capability | Purpose | Implementations |
//! |---|---|---|
//! | [`FootprintProvider`] | building polygon near a coordinate | [`OverpassFootprints`] |
//! | [`TileImagery`] | decoded satellite tile for an address | [`ArcGisImagery`], [`GoogleImagery`], [`ImageryChain`] |
//! | [`CategoryProvider`] | coarse building category | [`NominatimCategories`] |
//!
//! All traits are dyn-compatible (boxed futures) so the estimator can hold
//! any backend behind a `Box<dyn ...>`.
//!
//! # Example
//!
//! ```ignore
//! use roofscan::provider::{ArcGisImagery, ReqwestClient, TileImagery};
//!
//! let imagery = ArcGisImagery::new(ReqwestClient::new()?);
//! let tile = imagery.fetch_tile(address).await?;
//! ```

mod http;
mod imagery;
mod nominatim;
mod overpass;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT};
pub use imagery::{
    decode_tile, decode_tile_blocking, ArcGisImagery, GoogleImagery, ImageryChain, TileImagery,
    ARCGIS_BASE_URL, GOOGLE_BASE_URL,
};
pub use nominatim::{BuildingCategory, CategoryProvider, NominatimCategories, NOMINATIM_ENDPOINT};
pub use overpass::{
    FootprintProvider, OverpassFootprints, DEFAULT_SEARCH_RADIUS_M, OVERPASS_ENDPOINT,
};
pub use types::{BoxFuture, ProviderError};

#[cfg(test)]
pub use http::tests::MockHttpClient;
