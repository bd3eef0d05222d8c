//! Building footprint polygons from OpenStreetMap via the Overpass API.
//!
//! The query asks for `building` ways and relations within a small radius of
//! the coordinate with full geometry (`out geom`). The first element that
//! carries an inline vertex list is used as the footprint.

use serde::Deserialize;

use crate::coord::GeoCoordinate;
use crate::provider::{BoxFuture, HttpClient, ProviderError};

/// Public Overpass API interpreter endpoint.
pub const OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Search radius around the coordinate, in meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 30.0;

/// Capability: look up a building polygon near a coordinate.
pub trait FootprintProvider: Send + Sync {
    /// Returns the ring of the nearest building footprint, or `None` if no
    /// building lies within `radius_m`.
    fn find_footprint(
        &self,
        coord: GeoCoordinate,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Option<Vec<GeoCoordinate>>, ProviderError>>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    geometry: Option<Vec<OverpassPoint>>,
}

#[derive(Debug, Deserialize)]
struct OverpassPoint {
    lat: f64,
    lon: f64,
}

/// Overpass-backed footprint provider.
pub struct OverpassFootprints<C: HttpClient> {
    http_client: C,
    endpoint: String,
    server_timeout_secs: u64,
}

impl<C: HttpClient> OverpassFootprints<C> {
    pub fn new(http_client: C) -> Self {
        Self::with_endpoint(http_client, OVERPASS_ENDPOINT)
    }

    pub fn with_endpoint(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            server_timeout_secs: 10,
        }
    }

    /// Builds the Overpass QL query.
    fn build_query(&self, coord: GeoCoordinate, radius_m: f64) -> String {
        let around = format!("around:{},{},{}", radius_m, coord.lat(), coord.lng());
        format!(
            "[out:json][timeout:{}];(way[\"building\"]({around});relation[\"building\"]({around}););out geom;",
            self.server_timeout_secs
        )
    }

    fn build_url(&self, coord: GeoCoordinate, radius_m: f64) -> Result<String, ProviderError> {
        let query = self.build_query(coord, radius_m);
        reqwest::Url::parse_with_params(&self.endpoint, &[("data", query.as_str())])
            .map(|url| url.to_string())
            .map_err(|e| ProviderError::HttpError(format!("Invalid Overpass endpoint: {}", e)))
    }
}

/// Extracts the first inline footprint ring from an Overpass JSON response.
fn parse_footprint(body: &[u8]) -> Result<Option<Vec<GeoCoordinate>>, ProviderError> {
    let response: OverpassResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let Some(points) = response
        .elements
        .into_iter()
        .find_map(|element| element.geometry.filter(|g| !g.is_empty()))
    else {
        return Ok(None);
    };

    points
        .into_iter()
        .map(|p| {
            GeoCoordinate::new(p.lat, p.lon).map_err(|e| ProviderError::Parse(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

impl<C: HttpClient> FootprintProvider for OverpassFootprints<C> {
    fn find_footprint(
        &self,
        coord: GeoCoordinate,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Option<Vec<GeoCoordinate>>, ProviderError>> {
        Box::pin(async move {
            let url = self.build_url(coord, radius_m)?;
            let body = self.http_client.get(&url).await?;
            parse_footprint(&body)
        })
    }

    fn name(&self) -> &str {
        "OpenStreetMap"
    }
}
