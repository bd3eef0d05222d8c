//! Coarse building category from reverse geocoding (Nominatim).

use serde::{Deserialize, Serialize};

use crate::coord::GeoCoordinate;
use crate::provider::{BoxFuture, HttpClient, ProviderError};

/// Public Nominatim reverse geocoding endpoint.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Coarse land-use category of the addressed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingCategory {
    Residential,
    Commercial,
    Unknown,
}

impl BuildingCategory {
    /// Typical roof area for the category, in m².
    pub fn default_area(&self) -> f64 {
        match self {
            BuildingCategory::Residential => 120.0,
            BuildingCategory::Commercial => 300.0,
            BuildingCategory::Unknown => 100.0,
        }
    }
}

/// Capability: classify the building at a coordinate.
pub trait CategoryProvider: Send + Sync {
    fn lookup_category(
        &self,
        coord: GeoCoordinate,
    ) -> BoxFuture<'_, Result<BuildingCategory, ProviderError>>;

    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    house_number: Option<String>,
    residential: Option<String>,
    commercial: Option<String>,
}

/// Maps a reverse geocoding response to a category.
///
/// A house number or a residential area marks a home; a commercial area
/// marks a commercial building; anything else is unknown.
fn parse_category(body: &[u8]) -> Result<BuildingCategory, ProviderError> {
    let response: ReverseResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let category = match response.address {
        Some(address) if address.house_number.is_some() || address.residential.is_some() => {
            BuildingCategory::Residential
        }
        Some(address) if address.commercial.is_some() => BuildingCategory::Commercial,
        _ => BuildingCategory::Unknown,
    };
    Ok(category)
}

/// Nominatim-backed category provider.
pub struct NominatimCategories<C: HttpClient> {
    http_client: C,
    endpoint: String,
}

impl<C: HttpClient> NominatimCategories<C> {
    pub fn new(http_client: C) -> Self {
        Self::with_endpoint(http_client, NOMINATIM_ENDPOINT)
    }

    pub fn with_endpoint(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    fn build_url(&self, coord: GeoCoordinate) -> Result<String, ProviderError> {
        let lat = coord.lat().to_string();
        let lon = coord.lng().to_string();
        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())],
        )
        .map(|url| url.to_string())
        .map_err(|e| ProviderError::HttpError(format!("Invalid Nominatim endpoint: {}", e)))
    }
}

impl<C: HttpClient> CategoryProvider for NominatimCategories<C> {
    fn lookup_category(
        &self,
        coord: GeoCoordinate,
    ) -> BoxFuture<'_, Result<BuildingCategory, ProviderError>> {
        Box::pin(async move {
            let url = self.build_url(coord)?;
            let body = self.http_client.get(&url).await?;
            parse_category(&body)
        })
    }

    fn name(&self) -> &str {
        "Nominatim"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    #[test]
    fn test_default_areas() {
        assert_eq!(BuildingCategory::Residential.default_area(), 120.0);
        assert_eq!(BuildingCategory::Commercial.default_area(), 300.0);
        assert_eq!(BuildingCategory::Unknown.default_area(), 100.0);
    }

    #[test]
    fn test_house_number_is_residential() {
        let body = br#"{"address": {"house_number": "12", "road": "Janpath"}}"#;
        assert_eq!(parse_category(body).unwrap(), BuildingCategory::Residential);
    }

    #[test]
    fn test_residential_area_wins_over_commercial() {
        let body = br#"{"address": {"residential": "Sector 4", "commercial": "Mall"}}"#;
        assert_eq!(parse_category(body).unwrap(), BuildingCategory::Residential);
    }

    #[test]
    fn test_commercial() {
        let body = br#"{"address": {"commercial": "Connaught Place"}}"#;
        assert_eq!(parse_category(body).unwrap(), BuildingCategory::Commercial);
    }

    #[test]
    fn test_unable_to_geocode_is_unknown() {
        let body = br#"{"error": "Unable to geocode"}"#;
        assert_eq!(parse_category(body).unwrap(), BuildingCategory::Unknown);
    }

    #[test]
    fn test_url_construction() {
        let provider = NominatimCategories::new(MockHttpClient::new(Ok(vec![])));
        let url = provider
            .build_url(GeoCoordinate::new(28.6139, 77.209).unwrap())
            .unwrap();
        assert_eq!(
            url,
            "https://nominatim.openstreetmap.org/reverse?format=json&lat=28.6139&lon=77.209"
        );
    }

    #[tokio::test]
    async fn test_lookup_through_client() {
        let client = MockHttpClient::new(Ok(br#"{"address": {"commercial": "x"}}"#.to_vec()));
        let provider = NominatimCategories::new(client);
        let category = provider
            .lookup_category(GeoCoordinate::new(0.0, 0.0).unwrap())
            .await
            .unwrap();
        assert_eq!(category, BuildingCategory::Commercial);
    }
}
