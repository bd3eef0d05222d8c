//! Estimation strategies, one per data source.

use std::sync::Arc;

use tracing::debug;

use super::types::{EstimateSource, FootprintEstimate, Stage, StageError};
use crate::coord::{tile_to_lat_lon, to_tile_address, GeoCoordinate};
use crate::geometry::polygon_area;
use crate::provider::{CategoryProvider, FootprintProvider, TileImagery, DEFAULT_SEARCH_RADIUS_M};
use crate::raster::{AreaClamp, RasterAnalyzer};

/// Area of the nearest mapped building polygon.
pub struct VectorFootprintSource {
    provider: Box<dyn FootprintProvider>,
    search_radius_m: f64,
    clamp: AreaClamp,
}

impl VectorFootprintSource {
    pub fn new(provider: Box<dyn FootprintProvider>) -> Self {
        Self {
            provider,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            clamp: AreaClamp::default(),
        }
    }

    pub fn with_search_radius(mut self, radius_m: f64) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    pub fn with_clamp(mut self, clamp: AreaClamp) -> Self {
        self.clamp = clamp;
        self
    }

    async fn try_estimate(
        &self,
        coord: GeoCoordinate,
    ) -> Result<(f64, FootprintEstimate), StageError> {
        let ring = self
            .provider
            .find_footprint(coord, self.search_radius_m)
            .await?
            .ok_or(StageError::NoResult)?;

        let area = polygon_area(&ring);
        debug!(vertices = ring.len(), area, "Footprint polygon found");
        Ok((
            area,
            FootprintEstimate::with_clamp(area, EstimateSource::Vector, self.clamp),
        ))
    }
}

/// Area measured from the satellite tile containing the coordinate.
pub struct RasterFootprintSource {
    imagery: Box<dyn TileImagery>,
    analyzer: Arc<RasterAnalyzer>,
    clamp: AreaClamp,
}

impl RasterFootprintSource {
    pub fn new(imagery: Box<dyn TileImagery>) -> Self {
        Self {
            imagery,
            analyzer: Arc::new(RasterAnalyzer::default()),
            clamp: AreaClamp::default(),
        }
    }

    pub fn with_analyzer(mut self, analyzer: RasterAnalyzer) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    pub fn with_clamp(mut self, clamp: AreaClamp) -> Self {
        self.clamp = clamp;
        self
    }

    async fn try_estimate(
        &self,
        coord: GeoCoordinate,
        zoom: u8,
    ) -> Result<(f64, FootprintEstimate), StageError> {
        let address = to_tile_address(coord, zoom)?;
        let tile = self.imagery.fetch_tile(address).await?;

        // Pixel work runs on the blocking pool so the stage timeout can abandon it
        let analyzer = Arc::clone(&self.analyzer);
        let lat = coord.lat();
        let analysis = tokio::task::spawn_blocking(move || analyzer.analyze(&tile, lat, zoom))
            .await
            .map_err(|e| StageError::Analysis(e.to_string()))??;

        let (nw_lat, nw_lng) = tile_to_lat_lon(&address);
        debug!(
            tile = %address,
            nw_lat,
            nw_lng,
            raw_area = analysis.raw_area,
            material = ?analysis.material,
            "Raster analysis complete"
        );
        Ok((
            analysis.raw_area,
            FootprintEstimate::with_clamp(analysis.raw_area, EstimateSource::Raster, self.clamp),
        ))
    }
}

/// Default area for the building's land-use category.
pub struct HeuristicFootprintSource {
    provider: Box<dyn CategoryProvider>,
    clamp: AreaClamp,
}

impl HeuristicFootprintSource {
    pub fn new(provider: Box<dyn CategoryProvider>) -> Self {
        Self {
            provider,
            clamp: AreaClamp::default(),
        }
    }

    pub fn with_clamp(mut self, clamp: AreaClamp) -> Self {
        self.clamp = clamp;
        self
    }

    async fn try_estimate(
        &self,
        coord: GeoCoordinate,
    ) -> Result<(f64, FootprintEstimate), StageError> {
        let category = self.provider.lookup_category(coord).await?;
        let area = category.default_area();

        debug!(?category, area, "Building category resolved");
        Ok((
            area,
            FootprintEstimate::with_clamp(area, EstimateSource::Heuristic, self.clamp),
        ))
    }
}

/// One way of estimating a footprint.
///
/// Variants map one-to-one onto orchestrator stages.
pub enum FootprintStrategy {
    Vector(VectorFootprintSource),
    Raster(RasterFootprintSource),
    Heuristic(HeuristicFootprintSource),
}

impl FootprintStrategy {
    /// Stage this strategy runs in.
    pub fn stage(&self) -> Stage {
        match self {
            FootprintStrategy::Vector(_) => Stage::TryVector,
            FootprintStrategy::Raster(_) => Stage::TryRaster,
            FootprintStrategy::Heuristic(_) => Stage::TryHeuristic,
        }
    }

    /// Name of the backing provider.
    pub fn provider_name(&self) -> &str {
        match self {
            FootprintStrategy::Vector(s) => s.provider.name(),
            FootprintStrategy::Raster(s) => s.imagery.name(),
            FootprintStrategy::Heuristic(s) => s.provider.name(),
        }
    }

    /// Runs the strategy once.
    ///
    /// Returns the unclamped area alongside the clamped estimate so the
    /// caller can apply the plausibility floor to the raw measurement.
    pub async fn try_estimate(
        &self,
        coord: GeoCoordinate,
        zoom: u8,
    ) -> Result<(f64, FootprintEstimate), StageError> {
        match self {
            FootprintStrategy::Vector(s) => s.try_estimate(coord).await,
            FootprintStrategy::Raster(s) => s.try_estimate(coord, zoom).await,
            FootprintStrategy::Heuristic(s) => s.try_estimate(coord).await,
        }
    }
}

impl From<VectorFootprintSource> for FootprintStrategy {
    fn from(source: VectorFootprintSource) -> Self {
        FootprintStrategy::Vector(source)
    }
}

impl From<RasterFootprintSource> for FootprintStrategy {
    fn from(source: RasterFootprintSource) -> Self {
        FootprintStrategy::Raster(source)
    }
}

impl From<HeuristicFootprintSource> for FootprintStrategy {
    fn from(source: HeuristicFootprintSource) -> Self {
        FootprintStrategy::Heuristic(source)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::coord::TileAddress;
    use crate::provider::{BoxFuture, BuildingCategory, ProviderError};
    use crate::raster::RasterTile;

    async fn maybe_sleep(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Footprint provider returning a fixed answer.
    pub struct StaticFootprints {
        pub result: Result<Option<Vec<GeoCoordinate>>, ProviderError>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StaticFootprints {
        pub fn new(result: Result<Option<Vec<GeoCoordinate>>, ProviderError>) -> Self {
            Self {
                result,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FootprintProvider for StaticFootprints {
        fn find_footprint(
            &self,
            _coord: GeoCoordinate,
            _radius_m: f64,
        ) -> BoxFuture<'_, Result<Option<Vec<GeoCoordinate>>, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                maybe_sleep(self.delay).await;
                self.result.clone()
            })
        }

        fn name(&self) -> &str {
            "static footprints"
        }
    }

    /// Imagery source returning a fixed tile.
    pub struct StaticImagery {
        pub result: Result<RasterTile, ProviderError>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StaticImagery {
        pub fn new(result: Result<RasterTile, ProviderError>) -> Self {
            Self {
                result,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl TileImagery for StaticImagery {
        fn fetch_tile(
            &self,
            _tile: TileAddress,
        ) -> BoxFuture<'_, Result<RasterTile, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                maybe_sleep(self.delay).await;
                self.result.clone()
            })
        }

        fn name(&self) -> &str {
            "static imagery"
        }

        fn max_zoom(&self) -> u8 {
            22
        }
    }

    /// Category provider returning a fixed category.
    pub struct StaticCategory {
        pub result: Result<BuildingCategory, ProviderError>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StaticCategory {
        pub fn new(result: Result<BuildingCategory, ProviderError>) -> Self {
            Self {
                result,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CategoryProvider for StaticCategory {
        fn lookup_category(
            &self,
            _coord: GeoCoordinate,
        ) -> BoxFuture<'_, Result<BuildingCategory, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                maybe_sleep(self.delay).await;
                self.result.clone()
            })
        }

        fn name(&self) -> &str {
            "static category"
        }
    }

    fn delhi() -> GeoCoordinate {
        GeoCoordinate::new(28.6139, 77.2090).unwrap()
    }

    fn square_ring(half: f64) -> Vec<GeoCoordinate> {
        let c = delhi();
        vec![
            GeoCoordinate::new(c.lat() + half, c.lng() - half).unwrap(),
            GeoCoordinate::new(c.lat() + half, c.lng() + half).unwrap(),
            GeoCoordinate::new(c.lat() - half, c.lng() + half).unwrap(),
            GeoCoordinate::new(c.lat() - half, c.lng() - half).unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_vector_strategy_measures_polygon() {
        let provider = StaticFootprints::new(Ok(Some(square_ring(0.0001))));
        let strategy = FootprintStrategy::from(VectorFootprintSource::new(Box::new(provider)));

        let (raw, estimate) = strategy.try_estimate(delhi(), 19).await.unwrap();

        // 22.2 m × 22.2 m
        assert!((raw - 492.84).abs() < 0.01);
        assert_eq!(estimate.area_square_meters(), raw);
        assert_eq!(estimate.source(), EstimateSource::Vector);
        assert_eq!(strategy.stage(), Stage::TryVector);
    }

    #[tokio::test]
    async fn test_vector_strategy_without_building() {
        let provider = StaticFootprints::new(Ok(None));
        let strategy = FootprintStrategy::from(VectorFootprintSource::new(Box::new(provider)));

        let result = strategy.try_estimate(delhi(), 19).await;
        assert!(matches!(result, Err(StageError::NoResult)));
    }

    #[tokio::test]
    async fn test_raster_strategy_uses_largest_region() {
        let mut tile = RasterTile::filled(256, 256, [40, 140, 40]);
        tile.fill_rect(100, 100, 40, 30, [180, 90, 60]);
        let imagery = StaticImagery::new(Ok(tile));
        let strategy = FootprintStrategy::from(RasterFootprintSource::new(Box::new(imagery)));

        let (raw, estimate) = strategy.try_estimate(delhi(), 19).await.unwrap();

        assert!((raw - 82.445_351).abs() < 1e-3);
        assert_eq!(estimate.source(), EstimateSource::Raster);
        assert_eq!(strategy.provider_name(), "static imagery");
    }

    #[tokio::test]
    async fn test_raster_strategy_propagates_fetch_error() {
        let imagery = StaticImagery::new(Err(ProviderError::HttpError("HTTP 500".to_string())));
        let strategy = FootprintStrategy::from(RasterFootprintSource::new(Box::new(imagery)));

        let result = strategy.try_estimate(delhi(), 19).await;
        assert!(matches!(
            result,
            Err(StageError::Provider(ProviderError::HttpError(_)))
        ));
    }

    #[tokio::test]
    async fn test_raster_strategy_reports_no_region_on_empty_tile() {
        let imagery = StaticImagery::new(Ok(RasterTile::filled(0, 0, [0, 0, 0])));
        let strategy = FootprintStrategy::from(RasterFootprintSource::new(Box::new(imagery)));

        let result = strategy.try_estimate(delhi(), 19).await;
        assert!(matches!(result, Err(StageError::Raster(_))));
    }

    #[tokio::test]
    async fn test_heuristic_strategy_uses_category_default() {
        let provider = StaticCategory::new(Ok(BuildingCategory::Commercial));
        let strategy = FootprintStrategy::from(HeuristicFootprintSource::new(Box::new(provider)));

        let (raw, estimate) = strategy.try_estimate(delhi(), 19).await.unwrap();
        assert_eq!(raw, 300.0);
        assert_eq!(estimate.area_square_meters(), 300.0);
        assert_eq!(estimate.source(), EstimateSource::Heuristic);
    }
}
