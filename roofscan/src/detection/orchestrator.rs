//! Fallback orchestration across estimation stages.
//!
//! Stages run strictly in order, one at a time:
//!
//! ```text
//! TryVector ──► TryRaster ──► TryHeuristic ──► Exhausted
//!     │             │               │
//!     └─────────────┴───────────────┴──► first plausible estimate
//! ```
//!
//! A stage advances on provider error, timeout, missing data, or a raw
//! area that does not exceed the plausibility floor. Failures are logged
//! and collected; only exhaustion surfaces them to the caller.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::strategy::{
    FootprintStrategy, HeuristicFootprintSource, RasterFootprintSource, VectorFootprintSource,
};
use super::types::{DetectionError, FootprintEstimate, Stage, StageError, StageFailure};
use crate::config::EngineConfig;
use crate::coord::{CoordError, GeoCoordinate, MAX_ZOOM};
use crate::provider::{
    ArcGisImagery, GoogleImagery, ImageryChain, NominatimCategories, OverpassFootprints,
    ProviderError, ReqwestClient, TileImagery,
};
use crate::raster::MIN_PLAUSIBLE_AREA;

/// Zoom level used when the caller has no preference.
pub const DEFAULT_ZOOM: u8 = 19;

/// Upper bound on each stage, including all network I/O and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub vector: Duration,
    pub raster: Duration,
    pub heuristic: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            vector: Duration::from_secs(10),
            raster: Duration::from_secs(8),
            heuristic: Duration::from_secs(5),
        }
    }
}

impl StageTimeouts {
    /// Timeout for `stage`. `Exhausted` has no work and gets zero.
    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::TryVector => self.vector,
            Stage::TryRaster => self.raster,
            Stage::TryHeuristic => self.heuristic,
            Stage::Exhausted => Duration::ZERO,
        }
    }
}

/// Estimates roof footprint area with graceful degradation.
pub struct FootprintEstimator {
    strategies: Vec<FootprintStrategy>,
    timeouts: StageTimeouts,
    plausibility_floor: f64,
}

impl FootprintEstimator {
    /// Creates an estimator over arbitrary strategies.
    ///
    /// Strategies are ordered by stage; strategies sharing a stage keep
    /// their relative order.
    pub fn new(mut strategies: Vec<FootprintStrategy>, timeouts: StageTimeouts) -> Self {
        strategies.sort_by_key(|s| s.stage());
        Self {
            strategies,
            timeouts,
            plausibility_floor: MIN_PLAUSIBLE_AREA,
        }
    }

    /// Sets the raw area a result must exceed to be accepted.
    pub fn with_plausibility_floor(mut self, floor: f64) -> Self {
        self.plausibility_floor = floor;
        self
    }

    /// Wires the HTTP-backed providers described by `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ProviderError> {
        let providers = &config.providers;
        let client = ReqwestClient::with_options(providers.http_timeout, &providers.user_agent)?;
        let clamp = config.raster.clamp();

        let vector = VectorFootprintSource::new(Box::new(OverpassFootprints::with_endpoint(
            client.clone(),
            providers.overpass_url.clone(),
        )))
        .with_search_radius(providers.search_radius_m)
        .with_clamp(clamp);

        let imagery: Vec<Box<dyn TileImagery>> = vec![
            Box::new(ArcGisImagery::with_base_url(
                client.clone(),
                providers.arcgis_url.clone(),
            )),
            Box::new(GoogleImagery::with_base_url(
                client.clone(),
                providers.google_url.clone(),
            )),
        ];
        let raster = RasterFootprintSource::new(Box::new(ImageryChain::new(imagery)))
            .with_analyzer(config.raster_analyzer())
            .with_clamp(clamp);

        let heuristic = HeuristicFootprintSource::new(Box::new(
            NominatimCategories::with_endpoint(client, providers.nominatim_url.clone()),
        ))
        .with_clamp(clamp);

        Ok(Self::new(
            vec![vector.into(), raster.into(), heuristic.into()],
            config.detection.timeouts,
        )
        .with_plausibility_floor(config.detection.plausibility_floor))
    }

    pub fn timeouts(&self) -> &StageTimeouts {
        &self.timeouts
    }

    /// Validates raw input and estimates.
    ///
    /// Invalid latitude, longitude or zoom is rejected before any provider
    /// is contacted.
    pub async fn estimate_at(
        &self,
        lat: f64,
        lng: f64,
        zoom: u8,
    ) -> Result<FootprintEstimate, DetectionError> {
        let coord = GeoCoordinate::new(lat, lng)?;
        self.estimate_footprint(coord, zoom).await
    }

    /// Runs the stages in order and returns the first plausible estimate.
    pub async fn estimate_footprint(
        &self,
        coord: GeoCoordinate,
        zoom: u8,
    ) -> Result<FootprintEstimate, DetectionError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom).into());
        }

        info!(coord = %coord, zoom, "Estimating roof footprint");

        let mut failures = Vec::new();
        let mut stage = Stage::first();

        while stage != Stage::Exhausted {
            let limit = self.timeouts.for_stage(stage);

            for strategy in self.strategies.iter().filter(|s| s.stage() == stage) {
                let provider = strategy.provider_name();
                debug!(%stage, provider, "Trying stage");

                let outcome =
                    match tokio::time::timeout(limit, strategy.try_estimate(coord, zoom)).await {
                        Ok(result) => result,
                        Err(_) => Err(StageError::Timeout(limit)),
                    };

                match outcome.and_then(|(raw, estimate)| self.check_plausible(raw, estimate)) {
                    Ok(estimate) => {
                        info!(
                            %stage,
                            provider,
                            area = estimate.area_square_meters(),
                            confidence = %estimate.confidence(),
                            "Footprint estimated"
                        );
                        return Ok(estimate);
                    }
                    Err(e) => {
                        match &e {
                            StageError::NoResult | StageError::Implausible { .. } => {
                                debug!(%stage, provider, reason = %e, "Stage produced no usable result")
                            }
                            _ => warn!(%stage, provider, error = %e, "Stage failed"),
                        }
                        failures.push(StageFailure {
                            stage,
                            provider: provider.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }

            stage = stage.next();
        }

        warn!(coord = %coord, failures = failures.len(), "All detection methods failed");
        Err(DetectionError::DetectionFailed { failures })
    }

    fn check_plausible(
        &self,
        raw_area: f64,
        estimate: FootprintEstimate,
    ) -> Result<FootprintEstimate, StageError> {
        if raw_area > self.plausibility_floor {
            Ok(estimate)
        } else {
            Err(StageError::Implausible {
                area: raw_area,
                floor: self.plausibility_floor,
            })
        }
    }
}
