//! Estimation results, stages and errors

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::coord::CoordError;
use crate::provider::ProviderError;
use crate::raster::{AreaClamp, RasterError};

/// Which kind of data produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EstimateSource {
    /// Exact building polygon.
    Vector,
    /// Satellite image analysis.
    Raster,
    /// Category default area.
    Heuristic,
}

impl EstimateSource {
    /// Confidence attached to estimates from this source.
    pub fn confidence(&self) -> Confidence {
        match self {
            EstimateSource::Vector => Confidence::High,
            EstimateSource::Raster => Confidence::Medium,
            EstimateSource::Heuristic => Confidence::Low,
        }
    }
}

impl fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateSource::Vector => write!(f, "vector"),
            EstimateSource::Raster => write!(f, "raster"),
            EstimateSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Coarse reliability label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

/// Final roof area estimate handed to callers.
///
/// The area is always inside the plausibility clamp, so it is strictly
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FootprintEstimate {
    area_square_meters: f64,
    source: EstimateSource,
    confidence: Confidence,
}

impl FootprintEstimate {
    /// Creates an estimate, clamping the area with the default policy and
    /// deriving confidence from the source.
    pub fn new(area_square_meters: f64, source: EstimateSource) -> Self {
        Self::with_clamp(area_square_meters, source, AreaClamp::default())
    }

    /// Creates an estimate clamped with an explicit policy.
    pub fn with_clamp(area_square_meters: f64, source: EstimateSource, clamp: AreaClamp) -> Self {
        Self {
            area_square_meters: clamp.apply(area_square_meters),
            source,
            confidence: source.confidence(),
        }
    }

    pub fn area_square_meters(&self) -> f64 {
        self.area_square_meters
    }

    pub fn source(&self) -> EstimateSource {
        self.source
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }
}

/// Orchestrator stage. Stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    TryVector,
    TryRaster,
    TryHeuristic,
    Exhausted,
}

impl Stage {
    /// The stage an estimation starts in.
    pub fn first() -> Self {
        Stage::TryVector
    }

    /// The stage that follows this one.
    pub fn next(self) -> Self {
        match self {
            Stage::TryVector => Stage::TryRaster,
            Stage::TryRaster => Stage::TryHeuristic,
            Stage::TryHeuristic | Stage::Exhausted => Stage::Exhausted,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::TryVector => write!(f, "vector"),
            Stage::TryRaster => write!(f, "raster"),
            Stage::TryHeuristic => write!(f, "heuristic"),
            Stage::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Why a single stage did not produce an estimate.
///
/// Stage errors are absorbed by the orchestrator and never returned
/// directly.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Analysis task failed: {0}")]
    Analysis(String),

    #[error("No result")]
    NoResult,

    #[error("Area {area:.1} m² does not exceed the {floor} m² plausibility floor")]
    Implausible { area: f64, floor: f64 },
}

/// A recorded stage failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub provider: String,
    pub reason: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.stage, self.provider, self.reason)
    }
}

/// Errors crossing the estimator's public boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// Input rejected before any provider was contacted.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordError),

    /// Every stage failed; the caller should ask for manual input.
    #[error("All detection methods failed: {}", format_failures(.failures))]
    DetectionFailed { failures: Vec<StageFailure> },
}

fn format_failures(failures: &[StageFailure]) -> String {
    if failures.is_empty() {
        return "no stages configured".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
