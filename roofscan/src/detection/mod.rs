//! Footprint estimation with graceful degradation
//!
//! [`FootprintEstimator`] tries progressively less precise data sources and
//! returns the first plausible area:
//!
//! | Stage | Strategy | Data | Confidence |
//! |---|---|---|---|
//! | 1 | [`VectorFootprintSource`] | mapped building polygon | High |
//! | 2 | [`RasterFootprintSource`] | satellite tile analysis | Medium |
//! | 3 | [`HeuristicFootprintSource`] | land-use category default | Low |
//!
//! Every stage is bounded by a timeout from [`StageTimeouts`]. Stage
//! failures never escape individually; if every stage fails the caller
//! receives [`DetectionError::DetectionFailed`] with the collected reasons
//! and should fall back to manual input.
//!
//! # Example
//!
//! ```ignore
//! use roofscan::config::EngineConfig;
//! use roofscan::detection::{FootprintEstimator, DEFAULT_ZOOM};
//!
//! let estimator = FootprintEstimator::from_config(&EngineConfig::load()?)?;
//! let estimate = estimator.estimate_at(28.6139, 77.2090, DEFAULT_ZOOM).await?;
//! println!("{:.1} m² ({})", estimate.area_square_meters(), estimate.confidence());
//! ```

mod orchestrator;
mod strategy;
mod types;

pub use orchestrator::{FootprintEstimator, StageTimeouts, DEFAULT_ZOOM};
pub use strategy::{
    FootprintStrategy, HeuristicFootprintSource, RasterFootprintSource, VectorFootprintSource,
};
pub use types::{
    Confidence, DetectionError, EstimateSource, FootprintEstimate, Stage, StageError,
    StageFailure,
};
