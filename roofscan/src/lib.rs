//! RoofScan - Roof footprint area estimation
//!
//! This library estimates the roof area of the building at a coordinate,
//! trying mapped building polygons first, then satellite image analysis,
//! then a land-use category default.

pub mod config;
pub mod coord;
pub mod detection;
pub mod geometry;
pub mod logging;
pub mod provider;
pub mod raster;

pub use config::{ConfigError, EngineConfig};
pub use coord::{CoordError, GeoCoordinate, TileAddress};
pub use detection::{
    Confidence, DetectionError, EstimateSource, FootprintEstimate, FootprintEstimator,
    DEFAULT_ZOOM,
};
pub use geometry::{polygon_area, BoundaryPolygon};
