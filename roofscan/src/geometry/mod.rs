//! Polygon area and the roof boundary editor.

mod boundary;
mod polygon;

pub use boundary::{BoundaryError, BoundaryPolygon};
pub use polygon::{polygon_area, METERS_PER_DEGREE};
