//! Editable roof boundary seeded from an estimate.
//!
//! The editor starts from a square of the estimated area centered on the
//! property and lets the user drag vertices. The area is recomputed with
//! [`polygon_area`] after every mutation.

use thiserror::Error;

use super::polygon::{polygon_area, METERS_PER_DEGREE};
use crate::coord::{CoordError, GeoCoordinate};
use crate::detection::FootprintEstimate;

/// Errors raised by boundary editing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    /// A ring needs at least three vertices.
    #[error("Boundary needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Vertex index beyond the ring.
    #[error("Vertex index {index} out of range for {len} vertices")]
    VertexOutOfRange { index: usize, len: usize },

    /// The seeded square would leave the valid coordinate range.
    #[error("Boundary vertex out of range: {0}")]
    InvalidVertex(#[from] CoordError),
}

/// Closed vertex ring with its area kept current.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    vertices: Vec<GeoCoordinate>,
    area_square_meters: f64,
}

/// Default square ring of `area_square_meters` around `center`.
///
/// Vertices run NW, NE, SE, SW.
fn default_square(
    center: GeoCoordinate,
    area_square_meters: f64,
) -> Result<Vec<GeoCoordinate>, BoundaryError> {
    let side_degrees = area_square_meters.max(0.0).sqrt() / METERS_PER_DEGREE;
    let half = side_degrees / 2.0;
    let (lat, lng) = (center.lat(), center.lng());

    Ok(vec![
        GeoCoordinate::new(lat + half, lng - half)?,
        GeoCoordinate::new(lat + half, lng + half)?,
        GeoCoordinate::new(lat - half, lng + half)?,
        GeoCoordinate::new(lat - half, lng - half)?,
    ])
}

impl BoundaryPolygon {
    /// Builds a boundary from an explicit ring.
    pub fn new(vertices: Vec<GeoCoordinate>) -> Result<Self, BoundaryError> {
        if vertices.len() < 3 {
            return Err(BoundaryError::TooFewVertices(vertices.len()));
        }
        let area_square_meters = polygon_area(&vertices);
        Ok(Self {
            vertices,
            area_square_meters,
        })
    }

    /// Seeds the default square for an estimate at `center`.
    pub fn from_estimate(
        center: GeoCoordinate,
        estimate: &FootprintEstimate,
    ) -> Result<Self, BoundaryError> {
        Self::square(center, estimate.area_square_meters())
    }

    /// Square of side `√area` meters centered on `center`.
    pub fn square(center: GeoCoordinate, area_square_meters: f64) -> Result<Self, BoundaryError> {
        Self::new(default_square(center, area_square_meters)?)
    }

    /// Moves one vertex and recomputes the area.
    pub fn move_vertex(
        &mut self,
        index: usize,
        position: GeoCoordinate,
    ) -> Result<f64, BoundaryError> {
        let len = self.vertices.len();
        let vertex = self
            .vertices
            .get_mut(index)
            .ok_or(BoundaryError::VertexOutOfRange { index, len })?;
        *vertex = position;
        self.area_square_meters = polygon_area(&self.vertices);
        Ok(self.area_square_meters)
    }

    /// Discards edits and restores the default square for `estimate`.
    pub fn reset(
        &mut self,
        center: GeoCoordinate,
        estimate: &FootprintEstimate,
    ) -> Result<(), BoundaryError> {
        *self = Self::from_estimate(center, estimate)?;
        Ok(())
    }

    pub fn vertices(&self) -> &[GeoCoordinate] {
        &self.vertices
    }

    /// Area of the current ring in m².
    pub fn area_square_meters(&self) -> f64 {
        self.area_square_meters
    }
}
