//! Planar polygon area from geographic vertices.
//!
//! The shoelace formula is applied directly to (lat, lng) degrees and the
//! result scaled by a flat 111 km per degree. This ignores the shrinking of
//! longitude degrees away from the equator, which keeps the number
//! consistent between the vector source and the boundary editor.

use crate::coord::GeoCoordinate;

/// Approximate meters per degree used for small-extent conversions.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Area in m² enclosed by an ordered vertex ring.
///
/// The ring is closed implicitly; a repeated closing vertex is harmless.
/// Returns 0 for fewer than three vertices.
pub fn polygon_area(vertices: &[GeoCoordinate]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    // Shoelace is translation invariant; working relative to the first
    // vertex avoids cancellation between large absolute degree products.
    let origin = vertices[0];
    let relative = |v: &GeoCoordinate| (v.lat() - origin.lat(), v.lng() - origin.lng());

    let twice_area: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| {
            let (a_lat, a_lng) = relative(a);
            let (b_lat, b_lng) = relative(b);
            a_lat * b_lng - b_lat * a_lng
        })
        .sum();

    twice_area.abs() / 2.0 * METERS_PER_DEGREE * METERS_PER_DEGREE
}
