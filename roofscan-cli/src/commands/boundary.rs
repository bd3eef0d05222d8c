//! `boundary` command.

use roofscan::{BoundaryPolygon, GeoCoordinate};
use serde::Serialize;

use super::common::print_vertices;
use crate::error::CliError;

#[derive(Serialize)]
struct BoundaryOutput<'a> {
    center: GeoCoordinate,
    vertices: &'a [GeoCoordinate],
    area_square_meters: f64,
}

/// Prints the default editing square for `area` m² around the coordinate.
pub fn run(lat: f64, lng: f64, area: f64, json: bool) -> Result<(), CliError> {
    if !area.is_finite() || area <= 0.0 {
        return Err(CliError::InvalidInput(format!(
            "Area must be a positive number of m², got {}",
            area
        )));
    }

    let center = GeoCoordinate::new(lat, lng)?;
    let boundary = BoundaryPolygon::square(center, area)?;

    if json {
        let output = BoundaryOutput {
            center,
            vertices: boundary.vertices(),
            area_square_meters: boundary.area_square_meters(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Boundary around {} (NW, NE, SE, SW):", center);
    print_vertices(boundary.vertices());
    println!();
    println!("Area: {:.1} m²", boundary.area_square_meters());

    Ok(())
}
