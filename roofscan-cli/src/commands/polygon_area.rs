//! `polygon-area` command.

use roofscan::polygon_area;

use super::common::{parse_vertex, print_vertices};
use crate::error::CliError;

/// Prints the area enclosed by the given `lat,lng` vertices.
pub fn run(vertices: &[String]) -> Result<(), CliError> {
    let ring = vertices
        .iter()
        .map(|v| parse_vertex(v))
        .collect::<Result<Vec<_>, _>>()?;

    if ring.len() < 3 {
        return Err(CliError::InvalidInput(format!(
            "A polygon needs at least 3 vertices, got {}",
            ring.len()
        )));
    }

    println!("Polygon ({} vertices):", ring.len());
    print_vertices(&ring);
    println!();
    println!("Area: {:.1} m²", polygon_area(&ring));

    Ok(())
}
