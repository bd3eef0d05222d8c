//! Helpers shared across CLI commands.

use roofscan::GeoCoordinate;

use crate::error::CliError;

/// Parses a `lat,lng` pair such as `28.6139,77.2090`.
pub fn parse_vertex(text: &str) -> Result<GeoCoordinate, CliError> {
    let (lat, lng) = text.split_once(',').ok_or_else(|| {
        CliError::InvalidInput(format!("Expected 'lat,lng', got '{}'", text))
    })?;

    let parse = |part: &str, what: &str| {
        part.trim().parse::<f64>().map_err(|_| {
            CliError::InvalidInput(format!("Invalid {} '{}' in '{}'", what, part.trim(), text))
        })
    };

    Ok(GeoCoordinate::new(
        parse(lat, "latitude")?,
        parse(lng, "longitude")?,
    )?)
}

/// Prints a vertex ring, one numbered vertex per line.
pub fn print_vertices(vertices: &[GeoCoordinate]) {
    for (i, v) in vertices.iter().enumerate() {
        println!("  {:>2}: {:.7}, {:.7}", i, v.lat(), v.lng());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_vertex() {
        let v = parse_vertex("28.6139,77.2090").unwrap();
        assert_eq!(v.lat(), 28.6139);
        assert_eq!(v.lng(), 77.209);
    }

    #[test]
    fn test_parse_vertex_allows_spaces() {
        let v = parse_vertex(" -33.86 , 151.2 ").unwrap();
        assert_eq!(v.lat(), -33.86);
        assert_eq!(v.lng(), 151.2);
    }

    #[test]
    fn test_parse_vertex_rejects_garbage() {
        assert!(matches!(
            parse_vertex("28.6"),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_vertex("north,77.2"),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_vertex("91,0"),
            Err(CliError::InvalidInput(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_valid_pairs_parse(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let v = parse_vertex(&format!("{},{}", lat, lng)).unwrap();
            prop_assert_eq!(v.lat(), lat);
            prop_assert_eq!(v.lng(), lng);
        }
    }
}
