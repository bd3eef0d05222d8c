//! `estimate` command.

use roofscan::detection::{DetectionError, FootprintEstimate, FootprintEstimator};
use roofscan::{EngineConfig, GeoCoordinate};
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;

#[derive(Serialize)]
struct EstimateOutput {
    coordinate: GeoCoordinate,
    zoom: u8,
    #[serde(flatten)]
    estimate: FootprintEstimate,
}

/// Estimates the roof area at a coordinate and prints it.
pub fn run(lat: f64, lng: f64, zoom: Option<u8>, json: bool) -> Result<(), CliError> {
    let config = EngineConfig::load()?;
    let zoom = zoom.unwrap_or(config.detection.zoom);
    let coordinate = GeoCoordinate::new(lat, lng).map_err(DetectionError::from)?;

    let estimator = FootprintEstimator::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    debug!(%coordinate, zoom, "Running estimation");
    let result = runtime.block_on(estimator.estimate_footprint(coordinate, zoom));

    let estimate = match result {
        Ok(estimate) => estimate,
        Err(DetectionError::DetectionFailed { failures }) if !json => {
            eprintln!("Could not estimate the roof area automatically:");
            for failure in &failures {
                eprintln!("  - {}", failure);
            }
            eprintln!();
            eprintln!("Please measure the roof and enter the area manually.");
            return Err(DetectionError::DetectionFailed { failures }.into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let output = EstimateOutput {
            coordinate,
            zoom,
            estimate,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Coordinate:  {}", coordinate);
    println!("Roof area:   {:.1} m²", estimate.area_square_meters());
    println!("Source:      {}", estimate.source());
    println!("Confidence:  {}", estimate.confidence());

    Ok(())
}
