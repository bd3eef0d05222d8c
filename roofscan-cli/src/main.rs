//! RoofScan CLI - Command-line interface
//!
//! Thin front end over the `roofscan` library: estimate roof area at a
//! coordinate, seed a boundary square, or measure a polygon by hand.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roofscan::logging::{init_logging, DEFAULT_LOG_FILTER};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "roofscan", version, about = "Estimate building roof area from a coordinate")]
struct Cli {
    /// Log debug output from the estimator
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Estimate the roof area of the building at a coordinate
    Estimate {
        /// Latitude in degrees (-90 to 90)
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees (-180 to 180)
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Imagery zoom level (config default, normally 19)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=22))]
        zoom: Option<u8>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default boundary square for a roof area
    Boundary {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Roof area in square meters
        #[arg(long)]
        area: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the area of a polygon given as lat,lng vertices
    PolygonArea {
        /// Vertices in order, e.g. 28.6140,77.2089
        #[arg(required = true, num_args = 3.., allow_hyphen_values = true)]
        vertices: Vec<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let filter = if cli.verbose {
        "roofscan=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let _guard = init_logging(filter, cli.log_dir.as_deref())?;

    match cli.command {
        Commands::Estimate {
            lat,
            lng,
            zoom,
            json,
        } => commands::estimate::run(lat, lng, zoom, json),
        Commands::Boundary {
            lat,
            lng,
            area,
            json,
        } => commands::boundary::run(lat, lng, area, json),
        Commands::PolygonArea { vertices } => commands::polygon_area::run(&vertices),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
