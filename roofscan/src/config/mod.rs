//! Engine configuration
//!
//! Settings live in an INI file at `~/.roofscan/config.ini`. A missing file
//! yields the built-in defaults; a present file only needs the keys it
//! overrides.
//!
//! ```ini
//! [detection]
//! zoom = 19
//! vector_timeout_secs = 10
//!
//! [raster]
//! color_threshold = 30
//! noise_floor = 50
//!
//! [providers]
//! user_agent = roofscan/0.1
//! ```
//!
//! `[raster] min_area` and `max_area` default to the 20 m² and 2000 m²
//! plausibility bounds, and every estimate is clamped into that range.
//! Overriding them replaces the range for all stages, so an estimate is then
//! only guaranteed to lie within the configured bounds.

mod file;

pub use file::{
    DetectionSettings, EngineConfig, ProviderSettings, RasterSettings, CONFIG_DIR_NAME,
    CONFIG_FILE_NAME,
};

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Directory holding the config file: `~/.roofscan`.
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// Full path of the config file: `~/.roofscan/config.ini`.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
