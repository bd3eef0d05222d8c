//! CLI error type.

use std::fmt;

use roofscan::config::ConfigError;
use roofscan::detection::DetectionError;
use roofscan::geometry::BoundaryError;
use roofscan::logging::LoggingError;
use roofscan::provider::ProviderError;
use roofscan::CoordError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Malformed command-line input.
    InvalidInput(String),
    /// Configuration could not be loaded or located.
    Config(String),
    /// HTTP providers could not be constructed.
    Provider(ProviderError),
    /// Every estimation stage failed.
    Detection(DetectionError),
    /// The boundary square could not be built.
    Boundary(BoundaryError),
    /// Logging setup failed.
    Logging(LoggingError),
    /// Tokio runtime could not start.
    Runtime(std::io::Error),
    /// JSON output could not be rendered.
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Provider(e) => write!(f, "Provider setup failed: {}", e),
            CliError::Detection(e) => write!(f, "{}", e),
            CliError::Boundary(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Json(e) => write!(f, "Failed to render JSON: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => 2,
            CliError::Detection(DetectionError::InvalidCoordinate(_)) => 2,
            CliError::Detection(DetectionError::DetectionFailed { .. }) => 3,
            _ => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e)
    }
}

impl From<DetectionError> for CliError {
    fn from(e: DetectionError) -> Self {
        CliError::Detection(e)
    }
}

impl From<BoundaryError> for CliError {
    fn from(e: BoundaryError) -> Self {
        CliError::Boundary(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidInput(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}
