//! Shared provider types and errors

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Boxed future type for dyn-compatible async provider methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur while talking to an external provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Imagery bytes could not be decoded into pixels.
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// A JSON response did not have the expected shape.
    #[error("Response parse failed: {0}")]
    Parse(String),

    /// The provider does not serve this zoom level.
    #[error("Unsupported zoom level: {0}")]
    UnsupportedZoom(u8),

    /// Every source in a provider chain that serves the zoom failed.
    #[error("All {count} attempted imagery sources failed, last error: {last}")]
    AllSourcesFailed { count: usize, last: String },
}
