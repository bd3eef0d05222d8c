//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::{BoxFuture, ProviderError};

/// Default request timeout for provider HTTP calls.
///
/// Each detection stage applies its own, usually tighter, deadline on top.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
///
/// Nominatim and Overpass both ask clients to identify themselves.
pub const DEFAULT_USER_AGENT: &str = concat!("roofscan/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_options(DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Creates a new ReqwestClient with custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(url.to_string())
    } else {
        ProviderError::HttpError(format!("Request failed: {}", e))
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| map_reqwest_error(url, e))?;

            if !response.status().is_success() {
                return Err(ProviderError::HttpError(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| map_reqwest_error(url, e))
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock HTTP client for testing.
    ///
    /// Returns a fixed response and records every requested URL.
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, ProviderError>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn new(response: Result<Vec<u8>, ProviderError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
            self.requests.lock().unwrap().push(url.to_string());
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.requested_urls(), vec!["http://example.com"]);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::new(Err(ProviderError::HttpError("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::new().is_ok());
    }
}
