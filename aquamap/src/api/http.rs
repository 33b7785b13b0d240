//! HTTP client abstraction for testability.

use std::future::Future;

use super::types::ApiError;

/// Status and body of an HTTP response.
///
/// Non-2xx statuses are not errors at this layer; [`super::GeodataClient`]
/// decides which statuses are terminal and which are retryable.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for asynchronous HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request, optionally with a Bearer token.
    fn get(
        &self,
        url: &str,
        bearer_token: Option<&str>,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new client with default configuration.
    ///
    /// Connection pooling and keepalive are tuned for the bursty request
    /// pattern of tile backfills.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(std::time::Duration::from_secs(30))
    }

    /// Creates a new client with a custom request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aquamap/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str, bearer_token: Option<&str>) -> Result<HttpResponse, ApiError> {
        tracing::trace!(url = url, "HTTP GET request starting");

        let mut request = self.client.get(url);
        if let Some(token) = bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response: {}", e)))?
            .to_vec();

        tracing::debug!(url = url, status = status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse { status, body })
    }
}
