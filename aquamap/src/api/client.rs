//! Geodata backend client with retry.

use std::time::Duration;

use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::types::{ApiError, LayerPage, WirePage};
use crate::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_BASE_DELAY};
use crate::coord::GeoBounds;
use crate::layer::LayerType;

/// Client for the geodata backend.
///
/// Wraps an [`AsyncHttpClient`] with bounded retries and exponential
/// backoff. The two query shapes it produces:
///
/// - `GET {base}/geodata/{city}/map?type={layer}&page={n}&per_page={size}`
/// - `GET {base}/geodata/{city}/bbox?bbox={minLon},{minLat},{maxLon},{maxLat}`
pub struct GeodataClient<C> {
    http: C,
    base_url: String,
    max_attempts: u32,
    retry_base_delay: Duration,
    request_timeout: Duration,
}

impl<C: AsyncHttpClient> GeodataClient<C> {
    /// Creates a client with the default retry policy.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_base_delay = base_delay;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fetches one pagination page of a layer.
    pub async fn fetch_layer_page(
        &self,
        city_id: &str,
        layer: LayerType,
        page: u32,
        per_page: Option<u32>,
        token: &str,
    ) -> Result<LayerPage, ApiError> {
        let mut url = format!(
            "{}/geodata/{}/map?type={}&page={}",
            self.base_url,
            city_id,
            layer.as_query(),
            page
        );
        if let Some(size) = per_page {
            url.push_str(&format!("&per_page={}", size));
        }
        self.get_page(&url, token).await
    }

    /// Fetches the features intersecting a bounding box.
    pub async fn fetch_bbox(
        &self,
        city_id: &str,
        bbox: &GeoBounds,
        token: &str,
    ) -> Result<LayerPage, ApiError> {
        let url = format!(
            "{}/geodata/{}/bbox?bbox={}",
            self.base_url,
            city_id,
            bbox.query_value()
        );
        self.get_page(&url, token).await
    }

    /// Performs a GET with retry, backoff and response validation.
    async fn get_page(&self, url: &str, token: &str) -> Result<LayerPage, ApiError> {
        let mut last_error = ApiError::Network("no attempts made".to_string());

        for attempt in 1..=self.max_attempts {
            let result = tokio::time::timeout(
                self.request_timeout,
                self.http.get(url, Some(token)),
            )
            .await;

            match result {
                Err(_) => {
                    last_error = ApiError::Network("timeout".to_string());
                }
                Ok(Err(e)) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    last_error = e;
                }
                Ok(Ok(response)) => {
                    if response.status == 401 {
                        warn!(url = url, "bearer token rejected, aborting request chain");
                        return Err(ApiError::Unauthorized);
                    }
                    if !response.is_success() {
                        last_error = ApiError::Http {
                            status: response.status,
                            url: url.to_string(),
                        };
                    } else {
                        // Decode failures are terminal: the backend answered,
                        // the body is just not what we expect.
                        return decode_page(&response.body);
                    }
                }
            }

            if attempt < self.max_attempts {
                let backoff = self.retry_base_delay * (1 << attempt);
                debug!(
                    url = url,
                    attempt = attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %last_error,
                    "request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_error)
    }
}

fn decode_page(body: &[u8]) -> Result<LayerPage, ApiError> {
    let wire: WirePage =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let features = wire
        .features
        .ok_or_else(|| ApiError::Decode("missing features array".to_string()))?;
    Ok(LayerPage {
        features,
        metadata: wire.metadata,
    })
}
