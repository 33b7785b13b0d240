//! API wire types, credentials and error taxonomy.

use serde::Deserialize;
use thiserror::Error;

use crate::error::LoadError;
use crate::feature::RawFeature;

/// Bearer token and city identifier required for every load operation.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub city_id: String,
    pub token: String,
}

impl AuthContext {
    pub fn new(city_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            city_id: city_id.into(),
            token: token.into(),
        }
    }

    /// Checks the fatal preconditions for any load operation.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.token.is_empty() {
            return Err(LoadError::MissingCredentials("auth token"));
        }
        if self.city_id.is_empty() {
            return Err(LoadError::MissingCredentials("city identifier"));
        }
        Ok(())
    }
}

/// Raw response body shape shared by the page and bbox endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct WirePage {
    pub features: Option<Vec<RawFeature>>,
    #[serde(default)]
    pub metadata: PageMetadata,
}

/// One page (or tile) of features with its metadata.
#[derive(Debug)]
pub struct LayerPage {
    pub features: Vec<RawFeature>,
    pub metadata: PageMetadata,
}

/// Backend-supplied page metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMetadata {
    /// Total feature count for the layer, when the backend declares it.
    pub total_features: Option<u64>,
    /// Whether another page follows this one.
    #[serde(default)]
    pub has_more: bool,
    /// Human-readable layer description for progress messages.
    pub description: Option<String>,
}

/// Errors from backend requests.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bearer token was rejected (HTTP 401). Never retried.
    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    /// Any other non-2xx status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Transport-level failure (connect error, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Http { .. } | ApiError::Network(_))
    }
}
