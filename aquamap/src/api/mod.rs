//! Backend API client.
//!
//! The engine consumes two query shapes from the geodata backend: paged
//! full-layer requests and bbox-scoped tile requests. [`GeodataClient`]
//! builds both on top of an injectable [`AsyncHttpClient`], adding retry
//! with exponential backoff; HTTP 401 is terminal and never retried.

mod client;
mod http;
mod types;

pub use client::GeodataClient;
pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient};
pub use types::{ApiError, AuthContext, LayerPage, PageMetadata};

#[cfg(test)]
pub use http::tests::MockHttpClient;
