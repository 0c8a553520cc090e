//! Search service client.
//!
//! The gateway talks to the backend through the [`SearchBackend`] trait: one
//! request descriptor in, one raw response or error out. [`SearchClient`] is
//! the HTTP implementation; tests substitute their own.

use crate::credentials::ApiKey;
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Search client errors.
#[derive(Debug, Error)]
pub enum SearchClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },
}

impl From<SearchClientError> for GatewayError {
    fn from(err: SearchClientError) -> Self {
        match err {
            SearchClientError::RequestFailed(e) => GatewayError::Backend {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            SearchClientError::ApiError { status, message } => GatewayError::Backend {
                status: Some(status),
                message,
            },
        }
    }
}

/// A fully built backend request.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Target URL including the `api-version` query.
    pub url: Url,
    /// Key sent in the `api-key` header.
    pub api_key: ApiKey,
    /// JSON body.
    pub body: Value,
}

/// Raw backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    /// HTTP status (always 2xx).
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string when it is not JSON.
    pub body: Value,
}

/// Capability to submit a query to the search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Send one request. No retries.
    async fn submit(&self, request: BackendRequest) -> Result<BackendResponse, SearchClientError>;
}

/// HTTP search client.
#[derive(Clone, Default)]
pub struct SearchClient {
    /// HTTP client instance.
    client: Client,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// Timeouts are applied per call by the dispatcher, so the HTTP client
    /// itself has none.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SearchBackend for SearchClient {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn submit(&self, request: BackendRequest) -> Result<BackendResponse, SearchClientError> {
        debug!("Submitting search request");

        let response = self
            .client
            .post(request.url)
            .header("api-key", request.api_key.expose())
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Search API error ({}): {}", status.as_u16(), text);
            return Err(SearchClientError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(BackendResponse {
            status: status.as_u16(),
            body,
        })
    }
}
