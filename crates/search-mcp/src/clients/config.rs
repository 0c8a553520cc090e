//! Gateway configuration.
//!
//! Provides the default endpoint, default keys, API versions and the default
//! per-call timeout. Configuration is loaded from environment variables with
//! defaults that match the search service's current GA API.

use crate::credentials::{self, CredentialDefaults, ADMIN_KEY_ENV, ENDPOINT_ENV, QUERY_KEY_ENV};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the default timeout in seconds.
pub const TIMEOUT_ENV: &str = "AZURE_SEARCH_TIMEOUT";
/// Environment variable overriding the classic search API version.
pub const API_VERSION_ENV: &str = "AZURE_SEARCH_API_VERSION";
/// Environment variable overriding the knowledge base retrieval API version.
pub const AGENTIC_API_VERSION_ENV: &str = "AZURE_SEARCH_AGENTIC_API_VERSION";

/// Default classic search API version.
pub const DEFAULT_API_VERSION: &str = "2024-07-01";
/// Default knowledge base retrieval API version.
pub const DEFAULT_AGENTIC_API_VERSION: &str = "2025-11-01-preview";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Default search service endpoint.
    pub endpoint: Option<String>,

    /// Default query-scoped key.
    #[serde(skip_serializing)]
    pub query_key: Option<String>,

    /// Default admin-scoped key.
    #[serde(skip_serializing)]
    pub admin_key: Option<String>,

    /// Default request timeout in seconds.
    pub default_timeout_secs: u64,

    /// API version for the classic search modes.
    pub api_version: String,

    /// API version for knowledge base retrieval.
    pub agentic_api_version: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            query_key: None,
            admin_key: None,
            default_timeout_secs: 30,
            api_version: DEFAULT_API_VERSION.to_string(),
            agentic_api_version: DEFAULT_AGENTIC_API_VERSION.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AZURE_SEARCH_ENDPOINT`: default service endpoint
    /// - `AZURE_SEARCH_QUERY_KEY`: default query key
    /// - `AZURE_SEARCH_ADMIN_KEY`: default admin key (agentic retrieval)
    /// - `AZURE_SEARCH_TIMEOUT`: request timeout in seconds (default: 30)
    /// - `AZURE_SEARCH_API_VERSION`: classic API version (default: 2024-07-01)
    /// - `AZURE_SEARCH_AGENTIC_API_VERSION`: retrieval API version (default: 2025-11-01-preview)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            endpoint: get(ENDPOINT_ENV),
            query_key: get(QUERY_KEY_ENV),
            admin_key: get(ADMIN_KEY_ENV),
            default_timeout_secs: get(TIMEOUT_ENV)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.default_timeout_secs),
            api_version: get(API_VERSION_ENV).unwrap_or(default.api_version),
            agentic_api_version: get(AGENTIC_API_VERSION_ENV)
                .unwrap_or(default.agentic_api_version),
        }
    }

    /// Get the default request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Defaults consulted by credential resolution.
    pub fn credential_defaults(&self) -> CredentialDefaults {
        CredentialDefaults {
            endpoint: self.endpoint.clone(),
            query_key: self.query_key.clone(),
            admin_key: self.admin_key.clone(),
        }
    }

    /// Validate the loaded values.
    ///
    /// Missing keys are not an error here; each call may still supply its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: TIMEOUT_ENV.to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        if let Some(ref endpoint) = self.endpoint {
            credentials::parse_endpoint(endpoint).map_err(|e| ConfigError::InvalidValue {
                key: ENDPOINT_ENV.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}
