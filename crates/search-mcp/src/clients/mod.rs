//! Backend client modules.
//!
//! - `config`: endpoint, key, API version and timeout defaults
//! - `search`: the [`SearchBackend`] capability and its HTTP client
//!
//! The client only moves bytes. Request shaping lives in `request` and
//! response shaping in `normalize`.

pub mod config;
pub mod search;

pub use config::{ConfigError, GatewayConfig};
pub use search::{BackendRequest, BackendResponse, SearchBackend, SearchClient, SearchClientError};
