//! Per-call credential resolution.
//!
//! Each tool call picks its endpoint and API key independently: an explicit
//! argument wins, then the process default for the key scope the mode needs,
//! and otherwise the call fails before anything is sent. Resolution never
//! mutates the defaults, so one call's override cannot leak into another.

use crate::error::{GatewayError, GatewayResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the default endpoint.
pub const ENDPOINT_ENV: &str = "AZURE_SEARCH_ENDPOINT";
/// Environment variable holding the default query key.
pub const QUERY_KEY_ENV: &str = "AZURE_SEARCH_QUERY_KEY";
/// Environment variable holding the default admin key.
pub const ADMIN_KEY_ENV: &str = "AZURE_SEARCH_ADMIN_KEY";

/// Scope of the API key a mode requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Read-only search key; used by the five classic modes.
    Query,
    /// Admin key; required by agentic retrieval.
    Admin,
}

impl KeyKind {
    /// Environment variable consulted for this scope's default key.
    pub fn env_var(self) -> &'static str {
        match self {
            KeyKind::Query => QUERY_KEY_ENV,
            KeyKind::Admin => ADMIN_KEY_ENV,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Query => f.write_str("query"),
            KeyKind::Admin => f.write_str("admin"),
        }
    }
}

/// The part of a credential that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPart {
    Endpoint,
    Key,
    EndpointAndKey,
}

impl fmt::Display for CredentialPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialPart::Endpoint => f.write_str("endpoint"),
            CredentialPart::Key => f.write_str("API key"),
            CredentialPart::EndpointAndKey => f.write_str("endpoint and API key"),
        }
    }
}

/// API key that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Process-wide defaults, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialDefaults {
    /// Default endpoint.
    pub endpoint: Option<String>,
    /// Default query-scoped key.
    pub query_key: Option<String>,
    /// Default admin-scoped key.
    pub admin_key: Option<String>,
}

impl CredentialDefaults {
    fn key_for(&self, kind: KeyKind) -> Option<&str> {
        match kind {
            KeyKind::Query => non_blank(self.query_key.as_deref()),
            KeyKind::Admin => non_blank(self.admin_key.as_deref()),
        }
    }
}

/// Resolved credentials for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    /// Service base URL, without a trailing slash.
    pub endpoint: Url,
    /// Key sent in the `api-key` header.
    pub key: ApiKey,
    /// Scope the key was resolved for.
    pub key_kind: KeyKind,
}

/// Resolve the endpoint and key for a call.
///
/// Explicit arguments win over `defaults`; blank strings count as absent. The
/// default key consulted is the one matching `key_kind`. When either part is
/// still missing the error names which, and which scope was required.
pub fn resolve(
    explicit_endpoint: Option<&str>,
    explicit_key: Option<&str>,
    key_kind: KeyKind,
    defaults: &CredentialDefaults,
) -> GatewayResult<Credentials> {
    let endpoint = non_blank(explicit_endpoint).or(non_blank(defaults.endpoint.as_deref()));
    let key = non_blank(explicit_key).or(defaults.key_for(key_kind));

    let (endpoint, key) = match (endpoint, key) {
        (Some(endpoint), Some(key)) => (endpoint, key),
        (None, Some(_)) => return Err(missing(CredentialPart::Endpoint, key_kind)),
        (Some(_), None) => return Err(missing(CredentialPart::Key, key_kind)),
        (None, None) => return Err(missing(CredentialPart::EndpointAndKey, key_kind)),
    };

    Ok(Credentials {
        endpoint: parse_endpoint(endpoint)?,
        key: ApiKey::new(key),
        key_kind,
    })
}

/// Parse an endpoint into a base URL, dropping any trailing slash.
pub fn parse_endpoint(raw: &str) -> GatewayResult<Url> {
    let invalid = |reason: String| GatewayError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim().trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) base URL".to_string()));
    }
    Ok(url)
}

fn missing(part: CredentialPart, key_kind: KeyKind) -> GatewayError {
    let (hint, env) = match part {
        CredentialPart::Endpoint => ("endpoint", ENDPOINT_ENV.to_string()),
        CredentialPart::Key => ("api_key", key_kind.env_var().to_string()),
        CredentialPart::EndpointAndKey => (
            "endpoint and api_key",
            format!("{} and {}", ENDPOINT_ENV, key_kind.env_var()),
        ),
    };
    GatewayError::MissingCredential {
        missing: part,
        key_kind,
        hint,
        env,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> CredentialDefaults {
        CredentialDefaults {
            endpoint: Some("https://svc.search.windows.net".to_string()),
            query_key: Some("A".to_string()),
            admin_key: Some("ADMIN".to_string()),
        }
    }

    #[test]
    fn test_explicit_key_wins_over_env_default() {
        let creds = resolve(None, Some("B"), KeyKind::Query, &defaults()).unwrap();
        assert_eq!(creds.key.expose(), "B");
        assert_eq!(creds.key_kind, KeyKind::Query);
    }

    #[test]
    fn test_falls_back_to_matching_scope() {
        let query = resolve(None, None, KeyKind::Query, &defaults()).unwrap();
        assert_eq!(query.key.expose(), "A");

        let admin = resolve(None, None, KeyKind::Admin, &defaults()).unwrap();
        assert_eq!(admin.key.expose(), "ADMIN");
    }

    #[test]
    fn test_admin_mode_never_uses_query_key() {
        let defaults = CredentialDefaults {
            admin_key: None,
            ..defaults()
        };
        let err = resolve(None, None, KeyKind::Admin, &defaults).unwrap_err();
        match err {
            GatewayError::MissingCredential {
                missing, key_kind, ..
            } => {
                assert_eq!(missing, CredentialPart::Key);
                assert_eq!(key_kind, KeyKind::Admin);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(resolve(None, None, KeyKind::Admin, &defaults)
            .unwrap_err()
            .to_string()
            .contains("AZURE_SEARCH_ADMIN_KEY"));
    }

    #[test]
    fn test_explicit_endpoint_overrides_and_is_trimmed() {
        let creds = resolve(
            Some("https://other.search.windows.net/"),
            None,
            KeyKind::Query,
            &defaults(),
        )
        .unwrap();
        assert_eq!(creds.endpoint.host_str(), Some("other.search.windows.net"));
    }

    #[test]
    fn test_blank_explicit_values_are_ignored() {
        let creds = resolve(Some("  "), Some(""), KeyKind::Query, &defaults()).unwrap();
        assert_eq!(creds.key.expose(), "A");
        assert_eq!(creds.endpoint.host_str(), Some("svc.search.windows.net"));
    }

    #[test]
    fn test_missing_both_parts() {
        let err = resolve(None, None, KeyKind::Query, &CredentialDefaults::default()).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MissingCredential {
                missing: CredentialPart::EndpointAndKey,
                key_kind: KeyKind::Query,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = resolve(Some("not a url"), Some("k"), KeyKind::Query, &defaults()).unwrap_err();
        assert_eq!(err.kind(), "InvalidEndpoint");

        let err = parse_endpoint("ftp://svc.example.com").unwrap_err();
        assert_eq!(err.kind(), "InvalidEndpoint");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn test_defaults_are_not_mutated() {
        let defaults = defaults();
        let _ = resolve(Some("https://x.example.com"), Some("B"), KeyKind::Query, &defaults);
        assert_eq!(defaults.query_key.as_deref(), Some("A"));
        assert_eq!(
            defaults.endpoint.as_deref(),
            Some("https://svc.search.windows.net")
        );
    }
}
