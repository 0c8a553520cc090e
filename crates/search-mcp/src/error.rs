//! Gateway error taxonomy.
//!
//! Every failure the gateway can produce while serving a tool call is a
//! [`GatewayError`]. Configuration and validation errors are raised before any
//! request leaves the process; [`GatewayError::Timeout`] and
//! [`GatewayError::Backend`] are the only variants that can follow a network
//! exchange, and both are surfaced as-is with no local recovery.

use crate::credentials::{CredentialPart, KeyKind};
use thiserror::Error;

/// Errors produced by the search gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No endpoint and/or key could be resolved for the call.
    #[error("Missing {missing} for {key_kind} credentials: pass {hint} or set {env}")]
    MissingCredential {
        /// Which part of the credential is absent.
        missing: CredentialPart,
        /// Key scope the calling mode required.
        key_kind: KeyKind,
        /// Argument names that would have supplied it.
        hint: &'static str,
        /// Environment variables that would have supplied it.
        env: String,
    },

    /// The resolved endpoint is not a usable base URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A knowledge source segment lacks `knowledgeSourceName` or `kind`.
    #[error("Missing required field '{field}' in knowledge source segment {segment}")]
    MissingRequiredField {
        /// Field name.
        field: String,
        /// Zero-based segment index.
        segment: usize,
    },

    /// `kind` is not one of the recognized source kinds.
    #[error("Unknown knowledge source kind '{kind}' in segment {segment} (expected searchIndex, web or remoteSharePoint)")]
    UnknownSourceKind {
        /// Kind as written.
        kind: String,
        /// Zero-based segment index.
        segment: usize,
    },

    /// A parameter is not applicable to the declared kind.
    #[error("Parameter '{key}' is not supported for kind '{kind}' (segment {segment})")]
    UnsupportedParameter {
        /// Parameter name.
        key: String,
        /// Declared kind.
        kind: String,
        /// Zero-based segment index.
        segment: usize,
    },

    /// A parameter value cannot be coerced to the declared type.
    #[error("Invalid value '{value}' for '{key}' in segment {segment}: expected {expected}")]
    InvalidParameterValue {
        /// Parameter name.
        key: String,
        /// Raw value.
        value: String,
        /// Human-readable expected type.
        expected: String,
        /// Zero-based segment index.
        segment: usize,
    },

    /// A segment contains a pair that is not `key=value`.
    #[error("Malformed pair '{pair}' in knowledge source segment {segment}: {reason}")]
    MalformedSegment {
        /// Offending pair text.
        pair: String,
        /// Zero-based segment index.
        segment: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The same key appears twice in one segment.
    #[error("Parameter '{key}' given more than once in segment {segment}")]
    DuplicateParameter {
        /// Parameter name.
        key: String,
        /// Zero-based segment index.
        segment: usize,
    },

    /// Two segments share a `knowledgeSourceName`.
    #[error("Knowledge source '{name}' configured in segments {first} and {segment}")]
    DuplicateSourceName {
        /// Repeated source name.
        name: String,
        /// Segment of the first occurrence.
        first: usize,
        /// Segment of the repeat.
        segment: usize,
    },

    /// Agentic retrieval was requested without any knowledge source.
    #[error("Agentic retrieval requires at least one knowledge source in knowledge_source_configs")]
    NoSourcesConfigured,

    /// One half of a vector query is present without the other.
    #[error("Incomplete vector query: '{missing}' is required alongside '{present}'")]
    IncompleteVectorSpec {
        /// Argument that is missing or blank.
        missing: &'static str,
        /// Argument it must accompany.
        present: &'static str,
    },

    /// A required tool argument is blank.
    #[error("Missing required argument '{0}'")]
    MissingArgument(&'static str),

    /// A tool argument has a value outside its vocabulary or range.
    #[error("Invalid argument: {0}")]
    InvalidArguments(String),

    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The backend did not answer within the call's time budget.
    #[error("Search request timed out after {seconds}s")]
    Timeout {
        /// Budget that elapsed.
        seconds: u64,
    },

    /// The backend failed; passed through verbatim.
    #[error("{}", format_backend(.status, .message))]
    Backend {
        /// HTTP status, when the backend answered.
        status: Option<u16>,
        /// Backend message or transport failure.
        message: String,
    },
}

impl GatewayError {
    /// Stable identifier used in structured tool errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "MissingCredential",
            Self::InvalidEndpoint { .. } => "InvalidEndpoint",
            Self::MissingRequiredField { .. } => "MissingRequiredField",
            Self::UnknownSourceKind { .. } => "UnknownSourceKind",
            Self::UnsupportedParameter { .. } => "UnsupportedParameter",
            Self::InvalidParameterValue { .. } => "InvalidParameterValue",
            Self::MalformedSegment { .. } => "MalformedSegment",
            Self::DuplicateParameter { .. } => "DuplicateParameter",
            Self::DuplicateSourceName { .. } => "DuplicateSourceName",
            Self::NoSourcesConfigured => "NoSourcesConfigured",
            Self::IncompleteVectorSpec { .. } => "IncompleteVectorSpec",
            Self::MissingArgument(_) => "MissingArgument",
            Self::InvalidArguments(_) => "InvalidArguments",
            Self::UnknownTool(_) => "UnknownTool",
            Self::Timeout { .. } => "Timeout",
            Self::Backend { .. } => "BackendError",
        }
    }

    /// HTTP status passed through from the backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the error was raised locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Timeout { .. } | Self::Backend { .. })
    }

    /// Structured form attached to failed tool results.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(status) = self.status() {
            error["status"] = serde_json::json!(status);
        }
        serde_json::json!({ "error": error })
    }
}

fn format_backend(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Search service error ({status}): {message}"),
        None => format!("Search service error: {message}"),
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
