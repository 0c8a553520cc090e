//! # Search MCP
//!
//! This crate provides an MCP (Model Context Protocol) gateway to a hosted
//! search service, exposing keyword, semantic, vector, hybrid,
//! semantic-hybrid and agentic retrieval as tools.
//!
//! ## Overview
//!
//! A tool call flows through:
//! - **Credentials**: layered endpoint/key resolution (explicit argument, then
//!   the environment default for the mode's key scope)
//! - **Sources**: the knowledge source mini-language, parsed and validated
//!   against a per-kind parameter schema (agentic mode only)
//! - **Request**: one builder per mode, rejecting contradictory arguments
//! - **Clients**: the HTTP search client behind the [`SearchBackend`] trait
//! - **Normalize**: one [`SearchResultEnvelope`] regardless of mode
//!
//! Validation always completes before anything is sent. There are no retries;
//! backend failures and timeouts are reported as they occur.
//!
//! ## Available Tools
//!
//! - `simple_search`: keyword (BM25) search
//! - `semantic_search`: semantic reranking with captions and answers
//! - `vector_search`: vector similarity over integrated vectorization
//! - `hybrid_search`: keyword plus vector, fused by the service
//! - `semantic_hybrid_search`: hybrid with semantic reranking
//! - `agentic_retrieval`: knowledge base retrieval (admin key)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use search_mcp::{all_tools, GatewayConfig, McpRequest, McpServer};
//!
//! async fn serve(line: &str) {
//!     let server = McpServer::gateway();
//!     server.register_tools(all_tools(GatewayConfig::from_env())).await;
//!
//!     if let Some(reply) = server.handle_line(line).await {
//!         println!("{reply}");
//!     }
//!
//!     let ping = server.handle_request(McpRequest::new("1", "ping")).await;
//!     assert!(ping.is_some());
//! }
//! ```
//!
//! ### Knowledge sources
//!
//! ```rust
//! use search_mcp::sources::{parse_source_configs, write_source_configs, SourceKind};
//!
//! let sources = parse_source_configs(
//!     "knowledgeSourceName=docs, kind=searchIndex, filterAddOn=year gt 2020; \
//!      knowledgeSourceName=news, kind=web, count=10",
//! )
//! .unwrap();
//!
//! assert_eq!(sources[1].kind, SourceKind::Web);
//! assert_eq!(parse_source_configs(&write_source_configs(&sources)).unwrap(), sources);
//! ```

pub mod clients;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod request;
pub mod server;
pub mod sources;
pub mod tools;
pub mod types;

// Re-export main types
pub use clients::{
    BackendRequest, BackendResponse, ConfigError, GatewayConfig, SearchBackend, SearchClient,
    SearchClientError,
};
pub use credentials::{ApiKey, CredentialDefaults, Credentials, KeyKind};
pub use dispatch::{ToolCall, ToolDispatcher};
pub use error::{GatewayError, GatewayResult};
pub use normalize::{Caption, SearchResultEnvelope};
pub use request::{QueryMode, QueryRequest};
pub use server::{McpServer, McpServerError, McpServerResult, Tool, ToolContext};
pub use types::{
    CallToolParams, ContentBlock, McpError, McpRequest, McpResponse, RequestId,
    ServerCapabilities, ServerInfo, ToolCapabilities, ToolDefinition, ToolResult,
};

// Re-export tool collections
pub use tools::{all_tools, search_tools, tools_with_backend, SearchTool};
