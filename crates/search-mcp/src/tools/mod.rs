//! Search MCP tools
//!
//! This module provides the tools the gateway registers: one per query mode.

pub mod search;

pub use search::*;

use crate::clients::config::GatewayConfig;
use crate::clients::search::{SearchBackend, SearchClient};
use crate::dispatch::ToolDispatcher;
use crate::server::Tool;
use std::sync::Arc;

/// Get all available MCP tools over the HTTP search client.
///
/// # Example
///
/// ```rust,no_run
/// use search_mcp::tools::all_tools;
/// use search_mcp::GatewayConfig;
///
/// let tools = all_tools(GatewayConfig::from_env());
/// println!("Available tools: {}", tools.len());
/// ```
pub fn all_tools(config: GatewayConfig) -> Vec<Arc<dyn Tool>> {
    tools_with_backend(Arc::new(SearchClient::new()), config)
}

/// Get all tools over an arbitrary backend.
pub fn tools_with_backend(
    backend: Arc<dyn SearchBackend>,
    config: GatewayConfig,
) -> Vec<Arc<dyn Tool>> {
    search_tools(Arc::new(ToolDispatcher::new(backend, config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_count() {
        let tools = all_tools(GatewayConfig::default());
        assert_eq!(tools.len(), 6, "Expected one tool per query mode");
    }

    #[test]
    fn test_all_tools_unique_names() {
        let tools = all_tools(GatewayConfig::default());
        let mut names = std::collections::HashSet::new();

        for tool in tools {
            let def = tool.definition();
            assert!(
                names.insert(def.name.clone()),
                "Duplicate tool name: {}",
                def.name
            );
        }
    }

    #[test]
    fn test_tool_categories() {
        for tool in all_tools(GatewayConfig::default()) {
            assert_eq!(tool.definition().category.as_deref(), Some(SEARCH_CATEGORY));
        }
    }
}
