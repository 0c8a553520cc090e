//! Search MCP tools
//!
//! One tool per query mode. Each tool forwards its arguments to the shared
//! [`ToolDispatcher`] and reports the normalized envelope as structured
//! content. Gateway failures come back as error results carrying
//! `{"error": {kind, message, status?}}` so the caller can correct the call.

use crate::dispatch::{ToolCall, ToolDispatcher};
use crate::request::QueryMode;
use crate::server::{McpServerError, McpServerResult, Tool, ToolContext};
use crate::types::{ToolDefinition, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Category shared by every search tool.
pub const SEARCH_CATEGORY: &str = "search";

fn connection_properties() -> Value {
    json!({
        "api_key": {
            "type": "string",
            "description": "Search service key; defaults to the configured key for this tool's scope"
        },
        "endpoint": {
            "type": "string",
            "description": "Search service endpoint, e.g. https://<service>.search.windows.net"
        }
    })
}

fn shaping_properties() -> Value {
    json!({
        "select": {
            "type": "string",
            "description": "Comma-separated fields to return"
        },
        "filter": {
            "type": "string",
            "description": "OData filter expression"
        },
        "include_vectors": {
            "type": "boolean",
            "description": "Keep vector fields in returned documents",
            "default": false
        }
    })
}

fn vector_properties(default_k: u32) -> Value {
    json!({
        "vector_fields": {
            "type": "string",
            "description": "Comma-separated vector field names"
        },
        "vector_text": {
            "type": "string",
            "description": "Text vectorized by the index's integrated vectorizer"
        },
        "k": {
            "type": "integer",
            "minimum": 1,
            "description": "Nearest neighbours to retrieve",
            "default": default_k
        },
        "exhaustive": {
            "type": "boolean",
            "description": "Brute-force search over all vectors",
            "default": false
        },
        "weight": {
            "type": "number",
            "description": "Relative weight of the vector query in fusion"
        }
    })
}

fn semantic_properties() -> Value {
    json!({
        "semantic_configuration": {
            "type": "string",
            "description": "Semantic configuration name defined on the index"
        },
        "query_caption": {
            "type": "string",
            "description": "Caption type",
            "default": "extractive"
        },
        "query_answer": {
            "type": "string",
            "description": "Answer type, e.g. extractive"
        },
        "query_answer_count": {
            "type": "integer",
            "minimum": 1,
            "description": "Number of answers to return"
        },
        "query_answer_threshold": {
            "type": "number",
            "minimum": 0,
            "maximum": 1,
            "description": "Minimum answer confidence"
        }
    })
}

fn paging_properties(default_top: u32) -> Value {
    json!({
        "top": {
            "type": "integer",
            "minimum": 1,
            "description": "Number of results to return",
            "default": default_top
        },
        "skip": {
            "type": "integer",
            "minimum": 0,
            "description": "Number of results to skip",
            "default": 0
        }
    })
}

fn base_properties() -> Value {
    json!({
        "index_name": {
            "type": "string",
            "description": "Search index name"
        },
        "query": {
            "type": "string",
            "description": "Search text"
        }
    })
}

fn search_fields_property() -> Value {
    json!({
        "search_fields": {
            "type": "string",
            "description": "Comma-separated searchable fields to match against"
        }
    })
}

fn object_schema(parts: &[Value], required: &[&str]) -> Value {
    let mut properties = Map::new();
    for part in parts {
        if let Value::Object(map) = part {
            properties.extend(map.clone());
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn definition(mode: QueryMode) -> ToolDefinition {
    let (description, schema) = match mode {
        QueryMode::Keyword => (
            "Keyword (BM25) search over an index",
            object_schema(
                &[
                    base_properties(),
                    paging_properties(5),
                    search_fields_property(),
                    json!({
                        "search_mode": {
                            "type": "string",
                            "enum": ["any", "all"],
                            "description": "Whether any or all terms must match",
                            "default": "any"
                        },
                        "facets": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Facet expressions, e.g. category,count:5"
                        }
                    }),
                    shaping_properties(),
                    connection_properties(),
                ],
                &["index_name", "query"],
            ),
        ),
        QueryMode::Semantic => (
            "Semantic search with reranking, captions and optional answers",
            object_schema(
                &[
                    base_properties(),
                    paging_properties(5),
                    semantic_properties(),
                    shaping_properties(),
                    connection_properties(),
                ],
                &["index_name", "query", "semantic_configuration"],
            ),
        ),
        QueryMode::Vector => (
            "Vector similarity search using the index's integrated vectorizer",
            object_schema(
                &[
                    json!({
                        "index_name": {
                            "type": "string",
                            "description": "Search index name"
                        }
                    }),
                    vector_properties(10),
                    shaping_properties(),
                    connection_properties(),
                ],
                &["index_name", "vector_fields", "vector_text"],
            ),
        ),
        QueryMode::Hybrid => (
            "Hybrid keyword and vector search fused with Reciprocal Rank Fusion",
            object_schema(
                &[
                    base_properties(),
                    json!({ "top": { "type": "integer", "minimum": 1, "default": 10 } }),
                    search_fields_property(),
                    vector_properties(10),
                    shaping_properties(),
                    connection_properties(),
                ],
                &["index_name", "query", "vector_fields", "vector_text"],
            ),
        ),
        QueryMode::SemanticHybrid => (
            "Hybrid search with semantic reranking over the fused results",
            object_schema(
                &[
                    base_properties(),
                    json!({ "top": { "type": "integer", "minimum": 1, "default": 10 } }),
                    search_fields_property(),
                    vector_properties(50),
                    semantic_properties(),
                    shaping_properties(),
                    connection_properties(),
                ],
                &[
                    "index_name",
                    "query",
                    "semantic_configuration",
                    "vector_fields",
                    "vector_text",
                ],
            ),
        ),
        QueryMode::Agentic => (
            "Agentic retrieval across the knowledge sources of a knowledge base (requires an admin key)",
            object_schema(
                &[
                    json!({
                        "knowledge_base_name": {
                            "type": "string",
                            "description": "Knowledge base name"
                        },
                        "query": {
                            "type": "string",
                            "description": "User question"
                        },
                        "intent_query": {
                            "type": "string",
                            "description": "Optional semantic intent to refine retrieval"
                        },
                        "reasoning_effort": {
                            "type": "string",
                            "enum": ["minimal", "low", "medium"]
                        },
                        "output_mode": {
                            "type": "string",
                            "enum": ["answerSynthesis", "extractiveData"],
                            "default": "answerSynthesis"
                        },
                        "include_activity": {
                            "type": "boolean",
                            "default": true
                        },
                        "max_runtime_seconds": {
                            "type": "integer",
                            "minimum": 1
                        },
                        "max_output_size": {
                            "type": "integer",
                            "minimum": 1
                        },
                        "knowledge_source_configs": {
                            "type": "string",
                            "description": "Sources as 'knowledgeSourceName=ks1, kind=searchIndex, filterAddOn=...; knowledgeSourceName=ks2, kind=web, count=10'"
                        }
                    }),
                    connection_properties(),
                ],
                &["knowledge_base_name", "query", "knowledge_source_configs"],
            ),
        ),
    };

    ToolDefinition::new(mode.tool_name(), description)
        .with_category(SEARCH_CATEGORY)
        .with_schema(schema)
}

/// A search tool serving one query mode.
pub struct SearchTool {
    mode: QueryMode,
    dispatcher: Arc<ToolDispatcher>,
}

impl SearchTool {
    /// Create the tool for `mode`.
    pub fn new(mode: QueryMode, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { mode, dispatcher }
    }

    /// Mode served by this tool.
    pub fn mode(&self) -> QueryMode {
        self.mode
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn definition(&self) -> ToolDefinition {
        definition(self.mode)
    }

    #[instrument(skip(self, args, context), fields(tool = %self.mode, correlation_id = %context.correlation_id))]
    async fn execute(&self, args: Value, context: &ToolContext) -> McpServerResult<ToolResult> {
        let outcome = match ToolCall::parse(self.mode, args) {
            Ok(call) => self.dispatcher.run(call).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(envelope) => {
                info!(documents = envelope.documents.len(), "Search succeeded");
                let value = serde_json::to_value(&envelope)
                    .map_err(|e| McpServerError::Internal(e.to_string()))?;
                Ok(ToolResult::json(value))
            }
            Err(e) if e.is_validation() => {
                warn!(kind = e.kind(), "Search rejected: {}", e);
                Ok(ToolResult::json_error(e.to_json()))
            }
            Err(e) => {
                error!(kind = e.kind(), status = ?e.status(), "Search failed: {}", e);
                Ok(ToolResult::json_error(e.to_json()))
            }
        }
    }
}

/// One tool per query mode, sharing `dispatcher`.
pub fn search_tools(dispatcher: Arc<ToolDispatcher>) -> Vec<Arc<dyn Tool>> {
    QueryMode::ALL
        .into_iter()
        .map(|mode| Arc::new(SearchTool::new(mode, dispatcher.clone())) as Arc<dyn Tool>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::config::GatewayConfig;
    use crate::clients::search::SearchClient;

    #[test]
    fn test_required_fields_are_declared() {
        for mode in QueryMode::ALL {
            let def = definition(mode);
            let properties = def.input_schema["properties"].as_object().unwrap();
            for required in def.input_schema["required"].as_array().unwrap() {
                let name = required.as_str().unwrap();
                assert!(
                    properties.contains_key(name),
                    "{} requires undeclared {}",
                    def.name,
                    name
                );
            }
            assert!(properties.contains_key("api_key"));
            assert!(properties.contains_key("endpoint"));
        }
    }

    #[test]
    fn test_defaults_in_schema() {
        assert_eq!(
            definition(QueryMode::Keyword).input_schema["properties"]["top"]["default"],
            5
        );
        assert_eq!(
            definition(QueryMode::SemanticHybrid).input_schema["properties"]["k"]["default"],
            50
        );
        assert_eq!(
            definition(QueryMode::Hybrid).input_schema["properties"]["k"]["default"],
            10
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_tool_error() {
        let dispatcher = Arc::new(ToolDispatcher::new(
            Arc::new(SearchClient::new()),
            GatewayConfig::default(),
        ));
        let tool = SearchTool::new(QueryMode::Vector, dispatcher);

        let result = tool
            .execute(json!({ "index_name": "hotels" }), &ToolContext::new())
            .await
            .unwrap();

        assert!(result.is_error);
        let payload = result.structured_content.unwrap();
        assert_eq!(payload["error"]["kind"], "MissingCredential");
    }
}
