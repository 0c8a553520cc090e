//! Tool arguments, as received from the MCP client.
//!
//! Arguments are deserialized loosely: required strings are `Option` so that
//! an absent or blank value surfaces as [`GatewayError::MissingArgument`]
//! from the builders rather than as a generic deserialization failure.
//!
//! [`GatewayError::MissingArgument`]: crate::error::GatewayError::MissingArgument

use serde::Deserialize;

fn default_keyword_top() -> u32 {
    5
}

fn default_k() -> u32 {
    10
}

fn default_semantic_hybrid_k() -> u32 {
    50
}

fn default_hybrid_top() -> u32 {
    10
}

fn default_caption() -> Option<String> {
    Some("extractive".to_string())
}

fn default_true() -> bool {
    true
}

/// Per-call connection overrides shared by every tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionArgs {
    /// Explicit key; otherwise the environment default for the mode's scope.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Explicit endpoint; otherwise the environment default.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// `simple_search` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordArgs {
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_keyword_top")]
    pub top: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub search_fields: Option<String>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    /// `any` or `all`.
    #[serde(default)]
    pub search_mode: Option<String>,
    #[serde(default)]
    pub facets: Vec<String>,
    #[serde(default)]
    pub include_vectors: bool,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}

/// `semantic_search` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct SemanticArgs {
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub semantic_configuration: Option<String>,
    #[serde(default = "default_keyword_top")]
    pub top: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default = "default_caption")]
    pub query_caption: Option<String>,
    #[serde(default)]
    pub query_answer: Option<String>,
    #[serde(default)]
    pub query_answer_count: Option<u32>,
    #[serde(default)]
    pub query_answer_threshold: Option<f64>,
    #[serde(default)]
    pub include_vectors: bool,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}

/// `vector_search` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorArgs {
    #[serde(default)]
    pub index_name: Option<String>,
    /// Comma-separated vector field names.
    #[serde(default)]
    pub vector_fields: Option<String>,
    /// Text the service vectorizes.
    #[serde(default)]
    pub vector_text: Option<String>,
    #[serde(default = "default_k")]
    pub k: u32,
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub include_vectors: bool,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}

/// `hybrid_search` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct HybridArgs {
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub vector_fields: Option<String>,
    #[serde(default)]
    pub vector_text: Option<String>,
    #[serde(default = "default_k")]
    pub k: u32,
    #[serde(default = "default_hybrid_top")]
    pub top: u32,
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub search_fields: Option<String>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub include_vectors: bool,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}

/// `semantic_hybrid_search` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct SemanticHybridArgs {
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub semantic_configuration: Option<String>,
    #[serde(default)]
    pub vector_fields: Option<String>,
    #[serde(default)]
    pub vector_text: Option<String>,
    #[serde(default = "default_semantic_hybrid_k")]
    pub k: u32,
    #[serde(default = "default_hybrid_top")]
    pub top: u32,
    #[serde(default)]
    pub exhaustive: bool,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub search_fields: Option<String>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default = "default_caption")]
    pub query_caption: Option<String>,
    #[serde(default)]
    pub query_answer: Option<String>,
    #[serde(default)]
    pub query_answer_count: Option<u32>,
    #[serde(default)]
    pub query_answer_threshold: Option<f64>,
    #[serde(default)]
    pub include_vectors: bool,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}

/// `agentic_retrieval` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct AgenticArgs {
    #[serde(default)]
    pub knowledge_base_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// Optional semantic intent that refines retrieval.
    #[serde(default)]
    pub intent_query: Option<String>,
    /// `minimal`, `low` or `medium`.
    #[serde(default)]
    pub reasoning_effort: Option<String>,
    /// `answerSynthesis` or `extractiveData`.
    #[serde(default)]
    pub output_mode: Option<String>,
    #[serde(default = "default_true")]
    pub include_activity: bool,
    #[serde(default)]
    pub max_runtime_seconds: Option<u32>,
    #[serde(default)]
    pub max_output_size: Option<u32>,
    /// Knowledge sources in the `key=value, ...; ...` mini-language.
    #[serde(default)]
    pub knowledge_source_configs: Option<String>,
    #[serde(flatten)]
    pub connection: ConnectionArgs,
}
