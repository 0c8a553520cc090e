//! Mode-specific query requests.
//!
//! Each query mode has its own request type, so fields that only make sense
//! for one mode (vector queries, semantic answers, knowledge sources) never
//! appear on another. [`QueryRequest`] is the tagged union the dispatcher
//! works with; it knows which key scope it needs, how to render its backend
//! body and URL, and how long the call may take.

pub mod args;
mod build;

pub use args::{
    AgenticArgs, ConnectionArgs, HybridArgs, KeywordArgs, SemanticArgs, SemanticHybridArgs,
    VectorArgs,
};

use crate::clients::config::GatewayConfig;
use crate::clients::search::BackendRequest;
use crate::credentials::{Credentials, KeyKind};
use crate::error::{GatewayError, GatewayResult};
use crate::sources::KnowledgeSourceConfig;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;

/// Extra time granted past the backend's own runtime bound.
const AGENTIC_GRACE_SECS: u64 = 5;

/// The six query modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    Keyword,
    Semantic,
    Vector,
    Hybrid,
    SemanticHybrid,
    Agentic,
}

impl QueryMode {
    /// Every mode, in tool order.
    pub const ALL: [QueryMode; 6] = [
        QueryMode::Keyword,
        QueryMode::Semantic,
        QueryMode::Vector,
        QueryMode::Hybrid,
        QueryMode::SemanticHybrid,
        QueryMode::Agentic,
    ];

    /// Name of the tool serving this mode.
    pub fn tool_name(self) -> &'static str {
        match self {
            QueryMode::Keyword => "simple_search",
            QueryMode::Semantic => "semantic_search",
            QueryMode::Vector => "vector_search",
            QueryMode::Hybrid => "hybrid_search",
            QueryMode::SemanticHybrid => "semantic_hybrid_search",
            QueryMode::Agentic => "agentic_retrieval",
        }
    }

    /// Mode served by the named tool.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.tool_name() == name)
    }

    /// Key scope the mode requires.
    pub fn key_kind(self) -> KeyKind {
        match self {
            QueryMode::Agentic => KeyKind::Admin,
            _ => KeyKind::Query,
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

/// `searchMode` for the lexical component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Any,
    All,
}

impl SearchMode {
    fn as_str(self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::All => "all",
        }
    }
}

/// Agentic retrieval reasoning effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
}

impl ReasoningEffort {
    fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::Minimal => "minimal",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
        }
    }
}

/// Agentic retrieval output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    AnswerSynthesis,
    ExtractiveData,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            OutputMode::AnswerSynthesis => "answerSynthesis",
            OutputMode::ExtractiveData => "extractiveData",
        }
    }
}

/// Result paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub top: u32,
    pub skip: u32,
}

/// Field projection, pre-filter and vector stripping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shaping {
    pub select: Vec<String>,
    pub filter: Option<String>,
    pub include_vectors: bool,
}

/// A text query vectorized by the index's integrated vectorizer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpec {
    pub fields: Vec<String>,
    pub text: String,
    pub k: u32,
    pub exhaustive: bool,
    pub weight: Option<f64>,
}

/// Semantic answers request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSpec {
    pub kind: String,
    pub count: Option<u32>,
    pub threshold: Option<f64>,
}

impl AnswerSpec {
    /// Wire form: `kind[|count-N][,threshold-T]`.
    pub fn to_wire(&self) -> String {
        let mut options = Vec::new();
        if let Some(count) = self.count {
            options.push(format!("count-{count}"));
        }
        if let Some(threshold) = self.threshold {
            options.push(format!("threshold-{threshold}"));
        }
        if options.is_empty() {
            self.kind.clone()
        } else {
            format!("{}|{}", self.kind, options.join(","))
        }
    }
}

/// Semantic reranking configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticSpec {
    pub configuration: String,
    pub captions: Option<String>,
    pub answers: Option<AnswerSpec>,
}

/// Keyword (BM25) search.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordQuery {
    pub index: String,
    pub text: String,
    pub search_fields: Vec<String>,
    pub search_mode: SearchMode,
    pub facets: Vec<String>,
    pub paging: Paging,
    pub shaping: Shaping,
}

/// Semantic reranked search.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticQuery {
    pub index: String,
    pub text: String,
    pub semantic: SemanticSpec,
    pub paging: Paging,
    pub shaping: Shaping,
}

/// Pure vector similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub index: String,
    pub vector: VectorSpec,
    pub shaping: Shaping,
}

/// Keyword plus vector search fused by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
    pub index: String,
    pub text: String,
    pub search_fields: Vec<String>,
    pub vector: VectorSpec,
    pub top: u32,
    pub shaping: Shaping,
}

/// Hybrid search with semantic reranking over the fused set.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHybridQuery {
    pub hybrid: HybridQuery,
    pub semantic: SemanticSpec,
}

/// Knowledge base agentic retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct AgenticQuery {
    pub knowledge_base: String,
    pub text: String,
    pub intent: Option<String>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub output_mode: OutputMode,
    pub include_activity: bool,
    pub max_runtime_seconds: Option<u32>,
    pub max_output_size: Option<u32>,
    pub sources: Vec<KnowledgeSourceConfig>,
}

/// A validated request for one of the six modes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Keyword(KeywordQuery),
    Semantic(SemanticQuery),
    Vector(VectorQuery),
    Hybrid(HybridQuery),
    SemanticHybrid(SemanticHybridQuery),
    Agentic(AgenticQuery),
}

impl QueryRequest {
    /// Mode of this request.
    pub fn mode(&self) -> QueryMode {
        match self {
            QueryRequest::Keyword(_) => QueryMode::Keyword,
            QueryRequest::Semantic(_) => QueryMode::Semantic,
            QueryRequest::Vector(_) => QueryMode::Vector,
            QueryRequest::Hybrid(_) => QueryMode::Hybrid,
            QueryRequest::SemanticHybrid(_) => QueryMode::SemanticHybrid,
            QueryRequest::Agentic(_) => QueryMode::Agentic,
        }
    }

    /// Time budget for the backend exchange.
    pub fn timeout(&self, default: Duration) -> Duration {
        match self {
            QueryRequest::Agentic(AgenticQuery {
                max_runtime_seconds: Some(runtime),
                ..
            }) => default.max(Duration::from_secs(u64::from(*runtime) + AGENTIC_GRACE_SECS)),
            _ => default,
        }
    }

    /// Shaping applied to returned documents, for the classic modes.
    pub fn shaping(&self) -> Option<&Shaping> {
        match self {
            QueryRequest::Keyword(q) => Some(&q.shaping),
            QueryRequest::Semantic(q) => Some(&q.shaping),
            QueryRequest::Vector(q) => Some(&q.shaping),
            QueryRequest::Hybrid(q) => Some(&q.shaping),
            QueryRequest::SemanticHybrid(q) => Some(&q.hybrid.shaping),
            QueryRequest::Agentic(_) => None,
        }
    }

    /// Semantic settings, for the semantic modes.
    pub fn semantic(&self) -> Option<&SemanticSpec> {
        match self {
            QueryRequest::Semantic(q) => Some(&q.semantic),
            QueryRequest::SemanticHybrid(q) => Some(&q.semantic),
            _ => None,
        }
    }

    /// Render the JSON body the backend expects.
    pub fn body(&self) -> Value {
        match self {
            QueryRequest::Keyword(q) => keyword_body(q),
            QueryRequest::Semantic(q) => semantic_body(q),
            QueryRequest::Vector(q) => vector_body(q),
            QueryRequest::Hybrid(q) => hybrid_body(q),
            QueryRequest::SemanticHybrid(q) => semantic_hybrid_body(q),
            QueryRequest::Agentic(q) => agentic_body(q),
        }
    }

    /// Build the backend request for the resolved credentials.
    pub fn to_backend(
        &self,
        credentials: &Credentials,
        config: &GatewayConfig,
    ) -> GatewayResult<BackendRequest> {
        let url = match self {
            QueryRequest::Keyword(KeywordQuery { index, .. })
            | QueryRequest::Semantic(SemanticQuery { index, .. })
            | QueryRequest::Vector(VectorQuery { index, .. })
            | QueryRequest::Hybrid(HybridQuery { index, .. })
            | QueryRequest::SemanticHybrid(SemanticHybridQuery {
                hybrid: HybridQuery { index, .. },
                ..
            }) => service_url(
                &credentials.endpoint,
                &["indexes", index.as_str(), "docs", "search"],
                &config.api_version,
            )?,
            QueryRequest::Agentic(q) => {
                let knowledge_base =
                    format!("knowledgebases('{}')", q.knowledge_base.replace('\'', "''"));
                service_url(
                    &credentials.endpoint,
                    &[knowledge_base.as_str(), "retrieve"],
                    &config.agentic_api_version,
                )?
            }
        };

        Ok(BackendRequest {
            url,
            api_key: credentials.key.clone(),
            body: self.body(),
        })
    }
}

fn service_url(endpoint: &Url, segments: &[&str], api_version: &str) -> GatewayResult<Url> {
    let mut url = endpoint.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| GatewayError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "endpoint cannot be a base URL".to_string(),
            })?;
        path.pop_if_empty().extend(segments);
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("api-version", api_version);
    Ok(url)
}

fn insert_list(body: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        body.insert(key.to_string(), json!(values.join(",")));
    }
}

fn insert_shaping(body: &mut Map<String, Value>, shaping: &Shaping) {
    insert_list(body, "select", &shaping.select);
    if let Some(ref filter) = shaping.filter {
        body.insert("filter".to_string(), json!(filter));
    }
}

fn insert_semantic(body: &mut Map<String, Value>, semantic: &SemanticSpec) {
    body.insert("queryType".to_string(), json!("semantic"));
    body.insert(
        "semanticConfiguration".to_string(),
        json!(semantic.configuration),
    );
    if let Some(ref captions) = semantic.captions {
        body.insert("captions".to_string(), json!(captions));
    }
    if let Some(ref answers) = semantic.answers {
        body.insert("answers".to_string(), json!(answers.to_wire()));
    }
}

fn vector_queries(vector: &VectorSpec) -> Value {
    let mut query = json!({
        "kind": "text",
        "text": vector.text,
        "fields": vector.fields.join(","),
        "k": vector.k,
        "exhaustive": vector.exhaustive,
    });
    if let Some(weight) = vector.weight {
        query["weight"] = json!(weight);
    }
    json!([query])
}

fn keyword_body(q: &KeywordQuery) -> Value {
    let mut body = Map::new();
    body.insert("search".to_string(), json!(q.text));
    body.insert("searchMode".to_string(), json!(q.search_mode.as_str()));
    body.insert("top".to_string(), json!(q.paging.top));
    body.insert("skip".to_string(), json!(q.paging.skip));
    body.insert("count".to_string(), json!(true));
    insert_list(&mut body, "searchFields", &q.search_fields);
    if !q.facets.is_empty() {
        body.insert("facets".to_string(), json!(q.facets));
    }
    insert_shaping(&mut body, &q.shaping);
    Value::Object(body)
}

fn semantic_body(q: &SemanticQuery) -> Value {
    let mut body = Map::new();
    body.insert("search".to_string(), json!(q.text));
    body.insert("semanticQuery".to_string(), json!(q.text));
    body.insert("top".to_string(), json!(q.paging.top));
    body.insert("skip".to_string(), json!(q.paging.skip));
    body.insert("count".to_string(), json!(true));
    insert_semantic(&mut body, &q.semantic);
    insert_shaping(&mut body, &q.shaping);
    Value::Object(body)
}

fn vector_body(q: &VectorQuery) -> Value {
    let mut body = Map::new();
    body.insert("vectorQueries".to_string(), vector_queries(&q.vector));
    body.insert("top".to_string(), json!(q.vector.k));
    body.insert("count".to_string(), json!(true));
    insert_shaping(&mut body, &q.shaping);
    Value::Object(body)
}

fn hybrid_map(q: &HybridQuery) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("search".to_string(), json!(q.text));
    body.insert("vectorQueries".to_string(), vector_queries(&q.vector));
    body.insert("top".to_string(), json!(q.top));
    body.insert("count".to_string(), json!(true));
    insert_list(&mut body, "searchFields", &q.search_fields);
    insert_shaping(&mut body, &q.shaping);
    body
}

fn hybrid_body(q: &HybridQuery) -> Value {
    Value::Object(hybrid_map(q))
}

fn semantic_hybrid_body(q: &SemanticHybridQuery) -> Value {
    let mut body = hybrid_map(&q.hybrid);
    insert_semantic(&mut body, &q.semantic);
    Value::Object(body)
}

fn agentic_body(q: &AgenticQuery) -> Value {
    let mut body = Map::new();
    body.insert(
        "messages".to_string(),
        json!([{
            "role": "user",
            "content": [{ "type": "text", "text": q.text }]
        }]),
    );
    body.insert("includeActivity".to_string(), json!(q.include_activity));
    body.insert("outputMode".to_string(), json!(q.output_mode.as_str()));
    if let Some(ref intent) = q.intent {
        body.insert(
            "intents".to_string(),
            json!([{ "type": "semantic", "search": intent }]),
        );
    }
    if let Some(effort) = q.reasoning_effort {
        body.insert(
            "retrievalReasoningEffort".to_string(),
            json!({ "kind": effort.as_str() }),
        );
    }
    if let Some(runtime) = q.max_runtime_seconds {
        body.insert("maxRuntimeInSeconds".to_string(), json!(runtime));
    }
    if let Some(size) = q.max_output_size {
        body.insert("maxOutputSize".to_string(), json!(size));
    }
    body.insert(
        "knowledgeSourceParams".to_string(),
        Value::Array(q.sources.iter().map(KnowledgeSourceConfig::to_wire).collect()),
    );
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::ApiKey;

    fn credentials(kind: KeyKind) -> Credentials {
        Credentials {
            endpoint: Url::parse("https://svc.search.windows.net").unwrap(),
            key: ApiKey::new("key"),
            key_kind: kind,
        }
    }

    fn vector() -> VectorSpec {
        VectorSpec {
            fields: vec!["text_vector".to_string()],
            text: "wifi setup".to_string(),
            k: 5,
            exhaustive: false,
            weight: None,
        }
    }

    fn agentic(runtime: Option<u32>) -> QueryRequest {
        QueryRequest::Agentic(AgenticQuery {
            knowledge_base: "kb1".to_string(),
            text: "what is new?".to_string(),
            intent: None,
            reasoning_effort: None,
            output_mode: OutputMode::AnswerSynthesis,
            include_activity: true,
            max_runtime_seconds: runtime,
            max_output_size: None,
            sources: Vec::new(),
        })
    }

    #[test]
    fn test_mode_tool_names_round_trip() {
        for mode in QueryMode::ALL {
            assert_eq!(QueryMode::from_tool_name(mode.tool_name()), Some(mode));
        }
        assert_eq!(QueryMode::from_tool_name("bing_search"), None);
    }

    #[test]
    fn test_only_agentic_needs_admin_key() {
        for mode in QueryMode::ALL {
            let expected = if mode == QueryMode::Agentic {
                KeyKind::Admin
            } else {
                KeyKind::Query
            };
            assert_eq!(mode.key_kind(), expected);
        }
    }

    #[test]
    fn test_answer_spec_wire_form() {
        let plain = AnswerSpec {
            kind: "extractive".to_string(),
            count: None,
            threshold: None,
        };
        assert_eq!(plain.to_wire(), "extractive");

        let full = AnswerSpec {
            kind: "extractive".to_string(),
            count: Some(3),
            threshold: Some(0.7),
        };
        assert_eq!(full.to_wire(), "extractive|count-3,threshold-0.7");
    }

    #[test]
    fn test_search_url() {
        let request = QueryRequest::Vector(VectorQuery {
            index: "hotels".to_string(),
            vector: vector(),
            shaping: Shaping::default(),
        });
        let backend = request
            .to_backend(&credentials(KeyKind::Query), &GatewayConfig::default())
            .unwrap();
        assert_eq!(
            backend.url.as_str(),
            "https://svc.search.windows.net/indexes/hotels/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_agentic_url() {
        let backend = agentic(None)
            .to_backend(&credentials(KeyKind::Admin), &GatewayConfig::default())
            .unwrap();
        assert_eq!(
            backend.url.as_str(),
            "https://svc.search.windows.net/knowledgebases('kb1')/retrieve?api-version=2025-11-01-preview"
        );
    }

    #[test]
    fn test_agentic_url_escapes_knowledge_base_key() {
        let mut request = agentic(None);
        if let QueryRequest::Agentic(ref mut q) = request {
            q.knowledge_base = "o'brien kb".to_string();
        }
        let backend = request
            .to_backend(&credentials(KeyKind::Admin), &GatewayConfig::default())
            .unwrap();
        assert_eq!(
            backend.url.as_str(),
            "https://svc.search.windows.net/knowledgebases('o''brien%20kb')/retrieve?api-version=2025-11-01-preview"
        );
    }

    #[test]
    fn test_vector_body_has_no_search_text() {
        let request = QueryRequest::Vector(VectorQuery {
            index: "hotels".to_string(),
            vector: vector(),
            shaping: Shaping::default(),
        });
        let body = request.body();
        assert!(body.get("search").is_none());
        assert_eq!(body["top"], 5);
        assert_eq!(
            body["vectorQueries"],
            json!([{
                "kind": "text",
                "text": "wifi setup",
                "fields": "text_vector",
                "k": 5,
                "exhaustive": false
            }])
        );
    }

    #[test]
    fn test_semantic_hybrid_body() {
        let request = QueryRequest::SemanticHybrid(SemanticHybridQuery {
            hybrid: HybridQuery {
                index: "docs".to_string(),
                text: "reset router".to_string(),
                search_fields: vec!["title".to_string(), "content".to_string()],
                vector: VectorSpec {
                    k: 50,
                    weight: Some(0.5),
                    ..vector()
                },
                top: 10,
                shaping: Shaping {
                    select: vec!["id".to_string()],
                    filter: Some("lang eq 'en'".to_string()),
                    include_vectors: false,
                },
            },
            semantic: SemanticSpec {
                configuration: "default".to_string(),
                captions: Some("extractive".to_string()),
                answers: None,
            },
        });

        let body = request.body();
        assert_eq!(body["search"], "reset router");
        assert_eq!(body["queryType"], "semantic");
        assert_eq!(body["semanticConfiguration"], "default");
        assert_eq!(body["captions"], "extractive");
        assert_eq!(body["searchFields"], "title,content");
        assert_eq!(body["select"], "id");
        assert_eq!(body["filter"], "lang eq 'en'");
        assert_eq!(body["vectorQueries"][0]["k"], 50);
        assert_eq!(body["vectorQueries"][0]["weight"], 0.5);
        assert!(body.get("answers").is_none());
        assert!(body.get("skip").is_none());
    }

    #[test]
    fn test_agentic_timeout_extends_past_runtime() {
        let default = Duration::from_secs(30);
        assert_eq!(agentic(None).timeout(default), default);
        assert_eq!(agentic(Some(10)).timeout(default), default);
        assert_eq!(agentic(Some(120)).timeout(default), Duration::from_secs(125));
    }
}
