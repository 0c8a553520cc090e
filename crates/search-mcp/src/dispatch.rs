//! Tool call dispatch.
//!
//! [`ToolDispatcher`] runs one call through the fixed sequence: parse the
//! arguments for the tool's mode, resolve credentials, build the request,
//! submit it under the call's time budget, normalize the response. Every
//! validation step completes before the backend is contacted.

use crate::clients::config::GatewayConfig;
use crate::clients::search::SearchBackend;
use crate::credentials::{self, Credentials};
use crate::error::{GatewayError, GatewayResult};
use crate::normalize::{normalize, SearchResultEnvelope};
use crate::request::{
    AgenticArgs, ConnectionArgs, HybridArgs, KeywordArgs, QueryMode, QueryRequest, SemanticArgs,
    SemanticHybridArgs, VectorArgs,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Arguments of one tool call, typed by mode.
#[derive(Debug, Clone)]
pub enum ToolCall {
    Keyword(KeywordArgs),
    Semantic(SemanticArgs),
    Vector(VectorArgs),
    Hybrid(HybridArgs),
    SemanticHybrid(SemanticHybridArgs),
    Agentic(AgenticArgs),
}

fn from_arguments<T: DeserializeOwned>(arguments: Value) -> GatewayResult<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| GatewayError::InvalidArguments(e.to_string()))
}

impl ToolCall {
    /// Deserialize raw arguments for `mode`.
    pub fn parse(mode: QueryMode, arguments: Value) -> GatewayResult<Self> {
        Ok(match mode {
            QueryMode::Keyword => ToolCall::Keyword(from_arguments(arguments)?),
            QueryMode::Semantic => ToolCall::Semantic(from_arguments(arguments)?),
            QueryMode::Vector => ToolCall::Vector(from_arguments(arguments)?),
            QueryMode::Hybrid => ToolCall::Hybrid(from_arguments(arguments)?),
            QueryMode::SemanticHybrid => ToolCall::SemanticHybrid(from_arguments(arguments)?),
            QueryMode::Agentic => ToolCall::Agentic(from_arguments(arguments)?),
        })
    }

    /// Mode of the call.
    pub fn mode(&self) -> QueryMode {
        match self {
            ToolCall::Keyword(_) => QueryMode::Keyword,
            ToolCall::Semantic(_) => QueryMode::Semantic,
            ToolCall::Vector(_) => QueryMode::Vector,
            ToolCall::Hybrid(_) => QueryMode::Hybrid,
            ToolCall::SemanticHybrid(_) => QueryMode::SemanticHybrid,
            ToolCall::Agentic(_) => QueryMode::Agentic,
        }
    }

    /// Per-call connection overrides.
    pub fn connection(&self) -> &ConnectionArgs {
        match self {
            ToolCall::Keyword(a) => &a.connection,
            ToolCall::Semantic(a) => &a.connection,
            ToolCall::Vector(a) => &a.connection,
            ToolCall::Hybrid(a) => &a.connection,
            ToolCall::SemanticHybrid(a) => &a.connection,
            ToolCall::Agentic(a) => &a.connection,
        }
    }

    /// Validate into a request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        match self {
            ToolCall::Keyword(a) => a.build(),
            ToolCall::Semantic(a) => a.build(),
            ToolCall::Vector(a) => a.build(),
            ToolCall::Hybrid(a) => a.build(),
            ToolCall::SemanticHybrid(a) => a.build(),
            ToolCall::Agentic(a) => a.build(),
        }
    }
}

/// Routes tool calls through resolution, building, submission and
/// normalization.
pub struct ToolDispatcher {
    backend: Arc<dyn SearchBackend>,
    config: GatewayConfig,
}

impl ToolDispatcher {
    /// Create a dispatcher over a backend.
    pub fn new(backend: Arc<dyn SearchBackend>, config: GatewayConfig) -> Self {
        Self { backend, config }
    }

    /// Serve a call addressed by tool name.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(
        &self,
        tool: &str,
        arguments: Value,
    ) -> GatewayResult<SearchResultEnvelope> {
        let mode = QueryMode::from_tool_name(tool)
            .ok_or_else(|| GatewayError::UnknownTool(tool.to_string()))?;
        let call = ToolCall::parse(mode, arguments)?;
        self.run(call).await
    }

    /// Serve a parsed call.
    pub async fn run(&self, call: ToolCall) -> GatewayResult<SearchResultEnvelope> {
        let mode = call.mode();
        let credentials = self.resolve(mode, call.connection())?;
        let request = call.build()?;
        self.execute(&credentials, &request).await
    }

    fn resolve(&self, mode: QueryMode, connection: &ConnectionArgs) -> GatewayResult<Credentials> {
        credentials::resolve(
            connection.endpoint.as_deref(),
            connection.api_key.as_deref(),
            mode.key_kind(),
            &self.config.credential_defaults(),
        )
    }

    /// Submit a built request and normalize the response.
    ///
    /// The exchange is bounded by the request's timeout; when it elapses the
    /// call fails with [`GatewayError::Timeout`] and no partial result.
    pub async fn execute(
        &self,
        credentials: &Credentials,
        request: &QueryRequest,
    ) -> GatewayResult<SearchResultEnvelope> {
        let backend_request = request.to_backend(credentials, &self.config)?;
        let budget = request.timeout(self.config.timeout());

        info!(mode = %request.mode(), url = %backend_request.url, "Dispatching search request");
        debug!("Request body: {}", backend_request.body);

        let response = tokio::time::timeout(budget, self.backend.submit(backend_request))
            .await
            .map_err(|_| GatewayError::Timeout {
                seconds: budget.as_secs(),
            })??;

        debug!("Backend answered with status {}", response.status);
        normalize(request, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::search::{BackendRequest, BackendResponse, SearchClientError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend that records requests and answers with a canned response.
    struct RecordingBackend {
        requests: Mutex<Vec<BackendRequest>>,
        response: Result<BackendResponse, (u16, String)>,
        delay: Option<Duration>,
    }

    impl RecordingBackend {
        fn answering(body: Value) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(BackendResponse { status: 200, body }),
                delay: None,
            })
        }

        fn failing(status: u16, message: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err((status, message.to_string())),
                delay: None,
            })
        }

        fn stalling(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(BackendResponse {
                    status: 200,
                    body: json!({ "value": [] }),
                }),
                delay: Some(delay),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SearchBackend for RecordingBackend {
        async fn submit(
            &self,
            request: BackendRequest,
        ) -> Result<BackendResponse, SearchClientError> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response
                .clone()
                .map_err(|(status, message)| SearchClientError::ApiError { status, message })
        }
    }

    fn config() -> GatewayConfig {
        GatewayConfig {
            endpoint: Some("https://svc.search.windows.net".to_string()),
            query_key: Some("query-key".to_string()),
            admin_key: Some("admin-key".to_string()),
            ..GatewayConfig::default()
        }
    }

    fn dispatcher(backend: Arc<RecordingBackend>, config: GatewayConfig) -> ToolDispatcher {
        ToolDispatcher::new(backend, config)
    }

    #[tokio::test]
    async fn test_keyword_call_uses_query_key() {
        let backend = RecordingBackend::answering(json!({
            "@odata.count": 1,
            "value": [{ "@search.score": 1.5, "id": "1" }]
        }));
        let envelope = dispatcher(backend.clone(), config())
            .dispatch("simple_search", json!({ "index_name": "hotels", "query": "pool" }))
            .await
            .unwrap();

        assert_eq!(envelope.count, Some(1));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].api_key.expose(), "query-key");
        assert_eq!(requests[0].body["top"], 5);
    }

    #[tokio::test]
    async fn test_agentic_call_uses_admin_key() {
        let backend = RecordingBackend::answering(json!({ "references": [] }));
        let envelope = dispatcher(backend.clone(), config())
            .dispatch(
                "agentic_retrieval",
                json!({
                    "knowledge_base_name": "kb",
                    "query": "q",
                    "knowledge_source_configs": "knowledgeSourceName=ks1, kind=web"
                }),
            )
            .await
            .unwrap();

        assert_eq!(envelope.status_code, Some(200));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].api_key.expose(), "admin-key");
    }

    #[tokio::test]
    async fn test_explicit_key_overrides_default() {
        let backend = RecordingBackend::answering(json!({ "value": [] }));
        dispatcher(backend.clone(), config())
            .dispatch(
                "simple_search",
                json!({ "index_name": "hotels", "query": "pool", "api_key": "explicit" }),
            )
            .await
            .unwrap();
        assert_eq!(
            backend.requests.lock().unwrap()[0].api_key.expose(),
            "explicit"
        );
    }

    #[tokio::test]
    async fn test_missing_admin_key_fails_before_network() {
        let backend = RecordingBackend::answering(json!({}));
        let config = GatewayConfig {
            admin_key: None,
            ..config()
        };
        let err = dispatcher(backend.clone(), config)
            .dispatch(
                "agentic_retrieval",
                json!({
                    "knowledge_base_name": "kb",
                    "query": "q",
                    "knowledge_source_configs": "knowledgeSourceName=ks1, kind=web"
                }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "MissingCredential");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_failures_send_nothing() {
        let backend = RecordingBackend::answering(json!({}));
        let dispatcher = dispatcher(backend.clone(), config());

        let cases = [
            (
                "vector_search",
                json!({ "index_name": "hotels", "vector_fields": "v" }),
                "IncompleteVectorSpec",
            ),
            (
                "agentic_retrieval",
                json!({ "knowledge_base_name": "kb", "query": "q" }),
                "NoSourcesConfigured",
            ),
            (
                "agentic_retrieval",
                json!({
                    "knowledge_base_name": "kb",
                    "query": "q",
                    "knowledge_source_configs": "knowledgeSourceName=ks1, kind=web, filterAddOn=x"
                }),
                "UnsupportedParameter",
            ),
            (
                "simple_search",
                json!({ "index_name": "hotels", "query": "pool", "top": "many" }),
                "InvalidArguments",
            ),
            ("bing_search", json!({}), "UnknownTool"),
        ];

        for (tool, arguments, kind) in cases {
            let err = dispatcher.dispatch(tool, arguments).await.unwrap_err();
            assert_eq!(err.kind(), kind, "tool {tool}");
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_null_arguments_report_missing_field() {
        let backend = RecordingBackend::answering(json!({}));
        let err = dispatcher(backend, config())
            .dispatch("simple_search", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::MissingArgument("index_name"));
    }

    #[tokio::test]
    async fn test_backend_error_passes_through() {
        let backend = RecordingBackend::failing(403, "Forbidden");
        let err = dispatcher(backend.clone(), config())
            .dispatch("simple_search", json!({ "index_name": "hotels", "query": "pool" }))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GatewayError::Backend {
                status: Some(403),
                message: "Forbidden".to_string()
            }
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let backend = RecordingBackend::stalling(Duration::from_secs(120));
        let config = GatewayConfig {
            default_timeout_secs: 30,
            ..config()
        };
        let err = dispatcher(backend, config)
            .dispatch("simple_search", json!({ "index_name": "hotels", "query": "pool" }))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Timeout { seconds: 30 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_agentic_runtime_extends_timeout() {
        let backend = RecordingBackend::stalling(Duration::from_secs(60));
        let envelope = dispatcher(backend, config())
            .dispatch(
                "agentic_retrieval",
                json!({
                    "knowledge_base_name": "kb",
                    "query": "q",
                    "max_runtime_seconds": 90,
                    "knowledge_source_configs": "knowledgeSourceName=ks1, kind=web"
                }),
            )
            .await;
        assert!(envelope.is_ok());
    }
}
