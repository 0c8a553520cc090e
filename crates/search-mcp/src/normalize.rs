//! Backend response normalization.
//!
//! Every mode's response is mapped onto one [`SearchResultEnvelope`]. Fields
//! the backend did not return are left as `None` and omitted when
//! serialized; nothing is synthesized.

use crate::clients::search::BackendResponse;
use crate::error::{GatewayError, GatewayResult};
use crate::request::QueryRequest;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const VECTOR_SUFFIXES: [&str; 4] = ["_vector", "_vectors", "_embedding", "_embeddings"];

/// A caption lifted out of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Position of the source document in `documents`.
    pub document: usize,
    /// Caption text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Caption with highlight markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
}

/// Uniform result shape returned by every tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultEnvelope {
    /// Ranked documents, or agentic references.
    pub documents: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<Vec<Caption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Map<String, Value>>,
    /// Opaque cursor for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Vec<Value>>,
    /// Agentic answer payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Agentic backend HTTP status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Normalize a backend response for the request that produced it.
pub fn normalize(
    request: &QueryRequest,
    response: BackendResponse,
) -> GatewayResult<SearchResultEnvelope> {
    match request {
        QueryRequest::Agentic(q) => Ok(normalize_agentic(response, q.include_activity)),
        _ => normalize_search(request, response),
    }
}

/// Whether a field name denotes a stored vector.
pub fn is_vector_field(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    VECTOR_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

fn normalize_search(
    request: &QueryRequest,
    response: BackendResponse,
) -> GatewayResult<SearchResultEnvelope> {
    let status = response.status;
    let mut body = match response.body {
        Value::Object(map) => map,
        other => {
            return Err(GatewayError::Backend {
                status: Some(status),
                message: format!("unexpected search response: {other}"),
            })
        }
    };

    let include_vectors = request.shaping().is_some_and(|s| s.include_vectors);
    let semantic = request.semantic();
    let lift_captions = semantic.is_some_and(|s| s.captions.is_some());

    let mut documents = match body.remove("value") {
        Some(Value::Array(docs)) => docs,
        _ => Vec::new(),
    };

    let mut captions = Vec::new();
    for (position, document) in documents.iter_mut().enumerate() {
        let Value::Object(fields) = document else {
            continue;
        };
        if let Some(Value::Array(lifted)) = fields.remove("@search.captions") {
            if lift_captions {
                captions.extend(lifted.into_iter().map(|c| Caption {
                    document: position,
                    text: c.get("text").and_then(Value::as_str).map(str::to_string),
                    highlights: c
                        .get("highlights")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                }));
            }
        }
        if !include_vectors {
            fields.retain(|name, _| !is_vector_field(name));
        }
    }

    let answers = match (semantic, body.remove("@search.answers")) {
        (Some(s), Some(Value::Array(answers))) if s.answers.is_some() => Some(answers),
        _ => None,
    };

    let facets = match body.remove("@search.facets") {
        Some(Value::Object(facets)) => Some(facets),
        _ => None,
    };

    let continuation_token = match (
        body.remove("@search.nextPageParameters"),
        body.remove("@odata.nextLink"),
    ) {
        (Some(params), _) if !params.is_null() => Some(BASE64.encode(params.to_string())),
        (_, Some(Value::String(link))) => Some(BASE64.encode(link)),
        _ => None,
    };

    Ok(SearchResultEnvelope {
        documents,
        count: body.get("@odata.count").and_then(Value::as_u64),
        answers,
        captions: (!captions.is_empty()).then_some(captions),
        facets,
        continuation_token,
        ..SearchResultEnvelope::default()
    })
}

fn normalize_agentic(response: BackendResponse, include_activity: bool) -> SearchResultEnvelope {
    let status_code = Some(response.status);
    let mut body = match response.body {
        Value::Object(map) => map,
        Value::String(raw) => {
            return SearchResultEnvelope {
                response: Some(json!({ "raw": raw })),
                status_code,
                ..SearchResultEnvelope::default()
            }
        }
        other => {
            return SearchResultEnvelope {
                response: Some(other),
                status_code,
                ..SearchResultEnvelope::default()
            }
        }
    };

    let documents = match body.remove("references") {
        Some(Value::Array(references)) => references,
        _ => Vec::new(),
    };

    let activity = match body.remove("activity") {
        Some(Value::Array(activity)) if include_activity => Some(activity),
        _ => None,
    };

    SearchResultEnvelope {
        documents,
        activity,
        response: body.remove("response"),
        status_code,
        ..SearchResultEnvelope::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{
        AgenticQuery, AnswerSpec, KeywordQuery, OutputMode, Paging, SearchMode, SemanticQuery,
        SemanticSpec, Shaping,
    };

    fn keyword(include_vectors: bool) -> QueryRequest {
        QueryRequest::Keyword(KeywordQuery {
            index: "hotels".to_string(),
            text: "pool".to_string(),
            search_fields: Vec::new(),
            search_mode: SearchMode::Any,
            facets: Vec::new(),
            paging: Paging { top: 5, skip: 0 },
            shaping: Shaping {
                include_vectors,
                ..Shaping::default()
            },
        })
    }

    fn semantic(answers: bool) -> QueryRequest {
        QueryRequest::Semantic(SemanticQuery {
            index: "docs".to_string(),
            text: "reset".to_string(),
            semantic: SemanticSpec {
                configuration: "default".to_string(),
                captions: Some("extractive".to_string()),
                answers: answers.then(|| AnswerSpec {
                    kind: "extractive".to_string(),
                    count: None,
                    threshold: None,
                }),
            },
            paging: Paging { top: 5, skip: 0 },
            shaping: Shaping::default(),
        })
    }

    fn agentic(include_activity: bool) -> QueryRequest {
        QueryRequest::Agentic(AgenticQuery {
            knowledge_base: "kb".to_string(),
            text: "q".to_string(),
            intent: None,
            reasoning_effort: None,
            output_mode: OutputMode::AnswerSynthesis,
            include_activity,
            max_runtime_seconds: None,
            max_output_size: None,
            sources: Vec::new(),
        })
    }

    fn ok(body: Value) -> BackendResponse {
        BackendResponse { status: 200, body }
    }

    #[test]
    fn test_vector_field_detection() {
        assert!(is_vector_field("content_vector"));
        assert!(is_vector_field("Title_Embeddings"));
        assert!(is_vector_field("image_VECTORS"));
        assert!(!is_vector_field("vector_notes"));
        assert!(!is_vector_field("title"));
    }

    #[test]
    fn test_documents_keep_scores_and_drop_vectors() {
        let envelope = normalize(
            &keyword(false),
            ok(json!({
                "@odata.count": 12,
                "value": [
                    { "@search.score": 3.2, "id": "1", "content_vector": [0.1, 0.2] }
                ]
            })),
        )
        .unwrap();

        assert_eq!(envelope.count, Some(12));
        assert_eq!(envelope.documents, vec![json!({ "@search.score": 3.2, "id": "1" })]);
        assert!(envelope.continuation_token.is_none());
        assert!(envelope.captions.is_none());
    }

    #[test]
    fn test_include_vectors_keeps_fields() {
        let envelope = normalize(
            &keyword(true),
            ok(json!({ "value": [{ "id": "1", "content_vector": [0.1] }] })),
        )
        .unwrap();
        assert!(envelope.documents[0].get("content_vector").is_some());
        assert!(envelope.count.is_none());
    }

    #[test]
    fn test_empty_result_omits_optional_fields() {
        let envelope = normalize(&keyword(false), ok(json!({ "value": [] }))).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, json!({ "documents": [] }));
    }

    #[test]
    fn test_zero_count_is_reported() {
        let envelope =
            normalize(&keyword(false), ok(json!({ "@odata.count": 0, "value": [] }))).unwrap();
        assert_eq!(envelope.count, Some(0));
    }

    #[test]
    fn test_facets_and_continuation() {
        let next = json!({ "search": "pool", "skip": 50 });
        let envelope = normalize(
            &keyword(false),
            ok(json!({
                "value": [],
                "@search.facets": { "category": [{ "value": "Budget", "count": 3 }] },
                "@search.nextPageParameters": next,
                "@odata.nextLink": "https://svc/indexes/hotels/docs/search"
            })),
        )
        .unwrap();

        assert_eq!(envelope.facets.unwrap()["category"][0]["count"], 3);
        let token = envelope.continuation_token.unwrap();
        let decoded: Value = serde_json::from_slice(&BASE64.decode(token).unwrap()).unwrap();
        assert_eq!(decoded, next);
    }

    #[test]
    fn test_next_link_only() {
        let envelope = normalize(
            &keyword(false),
            ok(json!({ "value": [], "@odata.nextLink": "https://svc/next" })),
        )
        .unwrap();
        assert_eq!(
            envelope.continuation_token,
            Some(BASE64.encode("https://svc/next"))
        );
    }

    #[test]
    fn test_captions_are_lifted_with_position() {
        let envelope = normalize(
            &semantic(true),
            ok(json!({
                "@search.answers": [{ "key": "2", "text": "Hold reset", "score": 0.9 }],
                "value": [
                    { "id": "1", "@search.rerankerScore": 2.1 },
                    {
                        "id": "2",
                        "@search.rerankerScore": 2.8,
                        "@search.captions": [{ "text": "Hold reset 10s", "highlights": "<em>reset</em>" }]
                    }
                ]
            })),
        )
        .unwrap();

        let captions = envelope.captions.unwrap();
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].document, 1);
        assert_eq!(captions[0].text.as_deref(), Some("Hold reset 10s"));
        assert!(envelope.documents[1].get("@search.captions").is_none());
        assert_eq!(envelope.documents[1]["@search.rerankerScore"], 2.8);
        assert_eq!(envelope.answers.unwrap()[0]["key"], "2");
    }

    #[test]
    fn test_answers_only_when_requested() {
        let envelope = normalize(
            &semantic(false),
            ok(json!({ "@search.answers": [{ "key": "1" }], "value": [] })),
        )
        .unwrap();
        assert!(envelope.answers.is_none());
    }

    #[test]
    fn test_non_object_search_body_is_backend_error() {
        let err = normalize(&keyword(false), ok(Value::String("<html>".to_string()))).unwrap_err();
        assert_eq!(err.kind(), "BackendError");
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn test_agentic_envelope() {
        let body = json!({
            "response": [{ "role": "assistant", "content": [{ "type": "text", "text": "Answer" }] }],
            "activity": [{ "type": "modelQueryPlanning", "id": 0 }],
            "references": [{ "type": "searchIndex", "id": "0", "activitySource": 1 }]
        });

        let envelope = normalize(
            &agentic(true),
            BackendResponse { status: 206, body: body.clone() },
        )
        .unwrap();
        assert_eq!(envelope.status_code, Some(206));
        assert_eq!(envelope.documents.len(), 1);
        assert_eq!(envelope.activity.unwrap().len(), 1);
        assert_eq!(envelope.response.unwrap(), body["response"]);

        let envelope = normalize(&agentic(false), ok(body)).unwrap();
        assert!(envelope.activity.is_none());
    }

    #[test]
    fn test_agentic_raw_text() {
        let envelope =
            normalize(&agentic(true), ok(Value::String("plain answer".to_string()))).unwrap();
        assert_eq!(envelope.response, Some(json!({ "raw": "plain answer" })));
        assert!(envelope.documents.is_empty());
    }
}
