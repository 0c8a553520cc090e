//! Argument validation and request construction for each mode.
//!
//! Builders are pure: they never touch credentials or the network, and every
//! rejection happens here so nothing is sent for an invalid call.

use super::args::{
    AgenticArgs, HybridArgs, KeywordArgs, SemanticArgs, SemanticHybridArgs, VectorArgs,
};
use super::{
    AgenticQuery, AnswerSpec, HybridQuery, KeywordQuery, OutputMode, Paging, QueryRequest,
    ReasoningEffort, SearchMode, SemanticHybridQuery, SemanticQuery, SemanticSpec, Shaping,
    VectorQuery, VectorSpec,
};
use crate::error::{GatewayError, GatewayResult};
use crate::sources::parse_source_configs;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str) -> GatewayResult<String> {
    non_blank(value).ok_or(GatewayError::MissingArgument(name))
}

/// Split a comma-separated field list, dropping blanks.
fn field_list(value: Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn shaping(select: Option<String>, filter: Option<String>, include_vectors: bool) -> Shaping {
    Shaping {
        select: field_list(select),
        filter: non_blank(filter),
        include_vectors,
    }
}

fn at_least_one(value: u32, name: &str) -> GatewayResult<u32> {
    if value == 0 {
        return Err(GatewayError::InvalidArguments(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(value)
}

fn vector_spec(
    fields: Option<String>,
    text: Option<String>,
    k: u32,
    exhaustive: bool,
    weight: Option<f64>,
) -> GatewayResult<VectorSpec> {
    let fields = field_list(fields);
    let text = non_blank(text);

    let text = match (fields.is_empty(), text) {
        (false, Some(text)) => text,
        (false, None) => {
            return Err(GatewayError::IncompleteVectorSpec {
                missing: "vector_text",
                present: "vector_fields",
            })
        }
        (true, Some(_)) => {
            return Err(GatewayError::IncompleteVectorSpec {
                missing: "vector_fields",
                present: "vector_text",
            })
        }
        (true, None) => return Err(GatewayError::MissingArgument("vector_fields")),
    };

    if let Some(weight) = weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GatewayError::InvalidArguments(format!(
                "weight must be a positive number, got {weight}"
            )));
        }
    }

    Ok(VectorSpec {
        fields,
        text,
        k: at_least_one(k, "k")?,
        exhaustive,
        weight,
    })
}

fn semantic_spec(
    configuration: Option<String>,
    caption: Option<String>,
    answer: Option<String>,
    answer_count: Option<u32>,
    answer_threshold: Option<f64>,
) -> GatewayResult<SemanticSpec> {
    let configuration = required(configuration, "semantic_configuration")?;

    if let Some(threshold) = answer_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GatewayError::InvalidArguments(format!(
                "query_answer_threshold must be between 0 and 1, got {threshold}"
            )));
        }
    }

    let answers = non_blank(answer).map(|kind| AnswerSpec {
        kind,
        count: answer_count,
        threshold: answer_threshold,
    });

    Ok(SemanticSpec {
        configuration,
        captions: non_blank(caption),
        answers,
    })
}

fn parse_search_mode(value: Option<String>) -> GatewayResult<SearchMode> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("any") => Ok(SearchMode::Any),
        Some("all") => Ok(SearchMode::All),
        Some(other) => Err(GatewayError::InvalidArguments(format!(
            "search_mode must be 'any' or 'all', got '{other}'"
        ))),
    }
}

fn parse_reasoning_effort(value: Option<String>) -> GatewayResult<Option<ReasoningEffort>> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(None),
        Some("minimal") => Ok(Some(ReasoningEffort::Minimal)),
        Some("low") => Ok(Some(ReasoningEffort::Low)),
        Some("medium") => Ok(Some(ReasoningEffort::Medium)),
        Some(other) => Err(GatewayError::InvalidArguments(format!(
            "reasoning_effort must be one of minimal, low, medium; got '{other}'"
        ))),
    }
}

fn parse_output_mode(value: Option<String>) -> GatewayResult<OutputMode> {
    match non_blank(value).as_deref() {
        None | Some("answerSynthesis") => Ok(OutputMode::AnswerSynthesis),
        Some("extractiveData") | Some("extractedData") => Ok(OutputMode::ExtractiveData),
        Some(other) => Err(GatewayError::InvalidArguments(format!(
            "output_mode must be 'answerSynthesis' or 'extractiveData', got '{other}'"
        ))),
    }
}

impl KeywordArgs {
    /// Validate into a keyword request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let index = required(self.index_name, "index_name")?;
        let text = required(self.query, "query")?;
        let facets = self
            .facets
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        Ok(QueryRequest::Keyword(KeywordQuery {
            index,
            text,
            search_fields: field_list(self.search_fields),
            search_mode: parse_search_mode(self.search_mode)?,
            facets,
            paging: Paging {
                top: at_least_one(self.top, "top")?,
                skip: self.skip,
            },
            shaping: shaping(self.select, self.filter, self.include_vectors),
        }))
    }
}

impl SemanticArgs {
    /// Validate into a semantic request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let index = required(self.index_name, "index_name")?;
        let text = required(self.query, "query")?;
        let semantic = semantic_spec(
            self.semantic_configuration,
            self.query_caption,
            self.query_answer,
            self.query_answer_count,
            self.query_answer_threshold,
        )?;

        Ok(QueryRequest::Semantic(SemanticQuery {
            index,
            text,
            semantic,
            paging: Paging {
                top: at_least_one(self.top, "top")?,
                skip: self.skip,
            },
            shaping: shaping(self.select, self.filter, self.include_vectors),
        }))
    }
}

impl VectorArgs {
    /// Validate into a pure vector request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let index = required(self.index_name, "index_name")?;
        let vector = vector_spec(
            self.vector_fields,
            self.vector_text,
            self.k,
            self.exhaustive,
            self.weight,
        )?;

        Ok(QueryRequest::Vector(VectorQuery {
            index,
            vector,
            shaping: shaping(self.select, self.filter, self.include_vectors),
        }))
    }
}

impl HybridArgs {
    /// Validate into a hybrid request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let index = required(self.index_name, "index_name")?;
        let text = required(self.query, "query")?;
        let vector = vector_spec(
            self.vector_fields,
            self.vector_text,
            self.k,
            self.exhaustive,
            self.weight,
        )?;

        Ok(QueryRequest::Hybrid(HybridQuery {
            index,
            text,
            search_fields: field_list(self.search_fields),
            vector,
            top: at_least_one(self.top, "top")?,
            shaping: shaping(self.select, self.filter, self.include_vectors),
        }))
    }
}

impl SemanticHybridArgs {
    /// Validate into a semantic hybrid request.
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let index = required(self.index_name, "index_name")?;
        let text = required(self.query, "query")?;
        let semantic = semantic_spec(
            self.semantic_configuration,
            self.query_caption,
            self.query_answer,
            self.query_answer_count,
            self.query_answer_threshold,
        )?;
        let vector = vector_spec(
            self.vector_fields,
            self.vector_text,
            self.k,
            self.exhaustive,
            self.weight,
        )?;

        Ok(QueryRequest::SemanticHybrid(SemanticHybridQuery {
            hybrid: HybridQuery {
                index,
                text,
                search_fields: field_list(self.search_fields),
                vector,
                top: at_least_one(self.top, "top")?,
                shaping: shaping(self.select, self.filter, self.include_vectors),
            },
            semantic,
        }))
    }
}

impl AgenticArgs {
    /// Validate into an agentic retrieval request.
    ///
    /// The source list is parsed and validated in full; a missing or empty
    /// list is rejected with [`GatewayError::NoSourcesConfigured`].
    pub fn build(self) -> GatewayResult<QueryRequest> {
        let knowledge_base = required(self.knowledge_base_name, "knowledge_base_name")?;
        let text = required(self.query, "query")?;

        let sources = match non_blank(self.knowledge_source_configs) {
            Some(raw) => parse_source_configs(&raw)?,
            None => Vec::new(),
        };
        if sources.is_empty() {
            return Err(GatewayError::NoSourcesConfigured);
        }

        if let Some(0) = self.max_runtime_seconds {
            return Err(GatewayError::InvalidArguments(
                "max_runtime_seconds must be at least 1".to_string(),
            ));
        }

        Ok(QueryRequest::Agentic(AgenticQuery {
            knowledge_base,
            text,
            intent: non_blank(self.intent_query),
            reasoning_effort: parse_reasoning_effort(self.reasoning_effort)?,
            output_mode: parse_output_mode(self.output_mode)?,
            include_activity: self.include_activity,
            max_runtime_seconds: self.max_runtime_seconds,
            max_output_size: self.max_output_size,
            sources,
        }))
    }
}
