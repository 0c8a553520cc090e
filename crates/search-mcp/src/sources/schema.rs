//! Per-kind parameter schema for knowledge sources.
//!
//! The schema is a static table: each [`SourceKind`] owns a slice of
//! [`ParamSpec`] descriptors. Supporting a new kind means adding a variant and
//! its row; the validator has no kind-specific branches.

use super::parser::RawSegment;
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Field naming the source.
pub const NAME_FIELD: &str = "knowledgeSourceName";
/// Field declaring the source kind.
pub const KIND_FIELD: &str = "kind";

/// Recognized knowledge source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "searchIndex")]
    SearchIndex,
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "remoteSharePoint")]
    RemoteSharePoint,
}

impl SourceKind {
    /// Every kind, in table order.
    pub const ALL: [SourceKind; 3] = [
        SourceKind::SearchIndex,
        SourceKind::Web,
        SourceKind::RemoteSharePoint,
    ];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::SearchIndex => "searchIndex",
            SourceKind::Web => "web",
            SourceKind::RemoteSharePoint => "remoteSharePoint",
        }
    }

    /// Look a kind up by its wire name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Optional parameters accepted for this kind.
    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            SourceKind::SearchIndex => SEARCH_INDEX_PARAMS,
            SourceKind::Web => WEB_PARAMS,
            SourceKind::RemoteSharePoint => REMOTE_SHAREPOINT_PARAMS,
        }
    }

    /// Descriptor for `key` under this kind, if applicable.
    pub fn param(self, key: &str) -> Option<&'static ParamSpec> {
        self.schema().iter().find(|spec| spec.name == key)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    String,
    /// Closed vocabulary, stored as a string.
    Enum(&'static [&'static str]),
}

impl ParamType {
    /// Description used in `InvalidParameterValue` errors.
    pub fn describe(self) -> String {
        match self {
            ParamType::Bool => "bool (true or false)".to_string(),
            ParamType::Int => "int".to_string(),
            ParamType::Float => "float".to_string(),
            ParamType::String => "string".to_string(),
            ParamType::Enum(values) => format!("one of {}", values.join(", ")),
        }
    }

    /// Coerce a raw literal. `None` means the literal does not fit the type.
    pub fn coerce(self, raw: &str) -> Option<ScalarValue> {
        match self {
            ParamType::Bool => match raw {
                "true" => Some(ScalarValue::Bool(true)),
                "false" => Some(ScalarValue::Bool(false)),
                _ => None,
            },
            ParamType::Int => raw.parse().ok().map(ScalarValue::Int),
            ParamType::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ScalarValue::Float),
            ParamType::String => Some(ScalarValue::Str(raw.to_string())),
            ParamType::Enum(values) => values
                .iter()
                .any(|v| *v == raw)
                .then(|| ScalarValue::Str(raw.to_string())),
        }
    }
}

/// Typed descriptor of one optional source parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Wire name (camelCase).
    pub name: &'static str,
    /// Declared type.
    pub ty: ParamType,
}

const fn param(name: &'static str, ty: ParamType) -> ParamSpec {
    ParamSpec { name, ty }
}

const INCLUDE_REFERENCES: ParamSpec = param("includeReferences", ParamType::Bool);
const ALWAYS_QUERY_SOURCE: ParamSpec = param("alwaysQuerySource", ParamType::Bool);
const RERANKER_THRESHOLD: ParamSpec = param("rerankerThreshold", ParamType::Float);
const INCLUDE_REFERENCE_SOURCE_DATA: ParamSpec =
    param("includeReferenceSourceData", ParamType::Bool);

const SEARCH_INDEX_PARAMS: &[ParamSpec] = &[
    INCLUDE_REFERENCES,
    ALWAYS_QUERY_SOURCE,
    RERANKER_THRESHOLD,
    INCLUDE_REFERENCE_SOURCE_DATA,
    param("filterAddOn", ParamType::String),
];

const WEB_PARAMS: &[ParamSpec] = &[
    INCLUDE_REFERENCES,
    ALWAYS_QUERY_SOURCE,
    RERANKER_THRESHOLD,
    INCLUDE_REFERENCE_SOURCE_DATA,
    param("count", ParamType::Int),
    param("freshness", ParamType::Enum(&["day", "week", "month"])),
    param("language", ParamType::String),
    param("market", ParamType::String),
];

const REMOTE_SHAREPOINT_PARAMS: &[ParamSpec] = &[
    INCLUDE_REFERENCES,
    ALWAYS_QUERY_SOURCE,
    RERANKER_THRESHOLD,
    INCLUDE_REFERENCE_SOURCE_DATA,
    param("filterExpressionAddOn", ParamType::String),
];

/// Typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Str(v) => f.write_str(v),
        }
    }
}

/// A validated knowledge source.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSourceConfig {
    /// Source name, unique within a request.
    pub name: String,
    /// Declared kind.
    pub kind: SourceKind,
    /// Optional parameters, all applicable to `kind`.
    pub params: BTreeMap<String, ScalarValue>,
}

impl KnowledgeSourceConfig {
    /// Render as a `knowledgeSourceParams` entry.
    pub fn to_wire(&self) -> serde_json::Value {
        let mut entry = serde_json::Map::new();
        entry.insert(NAME_FIELD.to_string(), serde_json::json!(self.name));
        entry.insert(KIND_FIELD.to_string(), serde_json::json!(self.kind));
        for (key, value) in &self.params {
            entry.insert(key.clone(), serde_json::json!(value));
        }
        serde_json::Value::Object(entry)
    }
}

/// Validate one raw segment against its kind's schema.
///
/// Required fields are checked first, so a segment without `kind` fails
/// with [`GatewayError::MissingRequiredField`] even when it also holds
/// malformed or repeated pairs.
pub fn validate_segment(segment: &RawSegment) -> GatewayResult<KnowledgeSourceConfig> {
    let required = |field: &str| {
        segment
            .pairs
            .get(field)
            .ok_or_else(|| GatewayError::MissingRequiredField {
                field: field.to_string(),
                segment: segment.index,
            })
    };

    let kind_name = required(KIND_FIELD)?;
    let name = required(NAME_FIELD)?;

    if let Some(err) = segment.defect_error() {
        return Err(err);
    }

    let kind = SourceKind::from_name(kind_name).ok_or_else(|| GatewayError::UnknownSourceKind {
        kind: kind_name.clone(),
        segment: segment.index,
    })?;

    let mut params = BTreeMap::new();
    for (key, raw) in &segment.pairs {
        if key == NAME_FIELD || key == KIND_FIELD {
            continue;
        }

        let spec = kind
            .param(key)
            .ok_or_else(|| GatewayError::UnsupportedParameter {
                key: key.clone(),
                kind: kind.to_string(),
                segment: segment.index,
            })?;

        let value = spec
            .ty
            .coerce(raw)
            .ok_or_else(|| GatewayError::InvalidParameterValue {
                key: key.clone(),
                value: raw.clone(),
                expected: spec.ty.describe(),
                segment: segment.index,
            })?;

        params.insert(key.clone(), value);
    }

    Ok(KnowledgeSourceConfig {
        name: name.clone(),
        kind,
        params,
    })
}

/// Validate every segment in order and reject repeated source names.
///
/// The first failing segment decides the error.
pub fn validate_segments(segments: &[RawSegment]) -> GatewayResult<Vec<KnowledgeSourceConfig>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut sources = Vec::with_capacity(segments.len());

    for segment in segments {
        let source = validate_segment(segment)?;
        if let Some(first) = seen.get(source.name.as_str()) {
            return Err(GatewayError::DuplicateSourceName {
                name: source.name,
                first: *first,
                segment: segment.index,
            });
        }
        if let Some(name) = segment.pairs.get(NAME_FIELD) {
            seen.insert(name.as_str(), segment.index);
        }
        sources.push(source);
    }

    Ok(sources)
}
