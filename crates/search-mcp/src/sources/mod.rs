//! Knowledge source configuration for agentic retrieval.
//!
//! Sources are written in a compact mini-language:
//!
//! ```text
//! knowledgeSourceName=ks1, kind=searchIndex, filterAddOn=year gt 2020; knowledgeSourceName=ks2, kind=web, count=10
//! ```
//!
//! [`parse_source_configs`] splits the string into raw segments and then
//! validates each one, in order, against its kind's parameter schema.

pub mod parser;
pub mod schema;
pub mod writer;

pub use parser::{parse_segments, RawSegment, SegmentDefect};
pub use schema::{
    validate_segment, validate_segments, KnowledgeSourceConfig, ParamSpec, ParamType,
    ScalarValue, SourceKind,
};
pub use writer::write_source_configs;

use crate::error::GatewayResult;

/// Parse and validate a configuration string.
///
/// Blank input yields an empty list; callers that need at least one source
/// enforce that themselves.
pub fn parse_source_configs(input: &str) -> GatewayResult<Vec<KnowledgeSourceConfig>> {
    validate_segments(&parse_segments(input))
}
