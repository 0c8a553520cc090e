//! Mini-language writer, the inverse of the parser.

use super::schema::{KnowledgeSourceConfig, KIND_FIELD, NAME_FIELD};

/// Render sources back into `key=value, ...; ...` form.
///
/// The name and kind lead each segment; parameters follow in key order.
/// Values are written as-is, so a string value containing `,` or `;` cannot
/// be represented.
pub fn write_source_configs(sources: &[KnowledgeSourceConfig]) -> String {
    sources
        .iter()
        .map(write_segment)
        .collect::<Vec<_>>()
        .join("; ")
}

fn write_segment(source: &KnowledgeSourceConfig) -> String {
    let mut pairs = vec![
        format!("{}={}", NAME_FIELD, source.name),
        format!("{}={}", KIND_FIELD, source.kind),
    ];
    pairs.extend(
        source
            .params
            .iter()
            .map(|(key, value)| format!("{key}={value}")),
    );
    pairs.join(", ")
}
