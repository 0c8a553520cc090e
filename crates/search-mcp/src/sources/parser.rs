//! Segment splitter for the knowledge source mini-language.
//!
//! ```text
//! configs  := segment (';' segment)*
//! segment  := pair (',' pair)*
//! pair     := KEY '=' VALUE
//! ```
//!
//! Keys are trimmed and values are trimmed at both ends only; whitespace
//! inside a value is kept verbatim. Any `=` after the first one in a pair
//! belongs to the value. Blank segments and blank pairs are skipped, so
//! trailing separators are harmless.
//!
//! Splitting never fails. A pair that is not `key=value`, or a key given
//! twice, is recorded on its segment as a [`SegmentDefect`] and reported
//! during validation, after the segment's required fields are checked.

use crate::error::GatewayError;
use std::collections::BTreeMap;

/// First structural problem found in a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentDefect {
    /// A pair is not `key=value`.
    Malformed {
        /// Offending pair text, trimmed.
        pair: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A key appears more than once.
    DuplicateKey(String),
}

/// One source segment as raw key/value strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    /// Position among non-blank segments.
    pub index: usize,
    /// Key to raw value. The first occurrence of a key wins.
    pub pairs: BTreeMap<String, String>,
    /// First structural problem, if any.
    pub defect: Option<SegmentDefect>,
}

impl RawSegment {
    /// The segment's structural problem as a gateway error.
    pub fn defect_error(&self) -> Option<GatewayError> {
        self.defect.as_ref().map(|defect| match defect {
            SegmentDefect::Malformed { pair, reason } => GatewayError::MalformedSegment {
                pair: pair.clone(),
                segment: self.index,
                reason: *reason,
            },
            SegmentDefect::DuplicateKey(key) => GatewayError::DuplicateParameter {
                key: key.clone(),
                segment: self.index,
            },
        })
    }
}

/// Split the configuration string into raw segments.
///
/// Total over any input: an empty or whitespace-only string yields no
/// segments. Pair order within a segment does not matter.
pub fn parse_segments(input: &str) -> Vec<RawSegment> {
    let mut segments = Vec::new();

    for text in input.split(';') {
        let mut segment = RawSegment {
            index: segments.len(),
            pairs: BTreeMap::new(),
            defect: None,
        };

        for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match split_pair(pair) {
                Ok((key, value)) => {
                    if segment.pairs.contains_key(key) {
                        segment
                            .defect
                            .get_or_insert(SegmentDefect::DuplicateKey(key.to_string()));
                    } else {
                        segment.pairs.insert(key.to_string(), value.to_string());
                    }
                }
                Err(reason) => {
                    segment.defect.get_or_insert(SegmentDefect::Malformed {
                        pair: pair.to_string(),
                        reason,
                    });
                }
            }
        }

        if !segment.pairs.is_empty() || segment.defect.is_some() {
            segments.push(segment);
        }
    }

    segments
}

fn split_pair(pair: &str) -> Result<(&str, &str), &'static str> {
    let (key, value) = pair.split_once('=').ok_or("expected key=value")?;
    let (key, value) = (key.trim(), value.trim());

    if key.is_empty() {
        return Err("empty key");
    }
    if value.is_empty() {
        return Err("empty value");
    }
    Ok((key, value))
}
