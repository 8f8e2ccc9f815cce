//! Extraction, validation and normalization of completion output
//!
//! The completion service may wrap its JSON in prose or markdown fences, omit
//! fields, or report out-of-range numbers. Everything here turns that into
//! fully populated records or a named error; nothing is silently padded.

use serde::Deserialize;
use serde_json::Value;

use crate::deserializers::{clamp_percent, de_option_i64_forgiving, de_option_usize_forgiving};
use crate::error::{FlagDetectorError, Result};
use crate::types::{
    AssessedGreenFlag, AssessedRedFlag, AssessedSeverity, AssessedStrength, CommunicationPatterns,
    FlagKind, FlagResult, OverallAssessment, RelationshipAssessment, Severity,
};

/// Remote-path confidence floor applied when none is configured
pub const DEFAULT_CONFIDENCE_FLOOR: u8 = 90;
/// Confidence assumed when the record carries none
pub const MISSING_CONFIDENCE: i64 = 95;

pub const DEFAULT_EXPLANATION: &str = "Analysis completed with high precision";
pub const DEFAULT_CATEGORY: &str = "Behavioral";
pub const DEFAULT_PSYCHOLOGY_BASIS: &str = "Based on established relationship psychology principles";
pub const DEFAULT_ACTION_ADVICE: &str = "Consider the broader context of your relationship patterns";

/// Find the first balanced `open`…`close` region of `raw`.
///
/// Brackets inside JSON string literals (including escaped quotes) are
/// ignored. An opening bracket that is never closed is skipped and the scan
/// resumes at the next one. Returns `None` when no opening bracket closes.
pub fn extract_balanced(raw: &str, open: char, close: char) -> Option<&str> {
    raw.match_indices(open)
        .find_map(|(start, _)| balanced_from(raw, start, open, close))
}

/// Balanced region starting at byte `start`, which must hold `open`
fn balanced_from(raw: &str, start: usize, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + c.len_utf8();
                return Some(&raw[start..end]);
            }
        }
    }
    None
}

/// One flag record as the model emitted it. Every field is optional here;
/// `normalize` decides the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlagRecord {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    pub confidence: Option<i64>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "psychology_basis")]
    pub psychology_basis: Option<String>,
    #[serde(default, alias = "action_advice")]
    pub action_advice: Option<String>,
    #[serde(default, alias = "input_index", deserialize_with = "de_option_usize_forgiving")]
    pub input_index: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Only an explicit "green" yields Green; anything else, including absence, is Red
pub fn coerce_kind(literal: Option<&str>) -> FlagKind {
    match literal {
        Some(s) if s.trim().eq_ignore_ascii_case("green") => FlagKind::Green,
        _ => FlagKind::Red,
    }
}

/// Clamp into 0..=100, then raise to the floor
pub fn apply_confidence_policy(raw: Option<i64>, floor: u8) -> u8 {
    let clamped = clamp_percent(raw.unwrap_or(MISSING_CONFIDENCE));
    clamped.max(floor.min(100))
}

/// Validates and normalizes completion output into strict records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseParser {
    confidence_floor: u8,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_FLOOR)
    }
}

impl ResponseParser {
    pub fn new(confidence_floor: u8) -> Self {
        Self {
            confidence_floor: confidence_floor.min(100),
        }
    }

    pub fn confidence_floor(&self) -> u8 {
        self.confidence_floor
    }

    /// Fill every default and enforce field ranges on one record
    pub fn normalize(&self, record: RawFlagRecord) -> FlagResult {
        let kind = coerce_kind(record.kind.as_deref());

        let severity = match non_blank(record.severity) {
            Some(s) => match Severity::parse(&s) {
                Some(sev) if sev.is_valid_for(kind) => sev,
                _ => {
                    tracing::warn!(severity = %s, kind = kind.as_str(), "severity not valid for kind, using default");
                    Severity::default_for(kind)
                }
            },
            None => Severity::default_for(kind),
        };

        FlagResult {
            kind,
            label: non_blank(record.label).unwrap_or_else(|| kind.default_label().to_string()),
            explanation: non_blank(record.explanation)
                .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
            confidence: apply_confidence_policy(record.confidence, self.confidence_floor),
            emoji: non_blank(record.emoji).unwrap_or_else(|| kind.default_emoji().to_string()),
            severity,
            category: non_blank(record.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            psychology_basis: non_blank(record.psychology_basis)
                .unwrap_or_else(|| DEFAULT_PSYCHOLOGY_BASIS.to_string()),
            action_advice: non_blank(record.action_advice)
                .unwrap_or_else(|| DEFAULT_ACTION_ADVICE.to_string()),
        }
    }

    /// Extract and validate the single flag record in `raw`
    pub fn parse_one(&self, raw: &str) -> Result<FlagResult> {
        let region = extract_balanced(raw, '{', '}')
            .ok_or_else(|| schema_error("no JSON object found in completion"))?;
        let record: RawFlagRecord = serde_json::from_str(region)?;
        Ok(self.normalize(record))
    }

    /// Extract and validate a batch of `expected_count` records in input order
    pub fn parse_many(&self, raw: &str, expected_count: usize) -> Result<Vec<FlagResult>> {
        let region = extract_balanced(raw, '[', ']')
            .ok_or_else(|| schema_error("no JSON array found in completion"))?;
        let items: Vec<Value> = serde_json::from_str(region)?;

        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                return Err(schema_error(format!(
                    "batch element {} is not an object",
                    i + 1
                )));
            }
            records.push(serde_json::from_value::<RawFlagRecord>(item)?);
        }

        if records.len() < expected_count {
            return Err(FlagDetectorError::IncompleteBatch {
                expected: expected_count,
                received: records.len(),
            });
        }
        if records.len() > expected_count {
            // Without an index on every kept record the extras cannot be told apart
            let indexed = records[..expected_count]
                .iter()
                .enumerate()
                .all(|(pos, r)| r.input_index == Some(pos + 1));
            if !indexed {
                tracing::warn!(
                    expected = expected_count,
                    received = records.len(),
                    "extra batch records without input indices"
                );
                return Err(FlagDetectorError::IncompleteBatch {
                    expected: expected_count,
                    received: records.len(),
                });
            }
            tracing::warn!(
                expected = expected_count,
                received = records.len(),
                "dropping extra batch records"
            );
            records.truncate(expected_count);
        }

        // Records that carry an index must sit at that position
        let aligned = records
            .iter()
            .enumerate()
            .take_while(|(pos, r)| r.input_index.is_none_or(|idx| idx == pos + 1))
            .count();
        if aligned < expected_count {
            tracing::warn!(
                expected = expected_count,
                aligned,
                "batch records out of input order"
            );
            return Err(FlagDetectorError::IncompleteBatch {
                expected: expected_count,
                received: aligned,
            });
        }

        Ok(records.into_iter().map(|r| self.normalize(r)).collect())
    }

    /// Extract and validate an extended content assessment
    pub fn parse_assessment(&self, raw: &str) -> Result<RelationshipAssessment> {
        let region = extract_balanced(raw, '{', '}')
            .ok_or_else(|| schema_error("no JSON object found in completion"))?;
        let record: RawAssessment = serde_json::from_str(region)?;
        Ok(record.normalize())
    }
}

/// Shorthand for `ResponseParser::default().parse_one(raw)`
pub fn parse_one(raw: &str) -> Result<FlagResult> {
    ResponseParser::default().parse_one(raw)
}

/// Shorthand for `ResponseParser::default().parse_many(raw, expected_count)`
pub fn parse_many(raw: &str, expected_count: usize) -> Result<Vec<FlagResult>> {
    ResponseParser::default().parse_many(raw, expected_count)
}

fn schema_error(message: impl Into<String>) -> FlagDetectorError {
    FlagDetectorError::Schema {
        message: message.into(),
    }
}

// Assessment wire records

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    #[serde(default)]
    red_flags: Vec<RawAssessedFlag>,
    #[serde(default)]
    green_flags: Vec<RawAssessedFlag>,
    #[serde(default)]
    overall_assessment: Option<RawOverall>,
    #[serde(default)]
    communication_patterns: Option<RawPatterns>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAssessedFlag {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    strength: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    evidence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOverall {
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    score: Option<i64>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPatterns {
    #[serde(default)]
    tone: Option<String>,
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    emotional_intelligence: Option<i64>,
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    respect_level: Option<i64>,
    #[serde(default)]
    conflict_style: Option<String>,
}

const NEUTRAL_SCORE: i64 = 50;

impl RawAssessment {
    fn normalize(self) -> RelationshipAssessment {
        let red_flags = self
            .red_flags
            .into_iter()
            .map(|f| AssessedRedFlag {
                category: non_blank(f.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                severity: match non_blank(f.severity).map(|s| s.to_lowercase()).as_deref() {
                    Some("low") => AssessedSeverity::Low,
                    Some("high") => AssessedSeverity::High,
                    Some("critical") => AssessedSeverity::Critical,
                    _ => AssessedSeverity::Medium,
                },
                description: non_blank(f.description)
                    .unwrap_or_else(|| "Concerning pattern identified".to_string()),
                evidence: non_blank(f.evidence).unwrap_or_else(|| "Not specified".to_string()),
            })
            .collect();

        let green_flags = self
            .green_flags
            .into_iter()
            .map(|f| AssessedGreenFlag {
                category: non_blank(f.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                strength: match non_blank(f.strength.or(f.severity))
                    .map(|s| s.to_lowercase())
                    .as_deref()
                {
                    Some("strong") => AssessedStrength::Strong,
                    Some("excellent") => AssessedStrength::Excellent,
                    _ => AssessedStrength::Good,
                },
                description: non_blank(f.description)
                    .unwrap_or_else(|| "Positive pattern identified".to_string()),
                evidence: non_blank(f.evidence).unwrap_or_else(|| "Not specified".to_string()),
            })
            .collect();

        let overall = self.overall_assessment.unwrap_or_default();
        let overall_assessment = OverallAssessment {
            score: clamp_percent(overall.score.unwrap_or(NEUTRAL_SCORE)),
            summary: non_blank(overall.summary)
                .unwrap_or_else(|| "No overall summary was provided".to_string()),
            recommendations: overall
                .recommendations
                .into_iter()
                .filter_map(|r| non_blank(Some(r)))
                .collect(),
        };

        let patterns = self.communication_patterns.unwrap_or_default();
        let communication_patterns = CommunicationPatterns {
            tone: non_blank(patterns.tone).unwrap_or_else(|| "neutral".to_string()),
            emotional_intelligence: clamp_percent(
                patterns.emotional_intelligence.unwrap_or(NEUTRAL_SCORE),
            ),
            respect_level: clamp_percent(patterns.respect_level.unwrap_or(NEUTRAL_SCORE)),
            conflict_style: non_blank(patterns.conflict_style)
                .unwrap_or_else(|| "neutral".to_string()),
        };

        RelationshipAssessment {
            red_flags,
            green_flags,
            overall_assessment,
            communication_patterns,
        }
    }
}
