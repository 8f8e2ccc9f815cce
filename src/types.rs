//! Data model shared by the rule engine, the remote path, and callers

use serde::{Deserialize, Serialize};

/// The two-valued outcome taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Red,
    Green,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Red => "red",
            FlagKind::Green => "green",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            FlagKind::Red => "Red Flag",
            FlagKind::Green => "Green Flag",
        }
    }

    pub fn default_emoji(&self) -> &'static str {
        match self {
            FlagKind::Red => "🚨",
            FlagKind::Green => "💚",
        }
    }
}

/// Intensity tier: severity for red flags, strength for green flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
    Good,
    Strong,
    Excellent,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::Critical => "critical",
            Severity::Good => "good",
            Severity::Strong => "strong",
            Severity::Excellent => "excellent",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the seven tiers.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Some(Severity::Mild),
            "moderate" => Some(Severity::Moderate),
            "severe" => Some(Severity::Severe),
            "critical" => Some(Severity::Critical),
            "good" => Some(Severity::Good),
            "strong" => Some(Severity::Strong),
            "excellent" => Some(Severity::Excellent),
            _ => None,
        }
    }

    pub fn is_valid_for(&self, kind: FlagKind) -> bool {
        match kind {
            FlagKind::Red => matches!(
                self,
                Severity::Mild | Severity::Moderate | Severity::Severe | Severity::Critical
            ),
            FlagKind::Green => {
                matches!(self, Severity::Good | Severity::Strong | Severity::Excellent)
            }
        }
    }

    /// Mid-tier default per kind
    pub fn default_for(kind: FlagKind) -> Self {
        match kind {
            FlagKind::Red => Severity::Moderate,
            FlagKind::Green => Severity::Good,
        }
    }

    /// Map a rule weight (0-100) onto the tier scale for `kind`
    pub fn from_weight(kind: FlagKind, weight: u8) -> Self {
        match kind {
            FlagKind::Red => match weight {
                95.. => Severity::Critical,
                90..=94 => Severity::Severe,
                80..=89 => Severity::Moderate,
                _ => Severity::Mild,
            },
            FlagKind::Green => match weight {
                95.. => Severity::Excellent,
                90..=94 => Severity::Strong,
                _ => Severity::Good,
            },
        }
    }
}

/// Canonical classification output. Every field is populated before it reaches a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResult {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub label: String,
    pub explanation: String,
    pub confidence: u8,
    pub emoji: String,
    pub severity: Severity,
    pub category: String,
    pub psychology_basis: String,
    pub action_advice: String,
}

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Remote,
    Local,
}

/// A result tagged with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub result: FlagResult,
    pub source: ClassificationSource,
}

/// Focus of a richer content assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Communication,
    Behavior,
    RelationshipPattern,
    #[default]
    General,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Communication => "communication",
            AnalysisType::Behavior => "behavior",
            AnalysisType::RelationshipPattern => "relationship_pattern",
            AnalysisType::General => "general",
        }
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "communication" => Ok(AnalysisType::Communication),
            "behavior" | "behaviour" => Ok(AnalysisType::Behavior),
            "relationship_pattern" => Ok(AnalysisType::RelationshipPattern),
            "general" => Ok(AnalysisType::General),
            other => Err(format!(
                "unknown analysis type '{}'; expected communication, behavior, relationship_pattern or general",
                other
            )),
        }
    }
}

/// Per-call request for the richer assessment variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
}

impl ClassificationRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            context: None,
            analysis_type: AnalysisType::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }
}

/// Severity scale used by the assessment schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessedSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Strength scale used by the assessment schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessedStrength {
    Good,
    Strong,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessedRedFlag {
    pub category: String,
    pub severity: AssessedSeverity,
    pub description: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessedGreenFlag {
    pub category: String,
    pub strength: AssessedStrength,
    pub description: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub score: u8,
    pub summary: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPatterns {
    pub tone: String,
    pub emotional_intelligence: u8,
    pub respect_level: u8,
    pub conflict_style: String,
}

/// Extended multi-field assessment returned by `classify_content`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAssessment {
    pub red_flags: Vec<AssessedRedFlag>,
    pub green_flags: Vec<AssessedGreenFlag>,
    pub overall_assessment: OverallAssessment,
    pub communication_patterns: CommunicationPatterns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_validity_per_kind() {
        assert!(Severity::Critical.is_valid_for(FlagKind::Red));
        assert!(!Severity::Critical.is_valid_for(FlagKind::Green));
        assert!(Severity::Excellent.is_valid_for(FlagKind::Green));
        assert!(!Severity::Good.is_valid_for(FlagKind::Red));
    }

    #[test]
    fn test_severity_from_weight() {
        assert_eq!(Severity::from_weight(FlagKind::Red, 95), Severity::Critical);
        assert_eq!(Severity::from_weight(FlagKind::Red, 90), Severity::Severe);
        assert_eq!(Severity::from_weight(FlagKind::Red, 85), Severity::Moderate);
        assert_eq!(Severity::from_weight(FlagKind::Red, 75), Severity::Mild);
        assert_eq!(Severity::from_weight(FlagKind::Green, 95), Severity::Excellent);
        assert_eq!(Severity::from_weight(FlagKind::Green, 90), Severity::Strong);
        assert_eq!(Severity::from_weight(FlagKind::Green, 60), Severity::Good);
    }

    #[test]
    fn test_flag_result_wire_names() {
        let result = FlagResult {
            kind: FlagKind::Red,
            label: "Red Flag".into(),
            explanation: "x".into(),
            confidence: 92,
            emoji: "🚨".into(),
            severity: Severity::Severe,
            category: "Control".into(),
            psychology_basis: "y".into(),
            action_advice: "z".into(),
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["type"], "red");
        assert_eq!(v["severity"], "severe");
        assert_eq!(v["psychologyBasis"], "y");
        assert_eq!(v["actionAdvice"], "z");
    }

    #[test]
    fn test_classification_request_wire_names() {
        let request = ClassificationRequest::new("he cancels plans last minute")
            .with_analysis_type(AnalysisType::RelationshipPattern);
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["analysisType"], "relationship_pattern");
        assert!(v.get("analysis_type").is_none());
        assert!(v.get("context").is_none());

        let parsed: ClassificationRequest =
            serde_json::from_str(r#"{"content":"x","analysisType":"communication"}"#).unwrap();
        assert_eq!(parsed.analysis_type, AnalysisType::Communication);
    }

    #[test]
    fn test_analysis_type_from_str() {
        assert_eq!(
            "relationship-pattern".parse::<AnalysisType>().unwrap(),
            AnalysisType::RelationshipPattern
        );
        assert_eq!(
            "Communication".parse::<AnalysisType>().unwrap(),
            AnalysisType::Communication
        );
        assert!("gossip".parse::<AnalysisType>().is_err());
    }
}
