//! Deterministic keyword-pattern classifier used as the offline path
//!
//! Scores input against two fixed tables of weighted keyword patterns, one for
//! red flags and one for green flags. Table order is part of the contract:
//! on equal scores the pattern listed first wins.

use once_cell::sync::Lazy;

use crate::types::{FlagKind, FlagResult, Severity};

/// Upper bound on confidence reported by the rule engine
pub const MAX_LOCAL_CONFIDENCE: u8 = 95;
/// Confidence reported when no pattern matches
pub const NEUTRAL_CONFIDENCE: u8 = 60;
pub const NEUTRAL_LABEL: &str = "Neutral/Unclear";
pub const NEUTRAL_EMOJI: &str = "🤔";

/// Rotation of statements used when nothing matches
pub const NEUTRAL_EXPLANATIONS: [&str; 3] = [
    "This behavior seems neutral - consider the broader context of your relationship.",
    "Without more context, this appears to be a normal relationship interaction.",
    "This seems like typical relationship communication - look for patterns over time.",
];

/// One weighted keyword pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    pub keywords: &'static [&'static str],
    pub category: &'static str,
    pub explanation: &'static str,
    /// Severity (red table) or strength (green table), 0-100
    pub weight: u8,
}

impl RulePattern {
    /// Number of keywords found as substrings of already lower-cased text, times weight
    pub fn score(&self, lower: &str) -> u32 {
        let hits = self.keywords.iter().filter(|kw| lower.contains(*kw)).count() as u32;
        hits * self.weight as u32
    }
}

pub static RED_PATTERNS: Lazy<Vec<RulePattern>> = Lazy::new(|| {
    vec![
        // Control and manipulation
        RulePattern {
            keywords: &[
                "control",
                "controlling",
                "won't let",
                "forbid",
                "not allowed",
                "permission",
            ],
            category: "Control",
            explanation: "Controlling behavior restricts your freedom and autonomy, which is unhealthy in relationships.",
            weight: 90,
        },
        RulePattern {
            keywords: &[
                "manipulate",
                "manipulating",
                "guilt trip",
                "emotional blackmail",
                "threatens",
            ],
            category: "Manipulation",
            explanation: "Manipulation tactics are used to control your emotions and decisions, which is toxic behavior.",
            weight: 95,
        },
        // Communication
        RulePattern {
            keywords: &[
                "silent treatment",
                "ignores",
                "won't talk",
                "shuts down",
                "stonewalling",
            ],
            category: "Communication",
            explanation: "Refusing to communicate or giving silent treatment is an unhealthy way to handle conflicts.",
            weight: 75,
        },
        RulePattern {
            keywords: &[
                "yells",
                "screams",
                "shouts",
                "aggressive",
                "hostile",
                "verbally abusive",
            ],
            category: "Communication",
            explanation: "Aggressive communication and verbal abuse are serious red flags that indicate toxic behavior.",
            weight: 95,
        },
        // Jealousy and possessiveness
        RulePattern {
            keywords: &[
                "jealous",
                "possessive",
                "checks phone",
                "checks my phone",
                "goes through my phone",
                "stalks",
                "follows",
                "suspicious",
            ],
            category: "Jealousy",
            explanation: "Excessive jealousy and possessive behavior indicate insecurity and potential controlling tendencies.",
            weight: 85,
        },
        RulePattern {
            keywords: &[
                "disrespects",
                "puts down",
                "insults",
                "belittles",
                "humiliates",
                "embarrasses",
            ],
            category: "Disrespect",
            explanation: "Disrespectful behavior and put-downs are harmful to self-esteem and relationship health.",
            weight: 90,
        },
        RulePattern {
            keywords: &[
                "lies", "lying", "dishonest", "cheats", "cheating", "hides", "secretive",
            ],
            category: "Dishonesty",
            explanation: "Dishonesty and deception break down trust, which is fundamental to healthy relationships.",
            weight: 85,
        },
        // Stock phrases
        RulePattern {
            keywords: &[
                "not like other girls",
                "you're different",
                "all my exes were crazy",
            ],
            category: "Manipulation",
            explanation: "These phrases are classic manipulation tactics that put others down to make you feel special.",
            weight: 80,
        },
    ]
});

pub static GREEN_PATTERNS: Lazy<Vec<RulePattern>> = Lazy::new(|| {
    vec![
        RulePattern {
            keywords: &[
                "listens",
                "listening",
                "asks questions",
                "remembers",
                "communicates",
                "talks openly",
            ],
            category: "Communication",
            explanation: "Active listening and open communication are foundations of healthy relationships.",
            weight: 90,
        },
        RulePattern {
            keywords: &[
                "respects boundaries",
                "gives space",
                "understands",
                "patient",
                "supportive",
            ],
            category: "Respect",
            explanation: "Respecting boundaries and being supportive shows emotional maturity and care.",
            weight: 95,
        },
        RulePattern {
            keywords: &[
                "supports",
                "encouraging",
                "celebrates",
                "proud",
                "believes in",
                "cheers",
            ],
            category: "Support",
            explanation: "Being supportive and celebrating your achievements shows genuine care and partnership.",
            weight: 90,
        },
        RulePattern {
            keywords: &[
                "empathetic",
                "understanding",
                "validates",
                "comforts",
                "there for",
            ],
            category: "Empathy",
            explanation: "Empathy and emotional validation are crucial for deep, meaningful connections.",
            weight: 95,
        },
        RulePattern {
            keywords: &[
                "honest",
                "truthful",
                "transparent",
                "trustworthy",
                "reliable",
                "consistent",
            ],
            category: "Trust",
            explanation: "Honesty and reliability build the foundation of trust necessary for healthy relationships.",
            weight: 95,
        },
        RulePattern {
            keywords: &[
                "compromises",
                "works together",
                "grows",
                "learns",
                "apologizes",
                "changes",
            ],
            category: "Growth",
            explanation: "Willingness to compromise and grow together shows maturity and commitment to the relationship.",
            weight: 85,
        },
    ]
});

/// Best-scoring pattern of a table; the earliest pattern wins on equal scores
#[derive(Debug, Clone, Copy)]
pub struct PatternMatch<'a> {
    pub pattern: Option<&'a RulePattern>,
    pub score: u32,
}

pub fn best_match<'a>(patterns: &'a [RulePattern], lower: &str) -> PatternMatch<'a> {
    let mut best = PatternMatch {
        pattern: None,
        score: 0,
    };
    for pattern in patterns {
        let score = pattern.score(lower);
        // Strict comparison keeps the first pattern on ties
        if score > best.score {
            best = PatternMatch {
                pattern: Some(pattern),
                score,
            };
        }
    }
    best
}

/// Classify `text` with the keyword tables. Never fails.
pub fn classify_locally(text: &str) -> FlagResult {
    let lower = text.to_lowercase();
    let best_red = best_match(&RED_PATTERNS, &lower);
    let best_green = best_match(&GREEN_PATTERNS, &lower);

    tracing::debug!(
        red_score = best_red.score,
        green_score = best_green.score,
        "rule engine scored input"
    );

    if best_red.score > best_green.score
        && let Some(pattern) = best_red.pattern
    {
        return from_pattern(FlagKind::Red, pattern);
    }
    if let Some(pattern) = best_green.pattern {
        return from_pattern(FlagKind::Green, pattern);
    }
    neutral(&lower)
}

fn from_pattern(kind: FlagKind, pattern: &RulePattern) -> FlagResult {
    let (psychology_basis, action_advice) = guidance_for(kind, pattern.category);
    FlagResult {
        kind,
        label: kind.default_label().to_string(),
        explanation: pattern.explanation.to_string(),
        confidence: pattern.weight.min(MAX_LOCAL_CONFIDENCE),
        emoji: kind.default_emoji().to_string(),
        severity: Severity::from_weight(kind, pattern.weight),
        category: pattern.category.to_string(),
        psychology_basis: psychology_basis.to_string(),
        action_advice: action_advice.to_string(),
    }
}

fn neutral(lower: &str) -> FlagResult {
    FlagResult {
        kind: FlagKind::Green,
        label: NEUTRAL_LABEL.to_string(),
        explanation: NEUTRAL_EXPLANATIONS[neutral_index(lower)].to_string(),
        confidence: NEUTRAL_CONFIDENCE,
        emoji: NEUTRAL_EMOJI.to_string(),
        severity: Severity::Good,
        category: "Behavioral".to_string(),
        psychology_basis: "No recognizable concerning or healthy pattern was found in the description."
            .to_string(),
        action_advice: "Watch how this behavior repeats over time before drawing conclusions."
            .to_string(),
    }
}

// Stable per-input choice so identical input always yields an identical result
fn neutral_index(lower: &str) -> usize {
    let hash = blake3::hash(lower.as_bytes());
    hash.as_bytes()[0] as usize % NEUTRAL_EXPLANATIONS.len()
}

fn guidance_for(kind: FlagKind, category: &str) -> (&'static str, &'static str) {
    match (kind, category) {
        (FlagKind::Red, "Control") => (
            "Coercive control erodes autonomy and is a strong predictor of escalating abuse.",
            "Name the behavior, hold your boundary, and talk to someone you trust outside the relationship.",
        ),
        (FlagKind::Red, "Manipulation") => (
            "Manipulation exploits guilt and fear to override your own judgment.",
            "Write down what happened as it happened and check your read with a trusted friend or counselor.",
        ),
        (FlagKind::Red, "Communication") => (
            "Stonewalling and hostility are among the strongest predictors of relationship breakdown.",
            "Ask for a calm conversation at a set time; if hostility continues, consider couples counseling.",
        ),
        (FlagKind::Red, "Jealousy") => (
            "Possessive jealousy is rooted in insecurity and often serves as a vehicle for control.",
            "Make clear that your privacy is not negotiable and notice whether the monitoring stops.",
        ),
        (FlagKind::Red, "Disrespect") => (
            "Contempt is the single strongest predictor of relationship failure.",
            "Say plainly that put-downs are not acceptable and watch whether the behavior changes.",
        ),
        (FlagKind::Red, "Dishonesty") => (
            "Repeated deception breaks the trust that secure attachment depends on.",
            "Address the specific lie directly and decide what rebuilding trust would have to look like.",
        ),
        (FlagKind::Green, "Communication") => (
            "Responsive, open communication supports secure attachment.",
            "Acknowledge it and keep the same openness going in both directions.",
        ),
        (FlagKind::Green, "Respect") => (
            "Respecting boundaries signals emotional maturity and secure attachment.",
            "Reciprocate by respecting their boundaries and naming what you appreciate.",
        ),
        (FlagKind::Green, "Support") => (
            "Celebrating a partner's success builds closeness and mutual trust.",
            "Return the support and tell them it matters to you.",
        ),
        (FlagKind::Green, "Empathy") => (
            "Emotional validation helps both partners regulate stress and feel safe.",
            "Let them know you feel understood and offer the same attention back.",
        ),
        (FlagKind::Green, "Trust") => (
            "Consistency and honesty are the foundation of a secure bond.",
            "Keep meeting that reliability with your own.",
        ),
        (FlagKind::Green, "Growth") => (
            "Repair attempts and compromise are hallmarks of resilient couples.",
            "Recognize the effort and keep working through conflicts together.",
        ),
        (FlagKind::Red, _) => (
            "Based on established relationship psychology principles.",
            "Consider the broader context of your relationship patterns.",
        ),
        (FlagKind::Green, _) => (
            "Based on established relationship psychology principles.",
            "Keep nurturing the healthy patterns you see.",
        ),
    }
}
