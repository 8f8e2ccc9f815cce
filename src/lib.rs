//! Hybrid red flag / green flag classification engine.
//!
//! A remote language-completion classifier (prompt, exchange, strict parse)
//! backed by a deterministic keyword rule engine, both producing the same
//! fully populated [`FlagResult`].

pub mod batch;
pub mod classifier;
pub mod clients;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod rules;
pub mod types;

pub use classifier::{AssessmentLimits, FlagClassifier};
pub use error::{FlagDetectorError, Result};
pub use types::{
    AnalysisType, Classified, ClassificationRequest, ClassificationSource, FlagKind, FlagResult,
    RelationshipAssessment, Severity,
};
