//! Public classification entry point
//!
//! The remote completion path is primary. The rule engine is exposed at the
//! same shape through `classify_locally`, and is only substituted
//! automatically by `classify_with_fallback` when the policy enables it.

use std::sync::Arc;

use crate::batch::BatchOrchestrator;
use crate::clients::{ChatCompletionsClient, CompletionRequest, CompletionService};
use crate::config::{ClassificationConfig, Config};
use crate::error::{FlagDetectorError, Result};
use crate::parser::ResponseParser;
use crate::prompts::{
    ASSESSMENT_SYSTEM_PROMPT, PromptMode, SYSTEM_PROMPT, build_assessment_prompt, build_prompt,
};
use crate::rules;
use crate::types::{
    Classified, ClassificationRequest, ClassificationSource, FlagResult, RelationshipAssessment,
};

pub struct FlagClassifier {
    service: Arc<dyn CompletionService>,
    parser: ResponseParser,
    fallback_to_rules: bool,
    batch_max_tokens: Option<u32>,
    assessment: Option<AssessmentLimits>,
}

/// Sampling overrides for content assessments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentLimits {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl FlagClassifier {
    /// Classifier with the default policy: confidence floor 90, no automatic fallback
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self::with_policy(service, &ClassificationConfig::default())
    }

    pub fn with_policy(service: Arc<dyn CompletionService>, policy: &ClassificationConfig) -> Self {
        Self {
            service,
            parser: ResponseParser::new(policy.confidence_floor),
            fallback_to_rules: policy.fallback_to_rules,
            batch_max_tokens: None,
            assessment: None,
        }
    }

    /// Build the production classifier backed by the chat completions client
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ChatCompletionsClient::from_config(config)?;
        Ok(Self::with_policy(Arc::new(client), &config.classification)
            .with_batch_max_tokens(config.remote.batch_max_tokens)
            .with_assessment_limits(AssessmentLimits {
                max_tokens: config.remote.assessment_max_tokens,
                temperature: config.remote.assessment_temperature,
            }))
    }

    pub fn with_batch_max_tokens(mut self, max_tokens: u32) -> Self {
        self.batch_max_tokens = Some(max_tokens);
        self
    }

    pub fn with_assessment_limits(mut self, limits: AssessmentLimits) -> Self {
        self.assessment = Some(limits);
        self
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_to_rules
    }

    /// Classify one description through the remote service
    pub async fn classify(&self, content: &str) -> Result<FlagResult> {
        let content = non_empty(content)?;
        let prompt = build_prompt(&[content.to_string()], PromptMode::Single);
        let raw = self
            .service
            .submit(&CompletionRequest::new(SYSTEM_PROMPT, prompt))
            .await?;
        self.parser.parse_one(&raw)
    }

    /// Classify several descriptions in one remote exchange, results in input order
    pub async fn classify_batch(&self, contents: &[String]) -> Result<Vec<FlagResult>> {
        let mut orchestrator = BatchOrchestrator::new(self.service.as_ref(), self.parser);
        if let Some(max_tokens) = self.batch_max_tokens {
            orchestrator = orchestrator.with_max_tokens(max_tokens);
        }
        orchestrator.classify_batch(contents).await
    }

    /// Extended multi-field assessment of a piece of content
    pub async fn classify_content(
        &self,
        request: &ClassificationRequest,
    ) -> Result<RelationshipAssessment> {
        non_empty(&request.content)?;
        let mut completion =
            CompletionRequest::new(ASSESSMENT_SYSTEM_PROMPT, build_assessment_prompt(request));
        if let Some(limits) = self.assessment {
            completion = completion
                .with_max_tokens(limits.max_tokens)
                .with_temperature(limits.temperature);
        }
        let raw = self.service.submit(&completion).await?;
        self.parser.parse_assessment(&raw)
    }

    /// Rule engine classification; no network, never fails
    pub fn classify_locally(&self, content: &str) -> FlagResult {
        rules::classify_locally(content)
    }

    /// Remote first; falls back to the rule engine on remote failure when enabled
    pub async fn classify_with_fallback(&self, content: &str) -> Result<Classified> {
        match self.classify(content).await {
            Ok(result) => Ok(Classified {
                result,
                source: ClassificationSource::Remote,
            }),
            Err(err) if self.fallback_to_rules && err.is_remote_failure() => {
                tracing::warn!(error = %err, "remote classification failed, using rule engine");
                Ok(Classified {
                    result: rules::classify_locally(content),
                    source: ClassificationSource::Local,
                })
            }
            Err(err) => Err(err),
        }
    }
}

fn non_empty(content: &str) -> Result<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(FlagDetectorError::EmptyInput);
    }
    Ok(trimmed)
}
