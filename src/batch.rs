//! Single-exchange batch classification
//!
//! N inputs go out in one numbered prompt and come back as one array. The
//! call is atomic: either every result returns in input order or the whole
//! batch fails.

use crate::clients::{CompletionRequest, CompletionService};
use crate::error::{FlagDetectorError, Result};
use crate::parser::ResponseParser;
use crate::prompts::{BATCH_SYSTEM_PROMPT, PromptMode, build_prompt};
use crate::types::FlagResult;

/// Trimmed non-blank inputs, order kept
pub fn retain_non_empty(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coordinates one batch round trip against a completion service
pub struct BatchOrchestrator<'a> {
    service: &'a dyn CompletionService,
    parser: ResponseParser,
    max_tokens: Option<u32>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(service: &'a dyn CompletionService, parser: ResponseParser) -> Self {
        Self {
            service,
            parser,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Classify every non-blank input with exactly one remote exchange
    pub async fn classify_batch(&self, inputs: &[String]) -> Result<Vec<FlagResult>> {
        let retained = retain_non_empty(inputs);
        if retained.is_empty() {
            return Err(FlagDetectorError::EmptyBatch);
        }
        if retained.len() < inputs.len() {
            tracing::debug!(
                dropped = inputs.len() - retained.len(),
                "blank batch inputs filtered"
            );
        }

        let prompt = build_prompt(&retained, PromptMode::Batch);
        let mut request = CompletionRequest::new(BATCH_SYSTEM_PROMPT, prompt);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let raw = self.service.submit(&request).await?;
        let results = self.parser.parse_many(&raw, retained.len())?;
        tracing::debug!(count = results.len(), "batch classified");
        Ok(results)
    }
}
