//! Domain-specific error types for flag-detector

use thiserror::Error;

/// Main error type for the classification engine
#[derive(Error, Debug)]
pub enum FlagDetectorError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Service error: status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Incomplete batch: expected {expected} results, received {received}")]
    IncompleteBatch { expected: usize, received: usize },

    #[error("Empty batch: no non-empty inputs to classify")]
    EmptyBatch,

    #[error("Empty input: content must not be blank")]
    EmptyInput,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl FlagDetectorError {
    /// Transport and service failures may succeed on a later attempt; the rest will not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlagDetectorError::Transport { .. } | FlagDetectorError::Service { .. }
        )
    }

    /// Failures of the remote path, as opposed to caller mistakes.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            FlagDetectorError::Transport { .. }
                | FlagDetectorError::Service { .. }
                | FlagDetectorError::Schema { .. }
                | FlagDetectorError::IncompleteBatch { .. }
        )
    }
}

impl From<reqwest::Error> for FlagDetectorError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            format!("HTTP request failed: {}", err)
        };
        FlagDetectorError::Transport { message }
    }
}

impl From<serde_json::Error> for FlagDetectorError {
    fn from(err: serde_json::Error) -> Self {
        FlagDetectorError::Schema {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FlagDetectorError {
    fn from(err: toml::de::Error) -> Self {
        FlagDetectorError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for flag-detector operations
pub type Result<T> = std::result::Result<T, FlagDetectorError>;
