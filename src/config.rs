use serde::{Deserialize, Serialize};

use crate::error::{FlagDetectorError, Result};

/// Main configuration structure loaded from flag_detector.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Remote completion service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub batch_max_tokens: u32,
    /// Content assessments answer in free prose and get more room
    pub assessment_max_tokens: u32,
    pub assessment_temperature: f32,
    pub top_p: f32,
    pub timeout_ms: u64,
    /// Sent as HTTP-Referer for OpenRouter attribution
    pub referer: Option<String>,
    /// Sent as X-Title for OpenRouter attribution
    pub title: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "deepseek/deepseek-r1".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            batch_max_tokens: 2000,
            assessment_max_tokens: 2000,
            assessment_temperature: 0.7,
            top_p: 0.9,
            timeout_ms: 60_000,
            referer: None,
            title: Some("Red Flag Detector".to_string()),
        }
    }
}

/// Result policy for the remote path
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Remote confidence is never reported below this value; 0 reports it raw
    pub confidence_floor: u8,
    /// Answer from the rule engine when the remote path fails
    pub fallback_to_rules: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 90,
            fallback_to_rules: false,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            log_level: "flag_detector=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            api_key: std::env::var("FLAG_DETECTOR_API_KEY")
                .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "flag_detector=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses FLAG_DETECTOR_CONFIG environment variable or defaults to "flag_detector.toml"
    pub fn load() -> Result<Self> {
        if let Ok(env_path) = std::env::var("FLAG_DETECTOR_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("FLAG_DETECTOR_CONFIG")
            .unwrap_or_else(|_| "flag_detector.toml".to_string());

        let mut config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Parse the file-backed sections; runtime settings stay at their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FLAG_DETECTOR_BASE_URL") {
            self.remote.base_url = url;
            tracing::debug!("FLAG_DETECTOR_BASE_URL env override applied");
        }
        if let Ok(model) = std::env::var("FLAG_DETECTOR_MODEL") {
            self.remote.model = model;
            tracing::debug!("FLAG_DETECTOR_MODEL env override applied");
        }
        if let Some(timeout) = std::env::var("FLAG_DETECTOR_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.remote.timeout_ms = timeout;
        }
        if let Some(floor) = std::env::var("FLAG_DETECTOR_CONFIDENCE_FLOOR")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
        {
            self.classification.confidence_floor = floor;
        }
        if let Ok(fallback) = std::env::var("FLAG_DETECTOR_FALLBACK") {
            self.classification.fallback_to_rules =
                fallback == "1" || fallback.eq_ignore_ascii_case("true");
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let remote = &self.remote;
        if !remote.base_url.starts_with("http://") && !remote.base_url.starts_with("https://") {
            return Err(config_error(format!(
                "remote.base_url '{}' must start with http:// or https://",
                remote.base_url
            )));
        }
        if remote.model.trim().is_empty() {
            return Err(config_error("remote.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&remote.temperature) {
            return Err(config_error("remote.temperature must be between 0.0 and 2.0"));
        }
        if !(0.0..=2.0).contains(&remote.assessment_temperature) {
            return Err(config_error(
                "remote.assessment_temperature must be between 0.0 and 2.0",
            ));
        }
        if !(remote.top_p > 0.0 && remote.top_p <= 1.0) {
            return Err(config_error("remote.top_p must be in (0.0, 1.0]"));
        }
        if remote.max_tokens == 0
            || remote.batch_max_tokens == 0
            || remote.assessment_max_tokens == 0
        {
            return Err(config_error("remote max token limits must be greater than 0"));
        }
        if remote.timeout_ms == 0 {
            return Err(config_error("remote.timeout_ms must be greater than 0"));
        }
        if self.classification.confidence_floor > 100 {
            return Err(config_error(
                "classification.confidence_floor must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Credential for the completion service; required for remote calls
    pub fn api_key(&self) -> Result<&str> {
        self.runtime
            .api_key
            .as_deref()
            .ok_or_else(|| config_error("FLAG_DETECTOR_API_KEY (or OPENROUTER_API_KEY) is not set"))
    }
}

fn config_error(message: impl Into<String>) -> FlagDetectorError {
    FlagDetectorError::Config {
        message: message.into(),
    }
}
