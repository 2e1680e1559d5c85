use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, Result};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_CONFIG_FILE: &str = "page_pipeline.toml";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Main configuration structure loaded from page_pipeline.toml and environment variables.
///
/// Built once per process and handed to the call client and pipeline by value;
/// nothing in the crate reads it back from a global.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Generation service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 60_000,
        }
    }
}

/// Backoff settings for transient (rate limit / quota) failures
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Jitter is drawn from 1..=5 of these units
    pub jitter_unit_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 2_000,
            jitter_unit_ms: 1_000,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn jitter_unit(&self) -> Duration {
        Duration::from_millis(self.jitter_unit_ms)
    }
}

/// Pipeline behaviour settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub question_count: usize,
    pub output_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            question_count: 15,
            output_dir: "output".to_string(),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            pipeline: PipelineConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses PAGE_PIPELINE_CONFIG environment variable or defaults to "page_pipeline.toml"
    pub fn load() -> Result<Self> {
        // PP_ENV_FILE if set, otherwise ./.env when present
        if let Ok(env_path) = std::env::var("PP_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let (config_path, explicit) = match std::env::var("PAGE_PIPELINE_CONFIG") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = match read_config_file(&config_path, explicit)? {
            Some(content) => Self::from_toml_str(&content)?,
            None => {
                tracing::warn!(
                    "Config file {} not found, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate();

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply env-first overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Ok(url) = std::env::var("PP_BASE_URL") {
            self.generation.base_url = url;
        }
        if let Some(v) = env_parse::<u64>("PP_REQUEST_TIMEOUT_MS") {
            self.generation.request_timeout_ms = v;
        }
        if let Some(v) = env_parse::<u32>("PP_MAX_ATTEMPTS") {
            self.retry.max_attempts = v;
        }
        if let Some(v) = env_parse::<u64>("PP_RETRY_BASE_DELAY_MS") {
            self.retry.base_delay_ms = v;
        }
        if let Some(v) = env_parse::<u64>("PP_RETRY_JITTER_UNIT_MS") {
            self.retry.jitter_unit_ms = v;
        }
        if let Some(v) = env_parse::<usize>("PP_QUESTION_COUNT") {
            self.pipeline.question_count = v;
        }
        if let Ok(dir) = std::env::var("PP_OUTPUT_DIR") {
            self.pipeline.output_dir = dir;
        }
    }

    /// Clamp out-of-range values instead of failing the run
    pub fn validate(&mut self) {
        if self.retry.max_attempts == 0 {
            self.retry.max_attempts = 1;
        } else if self.retry.max_attempts > 10 {
            tracing::warn!(
                "max_attempts {} exceeds max 10, clamping to 10",
                self.retry.max_attempts
            );
            self.retry.max_attempts = 10;
        }

        if !(1..=50).contains(&self.pipeline.question_count) {
            let clamped = self.pipeline.question_count.clamp(1, 50);
            tracing::warn!(
                "question_count {} out of range 1-50, clamping to {}",
                self.pipeline.question_count,
                clamped
            );
            self.pipeline.question_count = clamped;
        }

        if !self.generation.base_url.starts_with("http://")
            && !self.generation.base_url.starts_with("https://")
        {
            tracing::warn!(
                "Generation base URL '{}' doesn't start with http:// or https://",
                self.generation.base_url
            );
        }
    }

    /// API key, or a config error when the service would be unreachable
    pub fn require_api_key(&self) -> Result<&str> {
        self.runtime
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PipelineError::config("GEMINI_API_KEY not set"))
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
        }
    }
}

/// `None` only when the default file is absent; every other read failure is fatal
fn read_config_file(path: &Path, explicit: bool) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound && !explicit => Ok(None),
        Err(e) => Err(PipelineError::config(format!(
            "cannot read config file {}: {}",
            path.display(),
            e
        ))),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
