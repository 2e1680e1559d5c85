//! Retrying front for a [`GenerationBackend`].
//!
//! Rate-limit and quota failures are retried with exponential backoff plus jitter.
//! Any other failure degrades to a fallback string right away. Running out of
//! attempts is the one fatal outcome.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::clients::traits::{GenerationBackend, GenerationRequest};
use crate::config::RetryConfig;
use crate::error::{PipelineError, Result};

pub const GENERATION_TEMPERATURE: f32 = 0.7;
pub const STRUCTURED_FALLBACK: &str = "{}";
pub const TEXT_FALLBACK: &str = "Error generating content";

const JITTER_MIN: f64 = 1.0;
const JITTER_MAX: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: cfg.base_delay(),
            jitter_unit: cfg.jitter_unit(),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            jitter_unit: Duration::ZERO,
        }
    }

    /// `base_delay * 2^attempt + jitter_units * jitter_unit`
    pub fn backoff(&self, attempt: u32, jitter_units: f64) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor) + self.jitter_unit.mul_f64(jitter_units)
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let units = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
        self.backoff(attempt, units)
    }
}

/// The call primitive every pipeline stage goes through
#[derive(Clone)]
pub struct ResilientClient {
    backend: Arc<dyn GenerationBackend>,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send one directive/content pair and return the response text.
    ///
    /// Returns `Err` only with [`PipelineError::RetriesExhausted`].
    pub async fn invoke(
        &self,
        system_directive: &str,
        user_content: &str,
        expect_structured: bool,
    ) -> Result<String> {
        let request = GenerationRequest {
            system_directive: system_directive.to_string(),
            user_content: user_content.to_string(),
            temperature: GENERATION_TEMPERATURE,
            expect_structured,
        };

        let mut last_error = String::new();
        for attempt in 0..self.policy.max_attempts {
            match self.backend.generate(&request).await {
                Ok(text) => {
                    if attempt > 0 {
                        debug!("Generation succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(text);
                }
                Err(e) if e.is_transient() => {
                    last_error = e.to_string();
                    if attempt + 1 == self.policy.max_attempts {
                        break;
                    }
                    let wait = self.policy.backoff_with_jitter(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited by generation service: {}",
                        e
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    warn!("Generation call failed, using fallback: {}", e);
                    return Ok(fallback(expect_structured).to_string());
                }
            }
        }

        Err(PipelineError::RetriesExhausted {
            attempts: self.policy.max_attempts,
            last_error,
        })
    }
}

pub fn fallback(expect_structured: bool) -> &'static str {
    if expect_structured {
        STRUCTURED_FALLBACK
    } else {
        TEXT_FALLBACK
    }
}
