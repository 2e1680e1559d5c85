use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One request to the text-generation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub system_directive: String,
    pub user_content: String,
    pub temperature: f32,
    /// Ask the provider for a JSON body
    pub expect_structured: bool,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty response: {0}")]
    EmptyResponse(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl GenerationError {
    /// Rate-limit and quota failures are worth waiting out; nothing else is.
    pub fn is_transient(&self) -> bool {
        if let GenerationError::Http { status: 429, .. } = self {
            return true;
        }
        let lower = self.to_string().to_lowercase();
        lower.contains("quota")
            || lower.contains("too many requests")
            || lower.contains("rate limit")
            || lower.contains("resource_exhausted")
            || lower.contains("resource exhausted")
    }
}

/// A remote text-generation provider
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_429_is_transient() {
        let err = GenerationError::Http {
            status: 429,
            body: "slow down".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_quota_keyword_is_transient() {
        let err = GenerationError::Transport("Quota exceeded for project".into());
        assert!(err.is_transient());
        let err = GenerationError::Http {
            status: 400,
            body: r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#.into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_other_failures_are_permanent() {
        assert!(
            !GenerationError::Http {
                status: 500,
                body: "internal".into()
            }
            .is_transient()
        );
        assert!(!GenerationError::Transport("connection refused".into()).is_transient());
        assert!(!GenerationError::EmptyResponse("no candidates".into()).is_transient());
    }

    #[test]
    fn test_digits_429_in_body_are_not_a_rate_limit() {
        let err = GenerationError::Http {
            status: 400,
            body: "invalid field at offset 4290".into(),
        };
        assert!(!err.is_transient());
        assert!(!GenerationError::Decode("expected value at line 1 column 429".into()).is_transient());
    }
}
