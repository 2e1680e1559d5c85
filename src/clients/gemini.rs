use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::traits::{GenerationBackend, GenerationError, GenerationRequest};
use crate::config::Config;
use crate::error::{PipelineError, Result};

const STRUCTURED_MIME: &str = "application/json";

/// REST client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Self::new(
            api_key,
            config.generation.model.clone(),
            config.generation.base_url.clone(),
            Duration::from_millis(config.generation.request_timeout_ms),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Request body in the provider's wire shape
pub(crate) fn request_body(request: &GenerationRequest) -> serde_json::Value {
    let mut generation_config = json!({ "temperature": request.temperature });
    if request.expect_structured {
        generation_config["responseMimeType"] = json!(STRUCTURED_MIME);
    }
    json!({
        "systemInstruction": { "parts": [{ "text": request.system_directive }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.user_content }] }],
        "generationConfig": generation_config,
    })
}

/// Concatenated text of the first candidate
fn response_text(body: &str) -> std::result::Result<String, GenerationError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Decode(e.to_string()))?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyResponse("no candidates returned".into()));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse(format!(
            "candidate had no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        tracing::debug!(
            model = %self.model,
            structured = request.expect_structured,
            chars = request.user_content.len(),
            "Sending generation request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(structured: bool) -> GenerationRequest {
        GenerationRequest {
            system_directive: "You are terse.".into(),
            user_content: "Say hi".into(),
            temperature: 0.7,
            expect_structured: structured,
        }
    }

    #[test]
    fn test_request_body_structured_flag() {
        let body = request_body(&req(true));
        assert_eq!(body["generationConfig"]["responseMimeType"], STRUCTURED_MIME);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are terse.");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Say hi");

        let body = request_body(&req(false));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello, "},{"text":"world"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(response_text(body).unwrap(), "Hello, world");
    }

    #[test]
    fn test_response_text_empty_candidates() {
        let err = response_text(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse(_)));

        let err = response_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let backend = GeminiBackend::new(
            "k",
            "gemini-1.5-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            backend.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
