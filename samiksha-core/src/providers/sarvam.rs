//! Sarvam completion provider.
//!
//! Vernacular-first chat completions endpoint following the OpenAI
//! request format. Primary capability for Hindi/Marathi/Gujarati work.

use crate::config::OrchestratorConfig;
use crate::error::ProviderError;
use crate::providers::CompletionProvider;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.sarvam.ai/v1";
const DEFAULT_MODEL: &str = "sarvam-m";

/// Client for the Sarvam chat completions API.
pub struct SarvamProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl SarvamProvider {
    pub fn new(api_key: String, config: &OrchestratorConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.completion_timeout())
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: config.completion_timeout_secs,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parse a chat-completions body into a `CompletionResponse`.
    fn parse_response(body: &Value) -> Result<CompletionResponse, ProviderError> {
        let text = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "no message content in choices".to_string(),
            })?;

        Ok(CompletionResponse {
            text: text.to_string(),
            model: body
                .get("model")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string()),
        })
    }
}

#[async_trait]
impl CompletionProvider for SarvamProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        debug!(url = %url, model = %self.model, "Sending Sarvam completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    ProviderError::Connection {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection {
                message: format!("failed to read response body: {e}"),
            })?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthFailed {
                capability: "sarvam".to_string(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| ProviderError::ResponseParse {
            message: format!("invalid JSON: {e}"),
        })?;
        Self::parse_response(&body)
    }

    fn name(&self) -> &str {
        "sarvam"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = json!({
            "model": "sarvam-m",
            "choices": [{ "message": { "role": "assistant", "content": "नमस्ते" } }]
        });
        let resp = SarvamProvider::parse_response(&body).unwrap();
        assert_eq!(resp.text, "नमस्ते");
        assert_eq!(resp.model.as_deref(), Some("sarvam-m"));
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let body = json!({ "error": "overloaded" });
        let err = SarvamProvider::parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseParse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let provider = SarvamProvider::new("sk_test".into(), &OrchestratorConfig::default())
            .with_base_url("http://127.0.0.1:1/v1");
        let err = provider
            .complete(CompletionRequest::probe())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Connection { .. } | ProviderError::Timeout { .. }
        ));
    }
}
