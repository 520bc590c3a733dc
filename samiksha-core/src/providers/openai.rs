//! OpenAI completion provider.
//!
//! Last entry in the completion fallback chain: general-purpose model
//! used when both vernacular capabilities are down or unconfigured.

use crate::config::OrchestratorConfig;
use crate::error::ProviderError;
use crate::providers::CompletionProvider;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for the OpenAI chat completions API.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
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
impl CompletionProvider for OpenAiProvider {
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
            "stream": false,
        });

        debug!(url = %url, model = %self.model, "Sending OpenAI completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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
                capability: "openai".to_string(),
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
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = json!({
            "model": "gpt-4o-mini",
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
        });
        let resp = OpenAiProvider::parse_response(&body).unwrap();
        assert_eq!(resp.text, "hello");
        assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_parse_response_null_content() {
        let body = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(matches!(
            OpenAiProvider::parse_response(&body),
            Err(ProviderError::ResponseParse { .. })
        ));
    }
}
