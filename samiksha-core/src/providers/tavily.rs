//! Tavily search provider.
//!
//! The single web-search capability. Returns ranked hits with title,
//! url, content snippet, and a provider-reported relevance score.

use crate::config::OrchestratorConfig;
use crate::error::ProviderError;
use crate::providers::SearchProvider;
use crate::types::{SearchHit, SearchRequest, SearchResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Client for the Tavily search API.
pub struct TavilyProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl TavilyProvider {
    pub fn new(api_key: String, config: &OrchestratorConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.search_timeout())
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            timeout_secs: config.search_timeout_secs,
        }
    }

    fn parse_response(body: &Value) -> Result<SearchResponse, ProviderError> {
        let results = body
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "no results array in response".to_string(),
            })?;

        let hits = results
            .iter()
            .filter_map(|r| {
                Some(SearchHit {
                    url: r.get("url")?.as_str()?.to_string(),
                    title: r
                        .get("title")
                        .and_then(|t| t.as_str())
                        .unwrap_or("untitled")
                        .to_string(),
                    content: r
                        .get("content")
                        .and_then(|c| c.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    score: r.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0),
                })
            })
            .collect();

        Ok(SearchResponse { results: hits })
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let body = json!({
            "api_key": self.api_key,
            "query": request.query,
            "max_results": request.max_results,
        });

        debug!(url = %url, query = %request.query, "Sending Tavily search request");

        let response = self
            .client
            .post(&url)
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

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailed {
                capability: "tavily".to_string(),
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
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = json!({
            "results": [
                { "title": "Mobile prices in India", "url": "https://example.com/a",
                  "content": "snippet", "score": 0.92 },
                { "url": "https://example.com/b", "content": "untitled hit" }
            ]
        });
        let resp = TavilyProvider::parse_response(&body).unwrap();
        assert_eq!(resp.results.len(), 2);
        assert_eq!(resp.results[0].title, "Mobile prices in India");
        assert!((resp.results[0].score - 0.92).abs() < f64::EPSILON);
        // hits without a title fall back to a placeholder instead of being dropped
        assert_eq!(resp.results[1].title, "untitled");
    }

    #[test]
    fn test_parse_response_missing_results() {
        let body = json!({ "detail": "quota exceeded" });
        assert!(matches!(
            TavilyProvider::parse_response(&body),
            Err(ProviderError::ResponseParse { .. })
        ));
    }

    #[test]
    fn test_hits_without_url_are_dropped() {
        let body = json!({ "results": [{ "title": "no url" }] });
        let resp = TavilyProvider::parse_response(&body).unwrap();
        assert!(resp.results.is_empty());
    }
}
