//! Core type definitions for the samiksha orchestration layer.
//!
//! Defines the task request/response surface, the completion and search
//! wire types exchanged with capability clients, and the supported
//! vernacular language set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of work a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Completion,
    Search,
    Analysis,
    Synthesis,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Completion => write!(f, "completion"),
            TaskKind::Search => write!(f, "search"),
            TaskKind::Analysis => write!(f, "analysis"),
            TaskKind::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// A supported vernacular language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    Marathi,
    Tamil,
    Telugu,
    Bengali,
    Gujarati,
}

impl Language {
    /// Every supported language, in default planning order.
    pub const ALL: [Language; 6] = [
        Language::Hindi,
        Language::Marathi,
        Language::Tamil,
        Language::Telugu,
        Language::Bengali,
        Language::Gujarati,
    ];

    /// English name of the language, lowercase.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Hindi => "hindi",
            Language::Marathi => "marathi",
            Language::Tamil => "tamil",
            Language::Telugu => "telugu",
            Language::Bengali => "bengali",
            Language::Gujarati => "gujarati",
        }
    }

    /// Keywords that identify this language in a free-form prompt,
    /// including the native-script self-name.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Language::Hindi => &["hindi", "हिंदी", "हिन्दी"],
            Language::Marathi => &["marathi", "मराठी"],
            Language::Tamil => &["tamil", "தமிழ்"],
            Language::Telugu => &["telugu", "తెలుగు"],
            Language::Bengali => &["bengali", "bangla", "বাংলা"],
            Language::Gujarati => &["gujarati", "ગુજરાતી"],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Optional generation parameters carried by a task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum output length in tokens.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// A single-shot task submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub kind: TaskKind,
    pub prompt: String,
    /// Whether the task needs real-time data (forces the composed
    /// search-and-synthesize path).
    #[serde(default)]
    pub requires_realtime: bool,
    #[serde(default)]
    pub params: Option<GenerationParams>,
}

impl TaskRequest {
    /// Create a plain completion task.
    pub fn completion(prompt: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Completion,
            prompt: prompt.into(),
            requires_realtime: false,
            params: None,
        }
    }

    /// Create a search-backed task.
    pub fn search(prompt: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Search,
            prompt: prompt.into(),
            requires_realtime: true,
            params: None,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// A citation extracted from search results backing a task response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    pub title: String,
}

/// The structured outcome of a task. Never an exception: failures are
/// reported with `success == false` and a populated `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub success: bool,
    pub text: Option<String>,
    /// Capability identifiers actually used, e.g. `["tavily", "sarvam"]`
    /// for a composed task.
    pub providers: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl TaskResponse {
    /// Build a success response.
    pub fn ok(text: impl Into<String>, providers: Vec<String>, latency_ms: u64) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            providers,
            citations: Vec::new(),
            error: None,
            latency_ms,
        }
    }

    /// Build a failure response.
    pub fn failure(error: impl Into<String>, providers: Vec<String>, latency_ms: u64) -> Self {
        Self {
            success: false,
            text: None,
            providers,
            citations: Vec::new(),
            error: Some(error.into()),
            latency_ms,
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// Composite provider identifier, e.g. `"tavily+sarvam"`.
    pub fn provider_id(&self) -> String {
        self.providers.join("+")
    }
}

/// A request against a completion capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }

    /// Minimal 1-token request used for liveness probes.
    pub fn probe() -> Self {
        Self {
            prompt: "ping".to_string(),
            max_tokens: 1,
            temperature: 0.0,
        }
    }
}

/// A response from a completion capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub model: Option<String>,
}

/// A request against the search capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
        }
    }

    /// Minimal 1-result request used for liveness probes.
    pub fn probe() -> Self {
        Self {
            query: "market".to_string(),
            max_results: 1,
        }
    }
}

/// One hit returned by the search capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Provider-reported relevance, 0.0-1.0.
    #[serde(default)]
    pub score: f64,
}

/// A response from the search capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

impl SearchResponse {
    /// Extract citations from the hits, preserving order.
    pub fn citations(&self) -> Vec<Citation> {
        self.results
            .iter()
            .map(|hit| Citation {
                url: hit.url.clone(),
                title: hit.title.clone(),
            })
            .collect()
    }
}

/// Timestamp helper shared by snapshots and missions.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_language_keywords_include_native_script() {
        assert!(Language::Hindi.keywords().contains(&"हिंदी"));
        assert!(Language::Tamil.keywords().contains(&"தமிழ்"));
    }

    #[test]
    fn test_task_request_builders() {
        let task = TaskRequest::completion("summarize this");
        assert_eq!(task.kind, TaskKind::Completion);
        assert!(!task.requires_realtime);

        let task = TaskRequest::search("latest prices");
        assert_eq!(task.kind, TaskKind::Search);
        assert!(task.requires_realtime);
    }

    #[test]
    fn test_response_provider_id_composite() {
        let resp = TaskResponse::ok("done", vec!["tavily".into(), "sarvam".into()], 120);
        assert_eq!(resp.provider_id(), "tavily+sarvam");
    }

    #[test]
    fn test_probe_requests_are_minimal() {
        assert_eq!(CompletionRequest::probe().max_tokens, 1);
        assert_eq!(SearchRequest::probe().max_results, 1);
    }

    #[test]
    fn test_search_citations_preserve_order() {
        let resp = SearchResponse {
            results: vec![
                SearchHit {
                    url: "https://a.example".into(),
                    title: "A".into(),
                    content: String::new(),
                    score: 0.9,
                },
                SearchHit {
                    url: "https://b.example".into(),
                    title: "B".into(),
                    content: String::new(),
                    score: 0.5,
                },
            ],
        };
        let citations = resp.citations();
        assert_eq!(citations[0].title, "A");
        assert_eq!(citations[1].title, "B");
    }

    #[test]
    fn test_task_response_failure_has_error() {
        let resp = TaskResponse::failure("all providers down", vec![], 40);
        assert!(!resp.success);
        assert!(resp.text.is_none());
        assert_eq!(resp.error.as_deref(), Some("all providers down"));
    }
}
