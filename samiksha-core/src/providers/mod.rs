//! Capability client implementations.
//!
//! Defines the `CompletionProvider` and `SearchProvider` traits — one
//! method per remote operation — plus concrete HTTP clients for:
//! - Sarvam (vernacular completion)
//! - Krutrim (vernacular completion)
//! - OpenAI (general completion)
//! - Tavily (web search)
//!
//! Use `ProviderSet::from_env()` to instantiate clients for every
//! capability whose credential is present and well-formed.

pub mod krutrim;
pub mod openai;
pub mod sarvam;
pub mod tavily;

use crate::config::OrchestratorConfig;
use crate::error::ProviderError;
use crate::registry::{Capability, CapabilityKind};
use crate::types::{CompletionRequest, CompletionResponse, SearchRequest, SearchResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub use krutrim::KrutrimProvider;
pub use openai::OpenAiProvider;
pub use sarvam::SarvamProvider;
pub use tavily::TavilyProvider;

/// A remote text-generation capability client.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform a completion and return the generated text.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;

    /// Capability name this client serves.
    fn name(&self) -> &str;
}

/// A remote web-search capability client.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a search and return ranked hits.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ProviderError>;

    /// Capability name this client serves.
    fn name(&self) -> &str;
}

/// A completion capability paired with its client.
#[derive(Clone)]
pub struct CompletionEntry {
    pub capability: &'static Capability,
    pub client: Arc<dyn CompletionProvider>,
}

/// The search capability paired with its client.
#[derive(Clone)]
pub struct SearchEntry {
    pub capability: &'static Capability,
    pub client: Arc<dyn SearchProvider>,
}

/// Every instantiated capability client, completion entries kept in
/// registry fallback priority order.
pub struct ProviderSet {
    completions: Vec<CompletionEntry>,
    search: Option<SearchEntry>,
}

impl ProviderSet {
    /// Build a provider set with explicit entries (tests, custom wiring).
    ///
    /// Completion entries are sorted into registry priority order.
    pub fn new(mut completions: Vec<CompletionEntry>, search: Option<SearchEntry>) -> Self {
        completions.sort_by_key(|e| e.capability.priority);
        Self {
            completions,
            search,
        }
    }

    /// Instantiate a client for every *enabled* capability.
    ///
    /// A capability with a missing or malformed credential is skipped,
    /// not an error: the health validator decides whether the remaining
    /// set is sufficient.
    pub fn from_env(config: &OrchestratorConfig) -> Self {
        let mut completions = Vec::new();
        for capability in Capability::completion_order() {
            if !capability.is_enabled() {
                debug!(capability = capability.name, "Skipping capability without a valid credential");
                continue;
            }
            let key = capability
                .credential()
                .expect("enabled capability has a credential");
            let client: Arc<dyn CompletionProvider> = match capability.name {
                "sarvam" => Arc::new(SarvamProvider::new(key, config)),
                "krutrim" => Arc::new(KrutrimProvider::new(key, config)),
                _ => Arc::new(OpenAiProvider::new(key, config)),
            };
            completions.push(CompletionEntry { capability, client });
        }

        let search_cap = Capability::search_capability();
        let search = if search_cap.is_enabled() {
            let key = search_cap
                .credential()
                .expect("enabled capability has a credential");
            Some(SearchEntry {
                capability: search_cap,
                client: Arc::new(TavilyProvider::new(key, config)),
            })
        } else {
            debug!(capability = search_cap.name, "Search capability not configured");
            None
        };

        Self::new(completions, search)
    }

    /// Enabled completion entries in fallback priority order.
    pub fn completions(&self) -> &[CompletionEntry] {
        &self.completions
    }

    /// The enabled search entry, if configured.
    pub fn search(&self) -> Option<&SearchEntry> {
        self.search.as_ref()
    }

    /// Look up a completion entry by capability name.
    pub fn completion_by_name(&self, name: &str) -> Option<&CompletionEntry> {
        self.completions.iter().find(|e| e.capability.name == name)
    }

    /// Enabled capabilities of every kind.
    pub fn enabled_capabilities(&self) -> Vec<&'static Capability> {
        let mut caps: Vec<&'static Capability> =
            self.completions.iter().map(|e| e.capability).collect();
        if let Some(ref s) = self.search {
            caps.push(s.capability);
        }
        caps
    }

    /// Whether at least one completion capability is enabled.
    pub fn has_completion(&self) -> bool {
        !self.completions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mock providers
// ---------------------------------------------------------------------------

/// A mock completion provider for tests: returns queued outcomes in
/// order, repeating the last queued outcome once the queue drains.
pub struct MockCompletionProvider {
    name: String,
    outcomes: std::sync::Mutex<Vec<Result<CompletionResponse, ProviderError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockCompletionProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcomes: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A provider that always answers with the given text.
    pub fn with_response(name: impl Into<String>, text: &str) -> Self {
        let provider = Self::new(name);
        provider.queue_ok(text);
        provider
    }

    /// A provider that always fails with a connection error.
    pub fn always_failing(name: impl Into<String>, message: &str) -> Self {
        let provider = Self::new(name);
        provider.queue_err(ProviderError::Connection {
            message: message.to_string(),
        });
        provider
    }

    pub fn queue_ok(&self, text: &str) {
        self.outcomes.lock().unwrap().push(Ok(CompletionResponse {
            text: text.to_string(),
            model: Some("mock-model".to_string()),
        }));
    }

    pub fn queue_err(&self, error: ProviderError) {
        self.outcomes.lock().unwrap().push(Err(error));
    }

    /// How many times `complete` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut outcomes = self.outcomes.lock().unwrap();
        match outcomes.len() {
            0 => Ok(CompletionResponse {
                text: "mock completion".to_string(),
                model: Some("mock-model".to_string()),
            }),
            1 => outcomes[0].clone(),
            _ => outcomes.remove(0),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A mock search provider for tests.
pub struct MockSearchProvider {
    name: String,
    outcome: std::sync::Mutex<Result<SearchResponse, ProviderError>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockSearchProvider {
    /// A provider answering every query with the given hits.
    pub fn with_hits(name: impl Into<String>, hits: Vec<crate::types::SearchHit>) -> Self {
        Self {
            name: name.into(),
            outcome: std::sync::Mutex::new(Ok(SearchResponse { results: hits })),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A provider that always fails.
    pub fn always_failing(name: impl Into<String>, message: &str) -> Self {
        Self {
            name: name.into(),
            outcome: std::sync::Mutex::new(Err(ProviderError::Connection {
                message: message.to_string(),
            })),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Switch the provider to failing after construction (e.g. healthy
    /// during the probe round, down for the task itself).
    pub fn set_failing(&self, message: &str) {
        *self.outcome.lock().unwrap() = Err(ProviderError::Connection {
            message: message.to_string(),
        });
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a one-hit search result for tests.
pub fn mock_hit(url: &str, title: &str) -> crate::types::SearchHit {
    crate::types::SearchHit {
        url: url.to_string(),
        title: title.to_string(),
        content: format!("content of {title}"),
        score: 0.8,
    }
}

/// Convenience: wrap a mock completion client in an entry for the named
/// registry capability.
pub fn mock_completion_entry(name: &str, client: MockCompletionProvider) -> CompletionEntry {
    let capability = Capability::by_name(name).expect("capability must exist in the registry");
    assert_eq!(capability.kind, CapabilityKind::Completion);
    CompletionEntry {
        capability,
        client: Arc::new(client),
    }
}

/// Convenience: wrap a mock search client in an entry.
pub fn mock_search_entry(client: MockSearchProvider) -> SearchEntry {
    SearchEntry {
        capability: Capability::search_capability(),
        client: Arc::new(client),
    }
}
