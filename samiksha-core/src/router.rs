//! Language-aware task routing.
//!
//! The router is pure dispatch: it maps a (task kind, language) pair to
//! exactly one completion capability and issues a single attempt. There
//! is no fallback chain here; a failed call propagates to the caller.
//! Tasks that need resilience go through the orchestrator instead.

use crate::config::OrchestratorConfig;
use crate::error::{Result, RoutingError, SamikshaError};
use crate::providers::ProviderSet;
use crate::types::{CompletionRequest, Language, TaskKind};
use std::sync::Arc;
use tracing::{debug, info};

/// Vernacular routing table: which completion capability serves which
/// language.
fn capability_for(language: Language) -> &'static str {
    match language {
        Language::Hindi | Language::Marathi | Language::Gujarati => "sarvam",
        Language::Tamil | Language::Telugu | Language::Bengali => "krutrim",
    }
}

/// The text produced by a routed task, with the capability that made it.
#[derive(Debug, Clone)]
pub struct RoutedOutput {
    pub text: String,
    pub capability: String,
}

/// Single-shot dispatcher for language-typed tasks.
pub struct TaskRouter {
    providers: Arc<ProviderSet>,
    config: OrchestratorConfig,
}

impl TaskRouter {
    pub fn new(providers: Arc<ProviderSet>, config: OrchestratorConfig) -> Self {
        Self { providers, config }
    }

    /// Route one task to its mapped capability and run it once.
    ///
    /// Only text-producing kinds are routable; search goes through the
    /// orchestrator's composed path.
    pub async fn route(
        &self,
        kind: TaskKind,
        language: Language,
        prompt: &str,
    ) -> Result<RoutedOutput> {
        if kind == TaskKind::Search {
            return Err(RoutingError::UnsupportedTask {
                task_type: kind.to_string(),
                language: language.to_string(),
            }
            .into());
        }

        let capability = capability_for(language);
        debug!(kind = %kind, language = %language, capability, "Routing task");

        let entry = self.providers.completion_by_name(capability).ok_or_else(|| {
            SamikshaError::Routing(RoutingError::CapabilityUnavailable {
                capability: capability.to_string(),
                task_type: kind.to_string(),
            })
        })?;

        let request = CompletionRequest::new(prompt, self.config.generation);
        let response = tokio::time::timeout(
            self.config.completion_timeout(),
            entry.client.complete(request),
        )
        .await
        .map_err(|_| {
            SamikshaError::Provider(crate::error::ProviderError::Timeout {
                timeout_secs: self.config.completion_timeout_secs,
            })
        })??;

        info!(capability, language = %language, "Routed task completed");
        Ok(RoutedOutput {
            text: response.text,
            capability: capability.to_string(),
        })
    }
}
