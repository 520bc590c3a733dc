//! Task orchestration over the capability set.
//!
//! The orchestrator gates every task behind a fresh validation snapshot,
//! then dispatches it: plain completions walk the fixed-priority fallback
//! chain, real-time tasks run the composed search-then-synthesize path.
//! `process_task` never returns an error; failures come back as a
//! `TaskResponse` with `success == false`.

use crate::config::OrchestratorConfig;
use crate::error::{ConfigError, PipelineError};
use crate::health::{HealthStatus, HealthValidator, ValidationSnapshot};
use crate::providers::ProviderSet;
use crate::types::{
    CompletionRequest, GenerationParams, SearchRequest, SearchResponse, TaskKind, TaskRequest,
    TaskResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of an explicit initialization round.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Human-readable problems found, empty when valid.
    pub errors: Vec<String>,
}

/// Point-in-time view of the orchestrator, for status commands.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Whether a validation round has ever completed.
    pub is_initialized: bool,
    pub is_valid: bool,
    pub primary_provider: Option<String>,
    pub search_provider: Option<String>,
    pub healthy_providers: Vec<String>,
    pub last_validation: Option<DateTime<Utc>>,
}

/// Dispatches tasks across the configured capabilities.
pub struct Orchestrator {
    providers: Arc<ProviderSet>,
    validator: HealthValidator,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(providers: Arc<ProviderSet>, config: OrchestratorConfig) -> Self {
        let validator = HealthValidator::new(providers.clone(), &config);
        Self {
            providers,
            validator,
            config,
        }
    }

    /// Build an orchestrator over every capability enabled in the
    /// environment.
    pub fn from_env(config: OrchestratorConfig) -> Self {
        let providers = Arc::new(ProviderSet::from_env(&config));
        Self::new(providers, config)
    }

    /// Run a validation round and report the outcome without failing.
    ///
    /// Configuration problems and unhealthy capabilities are both folded
    /// into the error list so callers can show everything at once.
    pub async fn validate_and_initialize(&self) -> ValidationOutcome {
        match self.validator.validate().await {
            Ok(snapshot) => {
                let errors = snapshot
                    .results
                    .iter()
                    .filter(|r| r.status == HealthStatus::Unhealthy)
                    .map(|r| {
                        format!(
                            "{}: {}",
                            r.capability,
                            r.error.as_deref().unwrap_or("probe failed")
                        )
                    })
                    .collect();
                ValidationOutcome {
                    is_valid: snapshot.is_valid,
                    errors,
                }
            }
            Err(ConfigError::MissingPrerequisites { errors }) => ValidationOutcome {
                is_valid: false,
                errors: errors.iter().map(|e| e.to_string()).collect(),
            },
            Err(e) => ValidationOutcome {
                is_valid: false,
                errors: vec![e.to_string()],
            },
        }
    }

    /// Current orchestrator state from the last validation snapshot.
    pub async fn status(&self) -> OrchestratorStatus {
        match self.validator.last_snapshot().await {
            Some(snapshot) => OrchestratorStatus {
                is_initialized: true,
                is_valid: snapshot.is_valid,
                primary_provider: snapshot.primary_completion.clone(),
                search_provider: snapshot.search_capability.clone(),
                healthy_providers: snapshot.healthy.clone(),
                last_validation: Some(snapshot.taken_at_utc),
            },
            None => OrchestratorStatus {
                is_initialized: false,
                is_valid: false,
                primary_provider: None,
                search_provider: None,
                healthy_providers: Vec::new(),
                last_validation: None,
            },
        }
    }

    /// Process one task end to end.
    ///
    /// Never returns an error: every failure mode lands in the response
    /// with `success == false` and a populated `error`.
    pub async fn process_task(&self, task: TaskRequest) -> TaskResponse {
        let start = Instant::now();
        info!(kind = %task.kind, realtime = task.requires_realtime, "Processing task");

        let snapshot = match self.validator.validate().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Task rejected: configuration invalid");
                return TaskResponse::failure(e.to_string(), Vec::new(), elapsed_ms(start));
            }
        };
        if !snapshot.is_valid {
            warn!("Task rejected: no healthy capability pair");
            return TaskResponse::failure(
                "orchestrator is not in a valid state: requires at least one healthy \
                 completion capability and a healthy search capability",
                Vec::new(),
                elapsed_ms(start),
            );
        }

        let needs_search = task.requires_realtime || task.kind == TaskKind::Search;
        if needs_search {
            self.process_search_task(&task, &snapshot, start).await
        } else {
            self.process_completion_task(&task, &snapshot, start).await
        }
    }

    /// Plain completion: walk the fallback chain.
    async fn process_completion_task(
        &self,
        task: &TaskRequest,
        snapshot: &ValidationSnapshot,
        start: Instant,
    ) -> TaskResponse {
        let request = CompletionRequest::new(&task.prompt, self.params_for(task));
        match self.run_completion_chain(snapshot, request).await {
            Ok((text, capability)) => {
                TaskResponse::ok(text, vec![capability], elapsed_ms(start))
            }
            Err(e) => TaskResponse::failure(e.to_string(), Vec::new(), elapsed_ms(start)),
        }
    }

    /// Composed path: search first, then synthesize the hits through the
    /// completion chain. The response carries both capability names and
    /// citations for every hit used.
    async fn process_search_task(
        &self,
        task: &TaskRequest,
        snapshot: &ValidationSnapshot,
        start: Instant,
    ) -> TaskResponse {
        // snapshot.is_valid guarantees a healthy search entry
        let Some(entry) = self.providers.search() else {
            return TaskResponse::failure(
                "search capability is not configured",
                Vec::new(),
                elapsed_ms(start),
            );
        };
        let search_name = entry.capability.name.to_string();

        let request = SearchRequest::new(&task.prompt, self.config.search_max_results);
        let results = match tokio::time::timeout(
            self.config.search_timeout(),
            entry.client.search(request),
        )
        .await
        {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!(capability = %search_name, error = %e, "Search call failed");
                return TaskResponse::failure(
                    format!("search failed: {e}"),
                    vec![search_name],
                    elapsed_ms(start),
                );
            }
            Err(_) => {
                warn!(capability = %search_name, "Search call timed out");
                return TaskResponse::failure(
                    format!(
                        "search failed: timed out after {}s",
                        self.config.search_timeout_secs
                    ),
                    vec![search_name],
                    elapsed_ms(start),
                );
            }
        };
        debug!(hits = results.results.len(), "Search returned");

        let synthesis =
            CompletionRequest::new(synthesis_prompt(&task.prompt, &results), self.params_for(task));
        match self.run_completion_chain(snapshot, synthesis).await {
            Ok((text, capability)) => {
                TaskResponse::ok(text, vec![search_name, capability], elapsed_ms(start))
                    .with_citations(results.citations())
            }
            Err(e) => {
                TaskResponse::failure(e.to_string(), vec![search_name], elapsed_ms(start))
            }
        }
    }

    /// Try every healthy completion capability in priority order, one
    /// attempt each. Collects every attempt's error so an exhausted chain
    /// reports the full picture.
    async fn run_completion_chain(
        &self,
        snapshot: &ValidationSnapshot,
        request: CompletionRequest,
    ) -> Result<(String, String), PipelineError> {
        let mut attempts: Vec<(String, String)> = Vec::new();

        for entry in self.providers.completions() {
            let name = entry.capability.name;
            if !snapshot.is_healthy(name) {
                debug!(capability = name, "Skipping unhealthy capability");
                continue;
            }

            debug!(capability = name, "Attempting completion");
            match tokio::time::timeout(
                self.config.completion_timeout(),
                entry.client.complete(request.clone()),
            )
            .await
            {
                Ok(Ok(response)) => {
                    info!(capability = name, "Completion succeeded");
                    return Ok((response.text, name.to_string()));
                }
                Ok(Err(e)) => {
                    warn!(capability = name, error = %e, "Completion attempt failed");
                    attempts.push((name.to_string(), e.to_string()));
                }
                Err(_) => {
                    let message = format!(
                        "timed out after {}s",
                        self.config.completion_timeout_secs
                    );
                    warn!(capability = name, "Completion attempt timed out");
                    attempts.push((name.to_string(), message));
                }
            }
        }

        Err(PipelineError::exhausted(attempts))
    }

    fn params_for(&self, task: &TaskRequest) -> GenerationParams {
        task.params.unwrap_or(self.config.generation)
    }
}

/// Render search hits into a synthesis prompt for the completion chain.
fn synthesis_prompt(original: &str, results: &SearchResponse) -> String {
    let mut prompt = String::from("Using only the sources below, answer the request.\n\nSources:\n");
    for (i, hit) in results.results.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {} ({})\n{}\n\n",
            i + 1,
            hit.title,
            hit.url,
            hit.content
        ));
    }
    prompt.push_str(&format!("Request: {original}\n"));
    prompt
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
