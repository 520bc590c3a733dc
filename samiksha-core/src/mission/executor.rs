//! Mission execution.
//!
//! Drives a planned mission through its subtasks in strict planning
//! order. Each subtask type dispatches to its capability role: search
//! subtasks hit the search capability, vernacular analysis goes through
//! the language router, and everything else walks the orchestrator's
//! fallback chain. The first failure marks the subtask and the mission
//! failed and stops the loop; results of already-completed subtasks are
//! preserved.

use crate::config::OrchestratorConfig;
use crate::mission::{
    CapabilityRole, CollectedSource, Mission, MissionStatus, SourceOrigin, SubtaskStatus,
    SubtaskType,
};
use crate::orchestrator::Orchestrator;
use crate::providers::ProviderSet;
use crate::router::TaskRouter;
use crate::types::{SearchRequest, TaskKind, TaskRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Executes missions over the configured capability set.
pub struct MissionExecutor {
    providers: Arc<ProviderSet>,
    orchestrator: Orchestrator,
    router: TaskRouter,
    config: OrchestratorConfig,
}

impl MissionExecutor {
    pub fn new(providers: Arc<ProviderSet>, config: OrchestratorConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(providers.clone(), config.clone()),
            router: TaskRouter::new(providers.clone(), config.clone()),
            providers,
            config,
        }
    }

    /// Run every subtask in planning order and return the finished
    /// mission, completed or failed.
    pub async fn execute(&self, mut mission: Mission) -> Mission {
        info!(mission = %mission.id, title = %mission.title, "Executing mission");

        let outcome = self.orchestrator.validate_and_initialize().await;
        if !outcome.is_valid {
            warn!(mission = %mission.id, "Mission rejected: capabilities not valid");
            let _ = mission.transition(MissionStatus::Failed);
            return mission;
        }

        if mission.transition(MissionStatus::Collecting).is_err() {
            warn!(mission = %mission.id, status = ?mission.status, "Mission not in a runnable state");
            let _ = mission.transition(MissionStatus::Failed);
            return mission;
        }

        for index in 0..mission.subtasks.len() {
            let kind = mission.subtasks[index].kind;
            if self.advance_phase(&mut mission, kind).is_err() {
                let _ = mission.transition(MissionStatus::Failed);
                return mission;
            }

            mission.subtasks[index].start();
            let start = Instant::now();
            info!(mission = %mission.id, subtask = kind.name(), "Running subtask");

            let outcome = if kind == SubtaskType::Search {
                // the search subtask's hits become mission sources
                let found = self.run_search(&mission).await;
                found.map(|sources| {
                    for source in sources {
                        mission.add_source(source);
                    }
                    format!("collected {} sources", mission.sources.len())
                })
            } else {
                self.run_subtask(&mission, index).await
            };

            match outcome {
                Ok(result) => {
                    let elapsed = start.elapsed().as_millis() as u64;
                    mission.subtasks[index].complete(result, elapsed);
                }
                Err(message) => {
                    let elapsed = start.elapsed().as_millis() as u64;
                    warn!(
                        mission = %mission.id,
                        subtask = kind.name(),
                        error = %message,
                        "Subtask failed, stopping mission"
                    );
                    mission.subtasks[index].fail(message, elapsed);
                    let _ = mission.transition(MissionStatus::Failed);
                    return mission;
                }
            }
        }

        mission.analysis = collect_analysis(&mission);
        mission.report = mission
            .subtasks
            .iter()
            .rev()
            .find(|s| s.kind == SubtaskType::Synthesize)
            .and_then(|s| s.result.clone());

        if mission.transition(MissionStatus::Completed).is_err() {
            let _ = mission.transition(MissionStatus::Failed);
            return mission;
        }
        info!(mission = %mission.id, sources = mission.sources.len(), "Mission completed");
        mission
    }

    /// Move the mission's phase forward to match the subtask about to run.
    fn advance_phase(
        &self,
        mission: &mut Mission,
        kind: SubtaskType,
    ) -> Result<(), crate::error::PipelineError> {
        let target = match kind {
            SubtaskType::Search | SubtaskType::Collect => MissionStatus::Collecting,
            SubtaskType::Sentiment | SubtaskType::Price | SubtaskType::Cultural => {
                MissionStatus::Analyzing
            }
            SubtaskType::Synthesize => MissionStatus::Synthesizing,
        };
        if mission.status == target {
            return Ok(());
        }
        mission.transition(target)
    }

    /// Dispatch one non-search subtask to its capability role. Returns
    /// the produced text, or the error message that failed it.
    async fn run_subtask(&self, mission: &Mission, index: usize) -> Result<String, String> {
        let subtask = &mission.subtasks[index];
        match subtask.kind {
            SubtaskType::Collect => Ok(run_collect(mission)),
            _ => match subtask.role {
                CapabilityRole::Vernacular => self.run_vernacular(mission, index).await,
                _ => self.run_completion(mission, index).await,
            },
        }
    }

    /// Search subtask: one bounded call against the search capability,
    /// hits classified into ranked sources.
    async fn run_search(&self, mission: &Mission) -> Result<Vec<CollectedSource>, String> {
        let entry = self
            .providers
            .search()
            .ok_or_else(|| "search capability is not configured".to_string())?;

        let request = SearchRequest::new(&mission.prompt, self.config.search_max_results);
        let response = tokio::time::timeout(self.config.search_timeout(), entry.client.search(request))
            .await
            .map_err(|_| {
                format!("search timed out after {}s", self.config.search_timeout_secs)
            })?
            .map_err(|e| e.to_string())?;

        Ok(response
            .results
            .into_iter()
            .map(|hit| {
                let origin = classify_origin(&hit.url);
                let mut source = CollectedSource::new(hit.url, hit.title, hit.content, hit.score);
                source.origin = origin;
                source
            })
            .collect())
    }

    /// Vernacular analysis: single-shot through the language router with
    /// the mission's primary language.
    async fn run_vernacular(&self, mission: &Mission, index: usize) -> Result<String, String> {
        let output = self
            .router
            .route(
                TaskKind::Analysis,
                mission.primary_language(),
                &subtask_prompt(mission, index),
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(output.text)
    }

    /// Completion-role subtasks walk the orchestrator's fallback chain.
    async fn run_completion(&self, mission: &Mission, index: usize) -> Result<String, String> {
        let response = self
            .orchestrator
            .process_task(TaskRequest::completion(subtask_prompt(mission, index)))
            .await;
        if response.success {
            Ok(response.text.unwrap_or_default())
        } else {
            Err(response
                .error
                .unwrap_or_else(|| "completion failed".to_string()))
        }
    }
}

/// Collect is a local step: the search subtask already ranked the
/// sources, so collection dedupes by url and summarizes.
fn run_collect(mission: &Mission) -> String {
    let mut seen = std::collections::HashSet::new();
    let unique = mission
        .sources
        .iter()
        .filter(|s| seen.insert(s.url.as_str()))
        .count();
    format!(
        "{unique} unique sources across {} languages",
        mission.languages.len()
    )
}

/// Fold the mission context and top-ranked source snippets into a
/// subtask prompt.
fn subtask_prompt(mission: &Mission, index: usize) -> String {
    let subtask = &mission.subtasks[index];
    let mut prompt = format!("{}\n\nMission: {}\n", subtask.description, mission.prompt);

    let completed: Vec<&str> = mission.subtasks[..index]
        .iter()
        .filter(|s| s.status == SubtaskStatus::Completed)
        .filter_map(|s| s.result.as_deref())
        .collect();
    if !completed.is_empty() {
        prompt.push_str("\nEarlier findings:\n");
        for finding in completed {
            prompt.push_str(finding);
            prompt.push('\n');
        }
    }

    if !mission.sources.is_empty() {
        prompt.push_str("\nTop sources:\n");
        for source in mission.sources.iter().take(5) {
            prompt.push_str(&format!("- {} ({})\n  {}\n", source.title, source.url, source.snippet));
        }
    }
    prompt
}

fn classify_origin(url: &str) -> SourceOrigin {
    const SOCIAL: &[&str] = &["twitter.", "x.com", "facebook.", "instagram.", "sharechat"];
    const NEWS: &[&str] = &["news", "times", "express", "hindustan", "thehindu"];
    const FORUM: &[&str] = &["forum", "reddit.", "quora."];

    if SOCIAL.iter().any(|d| url.contains(d)) {
        SourceOrigin::Social
    } else if FORUM.iter().any(|d| url.contains(d)) {
        SourceOrigin::Forum
    } else if NEWS.iter().any(|d| url.contains(d)) {
        SourceOrigin::News
    } else {
        SourceOrigin::Web
    }
}

/// Join the analysis-stage results in subtask order.
fn collect_analysis(mission: &Mission) -> Option<String> {
    let parts: Vec<&str> = mission
        .subtasks
        .iter()
        .filter(|s| {
            matches!(
                s.kind,
                SubtaskType::Sentiment | SubtaskType::Price | SubtaskType::Cultural
            )
        })
        .filter_map(|s| s.result.as_deref())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
