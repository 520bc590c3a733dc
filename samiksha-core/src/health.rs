//! Capability health validation.
//!
//! Probes every enabled capability concurrently with a minimal call
//! (1-token completion, 1-result search) and caches the resulting
//! `ValidationSnapshot` for a TTL window. Recomputation after expiry is
//! single-flight: concurrent callers await the same refresh instead of
//! issuing redundant probe storms.

use crate::config::OrchestratorConfig;
use crate::error::ConfigError;
use crate::providers::{CompletionEntry, ProviderSet, SearchEntry};
use crate::registry::Capability;
use crate::types::{CompletionRequest, SearchRequest};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Liveness status of one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    NotConfigured,
}

/// Outcome of probing one capability.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub capability: String,
    pub status: HealthStatus,
    /// Probe round-trip, present only when healthy.
    pub latency_ms: Option<u64>,
    /// Probe error, present only when unhealthy.
    pub error: Option<String>,
}

impl HealthCheckResult {
    fn healthy(capability: &str, latency: Duration) -> Self {
        Self {
            capability: capability.to_string(),
            status: HealthStatus::Healthy,
            latency_ms: Some(latency.as_millis() as u64),
            error: None,
        }
    }

    fn unhealthy(capability: &str, error: impl Into<String>) -> Self {
        Self {
            capability: capability.to_string(),
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    fn not_configured(capability: &str) -> Self {
        Self {
            capability: capability.to_string(),
            status: HealthStatus::NotConfigured,
            latency_ms: None,
            error: None,
        }
    }
}

/// The cached result of one probe round across all enabled capabilities.
#[derive(Debug, Clone)]
pub struct ValidationSnapshot {
    /// Monotonic instant used for TTL checks.
    taken_at: Instant,
    /// Wall-clock time of the probe round, for reporting.
    pub taken_at_utc: DateTime<Utc>,
    /// Names of capabilities that answered their probe.
    pub healthy: Vec<String>,
    /// Highest-priority healthy completion capability.
    pub primary_completion: Option<String>,
    /// The search capability, iff healthy.
    pub search_capability: Option<String>,
    /// True iff at least one completion capability is healthy AND the
    /// search capability is healthy.
    pub is_valid: bool,
    /// Per-capability probe outcomes, not-configured entries last.
    pub results: Vec<HealthCheckResult>,
}

impl ValidationSnapshot {
    /// Whether the snapshot is still within its TTL window.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.taken_at.elapsed() < ttl
    }

    pub fn is_healthy(&self, capability: &str) -> bool {
        self.healthy.iter().any(|name| name == capability)
    }
}

/// Probes capability liveness and owns the snapshot cache.
///
/// Injected into the orchestrator and mission executor; never a global.
pub struct HealthValidator {
    providers: Arc<ProviderSet>,
    ttl: Duration,
    probe_timeout: Duration,
    snapshot: RwLock<Option<ValidationSnapshot>>,
    /// Held for the duration of a refresh so concurrent expired callers
    /// queue behind one probe round.
    refresh: Mutex<()>,
}

impl HealthValidator {
    pub fn new(providers: Arc<ProviderSet>, config: &OrchestratorConfig) -> Self {
        Self {
            providers,
            ttl: config.validation_ttl(),
            probe_timeout: config.probe_timeout(),
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return a fresh validation snapshot, probing only if the cached
    /// one has expired.
    ///
    /// An individual probe failure never errors this call; only missing
    /// configuration (no completion capability, or no search capability)
    /// is a hard failure, raised before any probe is issued.
    pub async fn validate(&self) -> Result<ValidationSnapshot, ConfigError> {
        if let Some(snapshot) = self.read_fresh().await {
            debug!("Reusing cached validation snapshot");
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have completed the refresh while we waited.
        if let Some(snapshot) = self.read_fresh().await {
            return Ok(snapshot);
        }

        let snapshot = self.probe_all().await?;
        info!(
            is_valid = snapshot.is_valid,
            primary = snapshot.primary_completion.as_deref().unwrap_or("none"),
            healthy = snapshot.healthy.len(),
            "Validation snapshot refreshed"
        );
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The last computed snapshot, fresh or not.
    pub async fn last_snapshot(&self) -> Option<ValidationSnapshot> {
        self.snapshot.read().await.clone()
    }

    async fn read_fresh(&self) -> Option<ValidationSnapshot> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|s| s.is_fresh(self.ttl))
            .cloned()
    }

    /// Check prerequisites, then probe every enabled capability
    /// concurrently.
    ///
    /// Every missing prerequisite is reported, not just the first.
    async fn probe_all(&self) -> Result<ValidationSnapshot, ConfigError> {
        let mut missing = Vec::new();
        if !self.providers.has_completion() {
            let expected = Capability::completion_order()
                .iter()
                .map(|c| c.api_key_env)
                .collect::<Vec<_>>()
                .join(", ");
            missing.push(ConfigError::NoCompletionCapability { expected });
        }
        if self.providers.search().is_none() {
            let cap = Capability::search_capability();
            missing.push(ConfigError::SearchNotConfigured {
                name: cap.name.to_string(),
                var: cap.api_key_env.to_string(),
                prefix: cap.key_prefix.to_string(),
            });
        }
        match missing.len() {
            0 => {}
            1 => return Err(missing.remove(0)),
            _ => return Err(ConfigError::MissingPrerequisites { errors: missing }),
        }
        let search_entry = self
            .providers
            .search()
            .expect("search entry present after the prerequisite check");

        let completion_probes = self
            .providers
            .completions()
            .iter()
            .map(|entry| self.probe_completion(entry));
        let (mut results, search_result) = tokio::join!(
            join_all(completion_probes),
            self.probe_search(search_entry)
        );
        results.push(search_result);

        // Capabilities absent from the provider set were never probed.
        for capability in Capability::registry() {
            if !results.iter().any(|r| r.capability == capability.name) {
                results.push(HealthCheckResult::not_configured(capability.name));
            }
        }

        let healthy: Vec<String> = results
            .iter()
            .filter(|r| r.status == HealthStatus::Healthy)
            .map(|r| r.capability.clone())
            .collect();

        // Provider set is kept in priority order, so the first healthy
        // completion entry is the primary.
        let primary_completion = self
            .providers
            .completions()
            .iter()
            .map(|e| e.capability.name.to_string())
            .find(|name| healthy.contains(name));

        let search_healthy = healthy
            .iter()
            .any(|name| name == search_entry.capability.name);
        let search_capability =
            search_healthy.then(|| search_entry.capability.name.to_string());

        let is_valid = primary_completion.is_some() && search_healthy;

        Ok(ValidationSnapshot {
            taken_at: Instant::now(),
            taken_at_utc: Utc::now(),
            healthy,
            primary_completion,
            search_capability,
            is_valid,
            results,
        })
    }

    async fn probe_completion(&self, entry: &CompletionEntry) -> HealthCheckResult {
        let name = entry.capability.name;
        let start = Instant::now();
        match tokio::time::timeout(self.probe_timeout, entry.client.complete(CompletionRequest::probe()))
            .await
        {
            Ok(Ok(_)) => {
                debug!(capability = name, "Completion probe ok");
                HealthCheckResult::healthy(name, start.elapsed())
            }
            Ok(Err(e)) => {
                warn!(capability = name, error = %e, "Completion probe failed");
                HealthCheckResult::unhealthy(name, e.to_string())
            }
            Err(_) => {
                warn!(capability = name, "Completion probe timed out");
                HealthCheckResult::unhealthy(
                    name,
                    format!("probe timed out after {}s", self.probe_timeout.as_secs()),
                )
            }
        }
    }

    async fn probe_search(&self, entry: &SearchEntry) -> HealthCheckResult {
        let name = entry.capability.name;
        let start = Instant::now();
        match tokio::time::timeout(self.probe_timeout, entry.client.search(SearchRequest::probe()))
            .await
        {
            Ok(Ok(_)) => {
                debug!(capability = name, "Search probe ok");
                HealthCheckResult::healthy(name, start.elapsed())
            }
            Ok(Err(e)) => {
                warn!(capability = name, error = %e, "Search probe failed");
                HealthCheckResult::unhealthy(name, e.to_string())
            }
            Err(_) => {
                warn!(capability = name, "Search probe timed out");
                HealthCheckResult::unhealthy(
                    name,
                    format!("probe timed out after {}s", self.probe_timeout.as_secs()),
                )
            }
        }
    }
}
