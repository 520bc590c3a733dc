//! Orchestrator configuration.
//!
//! Layered figment loading: built-in defaults, then an optional
//! `samiksha.toml`, then `SAMIKSHA_`-prefixed environment variables.
//! Capability credentials are deliberately *not* part of this file —
//! they are read straight from the environment by the registry.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::types::GenerationParams;

/// Tunables for the orchestration core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Validation snapshot time-to-live, in seconds.
    pub validation_ttl_secs: u64,
    /// Timeout for a single completion call, in seconds.
    pub completion_timeout_secs: u64,
    /// Timeout for a single search call, in seconds.
    pub search_timeout_secs: u64,
    /// Timeout for a single health probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Number of results requested per search call.
    pub search_max_results: usize,
    /// Default generation parameters for completion tasks.
    pub generation: GenerationParams,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            validation_ttl_secs: 300,
            completion_timeout_secs: 30,
            search_timeout_secs: 10,
            probe_timeout_secs: 8,
            search_max_results: 5,
            generation: GenerationParams::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration: defaults < `samiksha.toml` (if present) <
    /// `SAMIKSHA_*` environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(OrchestratorConfig::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file("samiksha.toml"));
        }

        let config: OrchestratorConfig = figment
            .merge(Env::prefixed("SAMIKSHA_"))
            .extract()
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the orchestrator misbehave.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.validation_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "validation_ttl_secs must be greater than zero".to_string(),
            });
        }
        if self.search_max_results == 0 {
            return Err(ConfigError::Invalid {
                message: "search_max_results must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn validation_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.validation_ttl_secs)
    }

    pub fn completion_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn search_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.search_timeout_secs)
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.probe_timeout_secs)
    }
}
