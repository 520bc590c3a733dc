//! # Samiksha Core
//!
//! Core library for the Samiksha vernacular market-research orchestrator.
//! Provides the capability registry, provider clients, health validator,
//! task orchestrator, language router, mission planner/executor, and
//! fundamental types.

pub mod config;
pub mod error;
pub mod health;
pub mod mission;
pub mod orchestrator;
pub mod providers;
pub mod registry;
pub mod router;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::OrchestratorConfig;
pub use error::{
    ConfigError, PipelineError, ProviderError, Result, RoutingError, SamikshaError,
};
pub use health::{HealthCheckResult, HealthStatus, HealthValidator, ValidationSnapshot};
pub use mission::{
    CapabilityRole, CollectedSource, Focus, Mission, MissionExecutor, MissionPlanner,
    MissionReport, MissionStatus, SourceOrigin, Subtask, SubtaskStatus, SubtaskType, Timeframe,
};
pub use orchestrator::{Orchestrator, OrchestratorStatus, ValidationOutcome};
pub use providers::{
    CompletionProvider, MockCompletionProvider, MockSearchProvider, ProviderSet, SearchProvider,
};
pub use registry::{Capability, CapabilityKind};
pub use router::{RoutedOutput, TaskRouter};
pub use types::{
    Citation, CompletionRequest, CompletionResponse, GenerationParams, Language, SearchHit,
    SearchRequest, SearchResponse, TaskKind, TaskRequest, TaskResponse,
};
