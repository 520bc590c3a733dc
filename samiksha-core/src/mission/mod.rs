//! Market-research missions.
//!
//! A mission is a planned, multi-step research request: typed subtasks
//! executed in strict planning order, collected sources ranked by
//! relevance, and a final synthesized report. The planner builds
//! missions from free-form prompts; the executor drives them through
//! the state machine.

pub mod executor;
pub mod planner;
pub mod report;

use crate::error::PipelineError;
use crate::types::{Language, now};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub use executor::MissionExecutor;
pub use planner::MissionPlanner;
pub use report::MissionReport;

/// Lifecycle state of a mission.
///
/// `pending → collecting → (analyzing | synthesizing) → completed`;
/// `failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Pending,
    Collecting,
    Analyzing,
    Synthesizing,
    Completed,
    Failed,
}

impl MissionStatus {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: MissionStatus) -> bool {
        use MissionStatus::*;
        match (self, next) {
            (Pending, Collecting) => true,
            (Collecting, Analyzing) | (Collecting, Synthesizing) => true,
            (Analyzing, Synthesizing) => true,
            (Synthesizing, Completed) => true,
            // failure is reachable from any active state
            (Pending | Collecting | Analyzing | Synthesizing, Failed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            MissionStatus::Pending => "pending",
            MissionStatus::Collecting => "collecting",
            MissionStatus::Analyzing => "analyzing",
            MissionStatus::Synthesizing => "synthesizing",
            MissionStatus::Completed => "completed",
            MissionStatus::Failed => "failed",
        }
    }
}

/// How far the research window reaches back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
}

/// What the mission is trying to learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Sentiment,
    Price,
    Cultural,
    Comprehensive,
}

/// The capability class a subtask is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRole {
    /// Web search.
    Search,
    /// Language-routed completion (sentiment, cultural reads).
    Vernacular,
    /// Fallback-chain completion.
    Completion,
}

/// The kind of work one subtask performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskType {
    Search,
    Collect,
    Sentiment,
    Price,
    Cultural,
    Synthesize,
}

impl SubtaskType {
    pub fn name(self) -> &'static str {
        match self {
            SubtaskType::Search => "search",
            SubtaskType::Collect => "collect",
            SubtaskType::Sentiment => "sentiment",
            SubtaskType::Price => "price",
            SubtaskType::Cultural => "cultural",
            SubtaskType::Synthesize => "synthesize",
        }
    }

    /// Fixed dispatch table: which capability class handles this type.
    pub fn role(self) -> CapabilityRole {
        match self {
            SubtaskType::Search | SubtaskType::Collect => CapabilityRole::Search,
            SubtaskType::Sentiment | SubtaskType::Cultural => CapabilityRole::Vernacular,
            SubtaskType::Price | SubtaskType::Synthesize => CapabilityRole::Completion,
        }
    }

    /// Rough per-call cost in USD, for mission budgeting.
    pub fn estimated_cost(self) -> f64 {
        match self {
            SubtaskType::Search => 0.005,
            SubtaskType::Collect => 0.002,
            SubtaskType::Sentiment | SubtaskType::Price | SubtaskType::Cultural => 0.004,
            SubtaskType::Synthesize => 0.010,
        }
    }
}

/// Per-subtask lifecycle, forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One planned unit of mission work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: Uuid,
    pub kind: SubtaskType,
    pub description: String,
    pub role: CapabilityRole,
    pub status: SubtaskStatus,
    /// Text produced by the subtask, present once completed.
    pub result: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<u64>,
    pub estimated_cost: f64,
}

impl Subtask {
    pub fn new(kind: SubtaskType, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            description: description.into(),
            role: kind.role(),
            status: SubtaskStatus::Pending,
            result: None,
            error: None,
            duration_ms: None,
            estimated_cost: kind.estimated_cost(),
        }
    }

    pub fn start(&mut self) {
        debug_assert_eq!(self.status, SubtaskStatus::Pending);
        self.status = SubtaskStatus::Running;
    }

    pub fn complete(&mut self, result: impl Into<String>, duration_ms: u64) {
        self.status = SubtaskStatus::Completed;
        self.result = Some(result.into());
        self.duration_ms = Some(duration_ms);
    }

    pub fn fail(&mut self, error: impl Into<String>, duration_ms: u64) {
        self.status = SubtaskStatus::Failed;
        self.error = Some(error.into());
        self.duration_ms = Some(duration_ms);
    }
}

/// Where a collected source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    Web,
    Social,
    News,
    Forum,
}

/// A source gathered during collection, ranked by relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedSource {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub language: Option<Language>,
    pub origin: SourceOrigin,
    /// 0.0-1.0, provider-reported or derived.
    pub relevance: f64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CollectedSource {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        relevance: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            language: None,
            origin: SourceOrigin::Web,
            relevance,
            metadata: HashMap::new(),
        }
    }
}

/// A planned research mission and everything it has produced so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub title: String,
    pub prompt: String,
    pub languages: Vec<Language>,
    pub timeframe: Timeframe,
    pub focus: Focus,
    pub status: MissionStatus,
    pub subtasks: Vec<Subtask>,
    pub sources: Vec<CollectedSource>,
    /// Combined analysis text from the analysis-stage subtasks.
    pub analysis: Option<String>,
    /// Final synthesized report, present once completed.
    pub report: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Mission {
    /// Move to `next`, rejecting illegal transitions.
    pub fn transition(&mut self, next: MissionStatus) -> Result<(), PipelineError> {
        if !self.status.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.status.name().to_string(),
                to: next.name().to_string(),
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(now());
        }
        Ok(())
    }

    /// Record a source, keeping the list sorted by relevance descending.
    pub fn add_source(&mut self, source: CollectedSource) {
        let at = self
            .sources
            .partition_point(|s| s.relevance >= source.relevance);
        self.sources.insert(at, source);
    }

    /// The mission's primary language: first extracted, else hindi.
    pub fn primary_language(&self) -> Language {
        self.languages.first().copied().unwrap_or(Language::Hindi)
    }

    /// Sum of per-subtask cost estimates, USD.
    pub fn estimated_cost(&self) -> f64 {
        self.subtasks.iter().map(|s| s.estimated_cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_mission() -> Mission {
        Mission {
            id: Uuid::new_v4(),
            title: "test".into(),
            prompt: "test".into(),
            languages: vec![Language::Hindi],
            timeframe: Timeframe::Week,
            focus: Focus::Comprehensive,
            status: MissionStatus::Pending,
            subtasks: Vec::new(),
            sources: Vec::new(),
            analysis: None,
            report: None,
            created_at: now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_legal_transitions() {
        use MissionStatus::*;
        assert!(Pending.can_transition_to(Collecting));
        assert!(Collecting.can_transition_to(Analyzing));
        assert!(Collecting.can_transition_to(Synthesizing));
        assert!(Analyzing.can_transition_to(Synthesizing));
        assert!(Synthesizing.can_transition_to(Completed));
        assert!(Analyzing.can_transition_to(Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        use MissionStatus::*;
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Synthesizing));
        assert!(!Completed.can_transition_to(Collecting));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
    }

    #[test]
    fn test_mission_transition_rejects_illegal() {
        let mut mission = bare_mission();
        let err = mission.transition(MissionStatus::Completed).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));
        assert_eq!(mission.status, MissionStatus::Pending);
    }

    #[test]
    fn test_terminal_transition_stamps_completed_at() {
        let mut mission = bare_mission();
        mission.transition(MissionStatus::Collecting).unwrap();
        mission.transition(MissionStatus::Synthesizing).unwrap();
        assert!(mission.completed_at.is_none());
        mission.transition(MissionStatus::Completed).unwrap();
        assert!(mission.completed_at.is_some());
    }

    #[test]
    fn test_sources_kept_sorted_by_relevance() {
        let mut mission = bare_mission();
        mission.add_source(CollectedSource::new("https://a", "A", "", 0.4));
        mission.add_source(CollectedSource::new("https://b", "B", "", 0.9));
        mission.add_source(CollectedSource::new("https://c", "C", "", 0.6));

        let order: Vec<&str> = mission.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_subtask_lifecycle() {
        let mut subtask = Subtask::new(SubtaskType::Sentiment, "read sentiment");
        assert_eq!(subtask.status, SubtaskStatus::Pending);
        assert_eq!(subtask.role, CapabilityRole::Vernacular);

        subtask.start();
        subtask.complete("mostly positive", 120);
        assert_eq!(subtask.status, SubtaskStatus::Completed);
        assert_eq!(subtask.result.as_deref(), Some("mostly positive"));
        assert_eq!(subtask.duration_ms, Some(120));
    }

    #[test]
    fn test_cost_estimate_sums_subtasks() {
        let mut mission = bare_mission();
        mission.subtasks.push(Subtask::new(SubtaskType::Search, "s"));
        mission
            .subtasks
            .push(Subtask::new(SubtaskType::Synthesize, "z"));
        assert!((mission.estimated_cost() - 0.015).abs() < 1e-9);
    }
}
