//! Report assembly from finished missions.
//!
//! In-memory only: the report is a serializable view plus a markdown
//! rendering, nothing is written to disk here.

use crate::mission::{CollectedSource, Focus, Mission, MissionStatus, SubtaskStatus, Timeframe};
use crate::types::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured view of a mission's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    pub mission_id: Uuid,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub status: MissionStatus,
    pub languages: Vec<Language>,
    pub focus: Focus,
    pub timeframe: Timeframe,
    /// The synthesized report text, when the mission got that far.
    pub summary: Option<String>,
    pub analysis: Option<String>,
    pub sources: Vec<CollectedSource>,
    pub subtasks_completed: usize,
    pub subtasks_total: usize,
    pub estimated_cost: f64,
    pub total_duration_ms: u64,
}

impl MissionReport {
    pub fn from_mission(mission: &Mission) -> Self {
        Self {
            mission_id: mission.id,
            title: mission.title.clone(),
            generated_at: crate::types::now(),
            status: mission.status,
            languages: mission.languages.clone(),
            focus: mission.focus,
            timeframe: mission.timeframe,
            summary: mission.report.clone(),
            analysis: mission.analysis.clone(),
            sources: mission.sources.clone(),
            subtasks_completed: mission
                .subtasks
                .iter()
                .filter(|s| s.status == SubtaskStatus::Completed)
                .count(),
            subtasks_total: mission.subtasks.len(),
            estimated_cost: mission.estimated_cost(),
            total_duration_ms: mission
                .subtasks
                .iter()
                .filter_map(|s| s.duration_ms)
                .sum(),
        }
    }

    /// Render the report as markdown.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!(
            "*{:?} · {:?} focus · {} · {}/{} subtasks*\n\n",
            self.timeframe,
            self.focus,
            self.languages
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join(", "),
            self.subtasks_completed,
            self.subtasks_total,
        ));

        if let Some(summary) = &self.summary {
            out.push_str("## Findings\n\n");
            out.push_str(summary);
            out.push_str("\n\n");
        }
        if let Some(analysis) = &self.analysis {
            out.push_str("## Analysis\n\n");
            out.push_str(analysis);
            out.push_str("\n\n");
        }

        if !self.sources.is_empty() {
            out.push_str("## Sources\n\n");
            for source in &self.sources {
                out.push_str(&format!(
                    "- [{}]({}) — relevance {:.2}\n",
                    source.title, source.url, source.relevance
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "---\nEstimated cost: ${:.3} · Duration: {}ms · Status: {}\n",
            self.estimated_cost,
            self.total_duration_ms,
            self.status.name()
        ));
        out
    }
}
