//! Mission planning from free-form prompts.
//!
//! Pure keyword extraction: no remote calls, never fails. Unmatched
//! prompts fall back to the documented defaults (all languages, one
//! week, comprehensive focus).

use crate::mission::{Focus, Mission, MissionStatus, Subtask, SubtaskType, Timeframe};
use crate::types::{Language, now};
use tracing::debug;
use uuid::Uuid;

const TITLE_MAX_CHARS: usize = 60;

const QUARTER_KEYWORDS: &[&str] = &["quarter", "quarterly", "3 months", "three months", "90 days"];
const MONTH_KEYWORDS: &[&str] = &["month", "monthly", "30 days", "four weeks"];

const PRICE_KEYWORDS: &[&str] = &["price", "pricing", "cost", "affordab", "discount", "budget"];
const SENTIMENT_KEYWORDS: &[&str] = &[
    "sentiment",
    "opinion",
    "feel",
    "perception",
    "review",
    "reaction",
];
const CULTURAL_KEYWORDS: &[&str] = &[
    "cultural",
    "culture",
    "festival",
    "tradition",
    "regional",
    "custom",
];

/// Builds missions from prompts.
pub struct MissionPlanner;

impl MissionPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan a mission: extract languages, timeframe, and focus from the
    /// prompt, then lay out the fixed subtask sequence for that focus.
    pub fn plan(&self, prompt: &str) -> Mission {
        let lowered = prompt.to_lowercase();

        let languages = extract_languages(&lowered, prompt);
        let timeframe = extract_timeframe(&lowered);
        let focus = extract_focus(&lowered);
        let subtasks = plan_subtasks(focus, &languages, timeframe);

        debug!(
            languages = languages.len(),
            timeframe = ?timeframe,
            focus = ?focus,
            subtasks = subtasks.len(),
            "Planned mission"
        );

        Mission {
            id: Uuid::new_v4(),
            title: derive_title(prompt),
            prompt: prompt.to_string(),
            languages,
            timeframe,
            focus,
            status: MissionStatus::Pending,
            subtasks,
            sources: Vec::new(),
            analysis: None,
            report: None,
            created_at: now(),
            completed_at: None,
        }
    }
}

impl Default for MissionPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Languages named in the prompt, in the fixed language order.
/// No match means the mission spans the full set.
fn extract_languages(lowered: &str, original: &str) -> Vec<Language> {
    let matched: Vec<Language> = Language::ALL
        .iter()
        .copied()
        .filter(|lang| {
            lang.keywords()
                .iter()
                // native-script names are matched against the raw prompt
                .any(|kw| lowered.contains(kw) || original.contains(kw))
        })
        .collect();

    if matched.is_empty() {
        Language::ALL.to_vec()
    } else {
        matched
    }
}

/// Longest window wins: quarter over month over the week default.
fn extract_timeframe(lowered: &str) -> Timeframe {
    if QUARTER_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Timeframe::Quarter
    } else if MONTH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Timeframe::Month
    } else {
        Timeframe::Week
    }
}

/// Focus precedence: price > sentiment > cultural > comprehensive.
fn extract_focus(lowered: &str) -> Focus {
    if PRICE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Focus::Price
    } else if SENTIMENT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Focus::Sentiment
    } else if CULTURAL_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        Focus::Cultural
    } else {
        Focus::Comprehensive
    }
}

/// Fixed focus→subtask routing: search and collect always open the
/// mission, synthesize always closes it, analysis steps depend on focus.
fn plan_subtasks(focus: Focus, languages: &[Language], timeframe: Timeframe) -> Vec<Subtask> {
    let names: Vec<&str> = languages.iter().map(|l| l.name()).collect();
    let window = match timeframe {
        Timeframe::Week => "the past week",
        Timeframe::Month => "the past month",
        Timeframe::Quarter => "the past quarter",
    };

    let mut subtasks = vec![
        Subtask::new(
            SubtaskType::Search,
            format!(
                "Search {} discussions from {window}",
                names.join(", ")
            ),
        ),
        Subtask::new(
            SubtaskType::Collect,
            "Collect and rank the discovered sources",
        ),
    ];

    if matches!(focus, Focus::Sentiment | Focus::Comprehensive) {
        subtasks.push(Subtask::new(
            SubtaskType::Sentiment,
            "Read consumer sentiment across the collected sources",
        ));
    }
    if matches!(focus, Focus::Price | Focus::Comprehensive) {
        subtasks.push(Subtask::new(
            SubtaskType::Price,
            "Extract price points and price sensitivity signals",
        ));
    }
    if matches!(focus, Focus::Cultural | Focus::Comprehensive) {
        subtasks.push(Subtask::new(
            SubtaskType::Cultural,
            "Identify cultural and regional context in the sources",
        ));
    }

    subtasks.push(Subtask::new(
        SubtaskType::Synthesize,
        "Synthesize the findings into a market report",
    ));
    subtasks
}

fn derive_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}…", cut.trim_end())
    }
}
