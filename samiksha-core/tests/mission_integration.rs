//! End-to-end tests over mock providers: plan a mission, execute it,
//! and exercise the orchestrator surface the way the CLI does.

use samiksha_core::providers::{
    CompletionEntry, MockCompletionProvider, MockSearchProvider, mock_completion_entry, mock_hit,
    mock_search_entry,
};
use samiksha_core::{
    Capability, ConfigError, Mission, MissionExecutor, MissionPlanner, MissionReport,
    MissionStatus, Orchestrator, OrchestratorConfig, ProviderSet, SubtaskStatus, TaskRequest,
};
use std::sync::Arc;

fn full_mock_set() -> Arc<ProviderSet> {
    Arc::new(ProviderSet::new(
        vec![
            mock_completion_entry(
                "sarvam",
                MockCompletionProvider::with_response("sarvam", "उपभोक्ता कीमतों को लेकर सतर्क हैं"),
            ),
            mock_completion_entry(
                "openai",
                MockCompletionProvider::with_response("openai", "general analysis"),
            ),
        ],
        Some(mock_search_entry(MockSearchProvider::with_hits(
            "tavily",
            vec![
                mock_hit("https://timesofindia.example/prices", "Festival price report"),
                mock_hit("https://twitter.com/consumer/1", "Buyer thread"),
                mock_hit("https://example.com/survey", "Market survey"),
            ],
        ))),
    ))
}

async fn run_mission(prompt: &str) -> Mission {
    let executor = MissionExecutor::new(full_mock_set(), OrchestratorConfig::default());
    let planned = MissionPlanner::new().plan(prompt);
    executor.execute(planned).await
}

#[tokio::test]
async fn test_full_mission_lifecycle() {
    let mission =
        run_mission("Analyze Hindi discussions about price sensitivity this month").await;

    assert_eq!(mission.status, MissionStatus::Completed);
    assert!(mission.completed_at >= Some(mission.created_at));
    assert_eq!(mission.subtasks.len(), 4);
    assert!(
        mission
            .subtasks
            .iter()
            .all(|s| s.status == SubtaskStatus::Completed)
    );

    // three hits collected, highest relevance first
    assert_eq!(mission.sources.len(), 3);
    assert!(
        mission
            .sources
            .windows(2)
            .all(|w| w[0].relevance >= w[1].relevance)
    );

    let report = MissionReport::from_mission(&mission);
    let markdown = report.render_markdown();
    assert!(markdown.contains("## Findings"));
    assert!(markdown.contains("## Sources"));
    assert!(markdown.contains("Status: completed"));
}

#[tokio::test]
async fn test_comprehensive_mission_runs_every_analysis_step() {
    let mission = run_mission("smartphone market overview").await;

    assert_eq!(mission.status, MissionStatus::Completed);
    // search, collect, sentiment, price, cultural, synthesize
    assert_eq!(mission.subtasks.len(), 6);
    assert!(mission.analysis.is_some());
    assert!(mission.report.is_some());
}

#[tokio::test]
async fn test_orchestrator_fallback_visible_in_response() {
    let sarvam = MockCompletionProvider::new("sarvam");
    sarvam.queue_ok("probe ok");
    sarvam.queue_err(samiksha_core::ProviderError::Api {
        status: 502,
        message: "bad gateway".into(),
    });
    let set = Arc::new(ProviderSet::new(
        vec![
            mock_completion_entry("sarvam", sarvam),
            mock_completion_entry(
                "openai",
                MockCompletionProvider::with_response("openai", "fallback text"),
            ),
        ],
        Some(mock_search_entry(MockSearchProvider::with_hits("tavily", vec![]))),
    ));
    let orchestrator = Orchestrator::new(set, OrchestratorConfig::default());

    let response = orchestrator
        .process_task(TaskRequest::completion("summarize the market"))
        .await;
    assert!(response.success);
    assert_eq!(response.providers, vec!["openai"]);
}

#[tokio::test]
async fn test_composed_search_task_cites_sources() {
    let orchestrator = Orchestrator::new(full_mock_set(), OrchestratorConfig::default());

    let response = orchestrator
        .process_task(TaskRequest::search("latest festival discounts"))
        .await;
    assert!(response.success);
    assert_eq!(response.provider_id(), "tavily+sarvam");
    assert_eq!(response.citations.len(), 3);
}

#[tokio::test]
async fn test_search_only_configuration_is_one_config_error() {
    let set = Arc::new(ProviderSet::new(
        vec![],
        Some(mock_search_entry(MockSearchProvider::with_hits("tavily", vec![]))),
    ));
    let orchestrator = Orchestrator::new(set, OrchestratorConfig::default());

    let outcome = orchestrator.validate_and_initialize().await;
    assert!(!outcome.is_valid);
    assert_eq!(outcome.errors.len(), 1);
    let expected: ConfigError = ConfigError::NoCompletionCapability {
        expected: Capability::completion_order()
            .iter()
            .map(|c| c.api_key_env)
            .collect::<Vec<_>>()
            .join(", "),
    };
    assert_eq!(outcome.errors[0], expected.to_string());
}

#[tokio::test]
async fn test_concurrent_tasks_share_one_validation_round() {
    let sarvam = Arc::new(MockCompletionProvider::with_response("sarvam", "ok"));
    let set = Arc::new(ProviderSet::new(
        vec![CompletionEntry {
            capability: Capability::by_name("sarvam").unwrap(),
            client: sarvam.clone(),
        }],
        Some(mock_search_entry(MockSearchProvider::with_hits("tavily", vec![]))),
    ));
    let orchestrator = Arc::new(Orchestrator::new(set, OrchestratorConfig::default()));

    let tasks = (0..8).map(|i| {
        let o = orchestrator.clone();
        async move { o.process_task(TaskRequest::completion(format!("task {i}"))).await }
    });
    let responses = futures::future::join_all(tasks).await;

    assert!(responses.iter().all(|r| r.success));
    // 1 shared probe + 8 task completions
    assert_eq!(sarvam.call_count(), 9);
}

#[tokio::test]
async fn test_failed_mission_preserves_completed_work() {
    let sarvam = MockCompletionProvider::new("sarvam");
    sarvam.queue_ok("probe ok");
    sarvam.queue_err(samiksha_core::ProviderError::Timeout { timeout_secs: 30 });
    let set = Arc::new(ProviderSet::new(
        vec![mock_completion_entry("sarvam", sarvam)],
        Some(mock_search_entry(MockSearchProvider::with_hits(
            "tavily",
            vec![mock_hit("https://example.com/a", "A")],
        ))),
    ));
    let executor = MissionExecutor::new(set, OrchestratorConfig::default());

    let planned = MissionPlanner::new().plan("Hindi sentiment on electric scooters");
    let mission = executor.execute(planned).await;

    assert_eq!(mission.status, MissionStatus::Failed);
    assert!(mission.completed_at.is_some());
    assert_eq!(mission.sources.len(), 1);
    assert_eq!(mission.subtasks[0].status, SubtaskStatus::Completed);
    assert_eq!(mission.subtasks[1].status, SubtaskStatus::Completed);
    assert_eq!(mission.subtasks[2].status, SubtaskStatus::Failed);
    assert!(
        mission.subtasks[3..]
            .iter()
            .all(|s| s.status == SubtaskStatus::Pending)
    );
}
