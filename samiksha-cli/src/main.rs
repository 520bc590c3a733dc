//! Samiksha CLI — vernacular market-research orchestration from the
//! terminal.

use anyhow::Context;
use clap::Parser;
use samiksha_core::{
    MissionExecutor, MissionPlanner, MissionReport, Orchestrator, OrchestratorConfig, ProviderSet,
    TaskRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Samiksha: vernacular market research over interchangeable providers
#[derive(Parser, Debug)]
#[command(name = "samiksha", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./samiksha.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human output
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate capabilities and show orchestrator status
    Status,
    /// Run a single task through the orchestrator
    Task {
        /// The task prompt
        prompt: String,
        /// Force the composed search-and-synthesize path
        #[arg(long)]
        realtime: bool,
    },
    /// Plan a mission from a prompt without executing it
    Plan {
        /// The research prompt
        prompt: String,
    },
    /// Plan and execute a full research mission
    Mission {
        /// The research prompt
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = OrchestratorConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Status => status(config, cli.json).await,
        Commands::Task { prompt, realtime } => task(config, prompt, realtime, cli.json).await,
        Commands::Plan { prompt } => plan(prompt, cli.json),
        Commands::Mission { prompt } => mission(config, prompt, cli.json).await,
    }
}

async fn status(config: OrchestratorConfig, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_env(config);
    let outcome = orchestrator.validate_and_initialize().await;
    let status = orchestrator.status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "Orchestrator: {}",
        if status.is_valid { "valid" } else { "NOT VALID" }
    );
    println!(
        "  primary completion: {}",
        status.primary_provider.as_deref().unwrap_or("none")
    );
    println!(
        "  search:             {}",
        status.search_provider.as_deref().unwrap_or("none")
    );
    println!("  healthy:            {}", status.healthy_providers.join(", "));
    for error in &outcome.errors {
        println!("  problem: {error}");
    }
    Ok(())
}

async fn task(
    config: OrchestratorConfig,
    prompt: String,
    realtime: bool,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_env(config);
    let mut request = TaskRequest::completion(prompt);
    request.requires_realtime = realtime;

    let response = orchestrator.process_task(request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.success {
        println!("{}", response.text.as_deref().unwrap_or(""));
        if !response.citations.is_empty() {
            println!("\nSources:");
            for citation in &response.citations {
                println!("  - {} ({})", citation.title, citation.url);
            }
        }
        eprintln!(
            "\n[{} in {}ms]",
            response.provider_id(),
            response.latency_ms
        );
        Ok(())
    } else {
        anyhow::bail!(
            "task failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        )
    }
}

fn plan(prompt: String, json: bool) -> anyhow::Result<()> {
    let mission = MissionPlanner::new().plan(&prompt);

    if json {
        println!("{}", serde_json::to_string_pretty(&mission)?);
        return Ok(());
    }

    println!("Mission: {}", mission.title);
    println!(
        "  languages: {}",
        mission
            .languages
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  timeframe: {:?}", mission.timeframe);
    println!("  focus:     {:?}", mission.focus);
    println!("  estimated cost: ${:.3}", mission.estimated_cost());
    println!("  subtasks:");
    for subtask in &mission.subtasks {
        println!("    {} — {}", subtask.kind.name(), subtask.description);
    }
    Ok(())
}

async fn mission(config: OrchestratorConfig, prompt: String, json: bool) -> anyhow::Result<()> {
    let providers = Arc::new(ProviderSet::from_env(&config));
    let executor = MissionExecutor::new(providers, config);

    let planned = MissionPlanner::new().plan(&prompt);
    let finished = executor.execute(planned).await;
    let report = MissionReport::from_mission(&finished);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_markdown());
    }

    if finished.status == samiksha_core::MissionStatus::Failed {
        anyhow::bail!("mission failed");
    }
    Ok(())
}
