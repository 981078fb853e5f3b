// Bugscribe - conversational bug progress reporter
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use bugscribe::cli::Repl;
use bugscribe::config::constants::{DEFAULT_MAX_TURNS, DEFAULT_RESULTS_DIR};
use bugscribe::config::load_config;
use bugscribe::dataset::JsonDataset;
use bugscribe::logging::init_tracing;
use bugscribe::metrics;
use bugscribe::output::ArtifactWriter;
use bugscribe::providers::OpenRouterGateway;
use bugscribe::session::ConversationEngine;

#[derive(Parser)]
#[command(name = "bugscribe", version, about = "Interview a developer and record bug progress")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding developers.json and bugs.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for traces/ and outputs/
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Model identifier, overriding the configured one
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive reporting session (default)
    Chat,
    /// Summarize saved sessions
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(cli.data_dir, cli.results_dir, cli.model).await,
        Command::Metrics => show_metrics(cli.results_dir),
    }
}

async fn chat(
    data_dir: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    model: Option<String>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = results_dir {
        config.results_dir = dir;
    }
    if let Some(model) = model {
        config.model = model;
    }
    config.validate()?;

    let dataset = JsonDataset::load(&config.data_dir)
        .with_context(|| format!("Failed to load dataset from {}", config.data_dir.display()))?;
    eprintln!(
        "✓ Loaded {} developers and {} bugs",
        dataset.developers().len(),
        dataset.bugs().len()
    );

    let gateway =
        OpenRouterGateway::from_config(&config).context("Failed to create model gateway")?;
    let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(dataset), config.session);
    let writer = ArtifactWriter::new(&config.results_dir)?;

    Repl::new(engine, writer).run().await?;
    Ok(())
}

fn show_metrics(results_dir: Option<PathBuf>) -> Result<()> {
    // Metrics only read local files, so a missing API key is not an error here
    let config = load_config().ok();
    let results_dir = results_dir
        .or_else(|| config.as_ref().map(|c| c.results_dir.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR));
    let budget = config
        .as_ref()
        .map(|c| c.session.max_turns)
        .unwrap_or(DEFAULT_MAX_TURNS);

    let report = metrics::from_results_dir(&results_dir, budget)?;
    println!("{}", report);
    let path = metrics::save_report(&results_dir, &report)?;
    eprintln!("✓ Report saved to {}", path.display());
    Ok(())
}
