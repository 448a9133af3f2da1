//! GroundTruth CLI
//!
//! Conversational flight lookup over the operations knowledge graph.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groundtruth_agents::{
    AgentExecutor, AppConfig, ChatSession, CompletionProvider, FlightLookupTool, GroqClient, Tool,
};
use groundtruth_core::FlightImportFile;
use groundtruth_db::{init_memory, init_persistent, init_remote, FlightRepository};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// GroundTruth - conversational flight lookup over a knowledge graph
#[derive(Parser)]
#[command(name = "groundtruth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local database path (RocksDB) instead of the remote graph
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    /// Use in-memory database (for testing)
    #[arg(long)]
    memory: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with the flight assistant
    Chat,

    /// Ask a single question and exit
    Ask {
        /// The question, e.g. "What airline operates LX 15?"
        question: String,
    },

    /// Import flight schedule data from a JSON file
    Import {
        /// Path to the schedule JSON
        path: PathBuf,
    },

    /// Show graph statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Local modes need only the completion credential; the default remote
    // graph requires the full credential set before anything runs.
    let db = if cli.memory {
        info!("Using in-memory database");
        init_memory().await?
    } else if let Some(path) = &cli.db_path {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("Using database at: {}", path.display());
        init_persistent(path).await?
    } else {
        let config =
            AppConfig::from_env().map_err(|e| anyhow::anyhow!("System not ready: {e}"))?;
        info!("Connecting to graph at: {}", config.graph_uri);
        init_remote(
            &config.graph_uri,
            &config.graph_username,
            &config.graph_password,
        )
        .await?
    };

    let repo = FlightRepository::new(db);

    match cli.command {
        Commands::Chat => {
            let model = completion_from_env()?;
            cmd_chat(repo, model).await?;
        }
        Commands::Ask { question } => {
            let model = completion_from_env()?;
            cmd_ask(repo, model, question).await?;
        }
        Commands::Import { path } => {
            cmd_import(repo, path).await?;
        }
        Commands::Stats => {
            cmd_stats(repo).await?;
        }
    }

    Ok(())
}

fn completion_from_env() -> Result<GroqClient> {
    AppConfig::completion_key_from_env()
        .map(GroqClient::new)
        .map_err(|e| anyhow::anyhow!("System not ready: {e}"))
}

fn build_session<P: CompletionProvider>(repo: FlightRepository, model: P) -> ChatSession<P> {
    let tool = Arc::new(FlightLookupTool::new(repo)) as Arc<dyn Tool>;
    let executor = AgentExecutor::new(model, vec![tool]);
    ChatSession::new(executor)
}

async fn cmd_chat<P: CompletionProvider>(repo: FlightRepository, model: P) -> Result<()> {
    let mut session = build_session(repo, model);

    println!("GroundTruth Flight Assistant");
    println!("Ask about a flight code. Commands: reset, quit");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let question = line.trim();
        match question {
            "" => continue,

            "quit" | "q" | "exit" => {
                println!("Goodbye!");
                break;
            }

            "reset" => {
                session.reset();
                println!("Conversation cleared.");
            }

            _ => {
                let answer = session.ask(question).await;
                println!("Assistant: {}", answer);
            }
        }

        println!();
    }

    Ok(())
}

async fn cmd_ask<P: CompletionProvider>(
    repo: FlightRepository,
    model: P,
    question: String,
) -> Result<()> {
    let mut session = build_session(repo, model);
    let answer = session.ask(&question).await;
    println!("{}", answer);
    Ok(())
}

async fn cmd_import(repo: FlightRepository, path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let file = FlightImportFile::from_json(&content)
        .with_context(|| format!("Failed to parse schedule from: {}", path.display()))?;

    let loaded = repo.import_schedule(&file).await?;

    println!("✓ Imported {} flights from {}", loaded, path.display());

    Ok(())
}

async fn cmd_stats(repo: FlightRepository) -> Result<()> {
    let stats = repo.stats().await?;

    println!("Graph Statistics:");
    println!("  • Flights: {}", stats.flight_count);
    println!("  • Designators: {}", stats.designator_count);
    println!("  • Airlines: {}", stats.airline_count);
    println!("  • Routes: {}", stats.route_count);

    Ok(())
}
