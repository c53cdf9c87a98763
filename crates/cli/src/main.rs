//! Employee Assistant CLI
//!
//! Main entry point for the assistant command-line tool.
//! Ingests extracted documents and answers questions over them.

mod commands;

use assistant_core::{config::AppConfig, logging};
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, FormsCommand, IngestCommand, StatsCommand};
use std::path::PathBuf;

/// Employee Assistant - answers questions from your document corpus
#[derive(Parser, Debug)]
#[command(name = "assistant")]
#[command(about = "Question answering over company documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ASSISTANT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ASSISTANT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the vector index from processed documents
    Ingest(IngestCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Answer questions read line by line from stdin
    Chat(ChatCommand),

    /// Show index statistics
    Stats(StatsCommand),

    /// Form assistance
    Forms(FormsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Generation: {:?}", config.generation);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
        Commands::Forms(_) => "forms",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config),
        Commands::Forms(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
