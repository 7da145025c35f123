#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::{Context, Result};
use chatfight_core::{Engine, EngineConfig};
use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chatfight: group-chat activity counters and leaderboards",
    long_about = None
)]
struct Cli {
    /// Path to the counters database (overrides config).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the engine config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Ingest activity events from JSONL",
        after_help = "EXAMPLES:\n    # Ingest from a file\n    cf ingest events.jsonl\n\n    # Ingest from stdin\n    tail -f events.jsonl | cf ingest -"
    )]
    Ingest(cmd::ingest::IngestArgs),

    #[command(
        about = "Show a ranked leaderboard",
        after_help = "EXAMPLES:\n    # Top users in one group today\n    cf leaderboard --group -1001234 --window day\n\n    # Platform-wide top users\n    cf leaderboard\n\n    # Most active groups this week\n    cf leaderboard --groups --window week --json"
    )]
    Leaderboard(cmd::leaderboard::LeaderboardArgs),

    #[command(
        about = "Show a message total",
        after_help = "EXAMPLES:\n    # One user's count in one group\n    cf total --user 42 --group -1001234\n\n    # Platform total this week\n    cf total --window week"
    )]
    Total(cmd::total::TotalArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHATFIGHT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "chatfight=debug,info"
        } else {
            "chatfight=info,warn"
        })
    });

    let format = env::var("CHATFIGHT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map_or_else(|| PathBuf::from("chatfight.toml"), |d| d.join("chatfight/config.toml"))
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = EngineConfig::load_or_default(&path).context("load engine config")?;
    if let Some(db) = &cli.db {
        config.database.path.clone_from(db);
    }
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let engine = Engine::open(&config).context("open engine")?;
    let mode = cli.output_mode();

    match &cli.command {
        Commands::Ingest(args) => cmd::ingest::run_ingest(args, &engine, mode),
        Commands::Leaderboard(args) => cmd::leaderboard::run_leaderboard(args, &engine, mode),
        Commands::Total(args) => cmd::total::run_total(args, &engine, mode),
    }
}
