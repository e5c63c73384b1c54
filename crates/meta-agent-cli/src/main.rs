//! MetaAgent CLI
//!
//! Feeds JSON records through the novelty accumulator and archives the
//! annotated batch:
//! - `run` classifies records from a file or stdin
//! - `demo` replays a small built-in login/download session
//! - `fingerprint` prints record fingerprints without classifying anything

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod input;

/// MetaAgent CLI
#[derive(Parser)]
#[command(name = "meta-agent")]
#[command(about = "Flag novel records by fingerprint frequency and archive the insights", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "META_AGENT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Anomaly threshold (overrides the config file)
    #[arg(short, long, global = true)]
    threshold: Option<f64>,

    /// Directory for insight archives (overrides the config file)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "META_AGENT_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify records from a JSON array or JSON-lines file (`-` for stdin)
    Run {
        input: PathBuf,
    },

    /// Replay the built-in sample session (threshold 0.5 unless set by flag, config or env)
    Demo,

    /// Print the fingerprint of every record
    Fingerprint {
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json);

    let overrides = commands::Overrides {
        config: cli.config,
        threshold: cli.threshold,
        output_dir: cli.output_dir,
    };

    match cli.command {
        Commands::Run { input } => commands::run(&overrides, &input),
        Commands::Demo => commands::demo(&overrides),
        Commands::Fingerprint { input } => commands::fingerprint(&input),
    }
}

/// Logs go to stderr; stdout carries results.
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
