//! Battle simulator entry point.
//!
//! Run with: `battle-sim <command>`
mod commands;
mod content;
mod prompt;

use anyhow::Result;
use clap::Parser;
use commands::{Balance, Catalog, Simulate};
use tracing_subscriber::EnvFilter;

/// Dice-driven faction battles from the command line
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Run and balance dice-driven faction battles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play one battle and print its log
    Simulate(Simulate),

    /// Sweep seeds over faction pairings and report win rates
    Balance(Balance),

    /// List the loaded factions and skills
    Catalog(Catalog),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(cmd) => cmd.execute().await,
        Command::Balance(cmd) => cmd.execute().await,
        Command::Catalog(cmd) => cmd.execute(),
    }
}

/// Logs go to stderr so battle output on stdout stays pipeable.
fn setup_logging() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// `RUST_LOG` as given, or `info` when it is unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
