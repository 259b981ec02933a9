//! oxo CLI - Ensemble tic-tac-toe engine with online learning
//!
//! This CLI provides:
//! - Self-play training against a random mover
//! - Evaluation against random, minimax, MCTS and Q-learning opponents
//! - Interactive play on the terminal

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oxo")]
#[command(version, about = "Ensemble tic-tac-toe engine with online learning", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the engine through self-play
    Train(oxo::cli::commands::train::TrainArgs),

    /// Evaluate the engine against an opponent
    Evaluate(oxo::cli::commands::evaluate::EvaluateArgs),

    /// Play a game against the engine
    Play(oxo::cli::commands::play::PlayArgs),
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Train(args) => oxo::cli::commands::train::execute(args),
        Commands::Evaluate(args) => oxo::cli::commands::evaluate::execute(args),
        Commands::Play(args) => oxo::cli::commands::play::execute(args),
    }
}
