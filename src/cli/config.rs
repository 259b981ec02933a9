//! Engine configuration shared by every command

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;

use crate::{app::EngineConfig, tictactoe::Player};

/// Flags that shape the engine, layered over an optional JSON file
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// JSON engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// MCTS iterations per move
    #[arg(long)]
    pub mcts_iterations: Option<usize>,
}

impl EngineArgs {
    /// File values (or defaults), then command-line overrides.
    pub fn resolve(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("loading engine config from {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(iterations) = self.mcts_iterations {
            config = config.with_mcts_iterations(iterations);
        }

        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn parse_player_token(value: &str, flag: &str) -> Result<Player> {
    match value.trim().to_ascii_lowercase().as_str() {
        "x" | "first" | "player1" | "p1" => Ok(Player::X),
        "o" | "second" | "player2" | "p2" => Ok(Player::O),
        other => Err(anyhow!(
            "Invalid value '{other}' for {flag} (expected 'x' or 'o')"
        )),
    }
}
