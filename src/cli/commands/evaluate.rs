//! Evaluate command - Match the ensemble engine against a fixed opponent

use std::{fs::File, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::{
    cli::config::{EngineArgs, parse_player_token},
    engine::{Diagnostics, Engine},
    pipeline::{
        EnsembleLearner, JsonlObserver, Learner, MctsLearner, MinimaxLearner, ProgressObserver,
        RandomLearner, TracingObserver, TrainingConfig, TrainingPipeline, TrainingResult,
    },
    q_learning::QLearningAgent,
    self_play::SelfPlayLoop,
    tictactoe::Player,
};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpponentKind {
    Random,
    Minimax,
    Mcts,
    QLearning,
}

#[derive(Parser, Debug)]
#[command(about = "Evaluate the engine against an opponent")]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Opponent to evaluate against
    #[arg(long, short = 'o', value_enum, default_value_t = OpponentKind::Random)]
    pub opponent: OpponentKind,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 100)]
    pub games: usize,

    /// Self-play batches to run before evaluating
    #[arg(long, default_value_t = 0)]
    pub warmup_batches: usize,

    /// Which token the engine controls (`x` or `o`)
    #[arg(long)]
    pub agent_player: Option<String>,

    /// Which token makes the first move (`x` or `o`)
    #[arg(long)]
    pub first_player: Option<String>,

    /// Keep learning from evaluation games
    #[arg(long)]
    pub learn: bool,

    /// Write one JSON line per game to this file
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let config = args.engine.resolve()?;

    let agent_player = match &args.agent_player {
        Some(value) => parse_player_token(value, "--agent-player")?,
        None => config.engine_player,
    };
    let first_player = match &args.first_player {
        Some(value) => parse_player_token(value, "--first-player")?,
        None => Player::X,
    };

    let seed = config.seed;
    let opponent_mcts = config.mcts;
    let engine = Engine::new(config.with_engine_player(agent_player))?;

    if args.warmup_batches > 0 {
        println!("Warming up with {} self-play batches...", args.warmup_batches);
        let mut self_play = SelfPlayLoop::new(engine.clone());
        for _ in 0..args.warmup_batches {
            self_play.run_batch()?;
        }
    }

    let mut opponent: Box<dyn Learner> = match args.opponent {
        OpponentKind::Random => Box::new(RandomLearner::new("Random")),
        OpponentKind::Minimax => Box::new(MinimaxLearner::new("Minimax")),
        OpponentKind::Mcts => Box::new(MctsLearner::new("MCTS", opponent_mcts)),
        OpponentKind::QLearning => Box::new(QLearningAgent::new(engine.config().tabular)),
    };

    println!("\n=== Evaluation Configuration ===");
    println!("Opponent: {}", opponent.name());
    println!("Engine plays as: {agent_player:?} (first player: {first_player:?})");
    println!("Games: {}", args.games);
    println!("Learning during evaluation: {}", args.learn);
    let evaluation_seed = seed.map(|s| s.wrapping_add(2));
    if let Some(seed) = evaluation_seed {
        println!("Seed: {seed}");
    }

    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        num_games: args.games,
        seed: evaluation_seed,
        agent_player,
        first_player,
    })
    .with_observer(Box::new(ProgressObserver::new(agent_player)))
    .with_observer(Box::new(TracingObserver));
    if let Some(path) = &args.observations {
        pipeline = pipeline.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let mut learner = EnsembleLearner::new(engine.clone(), "Ensemble");
    if !args.learn {
        learner = learner.frozen();
    }

    println!("\n=== Running Evaluation ===");
    let result = pipeline.run(&mut learner, opponent.as_mut())?;

    println!("\n=== Evaluation Results ===");
    println!("Total games: {}", result.total_games);
    println!("Wins: {} ({:.1}%)", result.wins, result.win_rate * 100.0);
    println!("Draws: {} ({:.1}%)", result.draws, result.draw_rate * 100.0);
    println!(
        "Losses: {} ({:.1}%)",
        result.losses,
        result.loss_rate * 100.0
    );

    if let Some(export_path) = &args.export {
        let diagnostics = engine.diagnostics()?;
        export_results(&result, &diagnostics, &args, export_path)?;
        println!("\n✓ Results exported to: {}", export_path.display());
    }

    Ok(())
}

/// Export evaluation results to JSON
fn export_results(
    result: &TrainingResult,
    diagnostics: &Diagnostics,
    args: &EvaluateArgs,
    path: &Path,
) -> Result<()> {
    #[derive(Serialize)]
    struct EvaluationExport<'a> {
        opponent: OpponentKind,
        games: usize,
        warmup_batches: usize,
        learn: bool,
        result: &'a TrainingResult,
        engine: &'a Diagnostics,
    }

    let export = EvaluationExport {
        opponent: args.opponent,
        games: args.games,
        warmup_batches: args.warmup_batches,
        learn: args.learn,
        result,
        engine: diagnostics,
    };

    let file =
        File::create(path).with_context(|| format!("creating export file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &export)?;
    Ok(())
}
