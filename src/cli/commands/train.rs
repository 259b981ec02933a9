//! Train command - Run self-play batches against a random mover

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    cli::{
        config::{EngineArgs, parse_player_token},
        output::{create_training_progress, format_number, print_kv, print_section},
    },
    engine::{Diagnostics, Engine},
    self_play::{BatchSummary, SelfPlayLoop},
};

#[derive(Parser, Debug)]
#[command(about = "Train the engine through self-play")]
pub struct TrainArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Number of self-play batches to run
    #[arg(long, short = 'b', default_value_t = 10)]
    pub batches: usize,

    /// Games per batch (defaults to the configured batch size)
    #[arg(long, short = 'g')]
    pub games_per_batch: Option<usize>,

    /// Which token the engine plays (`x` or `o`)
    #[arg(long)]
    pub engine_player: Option<String>,

    /// Write the final diagnostics to a JSON file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    batches: usize,
    games: usize,
    wins: usize,
    draws: usize,
    losses: usize,
    seed: Option<u64>,
    diagnostics: &'a Diagnostics,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.engine.resolve()?;
    if let Some(value) = &args.engine_player {
        config = config.with_engine_player(parse_player_token(value, "--engine-player")?);
    }
    if let Some(games) = args.games_per_batch {
        if games == 0 {
            bail!("--games-per-batch must be positive");
        }
        config.self_play.games_per_batch = games;
    }

    let seed = config.seed;
    let games_per_batch = config.self_play.games_per_batch;
    let engine = Engine::new(config)?;

    print_section("Self-Play Training");
    print_kv("Engine plays", &engine.engine_player().to_string());
    print_kv("Batches", &format_number(args.batches));
    print_kv("Games per batch", &format_number(games_per_batch));
    if let Some(seed) = seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut self_play = SelfPlayLoop::new(engine.clone());
    let progress = if args.quiet {
        None
    } else {
        Some(create_training_progress((args.batches * games_per_batch) as u64)?)
    };

    let mut totals = BatchSummary::default();
    for _ in 0..args.batches {
        let summary = self_play
            .run_batch()?
            .context("self-play slot was unexpectedly busy")?;
        totals.games += summary.games;
        totals.wins += summary.wins;
        totals.draws += summary.draws;
        totals.losses += summary.losses;

        if let Some(pb) = &progress {
            pb.inc(summary.games as u64);
            pb.set_message(format!(
                "W:{} D:{} L:{}",
                totals.wins, totals.draws, totals.losses
            ));
        }
    }
    if let Some(pb) = &progress {
        pb.finish();
    }

    let diagnostics = engine.diagnostics()?;

    println!("\n=== Training Results ===");
    println!("Total games: {}", totals.games);
    let rate = |count: usize| {
        if totals.games == 0 {
            0.0
        } else {
            count as f64 / totals.games as f64 * 100.0
        }
    };
    println!("Wins: {} ({:.1}%)", totals.wins, rate(totals.wins));
    println!("Draws: {} ({:.1}%)", totals.draws, rate(totals.draws));
    println!("Losses: {} ({:.1}%)", totals.losses, rate(totals.losses));

    println!("\n=== Diagnostics ===");
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);

    if let Some(path) = &args.output {
        let summary = TrainingSummaryFile {
            batches: args.batches,
            games: totals.games,
            wins: totals.wins,
            draws: totals.draws,
            losses: totals.losses,
            seed,
            diagnostics: &diagnostics,
        };
        let file = File::create(path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\n✓ Summary written to: {}", path.display());
    }

    Ok(())
}
