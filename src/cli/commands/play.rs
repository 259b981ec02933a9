//! Play command - Text-mode game against the engine

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    cli::{
        config::{EngineArgs, parse_player_token},
        output::render_board,
    },
    engine::Engine,
    self_play::SelfPlayLoop,
    tictactoe::{BoardState, Game, GameOutcome},
};

#[derive(Parser, Debug)]
#[command(about = "Play a game against the engine")]
pub struct PlayArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Token you play (`x` or `o`); X always moves first
    #[arg(long, default_value = "x")]
    pub human: String,

    /// Self-play batches to run before the game
    #[arg(long, default_value_t = 0)]
    pub warmup_batches: usize,

    /// Show every strategy's vote and the final scores
    #[arg(long)]
    pub explain: bool,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let human = parse_player_token(&args.human, "--human")?;
    let config = args.engine.resolve()?.with_engine_player(human.opponent());
    let engine = Engine::new(config)?;

    if args.warmup_batches > 0 {
        println!("Warming up with {} self-play batches...", args.warmup_batches);
        let mut self_play = SelfPlayLoop::new(engine.clone());
        for _ in 0..args.warmup_batches {
            self_play.run_batch()?;
        }
    }

    println!("You are {human}. Enter a cell number (0-8) to move, 'q' to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut game = Game::new();
    let mut state = game.current_state()?;
    // Engine move still waiting for the human's reply before it is recorded
    let mut pending: Option<(BoardState, usize)> = None;

    while !state.is_terminal() {
        println!("\n{}", render_board(&state));

        if state.to_move == human {
            print!("Your move: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                bail!("input closed before the game finished");
            };
            let line = line.context("reading move from stdin")?;
            let input = line.trim();
            if input.eq_ignore_ascii_case("q") {
                println!("Game abandoned.");
                return Ok(());
            }
            let position = match input.parse::<usize>() {
                Ok(position) => position,
                Err(_) => {
                    println!("'{input}' is not a cell number.");
                    continue;
                }
            };
            match game.play(position) {
                Ok(next) => state = next,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            }

            if let Some((before, action)) = pending.take() {
                engine.record_transition(&before, action, &state)?;
            }
        } else {
            let decision = engine.decide(&state)?;
            if args.explain {
                println!("Votes: {:?}", decision.candidates);
                println!("Scores: {:?}", decision.scores);
            }
            println!("Engine plays {}", decision.chosen);

            let before = state;
            state = game.play(decision.chosen)?;
            if state.is_terminal() {
                engine.record_transition(&before, decision.chosen, &state)?;
            } else {
                pending = Some((before, decision.chosen));
            }
        }
    }

    println!("\n{}", render_board(&state));
    engine.record_outcome(&state, state.winner())?;

    let moves: Vec<String> = game.positions().iter().map(usize::to_string).collect();
    println!("Moves: {}", moves.join(" "));

    match game.outcome {
        Some(GameOutcome::Win(winner)) if winner == human => println!("You win!"),
        Some(GameOutcome::Win(_)) => println!("The engine wins."),
        _ => println!("Draw."),
    }

    let diagnostics = engine.diagnostics()?;
    println!(
        "Strategy weights: exhaustive {:.3}, sampling {:.3}, learned {:.3}",
        diagnostics.strategy_weights.exhaustive,
        diagnostics.strategy_weights.sampling,
        diagnostics.strategy_weights.learned
    );

    Ok(())
}
