//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during a run without coupling
//! the match loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    ports::Observer,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Observation of a single step during a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepObservation {
    pub step_num: usize,
    /// Board before the move, as `key_player`
    pub state: String,
    pub move_position: usize,
}

/// Complete observation of one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub game_num: usize,
    pub outcome: GameOutcome,
    pub steps: Vec<StepObservation>,
    pub total_moves: usize,
}

/// Win/draw/loss tally from one side's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    wins: usize,
    draws: usize,
    losses: usize,
}

impl Tally {
    fn record(&mut self, outcome: GameOutcome, perspective: Player) {
        match outcome {
            GameOutcome::Win(winner) if winner == perspective => self.wins += 1,
            GameOutcome::Win(_) => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }

    fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    perspective: Player,
    tally: Tally,
}

impl ProgressObserver {
    /// Progress bar counting wins for `perspective`
    pub fn new(perspective: Player) -> Self {
        Self {
            progress_bar: None,
            perspective,
            tally: Tally::default(),
        }
    }

    fn message(&self) -> String {
        format!(
            "{} D:{} L:{}",
            self.tally.wins, self.tally.draws, self.tally.losses
        )
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_games: usize) -> Result<()> {
        let pb = ProgressBar::new(total_games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games (W:{msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: GameOutcome) -> Result<()> {
        self.tally.record(outcome, self.perspective);

        if let Some(pb) = &self.progress_bar {
            pb.set_position(game_num as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks win/draw/loss rates and game length
pub struct MetricsObserver {
    perspective: Player,
    tally: Tally,
    move_counts: Vec<usize>,
}

impl MetricsObserver {
    pub fn new(perspective: Player) -> Self {
        Self {
            perspective,
            tally: Tally::default(),
            move_counts: Vec::new(),
        }
    }

    fn rate(&self, count: usize) -> f64 {
        let total = self.tally.total();
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    pub fn win_rate(&self) -> f64 {
        self.rate(self.tally.wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.tally.draws)
    }

    pub fn loss_rate(&self) -> f64 {
        self.rate(self.tally.losses)
    }

    /// Get average game length in moves
    pub fn avg_game_length(&self) -> f64 {
        if self.move_counts.is_empty() {
            0.0
        } else {
            self.move_counts.iter().sum::<usize>() as f64 / self.move_counts.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_games: self.tally.total(),
            wins: self.tally.wins,
            draws: self.tally.draws,
            losses: self.tally.losses,
            win_rate: self.win_rate(),
            draw_rate: self.draw_rate(),
            loss_rate: self.loss_rate(),
            avg_game_length: self.avg_game_length(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    pub avg_game_length: f64,
}

impl Observer for MetricsObserver {
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        self.move_counts.push(0);
        Ok(())
    }

    fn on_move(
        &mut self,
        _game_num: usize,
        _step_num: usize,
        _state: &BoardState,
        _move_pos: usize,
    ) -> Result<()> {
        if let Some(last) = self.move_counts.last_mut() {
            *last += 1;
        }
        Ok(())
    }

    fn on_game_end(&mut self, _game_num: usize, outcome: GameOutcome) -> Result<()> {
        self.tally.record(outcome, self.perspective);
        Ok(())
    }
}

/// Emits one `tracing` event per move and per game
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_training_start(&mut self, total_games: usize) -> Result<()> {
        info!(total_games, "run started");
        Ok(())
    }

    fn on_move(
        &mut self,
        game_num: usize,
        step_num: usize,
        state: &BoardState,
        move_pos: usize,
    ) -> Result<()> {
        debug!(game_num, step_num, state = %state.encode(), move_pos, "move");
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: GameOutcome) -> Result<()> {
        debug!(game_num, ?outcome, "game finished");
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        info!("run finished");
        Ok(())
    }
}

/// JSONL observer - Writes one JSON object per finished game
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_game_steps: Vec<StepObservation>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_game_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        self.current_game_steps.clear();
        Ok(())
    }

    fn on_move(
        &mut self,
        _game_num: usize,
        step_num: usize,
        state: &BoardState,
        move_pos: usize,
    ) -> Result<()> {
        self.current_game_steps.push(StepObservation {
            step_num,
            state: state.encode(),
            move_position: move_pos,
        });
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: GameOutcome) -> Result<()> {
        let observation = Observation {
            game_num,
            outcome,
            total_moves: self.current_game_steps.len(),
            steps: std::mem::take(&mut self.current_game_steps),
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
