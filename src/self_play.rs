//! Background self-play
//!
//! The engine plays batches of games against a uniformly random mover with
//! no human input. Every engine move becomes an experience tuple, and every
//! finished game feeds the engine's outcome bookkeeping.
//!
//! [`SelfPlayLoop::run_batch`] plays one batch synchronously.
//! [`SelfPlayLoop::spawn`] moves the loop onto a worker thread that repeats
//! batches with an idle interval until [`SelfPlayHandle::stop`] is called.

use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

use rand::{rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    Error, Result,
    engine::Engine,
    q_learning::agent::build_rng,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Batch size and cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    pub games_per_batch: usize,
    /// Idle time between batches, in milliseconds
    pub interval_ms: u64,
    /// Wait before the first batch, in milliseconds
    pub initial_delay_ms: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games_per_batch: 10,
            interval_ms: 30_000,
            initial_delay_ms: 1_000,
        }
    }
}

impl SelfPlayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.games_per_batch == 0 {
            return Err(Error::InvalidConfiguration {
                message: "self_play.games_per_batch must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Results of one batch from the engine's side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: GameOutcome, engine_side: Player) {
        self.games += 1;
        match outcome {
            GameOutcome::Win(winner) if winner == engine_side => self.wins += 1,
            GameOutcome::Win(_) => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// Self-play driver bound to one engine
pub struct SelfPlayLoop {
    engine: Engine,
    config: SelfPlayConfig,
    rng: StdRng,
}

impl SelfPlayLoop {
    /// Loop using the engine's own self-play settings and seed.
    pub fn new(engine: Engine) -> Self {
        let config = engine.config().self_play;
        let seed = engine.config().seed.map(|seed| seed.wrapping_add(1));
        Self {
            engine,
            config,
            rng: build_rng(seed),
        }
    }

    pub fn with_config(mut self, config: SelfPlayConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the random mover.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Play one batch now.
    ///
    /// Returns `Ok(None)` without playing if another batch holds the busy flag.
    pub fn run_batch(&mut self) -> Result<Option<BatchSummary>> {
        let Some(_guard) = self.engine.try_begin_self_play() else {
            warn!("self-play batch skipped: another batch is still running");
            return Ok(None);
        };

        let engine_side = self.engine.engine_player();
        let mut summary = BatchSummary::default();
        for _ in 0..self.config.games_per_batch {
            let outcome = self.play_game()?;
            summary.record(outcome, engine_side);
            self.engine.count_self_play_game()?;
        }

        info!(
            games = summary.games,
            wins = summary.wins,
            draws = summary.draws,
            losses = summary.losses,
            "self-play batch finished"
        );
        Ok(Some(summary))
    }

    /// One game, engine opening, against the random mover.
    fn play_game(&mut self) -> Result<GameOutcome> {
        let engine_side = self.engine.engine_player();
        let mut state = BoardState::new_with_player(engine_side);

        while !state.is_terminal() {
            if state.to_move != engine_side {
                let reply = self.random_move(&state)?;
                state = state.make_move(reply)?;
                continue;
            }

            let before = state;
            let action = self.engine.choose_move(&before)?;
            let mut after = before.make_move(action)?;
            if !after.is_terminal() {
                let reply = self.random_move(&after)?;
                after = after.make_move(reply)?;
            }

            self.engine.record_transition(&before, action, &after)?;
            state = after;
        }

        let winner = state.winner();
        self.engine.record_outcome(&state, winner)?;
        Ok(GameOutcome::from_board(&state).unwrap_or(GameOutcome::Draw))
    }

    fn random_move(&mut self, state: &BoardState) -> Result<usize> {
        state
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoValidMoves)
    }

    /// Run batches on a worker thread until stopped.
    pub fn spawn(mut self) -> SelfPlayHandle {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let initial_delay = self.config.initial_delay();
        let interval = self.config.interval();

        let worker = thread::spawn(move || {
            let mut wait = initial_delay;
            loop {
                match stop_rx.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if let Err(err) = self.run_batch() {
                    error!(%err, "self-play batch failed");
                }
                wait = interval;
            }
            info!("self-play worker stopped");
        });

        SelfPlayHandle {
            stop_tx,
            worker: Some(worker),
        }
    }
}

/// Control handle for a spawned self-play worker
#[derive(Debug)]
pub struct SelfPlayHandle {
    stop_tx: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SelfPlayHandle {
    /// Signal the worker and wait for it to finish its current batch.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        // the worker may already be gone
        let _ = self.stop_tx.send(());
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| Error::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for SelfPlayHandle {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            error!(%err, "self-play worker did not shut down cleanly");
        }
    }
}
