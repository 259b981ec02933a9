//! Engine facade
//!
//! [`Engine`] is the boundary the presentation layer talks to. It owns all
//! mutable learning state and is a cheap clonable handle, so the self-play
//! worker and foreground callers can share one instance.
//!
//! Learned state (value table, approximator, experience store) sits behind a
//! single `RwLock`: every update takes the write lock for its whole duration,
//! so a reader sees the state either fully before or fully after it.

use std::sync::{
    Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicBool, Ordering},
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    app::EngineConfig,
    ensemble::{Decision, DecisionEnsemble, LearnedStrategy, StrategyWeights},
    experience::{Experience, ExperienceStore},
    network::{Approximator, NetworkInfo},
    q_learning::{QLearningAgent, agent::build_rng},
    tictactoe::{BoardState, Player},
};

/// Read-only snapshot of the engine's bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub total_games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    /// Current ε of the tabular estimator
    pub exploration_rate: f64,
    pub strategy_weights: StrategyWeights,
    pub experience_buffer_size: usize,
    pub is_self_play_training: bool,
    pub self_play_games: usize,
    pub q_table_size: usize,
    pub network: NetworkInfo,
    /// Approximator training steps triggered by recorded transitions
    pub training_steps: usize,
}

struct LearnedState {
    tabular: QLearningAgent,
    approximator: Approximator,
    experience: ExperienceStore,
    training_steps: usize,
}

impl LearnedState {
    fn fresh(config: &EngineConfig, rng: &mut StdRng) -> Result<Self> {
        Ok(Self {
            tabular: QLearningAgent::new(config.tabular).with_seed(rng.random()),
            approximator: Approximator::new(config.network.clone(), rng)?,
            experience: ExperienceStore::new(config.experience_capacity),
            training_steps: 0,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct GameRecord {
    weights: StrategyWeights,
    total_games: usize,
    wins: usize,
    draws: usize,
    losses: usize,
    self_play_games: usize,
}

impl GameRecord {
    fn new(weights: StrategyWeights) -> Self {
        Self {
            weights,
            total_games: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            self_play_games: 0,
        }
    }

    fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.wins as f64 / self.total_games as f64
        }
    }
}

struct Shared {
    config: EngineConfig,
    ensemble: DecisionEnsemble,
    learned: RwLock<LearnedState>,
    record: Mutex<GameRecord>,
    rng: Mutex<StdRng>,
    self_play_busy: AtomicBool,
}

/// Clears the self-play busy flag when dropped
pub struct SelfPlayGuard {
    shared: Arc<Shared>,
}

impl Drop for SelfPlayGuard {
    fn drop(&mut self) {
        self.shared.self_play_busy.store(false, Ordering::Release);
    }
}

/// Ensemble decision engine with online learning
///
/// # Examples
///
/// ```
/// use oxo::{Engine, app::EngineConfig, tictactoe::BoardState};
///
/// let engine = Engine::new(EngineConfig::default().with_seed(1).with_mcts_iterations(100))?;
/// let state = BoardState::from_string("....X....")?;
/// let pos = engine.choose_move(&state)?;
/// assert!(state.is_empty(pos));
/// # Ok::<(), oxo::Error>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("engine_player", &self.shared.config.engine_player)
            .field(
                "self_play_busy",
                &self.shared.self_play_busy.load(Ordering::Acquire),
            )
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = build_rng(config.seed);
        let learned = LearnedState::fresh(&config, &mut rng)?;
        let ensemble = DecisionEnsemble::new(config.mcts, config.bonuses);
        let record = GameRecord::new(config.initial_weights);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                ensemble,
                learned: RwLock::new(learned),
                record: Mutex::new(record),
                rng: Mutex::new(rng),
                self_play_busy: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Side whose results count as wins and losses
    pub fn engine_player(&self) -> Player {
        self.shared.config.engine_player
    }

    fn read_learned(&self) -> Result<RwLockReadGuard<'_, LearnedState>> {
        self.shared
            .learned
            .read()
            .map_err(|_| Error::LockPoisoned { name: "learned state" })
    }

    fn write_learned(&self) -> Result<RwLockWriteGuard<'_, LearnedState>> {
        self.shared
            .learned
            .write()
            .map_err(|_| Error::LockPoisoned { name: "learned state" })
    }

    fn lock_record(&self) -> Result<MutexGuard<'_, GameRecord>> {
        self.shared
            .record
            .lock()
            .map_err(|_| Error::LockPoisoned { name: "game record" })
    }

    fn lock_rng(&self) -> Result<MutexGuard<'_, StdRng>> {
        self.shared
            .rng
            .lock()
            .map_err(|_| Error::LockPoisoned { name: "rng" })
    }

    fn learned_vote(&self, state: &BoardState) -> Result<Option<usize>> {
        match self.shared.config.learned_strategy {
            LearnedStrategy::Approximator => {
                let learned = self.read_learned()?;
                learned
                    .approximator
                    .best_move(&state.to_numeric(state.to_move))
            }
            LearnedStrategy::Tabular => self.write_learned()?.tabular.best_move(state),
        }
    }

    /// Full ensemble decision for the side to move, with every strategy's vote.
    pub fn decide(&self, state: &BoardState) -> Result<Decision> {
        if state.is_terminal() {
            return Err(Error::NoValidMoves);
        }

        // Only the seed draw is serialized; searches run in parallel.
        let seed = self.lock_rng()?.random::<u64>();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut candidates = self.shared.ensemble.search_candidates(state, &mut rng)?;
        candidates.learned = self.learned_vote(state)?;
        let weights = self.lock_record()?.weights;

        self.shared.ensemble.decide(state, candidates, &weights)
    }

    /// Move for the side to move.
    ///
    /// Fails with [`Error::NoValidMoves`] on a terminal board.
    pub fn choose_move(&self, state: &BoardState) -> Result<usize> {
        Ok(self.decide(state)?.chosen)
    }

    /// Record the mover's transition from `before` via `action` to `after`.
    ///
    /// `after` may already include the opponent's reply. The tuple is stored,
    /// the value table takes one TD step and the approximator trains when the
    /// store size hits the training cadence.
    pub fn record_transition(
        &self,
        before: &BoardState,
        action: usize,
        after: &BoardState,
    ) -> Result<()> {
        if action >= 9 {
            return Err(Error::InvalidPosition { position: action });
        }
        if before.is_terminal() {
            return Err(Error::GameOver);
        }
        if !before.is_empty(action) {
            return Err(Error::InvalidMove { position: action });
        }

        let learner = before.to_move;
        let experience = Experience::from_transition(before, action, after, learner);
        let network = &self.shared.config.network;

        let mut learned = self.write_learned()?;
        learned.experience.append(experience);
        learned
            .tabular
            .update_q(before, action, after, experience.reward)?;

        if learned
            .experience
            .ready_for_training(network.batch_size, network.train_every)
        {
            let batch = learned.experience.sample_recent(network.batch_size);
            learned.approximator.train(&batch)?;
            learned.training_steps += 1;
        }
        Ok(())
    }

    /// Close out a finished game.
    ///
    /// Updates the win/draw/loss counters from the engine's side, adapts the
    /// strategy weights and decays the tabular exploration rate.
    ///
    /// Fails with [`Error::GameInProgress`] on a board that is not terminal and
    /// with [`Error::InconsistentOutcome`] when `winner` disagrees with it.
    pub fn record_outcome(&self, final_board: &BoardState, winner: Option<Player>) -> Result<()> {
        if !final_board.is_terminal() {
            return Err(Error::GameInProgress);
        }
        let board_winner = final_board.winner();
        if board_winner != winner {
            return Err(Error::InconsistentOutcome {
                reported: winner,
                board: board_winner,
            });
        }

        let engine_player = self.shared.config.engine_player;
        {
            let mut record = self.lock_record()?;
            record.total_games += 1;
            match winner {
                Some(player) if player == engine_player => record.wins += 1,
                Some(_) => record.losses += 1,
                None => record.draws += 1,
            }
            let win_rate = record.win_rate();
            record.weights.adapt(win_rate, &self.shared.config.adaptation);
            debug!(
                total_games = record.total_games,
                win_rate,
                weights = ?record.weights,
                "strategy weights adapted"
            );
        }

        self.write_learned()?.tabular.decay_epsilon();
        Ok(())
    }

    /// Snapshot of counters, weights and learned-state sizes.
    pub fn diagnostics(&self) -> Result<Diagnostics> {
        let learned = self.read_learned()?;
        let record = *self.lock_record()?;

        Ok(Diagnostics {
            total_games: record.total_games,
            wins: record.wins,
            draws: record.draws,
            losses: record.losses,
            win_rate: record.win_rate(),
            exploration_rate: learned.tabular.epsilon(),
            strategy_weights: record.weights,
            experience_buffer_size: learned.experience.len(),
            is_self_play_training: self.shared.self_play_busy.load(Ordering::Acquire),
            self_play_games: record.self_play_games,
            q_table_size: learned.tabular.q_table_size(),
            network: learned.approximator.info(),
            training_steps: learned.training_steps,
        })
    }

    /// Fresh estimators, empty experience, initial weights and zeroed counters.
    pub fn reset_learning(&self) -> Result<()> {
        let fresh = {
            let mut rng = self.lock_rng()?;
            LearnedState::fresh(&self.shared.config, &mut rng)?
        };
        let mut learned = self.write_learned()?;
        let mut record = self.lock_record()?;
        *learned = fresh;
        *record = GameRecord::new(self.shared.config.initial_weights);
        debug!("learning state reset");
        Ok(())
    }

    /// Claim the self-play slot, `None` if a batch is already running.
    pub fn try_begin_self_play(&self) -> Option<SelfPlayGuard> {
        self.shared
            .self_play_busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SelfPlayGuard {
                shared: Arc::clone(&self.shared),
            })
    }

    pub fn is_self_play_training(&self) -> bool {
        self.shared.self_play_busy.load(Ordering::Acquire)
    }

    pub(crate) fn count_self_play_game(&self) -> Result<()> {
        self.lock_record()?.self_play_games += 1;
        Ok(())
    }
}
