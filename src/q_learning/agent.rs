//! Tabular Q-learning agent
//!
//! Picks the highest-valued legal move from its table, replaced by a uniformly
//! random legal move with probability ε. ε decays after every completed game
//! down to a floor.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    experience::transition_reward,
    ports::Learner,
    q_learning::q_table::QTable,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Hyperparameters of the tabular estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// α
    pub learning_rate: f64,
    /// γ
    pub discount_factor: f64,
    /// Initial exploration rate ε
    pub epsilon: f64,
    /// Multiplicative decay applied to ε after every game
    pub epsilon_decay: f64,
    /// Floor for ε
    pub min_epsilon: f64,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.3,
            epsilon_decay: 0.995,
            min_epsilon: 0.05,
        }
    }
}

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    config: TabularConfig,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    pub fn new(config: TabularConfig) -> Self {
        Self {
            q_table: QTable::new(config.learning_rate, config.discount_factor),
            config,
            epsilon: config.epsilon,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    /// Highest-valued legal move, first in ascending order on ties
    pub fn greedy_move(&mut self, state: &BoardState) -> Result<Option<usize>> {
        self.q_table.greedy_action(&state.to_key(), &state.legal_moves())
    }

    /// ε-greedy move, `None` when the board has no legal move
    pub fn best_move(&mut self, state: &BoardState) -> Result<Option<usize>> {
        let legal_moves = state.legal_moves();
        if legal_moves.is_empty() {
            return Ok(None);
        }
        if self.rng.random::<f64>() < self.epsilon {
            return Ok(legal_moves.choose(&mut self.rng).copied());
        }
        self.q_table.greedy_action(&state.to_key(), &legal_moves)
    }

    /// Apply one Q-learning step for the move `action` that led from `prev` to `next`.
    pub fn update_q(
        &mut self,
        prev: &BoardState,
        action: usize,
        next: &BoardState,
        reward: f64,
    ) -> Result<f64> {
        self.q_table
            .q_learning_update(&prev.to_key(), action, reward, &next.to_key())
    }

    /// Decay ε after a completed game
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn q_table_size(&self) -> usize {
        self.q_table.size()
    }

    fn reset_state(&mut self) {
        self.q_table.reset();
        self.epsilon = self.config.epsilon;
        self.rng = build_rng(self.rng_seed);
    }
}

impl Learner for QLearningAgent {
    fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        self.best_move(state)?.ok_or(Error::NoValidMoves)
    }

    fn learn(
        &mut self,
        first_player: Player,
        moves: &[usize],
        _outcome: GameOutcome,
        role: Player,
    ) -> Result<()> {
        let mut current_state = BoardState::new_with_player(first_player);

        for (i, &position) in moves.iter().enumerate() {
            let next_state = current_state.make_move(position)?;

            // Only update for our moves, looking ahead through the opponent's reply
            if current_state.to_move == role {
                let mut next_our_turn = next_state;
                if !next_state.is_terminal()
                    && let Some(&reply) = moves.get(i + 1)
                {
                    next_our_turn = next_state.make_move(reply)?;
                }
                let reward = transition_reward(&next_our_turn, role);
                self.update_q(&current_state, position, &next_our_turn, reward)?;
            }

            current_state = next_state;
        }

        self.decay_epsilon();
        Ok(())
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn reset(&mut self) -> Result<()> {
        self.reset_state();
        Ok(())
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }
}
