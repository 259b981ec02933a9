//! Learner port - abstraction over move-selection strategies
//!
//! Every strategy that can sit at the board implements this trait:
//! - The decision ensemble
//! - Exhaustive search (minimax)
//! - Sampling search (MCTS)
//! - Tabular Q-learning
//! - Baselines (uniform random)

use crate::{
    Result,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// Learner trait - Unified interface for all move-selection strategies
///
/// The training pipeline drives two learners against each other through this
/// port, so any pair of strategies can be matched without knowing their
/// concrete types.
pub trait Learner: Send {
    /// Select a move for the given board state.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid moves are available (terminal state).
    fn select_move(&mut self, state: &BoardState) -> Result<usize>;

    /// Update the learner after a game completes.
    ///
    /// # Parameters
    ///
    /// * `first_player` - Which player moved first in the game
    /// * `moves` - Sequence of move positions (0-8) made during the game
    /// * `outcome` - Final outcome of the game
    /// * `role` - Which player this learner was playing as
    ///
    /// The default implementation does nothing, suitable for fixed policies.
    fn learn(
        &mut self,
        _first_player: Player,
        _moves: &[usize],
        _outcome: GameOutcome,
        _role: Player,
    ) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name, used in reports and logs.
    fn name(&self) -> &str;

    /// Reset learner state to initial conditions.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Seed the learner's internal random number generator.
    ///
    /// Pipelines call this when given a deterministic seed. Deterministic
    /// learners can ignore it.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}
