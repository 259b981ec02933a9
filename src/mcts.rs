//! Monte Carlo Tree Search with UCT selection
//!
//! Every call builds a fresh arena tree rooted at the given position, runs
//! the select / expand / simulate / backpropagate cycle for the configured
//! number of iterations and reads out the most visited root child. Nothing
//! survives between calls.

pub mod node;
pub mod tree;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use node::{NodeId, SearchNode};
pub use tree::MctsTree;

use crate::{Result, tictactoe::BoardState};

/// Default number of iterations per move
pub const DEFAULT_ITERATIONS: usize = 500;

/// Search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Select/expand/simulate/backpropagate cycles per move
    pub iterations: usize,
    /// UCT exploration constant used during selection
    pub exploration: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: std::f64::consts::SQRT_2,
        }
    }
}

/// Sampling-based tree search
#[derive(Debug, Clone, Copy, Default)]
pub struct MonteCarloTreeSearch {
    config: MctsConfig,
}

impl MonteCarloTreeSearch {
    pub fn new(config: MctsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run the full iteration budget and return the resulting tree.
    pub fn search<R: Rng + ?Sized>(&self, state: &BoardState, rng: &mut R) -> Result<MctsTree> {
        let mut tree = MctsTree::new(*state);

        for _ in 0..self.config.iterations {
            let leaf = tree.select(self.config.exploration);
            let target = tree.expand(leaf)?.unwrap_or(leaf);
            let outcome = tree.simulate(target, rng)?;
            tree.backpropagate(target, outcome);
        }

        Ok(tree)
    }

    /// Most visited root move, or `None` when the board has no legal move.
    pub fn best_move<R: Rng + ?Sized>(
        &self,
        state: &BoardState,
        rng: &mut R,
    ) -> Result<Option<usize>> {
        if state.is_terminal() {
            return Ok(None);
        }
        let tree = self.search(state, rng)?;
        Ok(tree.best_action().map(|(action, _)| action))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_terminal_board_has_no_move() {
        let mcts = MonteCarloTreeSearch::default();
        let mut rng = StdRng::seed_from_u64(1);
        let state = BoardState::from_string("XOXXOOOXX").unwrap();
        assert_eq!(mcts.best_move(&state, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_single_legal_move_is_returned() {
        let mcts = MonteCarloTreeSearch::default();
        let mut rng = StdRng::seed_from_u64(2);
        let state = BoardState::from_string("XOXXOOOX.").unwrap();
        assert_eq!(mcts.best_move(&state, &mut rng).unwrap(), Some(8));
    }

    #[test]
    fn test_root_visits_add_up_to_budget() {
        let mcts = MonteCarloTreeSearch::new(MctsConfig {
            iterations: 200,
            ..MctsConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(3);
        let tree = mcts.search(&BoardState::new(), &mut rng).unwrap();

        assert_eq!(tree.get(tree.root()).visits, 200);
        assert_eq!(tree.root_visits().iter().sum::<u32>(), 200);
    }

    #[test]
    fn test_finds_winning_move() {
        // X X .
        // O O .
        // . . .
        let mcts = MonteCarloTreeSearch::default();
        let mut rng = StdRng::seed_from_u64(4);
        let state = BoardState::from_string("XX.OO....").unwrap();
        assert_eq!(mcts.best_move(&state, &mut rng).unwrap(), Some(2));
    }
}
