//! Decision ensemble
//!
//! Each move asks minimax, MCTS and the learned estimator for a candidate, adds
//! the strategy's weight to that candidate's score, layers fixed tactical
//! bonuses on every legal move and plays the top score.
//!
//! Immediate wins and forced blocks are hard constraints: when the side to
//! move can win at once only winning cells are eligible, otherwise when the
//! opponent threatens to win only blocking cells are eligible. The bonuses
//! still rank moves inside that set.

pub mod weights;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use weights::{StrategyWeights, WeightAdaptation};

use crate::{
    Error, Result,
    mcts::{MctsConfig, MonteCarloTreeSearch},
    minimax,
    tictactoe::{BoardState, CENTER, CORNERS},
};

/// Fixed score added to moves with tactical value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalBonuses {
    pub win: f64,
    pub block: f64,
    pub center: f64,
    pub corner: f64,
}

impl Default for TacticalBonuses {
    fn default() -> Self {
        Self {
            win: 10.0,
            block: 8.0,
            center: 2.0,
            corner: 1.0,
        }
    }
}

/// Which learned estimator casts the ensemble's learned vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnedStrategy {
    #[default]
    Approximator,
    /// ε-greedy value table
    Tabular,
}

/// Move suggested by each strategy, `None` when it had nothing to offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Candidates {
    pub exhaustive: Option<usize>,
    pub sampling: Option<usize>,
    pub learned: Option<usize>,
}

/// Outcome of one ensemble decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub chosen: usize,
    pub candidates: Candidates,
    /// Accumulated score per scored move
    pub scores: BTreeMap<usize, f64>,
}

/// Stateless combiner; learned state and weights are passed in per call
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEnsemble {
    mcts: MonteCarloTreeSearch,
    bonuses: TacticalBonuses,
}

impl DecisionEnsemble {
    pub fn new(mcts: MctsConfig, bonuses: TacticalBonuses) -> Self {
        Self {
            mcts: MonteCarloTreeSearch::new(mcts),
            bonuses,
        }
    }

    pub fn bonuses(&self) -> &TacticalBonuses {
        &self.bonuses
    }

    /// Ask minimax and MCTS for `state.to_move`; the learned slot is left empty.
    pub fn search_candidates<R: Rng + ?Sized>(
        &self,
        state: &BoardState,
        rng: &mut R,
    ) -> Result<Candidates> {
        let exhaustive = match minimax::best_move(state, state.to_move) {
            Ok(pos) => Some(pos),
            Err(Error::GameOver) => None,
            Err(err) => return Err(err),
        };
        let sampling = self.mcts.best_move(state, rng)?;

        Ok(Candidates {
            exhaustive,
            sampling,
            learned: None,
        })
    }

    /// Blend `candidates` and the tactical bonuses into one move.
    ///
    /// Fails with [`Error::NoValidMoves`] on a terminal board.
    pub fn decide(
        &self,
        state: &BoardState,
        candidates: Candidates,
        weights: &StrategyWeights,
    ) -> Result<Decision> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return Err(Error::NoValidMoves);
        }

        let side = state.to_move;
        let wins = state.immediate_wins(side);
        let blocks = state.immediate_wins(side.opponent());
        let eligible: &[usize] = if !wins.is_empty() {
            &wins
        } else if !blocks.is_empty() {
            &blocks
        } else {
            &legal
        };

        let mut scores: BTreeMap<usize, f64> = BTreeMap::new();
        let votes = [
            (candidates.exhaustive, weights.exhaustive),
            (candidates.sampling, weights.sampling),
            (candidates.learned, weights.learned),
        ];
        for (candidate, weight) in votes {
            if let Some(pos) = candidate.filter(|pos| legal.contains(pos)) {
                *scores.entry(pos).or_default() += weight;
            }
        }

        for &pos in &legal {
            let mut bonus = 0.0;
            if wins.contains(&pos) {
                bonus += self.bonuses.win;
            }
            if blocks.contains(&pos) {
                bonus += self.bonuses.block;
            }
            if pos == CENTER {
                bonus += self.bonuses.center;
            }
            if CORNERS.contains(&pos) {
                bonus += self.bonuses.corner;
            }
            if bonus != 0.0 {
                *scores.entry(pos).or_default() += bonus;
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (&pos, &score) in scores.iter().filter(|(pos, _)| eligible.contains(*pos)) {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((pos, score));
            }
        }
        let chosen = match best {
            Some((pos, _)) => pos,
            None => eligible[0],
        };

        debug!(
            chosen,
            ?candidates,
            wins = wins.len(),
            blocks = blocks.len(),
            "ensemble decision"
        );

        Ok(Decision {
            chosen,
            candidates,
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble() -> DecisionEnsemble {
        DecisionEnsemble::default()
    }

    #[test]
    fn test_win_beats_block_even_with_votes_elsewhere() {
        // X X .
        // O O .
        // . . .
        let state = BoardState::from_string("XX.OO....").unwrap();
        let candidates = Candidates {
            exhaustive: Some(5),
            sampling: Some(5),
            learned: Some(5),
        };
        let decision = ensemble()
            .decide(&state, candidates, &StrategyWeights::default())
            .unwrap();
        assert_eq!(decision.chosen, 2);
    }

    #[test]
    fn test_block_is_forced() {
        // X X .
        // . O .
        // . . .
        let state = BoardState::from_string("XX..O....").unwrap();
        let candidates = Candidates {
            exhaustive: Some(8),
            sampling: Some(6),
            learned: Some(4),
        };
        let decision = ensemble()
            .decide(&state, candidates, &StrategyWeights::default())
            .unwrap();
        assert_eq!(decision.chosen, 2);
    }

    #[test]
    fn test_votes_and_bonuses_accumulate() {
        let state = BoardState::from_string("....X....").unwrap();
        let candidates = Candidates {
            exhaustive: Some(0),
            sampling: Some(2),
            learned: Some(2),
        };
        let decision = ensemble()
            .decide(&state, candidates, &StrategyWeights::default())
            .unwrap();
        assert_eq!(decision.chosen, 2);
        assert!((decision.scores[&0] - 1.2).abs() < 1e-12);
        assert!((decision.scores[&2] - 1.8).abs() < 1e-12);
        assert!((decision.scores[&6] - 1.0).abs() < 1e-12);
        assert!(!decision.scores.contains_key(&1));
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let state = BoardState::from_string("....X....").unwrap();
        let decision = ensemble()
            .decide(&state, Candidates::default(), &StrategyWeights::default())
            .unwrap();
        assert_eq!(decision.chosen, 0);
    }

    #[test]
    fn test_search_candidates_agree_on_forced_win() {
        use rand::{SeedableRng, rngs::StdRng};

        let state = BoardState::from_string("XX.OO....").unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let candidates = ensemble().search_candidates(&state, &mut rng).unwrap();
        assert_eq!(candidates.exhaustive, Some(2));
        assert!(candidates.sampling.is_some_and(|pos| state.is_empty(pos)));
        assert_eq!(candidates.learned, None);
    }

    #[test]
    fn test_terminal_board_is_rejected() {
        let state = BoardState::from_string("XOXXOOOXX").unwrap();
        let result = ensemble().decide(&state, Candidates::default(), &StrategyWeights::default());
        assert!(matches!(result, Err(Error::NoValidMoves)));
    }
}
