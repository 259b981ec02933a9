//! Learner adapters
//!
//! Wraps each move-selection strategy in the [`Learner`] port so the
//! training pipeline can match any two of them:
//! - The engine's decision ensemble
//! - Minimax (perfect play)
//! - MCTS on its own
//! - Random baseline
//!
//! The tabular [`QLearningAgent`](crate::q_learning::QLearningAgent)
//! implements the port directly.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Error, Result,
    engine::Engine,
    mcts::{MctsConfig, MonteCarloTreeSearch},
    minimax,
    ports::Learner,
    q_learning::agent::build_rng,
    tictactoe::{BoardState, GameOutcome, Player},
};

/// The engine seen as a learner
///
/// After each game the engine's moves are replayed into
/// [`Engine::record_transition`] and the result goes to
/// [`Engine::record_outcome`], exactly as in self-play.
pub struct EnsembleLearner {
    engine: Engine,
    name: String,
    learning: bool,
}

impl EnsembleLearner {
    pub fn new(engine: Engine, name: impl Into<String>) -> Self {
        Self {
            engine,
            name: name.into(),
            learning: true,
        }
    }

    /// Stop feeding finished games back into the engine.
    pub fn frozen(mut self) -> Self {
        self.learning = false;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl Learner for EnsembleLearner {
    fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        self.engine.choose_move(state)
    }

    fn learn(
        &mut self,
        first_player: Player,
        moves: &[usize],
        _outcome: GameOutcome,
        role: Player,
    ) -> Result<()> {
        if !self.learning {
            return Ok(());
        }

        let mut state = BoardState::new_with_player(first_player);
        for (i, &position) in moves.iter().enumerate() {
            let next = state.make_move(position)?;
            if state.to_move == role {
                let mut after = next;
                if !next.is_terminal()
                    && let Some(&reply) = moves.get(i + 1)
                {
                    after = next.make_move(reply)?;
                }
                self.engine.record_transition(&state, position, &after)?;
            }
            state = next;
        }

        self.engine.record_outcome(&state, state.winner())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) -> Result<()> {
        self.engine.reset_learning()
    }
}

/// Perfect play via alpha-beta minimax
pub struct MinimaxLearner {
    name: String,
}

impl MinimaxLearner {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Learner for MinimaxLearner {
    fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        if state.is_terminal() {
            return Err(Error::NoValidMoves);
        }
        minimax::best_move(state, state.to_move)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Plain MCTS without the rest of the ensemble
pub struct MctsLearner {
    name: String,
    search: MonteCarloTreeSearch,
    rng: StdRng,
}

impl MctsLearner {
    pub fn new(name: impl Into<String>, config: MctsConfig) -> Self {
        Self {
            name: name.into(),
            search: MonteCarloTreeSearch::new(config),
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Learner for MctsLearner {
    fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        self.search
            .best_move(state, &mut self.rng)?
            .ok_or(Error::NoValidMoves)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

/// Random policy learner (baseline)
pub struct RandomLearner {
    name: String,
    rng: StdRng,
}

impl RandomLearner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: build_rng(None),
        }
    }

    /// Create a new random learner with a deterministic seed
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Learner for RandomLearner {
    fn select_move(&mut self, state: &BoardState) -> Result<usize> {
        state
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoValidMoves)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EngineConfig;

    #[test]
    fn test_random_learner_is_reproducible() {
        let state = BoardState::new();
        let mut a = RandomLearner::with_seed("a", 5);
        let mut b = RandomLearner::with_seed("b", 5);
        for _ in 0..10 {
            assert_eq!(a.select_move(&state).unwrap(), b.select_move(&state).unwrap());
        }
    }

    #[test]
    fn test_minimax_learner_takes_win() {
        let mut learner = MinimaxLearner::new("minimax");
        let state = BoardState::from_string("XX.OO....").unwrap();
        assert_eq!(learner.select_move(&state).unwrap(), 2);
    }

    #[test]
    fn test_adapters_reject_terminal_board() {
        let state = BoardState::from_string("XOXXOOOXX").unwrap();
        assert!(MinimaxLearner::new("m").select_move(&state).is_err());
        assert!(RandomLearner::with_seed("r", 1).select_move(&state).is_err());
        let mut mcts = MctsLearner::new("mcts", MctsConfig::default()).with_seed(1);
        assert!(matches!(mcts.select_move(&state), Err(Error::NoValidMoves)));
    }

    #[test]
    fn test_ensemble_learner_replays_its_moves() {
        let engine =
            Engine::new(EngineConfig::default().with_seed(3).with_mcts_iterations(50)).unwrap();
        let mut learner = EnsembleLearner::new(engine.clone(), "ensemble");

        // O X O
        // O X X
        // X O X
        let moves = [4, 0, 8, 2, 1, 7, 5, 3, 6];
        learner
            .learn(Player::X, &moves, GameOutcome::Draw, Player::O)
            .unwrap();

        let d = engine.diagnostics().unwrap();
        assert_eq!(d.total_games, 1);
        assert_eq!(d.experience_buffer_size, 4);
        assert_eq!(d.draws, 1);
    }
}
