//! Matches between two learners
//!
//! [`TrainingPipeline`] plays a fixed number of games between an agent and an
//! opponent, lets both learn from every finished game and tallies the results
//! from the agent's side.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    ports::{Learner, Observer},
    tictactoe::{Game, GameOutcome, Player},
};

/// Match settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub num_games: usize,
    /// Seeds the agent with `seed` and the opponent with `seed + 1`
    pub seed: Option<u64>,
    /// Side the agent plays
    pub agent_player: Player,
    /// Side that opens every game
    pub first_player: Player,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_games: 500,
            seed: None,
            agent_player: Player::X,
            first_player: Player::X,
        }
    }
}

/// Agent-side tally of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub total_games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
}

impl TrainingResult {
    pub fn new(total_games: usize, wins: usize, draws: usize, losses: usize) -> Self {
        let mut result = Self {
            total_games,
            wins,
            draws,
            losses,
            ..Self::default()
        };
        result.refresh_rates();
        result
    }

    fn record(&mut self, outcome: GameOutcome, agent: Player) {
        match outcome.winner() {
            Some(winner) if winner == agent => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
        self.total_games += 1;
        self.refresh_rates();
    }

    fn refresh_rates(&mut self) {
        let share = |count: usize| {
            if self.total_games == 0 {
                0.0
            } else {
                count as f64 / self.total_games as f64
            }
        };
        let rates = (share(self.wins), share(self.draws), share(self.losses));
        (self.win_rate, self.draw_rate, self.loss_rate) = rates;
    }
}

/// Plays one learner against another
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Play `num_games` games; `agent` moves as `agent_player`.
    pub fn run(
        &mut self,
        agent: &mut dyn Learner,
        opponent: &mut dyn Learner,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed)?;
            opponent.set_rng_seed(seed.wrapping_add(1))?;
        }

        let total = self.config.num_games;
        self.notify(|observer| observer.on_training_start(total))?;

        let mut result = TrainingResult::default();
        for game_num in 0..total {
            let outcome = self.play_game(game_num, agent, opponent)?;
            result.record(outcome, self.config.agent_player);
            self.notify(|observer| observer.on_game_end(game_num, outcome))?;
        }

        self.notify(|observer| observer.on_training_end())?;

        debug!(
            agent = agent.name(),
            opponent = opponent.name(),
            games = result.total_games,
            wins = result.wins,
            draws = result.draws,
            losses = result.losses,
            "match finished"
        );
        Ok(result)
    }

    fn notify(&mut self, event: impl FnMut(&mut Box<dyn Observer>) -> Result<()>) -> Result<()> {
        self.observers.iter_mut().try_for_each(event)
    }

    fn play_game(
        &mut self,
        game_num: usize,
        agent: &mut dyn Learner,
        opponent: &mut dyn Learner,
    ) -> Result<GameOutcome> {
        self.notify(|observer| observer.on_game_start(game_num))?;

        let agent_player = self.config.agent_player;
        let mut game = Game::new_with_player(self.config.first_player);
        let mut state = game.current_state()?;

        for step_num in 0.. {
            if state.is_terminal() {
                break;
            }
            let mover: &mut dyn Learner = if state.to_move == agent_player {
                agent
            } else {
                opponent
            };
            let position = mover.select_move(&state)?;
            self.notify(|observer| observer.on_move(game_num, step_num, &state, position))?;
            state = game.play(position)?;
        }

        let outcome = game.outcome.unwrap_or(GameOutcome::Draw);
        let moves = game.positions();
        let first = self.config.first_player;
        agent.learn(first, &moves, outcome, agent_player)?;
        opponent.learn(first, &moves, outcome, agent_player.opponent())?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::learners::{MinimaxLearner, RandomLearner},
        q_learning::{QLearningAgent, TabularConfig},
    };

    #[test]
    fn test_random_match_counts_every_game() {
        let config = TrainingConfig {
            num_games: 10,
            seed: Some(42),
            agent_player: Player::X,
            first_player: Player::X,
        };

        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = RandomLearner::new("Agent");
        let mut opponent = RandomLearner::new("Opponent");

        let result = pipeline.run(&mut agent, &mut opponent).unwrap();

        assert_eq!(result.total_games, 10);
        assert_eq!(result.wins + result.draws + result.losses, 10);
    }

    #[test]
    fn test_minimax_never_loses() {
        let config = TrainingConfig {
            num_games: 20,
            seed: Some(7),
            agent_player: Player::O,
            first_player: Player::X,
        };

        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = MinimaxLearner::new("Minimax");
        let mut opponent = QLearningAgent::new(TabularConfig::default());

        let result = pipeline.run(&mut agent, &mut opponent).unwrap();
        assert_eq!(result.losses, 0);
        assert!((result.win_rate + result.draw_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_rates() {
        let result = TrainingResult::new(4, 2, 1, 1);
        assert_eq!(result.win_rate, 0.5);
        assert_eq!(result.draw_rate, 0.25);
        assert_eq!(result.loss_rate, 0.25);
        assert_eq!(TrainingResult::default().win_rate, 0.0);

        let mut tally = TrainingResult::default();
        tally.record(GameOutcome::Win(Player::O), Player::O);
        tally.record(GameOutcome::Win(Player::X), Player::O);
        tally.record(GameOutcome::Draw, Player::O);
        assert_eq!(tally, TrainingResult::new(3, 1, 1, 1));
    }
}
