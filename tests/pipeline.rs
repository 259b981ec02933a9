//! Matches between learners through the training pipeline.

mod common;

use common::quick_engine;
use oxo::{
    pipeline::{
        EnsembleLearner, MctsLearner, MetricsObserver, MinimaxLearner, RandomLearner,
        TrainingConfig, TrainingPipeline,
    },
    mcts::MctsConfig,
    tictactoe::Player,
};

fn config(num_games: usize, agent_player: Player, first_player: Player) -> TrainingConfig {
    TrainingConfig {
        num_games,
        seed: Some(17),
        agent_player,
        first_player,
    }
}

#[test]
fn learning_ensemble_records_every_game() {
    let engine = quick_engine(40);
    let mut agent = EnsembleLearner::new(engine.clone(), "Ensemble");
    let mut opponent = RandomLearner::new("Random");

    let result = TrainingPipeline::new(config(6, Player::O, Player::X))
        .with_observer(Box::new(MetricsObserver::new(Player::O)))
        .run(&mut agent, &mut opponent)
        .unwrap();

    let d = engine.diagnostics().unwrap();
    assert_eq!(result.total_games, 6);
    assert_eq!(d.total_games, 6);
    assert_eq!((d.wins, d.draws, d.losses), (result.wins, result.draws, result.losses));
    assert!(d.experience_buffer_size >= 6 * 2);
}

#[test]
fn frozen_ensemble_leaves_engine_untouched() {
    let engine = quick_engine(41);
    let mut agent = EnsembleLearner::new(engine.clone(), "Ensemble").frozen();
    let mut opponent = MctsLearner::new(
        "MCTS",
        MctsConfig {
            iterations: 60,
            ..MctsConfig::default()
        },
    );

    let result = TrainingPipeline::new(config(4, Player::X, Player::X))
        .run(&mut agent, &mut opponent)
        .unwrap();

    assert_eq!(result.total_games, 4);
    let d = engine.diagnostics().unwrap();
    assert_eq!(d.total_games, 0);
    assert_eq!(d.experience_buffer_size, 0);
}

#[test]
fn minimax_against_itself_always_draws() {
    let mut agent = MinimaxLearner::new("A");
    let mut opponent = MinimaxLearner::new("B");
    let result = TrainingPipeline::new(config(3, Player::X, Player::X))
        .run(&mut agent, &mut opponent)
        .unwrap();
    assert_eq!(result.draws, 3);
}
