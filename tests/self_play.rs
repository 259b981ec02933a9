//! Self-play batches and the background worker.

mod common;

use std::{thread, time::Duration};

use common::{playable_states, quick_engine};
use oxo::{SelfPlayConfig, SelfPlayLoop, tictactoe::Player};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

#[test]
fn batches_accumulate_in_diagnostics() {
    let engine = quick_engine(30);
    let mut self_play = SelfPlayLoop::new(engine.clone()).with_config(SelfPlayConfig {
        games_per_batch: 4,
        ..SelfPlayConfig::default()
    });

    for _ in 0..3 {
        let summary = self_play.run_batch().unwrap().unwrap();
        assert_eq!(summary.games, 4);
    }

    let d = engine.diagnostics().unwrap();
    assert_eq!(d.self_play_games, 12);
    assert_eq!(d.total_games, 12);
    assert_eq!(d.wins + d.draws + d.losses, 12);
    assert!((d.strategy_weights.total() - 1.0).abs() < 1e-9);
    assert!(d.exploration_rate < 0.3);
}

#[test]
fn engine_can_play_either_side() {
    let engine = oxo::Engine::new(
        oxo::EngineConfig::default()
            .with_seed(31)
            .with_mcts_iterations(60)
            .with_engine_player(Player::X),
    )
    .unwrap();
    let mut self_play = SelfPlayLoop::new(engine.clone()).with_seed(4);
    let summary = self_play.run_batch().unwrap().unwrap();

    assert_eq!(summary.games, 10);
    let d = engine.diagnostics().unwrap();
    assert_eq!(
        (d.wins, d.draws, d.losses),
        (summary.wins, summary.draws, summary.losses)
    );
}

#[test]
fn worker_runs_batches_until_stopped() {
    let engine = quick_engine(32);
    let handle = SelfPlayLoop::new(engine.clone())
        .with_config(SelfPlayConfig {
            games_per_batch: 1,
            interval_ms: 5,
            initial_delay_ms: 0,
        })
        .spawn();

    let mut waited = Duration::ZERO;
    while engine.diagnostics().unwrap().self_play_games == 0 && waited < Duration::from_secs(30) {
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    handle.stop().unwrap();

    let d = engine.diagnostics().unwrap();
    assert!(d.self_play_games >= 1);
    assert!(!d.is_self_play_training);
}

#[test]
fn foreground_moves_run_alongside_the_worker() {
    let engine = quick_engine(33);
    let handle = SelfPlayLoop::new(engine.clone())
        .with_config(SelfPlayConfig {
            games_per_batch: 2,
            interval_ms: 0,
            initial_delay_ms: 0,
        })
        .spawn();

    let states = playable_states();
    let mut rng = StdRng::seed_from_u64(33);
    for _ in 0..25 {
        let state = *states.choose(&mut rng).unwrap();
        let mv = engine.choose_move(&state).unwrap();
        assert!(state.is_empty(mv));
        let after = state.make_move(mv).unwrap();
        engine.record_transition(&state, mv, &after).unwrap();
    }

    let mut waited = Duration::ZERO;
    while engine.diagnostics().unwrap().self_play_games == 0 && waited < Duration::from_secs(30) {
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    handle.stop().unwrap();

    let d = engine.diagnostics().unwrap();
    assert!(d.self_play_games >= 1);
    assert_eq!(d.wins + d.draws + d.losses, d.total_games);
    assert_eq!(d.total_games, d.self_play_games);
    assert!(d.experience_buffer_size >= 25 + d.self_play_games);
    assert!((d.strategy_weights.total() - 1.0).abs() < 1e-9);
}
