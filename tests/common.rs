//! Common test utilities for the oxo test suite.
//!
//! Reachable-position enumeration and small board helpers shared by the
//! integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};

use oxo::{
    app::EngineConfig,
    engine::Engine,
    tictactoe::{BoardState, Player, WINNING_LINES},
};

/// Every position reachable from the empty board with X opening, terminal
/// positions included.
pub fn reachable_states() -> Vec<BoardState> {
    let start = BoardState::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut states = Vec::new();

    while let Some(state) = queue.pop_front() {
        states.push(state);
        if state.is_terminal() {
            continue;
        }
        for mv in state.legal_moves() {
            let next = state.make_move(mv).unwrap();
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    states
}

/// Reachable positions where the side to move still has a move.
pub fn playable_states() -> Vec<BoardState> {
    reachable_states()
        .into_iter()
        .filter(|state| !state.is_terminal())
        .collect()
}

/// Parse a board, panicking with the offending string on failure.
pub fn board(s: &str) -> BoardState {
    BoardState::from_string(s).unwrap_or_else(|err| panic!("bad board '{s}': {err}"))
}

/// Play `moves` from the empty board with X opening.
pub fn play_out(moves: &[usize]) -> BoardState {
    moves
        .iter()
        .fold(BoardState::new(), |state, &mv| state.make_move(mv).unwrap())
}

/// Line check written independently of the crate's analyzer.
pub fn owns_line(state: &BoardState, player: Player) -> bool {
    WINNING_LINES.iter().any(|line| {
        line.iter()
            .all(|&pos| state.get(pos).to_player() == Some(player))
    })
}

/// Engine with a small search budget for fast tests.
pub fn quick_engine(seed: u64) -> Engine {
    Engine::new(EngineConfig::default().with_seed(seed).with_mcts_iterations(60)).unwrap()
}
