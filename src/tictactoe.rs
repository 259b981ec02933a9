//! Tic-Tac-Toe game implementation

pub mod board;
pub mod game;
pub mod lines;

pub use board::{BoardState, Cell, Player};
pub use game::{Game, GameOutcome, Move};
pub use lines::{CENTER, CORNERS, EDGES, LineAnalyzer, WINNING_LINES};
