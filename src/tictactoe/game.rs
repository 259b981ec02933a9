//! High-level game management

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Player};

/// A move in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub position: usize,
    pub player: Player,
}

/// Outcome of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// Outcome of a terminal board, `None` while the game is still running
    pub fn from_board(state: &BoardState) -> Option<Self> {
        if let Some(winner) = state.winner() {
            Some(GameOutcome::Win(winner))
        } else if state.is_terminal() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    /// The winning side, if any
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Draw => None,
        }
    }
}

/// A complete game with history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub initial: BoardState,
    pub moves: Vec<Move>,
    pub outcome: Option<GameOutcome>,
}

impl Game {
    /// Create a new game with X to move
    pub fn new() -> Self {
        Self::new_with_player(Player::X)
    }

    /// Create a new game opened by `first_player`
    pub fn new_with_player(first_player: Player) -> Self {
        Game {
            initial: BoardState::new_with_player(first_player),
            moves: Vec::new(),
            outcome: None,
        }
    }

    /// Play a move for the side to move
    pub fn play(&mut self, position: usize) -> Result<BoardState, crate::Error> {
        if self.outcome.is_some() {
            return Err(crate::Error::GameOver);
        }

        let current = self.current_state()?;
        let new_state = current.make_move(position)?;

        self.moves.push(Move {
            position,
            player: current.to_move,
        });
        self.outcome = GameOutcome::from_board(&new_state);

        Ok(new_state)
    }

    /// Move positions in play order
    pub fn positions(&self) -> Vec<usize> {
        self.moves.iter().map(|m| m.position).collect()
    }

    /// Get current board state
    ///
    /// # Errors
    ///
    /// Returns error if any move in the history is invalid, which indicates
    /// corrupted game data.
    pub fn current_state(&self) -> Result<BoardState, crate::Error> {
        self.moves
            .iter()
            .try_fold(self.initial, |state, m| state.apply_move(m.position, m.player))
    }

    /// Board states from the initial position through the last move
    pub fn state_sequence(&self) -> Result<Vec<BoardState>, crate::Error> {
        let mut states = Vec::with_capacity(self.moves.len() + 1);
        let mut state = self.initial;
        states.push(state);
        for m in &self.moves {
            state = state.apply_move(m.position, m.player)?;
            states.push(state);
        }
        Ok(states)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
