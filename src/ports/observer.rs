//! Observer port - abstraction for observing matches
//!
//! This port defines the interface for observing games played by the
//! training pipeline, allowing composable reporting without coupling the
//! match loop to progress bars, metrics or log output.

use crate::{
    Result,
    tictactoe::{BoardState, GameOutcome},
};

/// Observer trait for monitoring a run of games
///
/// # Event Sequence
///
/// 1. `on_training_start(total_games)` - Once at the beginning
/// 2. For each game:
///    - `on_game_start(game_num)`
///    - `on_move(...)` - For each move in the game
///    - `on_game_end(game_num, outcome)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use oxo::{ports::Observer, tictactoe::GameOutcome};
///
/// struct DrawCounter {
///     draws: usize,
/// }
///
/// impl Observer for DrawCounter {
///     fn on_game_end(&mut self, _game_num: usize, outcome: GameOutcome) -> oxo::Result<()> {
///         if outcome == GameOutcome::Draw {
///             self.draws += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first game with the number of games planned.
    fn on_training_start(&mut self, _total_games: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a game starts. `game_num` is 0-based.
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        Ok(())
    }

    /// Called for each move, after it is selected and before it is applied.
    ///
    /// # Parameters
    ///
    /// * `game_num` - Index of the current game
    /// * `step_num` - Step number within the game (0-based)
    /// * `state` - Board state before the move
    /// * `move_pos` - Position (0-8) where the move was made
    fn on_move(
        &mut self,
        _game_num: usize,
        _step_num: usize,
        _state: &BoardState,
        _move_pos: usize,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when a game reaches a terminal state.
    fn on_game_end(&mut self, _game_num: usize, _outcome: GameOutcome) -> Result<()> {
        Ok(())
    }

    /// Called once after the last game. Use this to finalize output.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
