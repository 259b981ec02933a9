//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '_' | ' ' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' | '0' => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell().to_char())
    }
}

/// Complete board state including cells and whose turn it is
///
/// This type implements `Copy`, so every strategy receives its own copy and a
/// move always produces a new value rather than mutating a shared board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
    pub to_move: Player,
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceCount {
    x: usize,
    o: usize,
}

impl BoardState {
    /// Create a new empty board with X to move
    pub fn new() -> Self {
        Self::new_with_player(Player::X)
    }

    /// Create a new empty board with a specified player to move first.
    ///
    /// Self-play opens with the engine's own side, which may be O.
    pub fn new_with_player(first_player: Player) -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
            to_move: first_player,
        }
    }

    fn count_pieces(cells: &[Cell; 9]) -> PieceCount {
        cells.iter().fold(PieceCount { x: 0, o: 0 }, |mut count, cell| {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => {}
            }
            count
        })
    }

    fn parse_player(suffix: &str, context: &str) -> Result<Player, crate::Error> {
        match suffix {
            "X" | "x" => Ok(Player::X),
            "O" | "o" => Ok(Player::O),
            _ => Err(crate::Error::InvalidConfiguration {
                message: format!("invalid player suffix '{suffix}' in '{context}'"),
            }),
        }
    }

    /// Create a board from a string representation.
    ///
    /// The string holds 9 cell characters (whitespace is ignored) and may carry
    /// a `_X` or `_O` suffix naming the side to move. Without a suffix the side
    /// to move is inferred from the piece counts: equal counts mean X moves,
    /// one extra X means O moves.
    ///
    /// # Errors
    ///
    /// Returns error if the board has fewer than 9 cells, contains an invalid
    /// character, or has piece counts that no alternating game can produce.
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (board_part, suffix) = match cleaned.split_once('_') {
            Some((board, suffix)) if board.chars().count() == 9 => (board, Some(suffix)),
            _ => (cleaned.as_str(), None),
        };

        let chars: Vec<char> = board_part.chars().collect();
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        let count = Self::count_pieces(&cells);
        let invalid_counts = || crate::Error::InvalidPieceCounts {
            x_count: count.x,
            o_count: count.o,
        };
        if count.x.abs_diff(count.o) > 1 {
            return Err(invalid_counts());
        }

        let to_move = match suffix {
            Some(suffix) => {
                let player = Self::parse_player(suffix, s)?;
                let consistent = match player {
                    Player::X => count.x <= count.o,
                    Player::O => count.o <= count.x,
                };
                if !consistent {
                    return Err(invalid_counts());
                }
                player
            }
            None if count.x == count.o => Player::X,
            None if count.x == count.o + 1 => Player::O,
            None => return Err(invalid_counts()),
        };

        Ok(BoardState { cells, to_move })
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions in ascending order
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Legal moves in ascending order (empty cells when the game is not over)
    pub fn legal_moves(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.empty_positions()
    }

    /// Make a move for the side to move and return the new board state
    #[must_use = "make_move returns a new board state; the original is unchanged"]
    pub fn make_move(&self, pos: usize) -> Result<BoardState, crate::Error> {
        self.apply_move(pos, self.to_move)
    }

    /// Place `player`'s mark at `pos` and return the new board state.
    ///
    /// # Errors
    ///
    /// - `InvalidPosition` if `pos` is outside 0-8
    /// - `GameOver` if the board is already terminal
    /// - `InvalidMove` if the cell is occupied
    /// - `OutOfTurn` if `player` is not the side to move
    #[must_use = "apply_move returns a new board state; the original is unchanged"]
    pub fn apply_move(&self, pos: usize, player: Player) -> Result<BoardState, crate::Error> {
        if pos >= 9 {
            return Err(crate::Error::InvalidPosition { position: pos });
        }
        if self.is_terminal() {
            return Err(crate::Error::GameOver);
        }
        if !self.is_empty(pos) {
            return Err(crate::Error::InvalidMove { position: pos });
        }
        if player != self.to_move {
            return Err(crate::Error::OutOfTurn { player });
        }

        let mut new_state = *self;
        new_state.cells[pos] = player.to_cell();
        new_state.to_move = player.opponent();
        Ok(new_state)
    }

    /// Positions where `player` would complete a line, ascending
    pub fn immediate_wins(&self, player: Player) -> Vec<usize> {
        LineAnalyzer::winning_moves(&self.cells, player)
            .into_iter()
            .collect()
    }

    /// Check if current player has an immediate winning move available
    pub fn has_immediate_win(&self) -> bool {
        LineAnalyzer::has_immediate_win(&self.cells, self.to_move)
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        LineAnalyzer::winner(&self.cells)
    }

    /// Check if the game is over (win or draw)
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || !self.cells.contains(&Cell::Empty)
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        !self.cells.contains(&Cell::Empty) && self.winner().is_none()
    }

    /// Nine-character key used for value-table lookups
    pub fn to_key(&self) -> String {
        self.cells.iter().map(|&c| c.to_char()).collect()
    }

    /// Key including the side to move, e.g. `XO......._X`
    pub fn encode(&self) -> String {
        format!("{}_{}", self.to_key(), self.to_move)
    }

    /// Numeric encoding relative to `perspective`: +1 own mark, -1 opponent, 0 empty
    pub fn to_numeric(&self, perspective: Player) -> [i8; 9] {
        let own = perspective.to_cell();
        let mut values = [0i8; 9];
        for (value, &cell) in values.iter_mut().zip(self.cells.iter()) {
            *value = match cell {
                Cell::Empty => 0,
                c if c == own => 1,
                _ => -1,
            };
        }
        values
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = BoardState::new();
        assert_eq!(board.to_move, Player::X);
        assert_eq!(board.legal_moves(), (0..9).collect::<Vec<_>>());
        assert!(!board.is_terminal());
    }

    #[test]
    fn test_make_move() {
        let board = BoardState::new();

        let new_board = board.make_move(4).unwrap();
        assert_eq!(new_board.cells[4], Cell::X);
        assert_eq!(new_board.to_move, Player::O);
        // original untouched
        assert_eq!(board.cells[4], Cell::Empty);

        let result = new_board.make_move(4);
        assert!(matches!(result, Err(crate::Error::InvalidMove { position: 4 })));
        assert!(result.unwrap_err().to_string().contains("occupied"));
    }

    #[test]
    fn test_apply_move_rejects_out_of_range_and_wrong_turn() {
        let board = BoardState::new();
        assert!(matches!(
            board.apply_move(9, Player::X),
            Err(crate::Error::InvalidPosition { position: 9 })
        ));
        assert!(matches!(
            board.apply_move(0, Player::O),
            Err(crate::Error::OutOfTurn { player: Player::O })
        ));
    }

    #[test]
    fn test_move_on_terminal_board_fails() {
        let board = BoardState::from_string("XXXOO....").unwrap();
        assert!(board.is_terminal());
        assert!(matches!(board.make_move(5), Err(crate::Error::GameOver)));
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn test_win_detection_diagonal() {
        let mut board = BoardState::new();
        board = board.make_move(0).unwrap(); // X
        board = board.make_move(1).unwrap(); // O
        board = board.make_move(4).unwrap(); // X
        board = board.make_move(2).unwrap(); // O
        board = board.make_move(8).unwrap(); // X

        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Player::X));
    }

    #[test]
    fn test_draw_detection() {
        let board = BoardState::from_string("XOXXOOOXX").unwrap();
        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_string_infers_turn() {
        let board = BoardState::from_string("XOX......").unwrap();
        assert_eq!(board.to_move, Player::O);

        let board = BoardState::from_string("XO.......").unwrap();
        assert_eq!(board.to_move, Player::X);

        assert!(BoardState::from_string("XO").is_err());
        assert!(BoardState::from_string("XOZ......").is_err());
        assert!(BoardState::from_string("XXX......").is_err());
    }

    #[test]
    fn test_from_string_with_turn_suffix() {
        let board = BoardState::from_string("........._O").unwrap();
        assert_eq!(board.to_move, Player::O);

        let board = BoardState::from_string("XX.OO...._O").unwrap();
        assert_eq!(board.to_move, Player::O);

        assert!(BoardState::from_string("O........_O").is_err());
    }

    #[test]
    fn test_keys_and_numeric_encoding() {
        let board = BoardState::from_string("XO.......").unwrap();
        assert_eq!(board.to_key(), "XO.......");
        assert_eq!(board.encode(), "XO......._X");
        assert_eq!(board.to_numeric(Player::O), [-1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(board.to_numeric(Player::X), [1, -1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_immediate_wins() {
        let board = BoardState::from_string("XX.O.O...").unwrap();
        assert_eq!(board.immediate_wins(Player::X), vec![2]);
        assert_eq!(board.immediate_wins(Player::O), vec![4]);
        assert!(board.has_immediate_win());
    }

    #[test]
    fn test_display() {
        let board = BoardState::from_string("XOX.O.X..").unwrap();
        assert_eq!(format!("{board}"), "XOX\n.O.\nX..");
    }
}
