//! Winning line analysis for Tic-Tac-Toe

use std::collections::BTreeSet;

use super::{Cell, Player};

/// Winning line indices on the 3x3 board, in scan order
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Corner cells
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Edge (non-corner, non-center) cells
pub const EDGES: [usize; 4] = [1, 3, 5, 7];

/// Center cell
pub const CENTER: usize = 4;

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Winner of the first completed line in scan order (rows, columns, diagonals)
    pub fn winner(cells: &[Cell; 9]) -> Option<Player> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| {
            let first = cells[a];
            if first != Cell::Empty && first == cells[b] && first == cells[c] {
                first.to_player()
            } else {
                None
            }
        })
    }

    /// Check if a player has won by having three in a row
    pub fn has_won(cells: &[Cell; 9], player: Player) -> bool {
        let target = player.to_cell();
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| cells[idx] == target))
    }

    /// Find all positions that would immediately win for the player, ascending
    pub fn winning_moves(cells: &[Cell; 9], player: Player) -> BTreeSet<usize> {
        WINNING_LINES
            .iter()
            .filter_map(|line| Self::winning_move_in_line(cells, player, line))
            .collect()
    }

    /// Check if a player has an immediate winning move available (2 in a line with 1 empty)
    pub fn has_immediate_win(cells: &[Cell; 9], player: Player) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| Self::winning_move_in_line(cells, player, line).is_some())
    }

    /// Find the winning move position in a specific line, if one exists
    fn winning_move_in_line(cells: &[Cell; 9], player: Player, line: &[usize; 3]) -> Option<usize> {
        let target = player.to_cell();
        let mut count = 0;
        let mut empty_pos = None;

        for &idx in line {
            match cells[idx] {
                Cell::Empty => {
                    if empty_pos.is_some() {
                        return None;
                    }
                    empty_pos = Some(idx);
                }
                c if c == target => count += 1,
                _ => return None,
            }
        }

        if count == 2 { empty_pos } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_won_horizontal() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::X;
        cells[1] = Cell::X;
        cells[2] = Cell::X;

        assert!(LineAnalyzer::has_won(&cells, Player::X));
        assert!(!LineAnalyzer::has_won(&cells, Player::O));
        assert_eq!(LineAnalyzer::winner(&cells), Some(Player::X));
    }

    #[test]
    fn test_winner_follows_scan_order() {
        // Unreachable board with two completed rows: the top row is scanned first
        let mut cells = [Cell::Empty; 9];
        for idx in [0, 1, 2] {
            cells[idx] = Cell::O;
        }
        for idx in [6, 7, 8] {
            cells[idx] = Cell::X;
        }

        assert_eq!(LineAnalyzer::winner(&cells), Some(Player::O));
    }

    #[test]
    fn test_winner_none_on_empty() {
        assert_eq!(LineAnalyzer::winner(&[Cell::Empty; 9]), None);
    }

    #[test]
    fn test_winning_moves_multiple() {
        // XX.
        // X..
        // ...
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::X;
        cells[1] = Cell::X;
        cells[3] = Cell::X;

        let moves: Vec<usize> = LineAnalyzer::winning_moves(&cells, Player::X)
            .into_iter()
            .collect();
        assert_eq!(moves, vec![2, 6]);
    }

    #[test]
    fn test_blocked_line_is_not_a_threat() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::X;
        cells[1] = Cell::X;
        cells[2] = Cell::O;

        assert!(!LineAnalyzer::has_immediate_win(&cells, Player::X));
    }
}
