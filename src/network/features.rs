//! Board feature extraction
//!
//! Boards arrive in the numeric encoding (+1 own, -1 opponent, 0 empty).
//! The feature vector is the nine cells followed by nine strategic scalars,
//! all divided by [`NORMALIZER`].

use crate::tictactoe::{CENTER, CORNERS, EDGES, WINNING_LINES};

/// Cells plus strategic scalars
pub const FEATURE_LEN: usize = 18;

/// Divisor applied to every feature
pub const NORMALIZER: f64 = 10.0;

const CENTER_WEIGHT: f64 = 5.0;

/// Lines where `side` holds two cells and the third is empty
fn threats(board: &[i8; 9], side: i8) -> usize {
    WINNING_LINES
        .iter()
        .filter(|line| {
            let own = line.iter().filter(|&&pos| board[pos] == side).count();
            let empty = line.iter().filter(|&&pos| board[pos] == 0).count();
            own == 2 && empty == 1
        })
        .count()
}

/// Empty cells after which `side` would hold two or more threats
fn forks(board: &[i8; 9], side: i8) -> usize {
    (0..9)
        .filter(|&pos| board[pos] == 0)
        .filter(|&pos| {
            let mut next = *board;
            next[pos] = side;
            threats(&next, side) >= 2
        })
        .count()
}

fn control(board: &[i8; 9], cells: &[usize]) -> f64 {
    cells.iter().map(|&pos| f64::from(board[pos].signum())).sum()
}

/// Normalized feature vector for a numeric board.
pub fn features(board: &[i8; 9]) -> [f64; FEATURE_LEN] {
    let mut out = [0.0; FEATURE_LEN];
    for (slot, &cell) in out.iter_mut().zip(board.iter()) {
        *slot = f64::from(cell);
    }

    let own_threats = threats(board, 1) as f64;
    let opponent_threats = threats(board, -1) as f64;

    out[9] = f64::from(board[CENTER].signum()) * CENTER_WEIGHT;
    out[10] = control(board, &CORNERS);
    out[11] = control(board, &EDGES);
    out[12] = own_threats;
    out[13] = opponent_threats;
    out[14] = forks(board, 1) as f64;
    out[15] = forks(board, -1) as f64;
    // blocking moves needed, then winning moves available
    out[16] = opponent_threats;
    out[17] = own_threats;

    for value in &mut out {
        *value /= NORMALIZER;
    }
    out
}

/// Features zero-padded to the network's input width.
pub fn encode_input(board: &[i8; 9], input_len: usize) -> Vec<f64> {
    let mut input = vec![0.0; input_len.max(FEATURE_LEN)];
    input[..FEATURE_LEN].copy_from_slice(&features(board));
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_is_all_zero() {
        assert_eq!(features(&[0; 9]), [0.0; FEATURE_LEN]);
    }

    #[test]
    fn test_strategic_features() {
        // own: 0, 1, 4   opponent: 3, 8
        let board = [1, 1, 0, -1, 1, 0, 0, 0, -1];
        let f = features(&board);

        assert_eq!(f[0], 0.1);
        assert_eq!(f[3], -0.1);
        assert_eq!(f[9], 0.5); // center
        assert_eq!(f[10], 0.0); // corners 0 and 8 cancel
        assert_eq!(f[11], 0.0); // edges 1 and 3 cancel
        // threats: row 0 (cell 2), column 1 (cell 7), diagonal 2-4-6 is only one own mark
        assert_eq!(f[12], 0.2);
        assert_eq!(f[13], 0.0);
        assert_eq!(f[16], f[13]);
        assert_eq!(f[17], f[12]);
    }

    #[test]
    fn test_fork_detection() {
        // own corners 0 and 8, opponent center
        let board = [1, 0, 0, 0, -1, 0, 0, 0, 1];
        // own at 2 threatens 1 and 5; own at 6 threatens 3 and 7
        assert_eq!(forks(&board, 1), 2);
        assert_eq!(forks(&board, -1), 0);
    }

    #[test]
    fn test_padding() {
        let input = encode_input(&[0; 9], 27);
        assert_eq!(input.len(), 27);
        assert!(input[FEATURE_LEN..].iter().all(|&v| v == 0.0));
    }
}
