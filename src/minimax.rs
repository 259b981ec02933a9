//! Exhaustive adversarial search with alpha-beta pruning
//!
//! Scores are from the maximizing side's point of view: a win for the
//! maximizing side scores `10 - depth`, a loss `depth - 10`, a draw `0`.
//! Depth counts plies below the root move, so the root move itself is
//! depth 0 and faster wins (or slower losses) are preferred.
//!
//! Each root move is searched with a fresh full window, which makes the
//! pruned root scores exactly equal to the full-width scores. Pruning only
//! changes how many nodes get visited.

use crate::{
    Error, Result,
    tictactoe::{BoardState, Player},
};

/// Score of a win found at depth 0
pub const WIN_SCORE: i32 = 10;

/// Node-visit bookkeeping for a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: u64,
}

fn terminal_score(state: &BoardState, maximizing: Player, depth: i32) -> Option<i32> {
    match state.winner() {
        Some(winner) if winner == maximizing => Some(WIN_SCORE - depth),
        Some(_) => Some(depth - WIN_SCORE),
        None if state.is_terminal() => Some(0),
        None => None,
    }
}

fn alpha_beta(
    state: &BoardState,
    maximizing: Player,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
    stats: &mut SearchStats,
) -> Result<i32> {
    stats.nodes_visited += 1;
    if let Some(score) = terminal_score(state, maximizing, depth) {
        return Ok(score);
    }

    if state.to_move == maximizing {
        let mut best = i32::MIN;
        for mv in state.legal_moves() {
            let child = state.make_move(mv)?;
            let score = alpha_beta(&child, maximizing, depth + 1, alpha, beta, stats)?;
            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        Ok(best)
    } else {
        let mut best = i32::MAX;
        for mv in state.legal_moves() {
            let child = state.make_move(mv)?;
            let score = alpha_beta(&child, maximizing, depth + 1, alpha, beta, stats)?;
            best = best.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        Ok(best)
    }
}

fn full_width(
    state: &BoardState,
    maximizing: Player,
    depth: i32,
    stats: &mut SearchStats,
) -> Result<i32> {
    stats.nodes_visited += 1;
    if let Some(score) = terminal_score(state, maximizing, depth) {
        return Ok(score);
    }

    let mut scores = Vec::new();
    for mv in state.legal_moves() {
        let child = state.make_move(mv)?;
        scores.push(full_width(&child, maximizing, depth + 1, stats)?);
    }

    let best = if state.to_move == maximizing {
        scores.into_iter().max()
    } else {
        scores.into_iter().min()
    };
    best.ok_or(Error::NoValidMoves)
}

fn root_moves(state: &BoardState) -> Result<Vec<usize>> {
    if state.is_terminal() {
        return Err(Error::GameOver);
    }
    Ok(state.legal_moves())
}

/// Alpha-beta score of every legal move, in ascending move order
pub fn score_moves(
    state: &BoardState,
    maximizing: Player,
    stats: &mut SearchStats,
) -> Result<Vec<(usize, i32)>> {
    root_moves(state)?
        .into_iter()
        .map(|mv| {
            let child = state.make_move(mv)?;
            let score = alpha_beta(&child, maximizing, 0, i32::MIN, i32::MAX, stats)?;
            Ok((mv, score))
        })
        .collect()
}

/// Unpruned reference search; same contract as [`score_moves`]
pub fn score_moves_full_width(
    state: &BoardState,
    maximizing: Player,
    stats: &mut SearchStats,
) -> Result<Vec<(usize, i32)>> {
    root_moves(state)?
        .into_iter()
        .map(|mv| {
            let child = state.make_move(mv)?;
            Ok((mv, full_width(&child, maximizing, 0, stats)?))
        })
        .collect()
}

/// Best move for the side to move, scored from `maximizing`'s point of view.
///
/// When the side to move is the maximizing side the highest score wins,
/// otherwise the lowest. Ties go to the lowest index.
///
/// # Errors
///
/// Returns `GameOver` if the board is already terminal.
pub fn best_move(state: &BoardState, maximizing: Player) -> Result<usize> {
    best_move_with_stats(state, maximizing).map(|(mv, _)| mv)
}

/// [`best_move`] plus the number of nodes the search visited
pub fn best_move_with_stats(state: &BoardState, maximizing: Player) -> Result<(usize, SearchStats)> {
    let mut stats = SearchStats::default();
    let scored = score_moves(state, maximizing, &mut stats)?;
    let prefer_high = state.to_move == maximizing;

    let mut best: Option<(usize, i32)> = None;
    for (mv, score) in scored {
        let better = match best {
            None => true,
            Some((_, current)) if prefer_high => score > current,
            Some((_, current)) => score < current,
        };
        if better {
            best = Some((mv, score));
        }
    }

    best.map(|(mv, _)| (mv, stats)).ok_or(Error::NoValidMoves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_immediate_win() {
        // X X .
        // O O .
        // . . .
        let state = BoardState::from_string("XX.OO....").unwrap();
        assert_eq!(best_move(&state, Player::X).unwrap(), 2);
    }

    #[test]
    fn test_blocks_immediate_loss() {
        // X X .
        // . O .
        // . . .
        let state = BoardState::from_string("XX..O....").unwrap();
        assert_eq!(state.to_move, Player::O);
        assert_eq!(best_move(&state, Player::O).unwrap(), 2);
    }

    #[test]
    fn test_prefers_faster_win() {
        let state = BoardState::from_string("XX.OO....").unwrap();
        let mut stats = SearchStats::default();
        let scores = score_moves(&state, Player::X, &mut stats).unwrap();
        let win_now = scores.iter().find(|(mv, _)| *mv == 2).unwrap().1;
        assert_eq!(win_now, WIN_SCORE);
        assert!(scores.iter().all(|&(_, s)| s <= win_now));
    }

    #[test]
    fn test_empty_board_is_a_draw_and_ties_break_low() {
        let state = BoardState::new();
        let mut stats = SearchStats::default();
        let scores = score_moves(&state, Player::X, &mut stats).unwrap();
        assert!(scores.iter().all(|&(_, s)| s == 0));
        assert_eq!(best_move(&state, Player::X).unwrap(), 0);
    }

    #[test]
    fn test_terminal_board_is_rejected() {
        let state = BoardState::from_string("XOXXOOOXX").unwrap();
        assert!(matches!(best_move(&state, Player::X), Err(Error::GameOver)));
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let state = BoardState::from_string("X...O....").unwrap();
        let mut pruned = SearchStats::default();
        let mut full = SearchStats::default();
        let a = score_moves(&state, Player::X, &mut pruned).unwrap();
        let b = score_moves_full_width(&state, Player::X, &mut full).unwrap();
        assert_eq!(a, b);
        assert!(pruned.nodes_visited < full.nodes_visited);
    }
}
