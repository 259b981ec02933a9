//! MCTS node representation.
//!
//! Nodes live in an arena owned by [`MctsTree`](super::tree::MctsTree) and
//! refer to their parent and children by [`NodeId`].

use crate::tictactoe::BoardState;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One board position reached from the root by a sequence of moves.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Position at this node
    pub state: BoardState,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Move that led here from the parent
    pub action: Option<usize>,
    /// Number of simulations that passed through this node
    pub visits: u32,
    /// Sum of simulation outcomes, from the root player's point of view
    pub score: f64,
    /// Legal moves not yet expanded into children, ascending; expansion pops from the end
    pub untried: Vec<usize>,
    /// Expanded children as (move, child) pairs in expansion order
    pub children: Vec<(usize, NodeId)>,
}

impl SearchNode {
    pub fn new_root(state: BoardState) -> Self {
        Self::new(state, None, None)
    }

    pub fn new_child(state: BoardState, parent: NodeId, action: usize) -> Self {
        Self::new(state, Some(parent), Some(action))
    }

    fn new(state: BoardState, parent: Option<NodeId>, action: Option<usize>) -> Self {
        Self {
            untried: state.legal_moves(),
            state,
            parent,
            action,
            visits: 0,
            score: 0.0,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Mean outcome from the root player's point of view
    #[inline]
    pub fn mean_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score / self.visits as f64
        }
    }

    /// UCT value of this node seen from its parent.
    ///
    /// `sign` is +1 when the parent's mover is the root player and -1
    /// otherwise, so each side maximises its own outcome.
    pub fn uct(&self, parent_visits: u32, exploration: f64, sign: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        let exploitation = sign * self.score / visits;
        let exploration = exploration * ((parent_visits as f64).ln() / visits).sqrt();
        exploitation + exploration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root_lists_untried_moves() {
        let node = SearchNode::new_root(BoardState::from_string("X...O....").unwrap());
        assert_eq!(node.untried, vec![1, 2, 3, 5, 6, 7, 8]);
        assert!(!node.is_fully_expanded());
        assert_eq!(node.mean_score(), 0.0);
    }

    #[test]
    fn test_uct_balances_exploitation_and_exploration() {
        let mut node = SearchNode::new_root(BoardState::new());
        node.visits = 4;
        node.score = 2.0;

        let greedy = node.uct(16, 0.0, 1.0);
        assert!((greedy - 0.5).abs() < 1e-12);

        let opponent_view = node.uct(16, 0.0, -1.0);
        assert!((opponent_view + 0.5).abs() < 1e-12);

        let explored = node.uct(16, std::f64::consts::SQRT_2, 1.0);
        let expected = 0.5 + std::f64::consts::SQRT_2 * ((16f64).ln() / 4.0).sqrt();
        assert!((explored - expected).abs() < 1e-12);
    }
}
