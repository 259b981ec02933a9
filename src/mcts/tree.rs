//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by [`NodeId`]
//! indices, so parent links never form ownership cycles and dropping the
//! tree frees every node at once.

use rand::{Rng, seq::IndexedRandom};

use super::node::{NodeId, SearchNode};
use crate::{
    Result,
    tictactoe::{BoardState, Player},
};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<SearchNode>,
    root: NodeId,
    root_player: Player,
}

impl MctsTree {
    /// Create a tree holding only the root position.
    pub fn new(root_state: BoardState) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(root_state)],
            root: NodeId(0),
            root_player: root_state.to_move,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Side to move at the root; outcomes are scored for this side
    #[inline]
    pub fn root_player(&self) -> Player {
        self.root_player
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `node_id` with the highest UCT value, first one on ties.
    pub fn select_child(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let sign = if node.state.to_move == self.root_player {
            1.0
        } else {
            -1.0
        };

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let value = self.get(child_id).uct(node.visits, exploration, sign);
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((child_id, value));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Descend from the root while nodes are fully expanded and have children.
    pub fn select(&self, exploration: f64) -> NodeId {
        let mut current = self.root;
        loop {
            let node = self.get(current);
            if !node.is_fully_expanded() || node.children.is_empty() {
                return current;
            }
            match self.select_child(current, exploration) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Pop the last untried move of `node_id` and add the resulting child.
    ///
    /// Returns `None` when the node has nothing left to expand.
    pub fn expand(&mut self, node_id: NodeId) -> Result<Option<NodeId>> {
        let node = self.get_mut(node_id);
        let Some(action) = node.untried.pop() else {
            return Ok(None);
        };
        let state = node.state.make_move(action)?;

        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new_child(state, node_id, action));
        self.get_mut(node_id).children.push((action, child_id));
        Ok(Some(child_id))
    }

    /// Play uniformly random moves from `node_id` to the end of the game.
    ///
    /// Returns +1 if the root player wins, -1 if it loses, 0 for a draw.
    pub fn simulate<R: Rng + ?Sized>(&self, node_id: NodeId, rng: &mut R) -> Result<f64> {
        let mut state = self.get(node_id).state;
        while !state.is_terminal() {
            let moves = state.legal_moves();
            let Some(&mv) = moves.choose(rng) else {
                break;
            };
            state = state.make_move(mv)?;
        }

        Ok(match state.winner() {
            Some(winner) if winner == self.root_player => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        })
    }

    /// Add `outcome` to every node from `leaf_id` up to the root.
    pub fn backpropagate(&mut self, leaf_id: NodeId, outcome: f64) {
        let mut current = Some(leaf_id);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.score += outcome;
            current = node.parent;
        }
    }

    /// Most visited root child as (move, visits); ties go to the lowest move.
    pub fn best_action(&self) -> Option<(usize, u32)> {
        let root = self.get(self.root);
        let mut best: Option<(usize, u32)> = None;
        for &(action, child_id) in &root.children {
            let visits = self.get(child_id).visits;
            let better = match best {
                None => true,
                Some((best_action, best_visits)) => {
                    visits > best_visits || (visits == best_visits && action < best_action)
                }
            };
            if better {
                best = Some((action, visits));
            }
        }
        best
    }

    /// Visit count of every root child, indexed by move
    pub fn root_visits(&self) -> [u32; 9] {
        let mut visits = [0u32; 9];
        for &(action, child_id) in &self.get(self.root).children {
            visits[action] = self.get(child_id).visits;
        }
        visits
    }
}
