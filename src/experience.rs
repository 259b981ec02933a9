//! Experience tuples and the bounded replay store
//!
//! States are kept in the numeric encoding relative to the learner
//! (+1 own mark, -1 opponent, 0 empty), the same form the approximator
//! consumes.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tictactoe::{BoardState, Player};

/// Reward for a transition that wins the game for the learner
pub const WIN_REWARD: f64 = 10.0;

/// Reward for a transition after which the learner has lost
pub const LOSS_REWARD: f64 = -10.0;

/// Default number of tuples kept
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Reward for reaching `next` from `learner`'s point of view.
///
/// Draws and non-terminal positions are worth 0.
pub fn transition_reward(next: &BoardState, learner: Player) -> f64 {
    match next.winner() {
        Some(winner) if winner == learner => WIN_REWARD,
        Some(_) => LOSS_REWARD,
        None => 0.0,
    }
}

/// One recorded transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: [i8; 9],
    pub action: usize,
    pub reward: f64,
    pub next_state: [i8; 9],
    pub done: bool,
}

impl Experience {
    /// Build a tuple for `learner` moving at `action` from `before`, ending up in `after`.
    pub fn from_transition(
        before: &BoardState,
        action: usize,
        after: &BoardState,
        learner: Player,
    ) -> Self {
        Self {
            state: before.to_numeric(learner),
            action,
            reward: transition_reward(after, learner),
            next_state: after.to_numeric(learner),
            done: after.is_terminal(),
        }
    }
}

/// FIFO ring buffer of experience tuples
#[derive(Debug, Clone)]
pub struct ExperienceStore {
    buffer: VecDeque<Experience>,
    capacity: usize,
}

impl ExperienceStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Push to the back, evicting the oldest tuple once over capacity.
    ///
    /// Returns the evicted tuple, if any.
    pub fn append(&mut self, experience: Experience) -> Option<Experience> {
        self.buffer.push_back(experience);
        if self.buffer.len() > self.capacity {
            self.buffer.pop_front()
        } else {
            None
        }
    }

    /// The last `n` tuples in insertion order.
    ///
    /// This is a recency window, not a uniform random sample.
    pub fn sample_recent(&self, n: usize) -> Vec<Experience> {
        let skip = self.buffer.len().saturating_sub(n);
        self.buffer.iter().skip(skip).copied().collect()
    }

    /// Whether the size hits the training cadence: at least `batch_size`
    /// tuples and a multiple of `every`.
    pub fn ready_for_training(&self, batch_size: usize, every: usize) -> bool {
        let len = self.buffer.len();
        every > 0 && len >= batch_size && len.is_multiple_of(every)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ExperienceStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
