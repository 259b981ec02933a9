//! Value table for tabular Q-learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Action values for one position, indexed by cell
pub type ActionValues = [f64; 9];

/// Q-table mapping a 9-cell board key to one value per cell
///
/// Unseen positions start at all zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    q_values: HashMap<String, ActionValues>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a new Q-table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    /// Values for a position without inserting it
    pub fn values(&self, key: &str) -> ActionValues {
        self.q_values.get(key).copied().unwrap_or([0.0; 9])
    }

    /// Values for a position, inserting zeros if it has not been seen yet
    pub fn values_mut(&mut self, key: &str) -> &mut ActionValues {
        self.q_values.entry(key.to_string()).or_insert([0.0; 9])
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, key: &str, action: usize) -> Result<f64> {
        check_action(action)?;
        Ok(self.values(key)[action])
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, key: &str, action: usize, value: f64) -> Result<()> {
        check_action(action)?;
        self.values_mut(key)[action] = value;
        Ok(())
    }

    /// Highest value over all nine cells of a position
    pub fn max_q(&self, key: &str) -> f64 {
        self.values(key)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Legal action with the highest value, first one in `legal_actions` on ties
    pub fn greedy_action(&mut self, key: &str, legal_actions: &[usize]) -> Result<Option<usize>> {
        let values = *self.values_mut(key);
        let mut best: Option<(usize, f64)> = None;
        for &action in legal_actions {
            check_action(action)?;
            let value = values[action];
            if best.is_none_or(|(_, current)| value > current) {
                best = Some((action, value));
            }
        }
        Ok(best.map(|(action, _)| action))
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max Q(s') - Q(s,a)]
    ///
    /// Returns the updated value.
    pub fn q_learning_update(
        &mut self,
        state: &str,
        action: usize,
        reward: f64,
        next_state: &str,
    ) -> Result<f64> {
        check_action(action)?;
        let max_next_q = self.max_q(next_state);
        let discount = self.discount_factor;
        let rate = self.learning_rate;

        let values = self.values_mut(state);
        let current_q = values[action];
        let td_error = reward + discount * max_next_q - current_q;
        values[action] = current_q + rate * td_error;
        Ok(values[action])
    }

    /// Forget every learned value
    pub fn reset(&mut self) {
        self.q_values.clear();
    }

    /// Number of positions stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }
}

fn check_action(action: usize) -> Result<()> {
    if action < 9 {
        Ok(())
    } else {
        Err(Error::InvalidPosition { position: action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = ".........";
    const AFTER_X: &str = "X........";

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(0.1, 0.9);
        assert_eq!(qtable.get(EMPTY, 0).unwrap(), 0.0);
        assert_eq!(qtable.size(), 0);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new(0.1, 0.9);
        qtable.set(EMPTY, 4, 1.5).unwrap();
        assert_eq!(qtable.get(EMPTY, 4).unwrap(), 1.5);
        assert!(qtable.set(EMPTY, 9, 1.0).is_err());
    }

    #[test]
    fn test_greedy_action_prefers_first_on_ties() {
        let mut qtable = QTable::new(0.1, 0.9);
        assert_eq!(qtable.greedy_action(EMPTY, &[2, 5, 7]).unwrap(), Some(2));
        // lookup initialises the position
        assert_eq!(qtable.size(), 1);

        qtable.set(EMPTY, 5, 0.5).unwrap();
        qtable.set(EMPTY, 7, 0.5).unwrap();
        assert_eq!(qtable.greedy_action(EMPTY, &[2, 5, 7]).unwrap(), Some(5));
        assert_eq!(qtable.greedy_action(EMPTY, &[]).unwrap(), None);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(0.1, 0.9);
        qtable.set(AFTER_X, 1, 1.0).unwrap();
        qtable.set(AFTER_X, 2, 2.0).unwrap();

        let updated = qtable.q_learning_update(EMPTY, 0, 0.0, AFTER_X).unwrap();

        // 0 + 0.1 * (0 + 0.9 * 2.0 - 0) = 0.18
        assert!((updated - 0.18).abs() < 1e-12);
        assert!((qtable.get(EMPTY, 0).unwrap() - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_terminal_reward_update() {
        let mut qtable = QTable::new(0.1, 0.9);
        let updated = qtable.q_learning_update(EMPTY, 4, 10.0, AFTER_X).unwrap();
        assert!((updated - 1.0).abs() < 1e-12);
    }
}
