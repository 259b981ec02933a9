//! Dense ReLU network with an output-layer-only TD update

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{NetworkConfig, features::encode_input};
use crate::{Error, Result, experience::Experience};

/// Shape summary reported in diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub layers: Vec<usize>,
    pub total_weights: usize,
}

/// Fixed-topology feed-forward approximator
///
/// `weights[l][j][k]` connects unit `k` of layer `l` to unit `j` of layer `l + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approximator {
    config: NetworkConfig,
    weights: Vec<Vec<Vec<f64>>>,
    biases: Vec<Vec<f64>>,
}

impl Approximator {
    /// Build a network with uniform Xavier-initialised weights and zero biases.
    pub fn new<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut weights = Vec::with_capacity(config.layers.len() - 1);
        let mut biases = Vec::with_capacity(config.layers.len() - 1);
        for pair in config.layers.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
            let layer = (0..fan_out)
                .map(|_| {
                    (0..fan_in)
                        .map(|_| (rng.random::<f64>() - 0.5) * 2.0 * limit)
                        .collect()
                })
                .collect();
            weights.push(layer);
            biases.push(vec![0.0; fan_out]);
        }

        Ok(Self {
            config,
            weights,
            biases,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn layers(&self) -> &[usize] {
        &self.config.layers
    }

    /// Number of connection weights, biases excluded
    pub fn total_weights(&self) -> usize {
        self.weights
            .iter()
            .flat_map(|layer| layer.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn info(&self) -> NetworkInfo {
        NetworkInfo {
            layers: self.config.layers.clone(),
            total_weights: self.total_weights(),
        }
    }

    fn input_len(&self) -> usize {
        self.config.layers[0]
    }

    /// Activations of every layer, input included.
    fn activations(&self, input: &[f64]) -> Result<Vec<Vec<f64>>> {
        if input.len() != self.input_len() {
            return Err(Error::InvalidStateLength {
                expected: self.input_len(),
                got: input.len(),
            });
        }

        let last = self.weights.len() - 1;
        let mut trace = Vec::with_capacity(self.weights.len() + 1);
        trace.push(input.to_vec());

        for (l, (layer, bias)) in self.weights.iter().zip(&self.biases).enumerate() {
            let previous = &trace[l];
            let next: Vec<f64> = layer
                .iter()
                .zip(bias)
                .map(|(unit, &b)| {
                    let sum = b + unit.iter().zip(previous).map(|(w, x)| w * x).sum::<f64>();
                    if l == last { sum } else { sum.max(0.0) }
                })
                .collect();
            trace.push(next);
        }

        Ok(trace)
    }

    /// Raw output scores for an input vector of the input layer's width.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut trace = self.activations(input)?;
        Ok(trace.pop().unwrap_or_default())
    }

    /// Q-values for a numeric board
    pub fn q_values(&self, board: &[i8; 9]) -> Result<Vec<f64>> {
        self.forward(&encode_input(board, self.input_len()))
    }

    /// Empty cell with the highest output, first in ascending order on ties.
    pub fn best_move(&self, board: &[i8; 9]) -> Result<Option<usize>> {
        let q = self.q_values(board)?;
        let mut best: Option<(usize, f64)> = None;
        for pos in (0..9).filter(|&pos| board[pos] == 0) {
            if best.is_none_or(|(_, value)| q[pos] > value) {
                best = Some((pos, q[pos]));
            }
        }
        Ok(best.map(|(pos, _)| pos))
    }

    /// One pass over `batch`, moving the taken action's output toward its TD target.
    ///
    /// Only the output layer changes; its input is the last hidden activation.
    /// Returns the mean squared TD error before the updates.
    pub fn train(&mut self, batch: &[Experience]) -> Result<f64> {
        if batch.is_empty() {
            return Ok(0.0);
        }

        let input_len = self.input_len();
        let rate = self.config.learning_rate;
        let discount = self.config.discount_factor;
        let mut squared_error = 0.0;

        for experience in batch {
            if experience.action >= 9 {
                return Err(Error::InvalidPosition {
                    position: experience.action,
                });
            }

            let target = if experience.done {
                experience.reward
            } else {
                let next_q = self.forward(&encode_input(&experience.next_state, input_len))?;
                let best_next = next_q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                experience.reward + discount * best_next
            };

            let mut trace = self.activations(&encode_input(&experience.state, input_len))?;
            let output = trace.pop().unwrap_or_default();
            let hidden = trace.pop().unwrap_or_default();
            let error = target - output[experience.action];
            squared_error += error * error;

            let out = self.weights.len() - 1;
            for (w, x) in self.weights[out][experience.action].iter_mut().zip(&hidden) {
                *w += rate * error * x;
            }
            self.biases[out][experience.action] += rate * error;
        }

        let mse = squared_error / batch.len() as f64;
        debug!(batch = batch.len(), mse, "approximator training step");
        Ok(mse)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn network(seed: u64) -> Approximator {
        let mut rng = StdRng::seed_from_u64(seed);
        Approximator::new(NetworkConfig::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_shape() {
        let net = network(1);
        assert_eq!(net.layers(), &[27, 64, 32, 16, 9]);
        assert_eq!(net.total_weights(), 27 * 64 + 64 * 32 + 32 * 16 + 16 * 9);
        assert_eq!(net.q_values(&[0; 9]).unwrap().len(), 9);
    }

    #[test]
    fn test_wrong_input_length_is_rejected() {
        let net = network(2);
        let err = net.forward(&[0.0; 18]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateLength {
                expected: 27,
                got: 18
            }
        ));
    }

    #[test]
    fn test_best_move_is_empty_cell() {
        let net = network(3);
        let board = [1, -1, 1, -1, 0, 1, -1, 1, -1];
        assert_eq!(net.best_move(&board).unwrap(), Some(4));
        assert_eq!(net.best_move(&[1; 9]).unwrap(), None);
    }

    #[test]
    fn test_training_moves_output_toward_target() {
        let mut net = network(4);
        let state = [1, 1, 0, -1, -1, 0, 0, 0, 0];
        let experience = Experience {
            state,
            action: 2,
            reward: 10.0,
            next_state: [1, 1, 1, -1, -1, 0, 0, 0, 0],
            done: true,
        };

        let before = net.q_values(&state).unwrap();
        let mut last_error = f64::INFINITY;
        for _ in 0..50 {
            let mse = net.train(&[experience]).unwrap();
            assert!(mse <= last_error + 1e-9);
            last_error = mse;
        }
        let after = net.q_values(&state).unwrap();

        assert!((10.0 - after[2]).abs() < (10.0 - before[2]).abs());
        // other outputs are untouched
        for pos in [0, 1, 3, 4, 5, 6, 7, 8] {
            assert_eq!(before[pos], after[pos]);
        }
    }

    #[test]
    fn test_invalid_action_is_rejected() {
        let mut net = network(5);
        let experience = Experience {
            state: [0; 9],
            action: 9,
            reward: 0.0,
            next_state: [0; 9],
            done: true,
        };
        assert!(matches!(
            net.train(&[experience]),
            Err(Error::InvalidPosition { position: 9 })
        ));
    }
}
