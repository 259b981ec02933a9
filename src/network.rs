//! Feed-forward action-value approximator
//!
//! A small dense network mapping board features to one raw Q-value per cell.
//! Hidden layers use ReLU, the output layer is linear. Training adjusts the
//! output layer only.

pub mod approximator;
pub mod features;

use serde::{Deserialize, Serialize};

pub use approximator::{Approximator, NetworkInfo};
pub use features::{FEATURE_LEN, encode_input, features};

use crate::{Error, Result};

/// Network shape and training constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Layer sizes from input to output
    pub layers: Vec<usize>,
    pub learning_rate: f64,
    /// Discount applied to the best next-state value
    pub discount_factor: f64,
    /// Most recent tuples consumed per training step
    pub batch_size: usize,
    /// Train whenever the store size is a multiple of this
    pub train_every: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layers: vec![27, 64, 32, 16, 9],
            learning_rate: 0.001,
            discount_factor: 0.95,
            batch_size: 32,
            train_every: 10,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "network needs at least an input and an output layer, got {} layers",
                    self.layers.len()
                ),
            });
        }
        if self.layers[0] < FEATURE_LEN {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "network input layer must hold {FEATURE_LEN} features, got {}",
                    self.layers[0]
                ),
            });
        }
        if self.layers.last() != Some(&9) {
            return Err(Error::InvalidConfiguration {
                message: "network output layer must have 9 units, one per cell".to_string(),
            });
        }
        if self.layers.contains(&0) {
            return Err(Error::InvalidConfiguration {
                message: "network layers must not be empty".to_string(),
            });
        }
        if self.batch_size == 0 || self.train_every == 0 {
            return Err(Error::InvalidConfiguration {
                message: "batch_size and train_every must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let mut config = NetworkConfig {
            layers: vec![27, 16, 8],
            ..NetworkConfig::default()
        };
        assert!(config.validate().is_err());

        config.layers = vec![10, 9];
        assert!(config.validate().is_err());

        config.layers = vec![18, 0, 9];
        assert!(config.validate().is_err());

        config.layers = vec![18, 9];
        assert!(config.validate().is_ok());
    }
}
