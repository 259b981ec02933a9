//! Adaptive strategy weights

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Rule for shifting weight after a game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightAdaptation {
    /// Win rate above which exhaustive search gains weight
    pub high_win_rate: f64,
    pub exhaustive_step: f64,
    pub exhaustive_cap: f64,
    /// Win rate below which sampling search gains weight
    pub low_win_rate: f64,
    pub sampling_step: f64,
    pub sampling_cap: f64,
}

impl Default for WeightAdaptation {
    fn default() -> Self {
        Self {
            high_win_rate: 0.7,
            exhaustive_step: 0.01,
            exhaustive_cap: 0.5,
            low_win_rate: 0.3,
            sampling_step: 0.02,
            sampling_cap: 0.6,
        }
    }
}

/// Blend weights for the three strategies, non-negative and summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    /// Minimax
    pub exhaustive: f64,
    /// MCTS
    pub sampling: f64,
    /// Approximator
    pub learned: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            exhaustive: 0.2,
            sampling: 0.4,
            learned: 0.4,
        }
    }
}

impl StrategyWeights {
    /// Weights scaled to sum to 1.
    ///
    /// Fails on negative, non-finite or all-zero weights.
    pub fn new(exhaustive: f64, sampling: f64, learned: f64) -> Result<Self> {
        let mut weights = Self {
            exhaustive,
            sampling,
            learned,
        };
        let parts = [exhaustive, sampling, learned];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.total() <= 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "strategy weights must be finite, non-negative and not all zero, got {parts:?}"
                ),
            });
        }
        weights.normalize();
        Ok(weights)
    }

    pub fn total(&self) -> f64 {
        self.exhaustive + self.sampling + self.learned
    }

    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            self.exhaustive /= total;
            self.sampling /= total;
            self.learned /= total;
        }
    }

    /// Shift weight according to the cumulative win rate, then renormalize.
    pub fn adapt(&mut self, win_rate: f64, rule: &WeightAdaptation) {
        if win_rate > rule.high_win_rate {
            self.exhaustive = (self.exhaustive + rule.exhaustive_step).min(rule.exhaustive_cap);
        } else if win_rate < rule.low_win_rate {
            self.sampling = (self.sampling + rule.sampling_step).min(rule.sampling_cap);
        }
        self.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(w: &StrategyWeights) {
        assert!((w.total() - 1.0).abs() < 1e-9);
        assert!(w.exhaustive >= 0.0 && w.sampling >= 0.0 && w.learned >= 0.0);
    }

    #[test]
    fn test_defaults_sum_to_one() {
        assert_normalized(&StrategyWeights::default());
    }

    #[test]
    fn test_high_win_rate_favours_exhaustive() {
        let mut w = StrategyWeights::default();
        w.adapt(0.9, &WeightAdaptation::default());
        assert!(w.exhaustive > 0.2);
        assert!(w.sampling < 0.4);
        assert_normalized(&w);
    }

    #[test]
    fn test_low_win_rate_favours_sampling() {
        let mut w = StrategyWeights::default();
        w.adapt(0.0, &WeightAdaptation::default());
        let expected = 0.42 / 1.02;
        assert!((w.sampling - expected).abs() < 1e-12);
        assert_normalized(&w);
    }

    #[test]
    fn test_middle_win_rate_keeps_weights() {
        let mut w = StrategyWeights::default();
        w.adapt(0.5, &WeightAdaptation::default());
        let d = StrategyWeights::default();
        assert!((w.exhaustive - d.exhaustive).abs() < 1e-12);
        assert!((w.sampling - d.sampling).abs() < 1e-12);
        assert!((w.learned - d.learned).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_adaptation_stays_normalized() {
        let rule = WeightAdaptation::default();
        let mut w = StrategyWeights::default();
        for i in 0..5000 {
            w.adapt(if i % 3 == 0 { 0.1 } else { 0.95 }, &rule);
            assert_normalized(&w);
        }
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(StrategyWeights::new(-0.1, 0.5, 0.6).is_err());
        assert!(StrategyWeights::new(0.0, 0.0, 0.0).is_err());
        assert!(StrategyWeights::new(f64::NAN, 0.5, 0.5).is_err());
        let w = StrategyWeights::new(1.0, 1.0, 2.0).unwrap();
        assert_eq!(w.learned, 0.5);
    }
}
