//! Engine configuration
//!
//! Every tunable constant of the engine lives here. Defaults reproduce the
//! reference behaviour; a JSON file can override any subset of fields.

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ensemble::{LearnedStrategy, StrategyWeights, TacticalBonuses, WeightAdaptation},
    experience::DEFAULT_CAPACITY,
    mcts::MctsConfig,
    network::NetworkConfig,
    q_learning::TabularConfig,
    self_play::SelfPlayConfig,
    tictactoe::Player,
};

/// Configuration for an [`Engine`](crate::engine::Engine).
///
/// # Examples
///
/// ```
/// use oxo::app::EngineConfig;
/// use oxo::tictactoe::Player;
///
/// let config = EngineConfig::default()
///     .with_seed(42)
///     .with_engine_player(Player::X)
///     .with_mcts_iterations(200);
/// config.validate()?;
/// # Ok::<(), oxo::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side the engine plays in self-play and whose wins count in diagnostics
    pub engine_player: Player,
    pub mcts: MctsConfig,
    pub tabular: TabularConfig,
    pub network: NetworkConfig,
    /// Estimator consulted for the learned vote
    pub learned_strategy: LearnedStrategy,
    /// Maximum experience tuples retained
    pub experience_capacity: usize,
    pub initial_weights: StrategyWeights,
    pub adaptation: WeightAdaptation,
    pub bonuses: TacticalBonuses,
    pub self_play: SelfPlayConfig,
    /// Random seed (None = non-deterministic)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_player: Player::O,
            mcts: MctsConfig::default(),
            tabular: TabularConfig::default(),
            network: NetworkConfig::default(),
            learned_strategy: LearnedStrategy::default(),
            experience_capacity: DEFAULT_CAPACITY,
            initial_weights: StrategyWeights::default(),
            adaptation: WeightAdaptation::default(),
            bonuses: TacticalBonuses::default(),
            self_play: SelfPlayConfig::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_engine_player(mut self, player: Player) -> Self {
        self.engine_player = player;
        self
    }

    /// Set the MCTS iteration budget per move.
    pub fn with_mcts_iterations(mut self, iterations: usize) -> Self {
        self.mcts.iterations = iterations;
        self
    }

    pub fn with_learned_strategy(mut self, strategy: LearnedStrategy) -> Self {
        self.learned_strategy = strategy;
        self
    }

    pub fn with_experience_capacity(mut self, capacity: usize) -> Self {
        self.experience_capacity = capacity;
        self
    }

    pub fn with_initial_weights(mut self, weights: StrategyWeights) -> Self {
        self.initial_weights = weights;
        self
    }

    pub fn with_self_play(mut self, self_play: SelfPlayConfig) -> Self {
        self.self_play = self_play;
        self
    }

    /// Check every section for values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.mcts.iterations == 0 {
            return Err(invalid("mcts.iterations must be positive"));
        }
        if !(self.mcts.exploration.is_finite() && self.mcts.exploration >= 0.0) {
            return Err(invalid("mcts.exploration must be a non-negative number"));
        }

        let t = &self.tabular;
        for (name, value) in [
            ("tabular.learning_rate", t.learning_rate),
            ("tabular.discount_factor", t.discount_factor),
            ("tabular.epsilon", t.epsilon),
            ("tabular.epsilon_decay", t.epsilon_decay),
            ("tabular.min_epsilon", t.min_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("{name} must be in [0, 1], got {value}")));
            }
        }
        if t.min_epsilon > t.epsilon {
            return Err(invalid("tabular.min_epsilon must not exceed tabular.epsilon"));
        }

        self.network.validate()?;

        if self.experience_capacity == 0 {
            return Err(invalid("experience_capacity must be positive"));
        }

        StrategyWeights::new(
            self.initial_weights.exhaustive,
            self.initial_weights.sampling,
            self.initial_weights.learned,
        )?;
        if (self.initial_weights.total() - 1.0).abs() > 1e-9 {
            return Err(invalid("initial_weights must sum to 1"));
        }

        self.self_play.validate()
    }

    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create config {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfiguration {
        message: message.to_string(),
    }
}
