//! Tabular Q-learning
//!
//! The learned estimator kept alongside the approximator: a table from board
//! key to nine action values, updated with one-step off-policy TD control.
//!
//! ```no_run
//! use oxo::{
//!     q_learning::{QLearningAgent, TabularConfig},
//!     tictactoe::BoardState,
//! };
//!
//! let mut agent = QLearningAgent::new(TabularConfig::default()).with_seed(7);
//! let state = BoardState::new();
//! let action = agent.best_move(&state)?;
//! # Ok::<(), oxo::Error>(())
//! ```

pub mod agent;
pub mod q_table;

pub use agent::{QLearningAgent, TabularConfig};
pub use q_table::{ActionValues, QTable};
