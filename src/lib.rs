//! oxo: an ensemble Tic-Tac-Toe decision engine with online learning
//!
//! This crate provides:
//! - Complete Tic-Tac-Toe board representation with validation
//! - Alpha-beta minimax and Monte Carlo tree search
//! - Tabular Q-learning and a feed-forward value approximator trained from
//!   an experience store
//! - A weighted decision ensemble with tactical gating and adaptive weights
//! - A background self-play loop feeding the learned estimators

pub mod app;
pub mod cli;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod experience;
pub mod mcts;
pub mod minimax;
pub mod network;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod self_play;
pub mod tictactoe;

pub use app::EngineConfig;
pub use engine::{Diagnostics, Engine};
pub use ensemble::{Decision, LearnedStrategy, StrategyWeights};
pub use error::{Error, Result};
pub use self_play::{BatchSummary, SelfPlayConfig, SelfPlayHandle, SelfPlayLoop};
