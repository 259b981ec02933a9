//! Application layer
//!
//! Configuration shared by the engine, the self-play loop and the CLI.

pub mod config;

pub use config::EngineConfig;
