//! CLI infrastructure for the oxo engine
//!
//! This module provides the command-line interface for self-play training,
//! evaluation against fixed opponents and interactive play.

pub mod commands;
pub mod config;
pub mod output;
