//! Subcommands of the `oxo` binary

pub mod evaluate;
pub mod play;
pub mod train;
