// src/cli/mod.rs
pub mod args;
pub mod paths;

pub use args::{Cli, Commands, FaultArgs, LimitArgs};
