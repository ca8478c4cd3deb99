// src/commands/mod.rs

pub mod classify;
pub mod common;
pub mod run;

pub use classify::classify_programs;
pub use run::{run_file, RunOptions};
