// src/fmt/mod.rs
//! Output renderers for parsed programs.

pub mod dot;
pub mod pretty;

pub use dot::to_dot;
pub use pretty::pretty_print;
