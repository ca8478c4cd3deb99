// src/sema/mod.rs
//! Semantic analysis: scopes, symbols and types.

pub mod analyzer;
pub mod symbol;
pub mod types;

pub use analyzer::{analyze, Analysis};
pub use symbol::{Symbol, SymbolId, SymbolTable};
pub use types::{FunctionType, Type};
