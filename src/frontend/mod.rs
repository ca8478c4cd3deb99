// src/frontend/mod.rs
//! Lexing and parsing: source text to AST.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod pos;
pub mod stream;
pub mod token;

pub use ast::Program;
pub use lexer::Lexer;
pub use parser::Parser;
pub use pos::SourcePosition;
pub use stream::{EagerTokenStream, LazyTokenStream, TokenStream};
pub use token::{Token, TokenKind};
