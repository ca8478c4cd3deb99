// src/lib.rs
//! MiniC: a four-stage compiler pipeline with fault injection.
//!
//! Source text flows through lexer, parser, semantic analyzer and
//! tree-walking interpreter; each stage fails fast with a
//! [`CompileError`] that classifies the program. A [`FaultConfig`] threads
//! a set of deliberately incorrect behaviors through every stage to
//! produce known-bad pipeline variants.

pub mod cli;
pub mod commands;
pub mod errors;
pub mod faults;
pub mod fmt;
pub mod frontend;
pub mod interp;
pub mod sema;

pub use errors::CompileError;
pub use faults::{Fault, FaultConfig, Stage};
pub use frontend::{Lexer, Program};
pub use interp::{Limits, Outcome, Value};
pub use sema::Analysis;

use frontend::{EagerTokenStream, LazyTokenStream, Parser};

/// Lex and parse `source` into an AST.
///
/// The eager strategy drains the lexer up front, so lexical errors surface
/// before the first parse step; the lazy strategy interleaves them.
/// Both produce identical trees for identical input.
pub fn parse(
    source: &str,
    faults: FaultConfig,
    lazy_lexer: bool,
) -> Result<Program, CompileError> {
    tracing::debug!(lazy_lexer, faults = %faults, "parsing program");

    let lexer = Lexer::new(source, faults);

    if lazy_lexer {
        Parser::new(LazyTokenStream::from_lexer(lexer), faults).parse_program()
    } else {
        Parser::new(EagerTokenStream::from_lexer(lexer)?, faults).parse_program()
    }
}

/// Name-resolve and type-check a parsed program.
pub fn analyze(program: &Program, faults: FaultConfig) -> Result<Analysis, CompileError> {
    sema::analyze(program, faults)
}

/// Verdict of running the whole pipeline over one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    LexicallyInvalid,
    SyntacticallyInvalid,
    SemanticallyInvalid,
    DynamicallyInvalid,
    NonTerminating,
    Valid,
}

impl Classification {
    pub fn from_error(error: &CompileError) -> Self {
        match error {
            CompileError::LexicallyInvalid { .. } => Classification::LexicallyInvalid,
            CompileError::SyntacticallyInvalid { .. } => Classification::SyntacticallyInvalid,
            CompileError::SemanticallyInvalid { .. } => Classification::SemanticallyInvalid,
            CompileError::DynamicallyInvalid { .. } => Classification::DynamicallyInvalid,
            CompileError::Timeout { .. } => Classification::NonTerminating,
        }
    }
}

/// Run the full pipeline in undefined-checking mode and classify the
/// program by the first stage that rejects it.
pub fn classify(
    source: &str,
    faults: FaultConfig,
    lazy_lexer: bool,
    limits: Limits,
) -> Classification {
    let result = parse(source, faults, lazy_lexer)
        .and_then(|program| analyze(&program, faults).map(|analysis| (program, analysis)))
        .and_then(|(program, analysis)| {
            interp::check_dynamically_valid(&program, &analysis, faults, limits)
        });

    match result {
        Ok(_) => Classification::Valid,
        Err(error) => Classification::from_error(&error),
    }
}
