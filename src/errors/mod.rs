// src/errors/mod.rs
//! Structured error reporting for the MiniC pipeline.
//!
//! One error kind per pipeline stage, each carrying a source position and a
//! message; rendered with miette diagnostics.

pub mod report;

pub use report::{render_to_stderr, render_to_string};

use crate::frontend::pos::SourcePosition;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The classification of a failed pipeline run.
///
/// Every stage fails fast on its first error; the first stage to fail
/// determines the program's classification.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CompileError {
    #[error("lexically invalid: {message}")]
    #[diagnostic(code(E0001))]
    LexicallyInvalid {
        message: String,
        position: SourcePosition,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("syntactically invalid: {message}")]
    #[diagnostic(code(E1001))]
    SyntacticallyInvalid {
        message: String,
        position: SourcePosition,
        #[label("unexpected token")]
        span: Option<SourceSpan>,
    },

    #[error("semantically invalid: {message}")]
    #[diagnostic(code(E2001))]
    SemanticallyInvalid {
        message: String,
        position: SourcePosition,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("dynamically invalid: {message}")]
    #[diagnostic(code(E3001))]
    DynamicallyInvalid {
        message: String,
        position: SourcePosition,
        #[label("observed here")]
        span: Option<SourceSpan>,
    },

    /// A resource-budget signal, not a validity verdict: the step or
    /// loop-iteration budget was exceeded.
    #[error("timeout: {message}")]
    #[diagnostic(code(E4001))]
    Timeout { message: String },
}

fn span_of(position: SourcePosition) -> Option<SourceSpan> {
    if position.is_unknown() {
        None
    } else {
        Some((position.offset as usize, 1).into())
    }
}

impl CompileError {
    pub fn lexically_invalid(position: SourcePosition, message: impl Into<String>) -> Self {
        Self::LexicallyInvalid {
            message: message.into(),
            position,
            span: span_of(position),
        }
    }

    pub fn syntactically_invalid(position: SourcePosition, message: impl Into<String>) -> Self {
        Self::SyntacticallyInvalid {
            message: message.into(),
            position,
            span: span_of(position),
        }
    }

    pub fn semantically_invalid(position: SourcePosition, message: impl Into<String>) -> Self {
        Self::SemanticallyInvalid {
            message: message.into(),
            position,
            span: span_of(position),
        }
    }

    pub fn dynamically_invalid(position: SourcePosition, message: impl Into<String>) -> Self {
        Self::DynamicallyInvalid {
            message: message.into(),
            position,
            span: span_of(position),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn position(&self) -> SourcePosition {
        match self {
            Self::LexicallyInvalid { position, .. }
            | Self::SyntacticallyInvalid { position, .. }
            | Self::SemanticallyInvalid { position, .. }
            | Self::DynamicallyInvalid { position, .. } => *position,
            Self::Timeout { .. } => SourcePosition::UNKNOWN,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::LexicallyInvalid { message, .. }
            | Self::SyntacticallyInvalid { message, .. }
            | Self::SemanticallyInvalid { message, .. }
            | Self::DynamicallyInvalid { message, .. }
            | Self::Timeout { message } => message,
        }
    }

    /// Process exit status used by the CLI. Timeouts are a budget signal,
    /// not a validity verdict, and share the uncategorized code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::LexicallyInvalid { .. } => 130,
            Self::SyntacticallyInvalid { .. } => 131,
            Self::SemanticallyInvalid { .. } => 132,
            Self::DynamicallyInvalid { .. } => 133,
            Self::Timeout { .. } => 1,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_convention() {
        let pos = SourcePosition::START;
        assert_eq!(CompileError::lexically_invalid(pos, "x").exit_code(), 130);
        assert_eq!(CompileError::syntactically_invalid(pos, "x").exit_code(), 131);
        assert_eq!(CompileError::semantically_invalid(pos, "x").exit_code(), 132);
        assert_eq!(CompileError::dynamically_invalid(pos, "x").exit_code(), 133);
        assert_eq!(CompileError::timeout("x").exit_code(), 1);
    }

    #[test]
    fn unknown_positions_produce_no_span() {
        let err = CompileError::dynamically_invalid(SourcePosition::UNKNOWN, "undefined exit value");
        match err {
            CompileError::DynamicallyInvalid { span, .. } => assert!(span.is_none()),
            _ => unreachable!(),
        }
    }
}
