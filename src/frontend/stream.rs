// src/frontend/stream.rs
//! Token acquisition strategies.
//!
//! The parser is written against the [`TokenStream`] trait and must not be
//! able to tell the two implementations apart: [`EagerTokenStream`] drains
//! the lexer into a buffer up front (unbounded re-peeking for the cost of
//! the memory), [`LazyTokenStream`] forwards every call to the lexer and
//! re-scans whitespace on repeated peeks.

use crate::errors::CompileError;
use crate::frontend::lexer::Lexer;
use crate::frontend::pos::SourcePosition;
use crate::frontend::token::{Token, TokenKind};

/// Peek/pop access to the lexeme sequence of one compilation.
pub trait TokenStream {
    /// The next token, without consuming it.
    fn peek(&mut self) -> Result<Token, CompileError>;

    /// The next token, consuming it.
    fn pop(&mut self) -> Result<Token, CompileError>;

    /// Position immediately after the last consumed token.
    fn position(&self) -> SourcePosition;

    /// Whether the next token is one of `kinds`.
    fn peek_is(&mut self, kinds: &[TokenKind]) -> Result<bool, CompileError> {
        let token = self.peek()?;
        Ok(kinds.contains(&token.kind))
    }

    /// Require the next token to be one of `kinds`, without consuming it.
    fn assert_peek(&mut self, kinds: &[TokenKind]) -> Result<Token, CompileError> {
        let token = self.peek()?;
        if kinds.contains(&token.kind) {
            return Ok(token);
        }

        Err(CompileError::syntactically_invalid(
            token.begin,
            format!(
                "expected {}, but found '{}'",
                describe_expected(kinds),
                token.text()
            ),
        ))
    }

    /// Require and consume the next token.
    fn assert_pop(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        let token = self.peek()?;
        if token.kind != kind {
            return Err(CompileError::syntactically_invalid(
                token.begin,
                format!(
                    "expected '{}', but found '{}'",
                    kind.spelling(),
                    token.text()
                ),
            ));
        }
        self.pop()
    }

    /// Consume the next token iff it matches.
    fn skip(&mut self, kind: TokenKind) -> Result<bool, CompileError> {
        if self.peek()?.kind == kind {
            self.pop()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// `'a', 'b' or 'c'` for expected-token error messages.
fn describe_expected(kinds: &[TokenKind]) -> String {
    let mut out = String::new();
    for (index, kind) in kinds.iter().enumerate() {
        if index > 0 {
            if index + 1 == kinds.len() {
                out.push_str(" or ");
            } else {
                out.push_str(", ");
            }
        }
        out.push('\'');
        out.push_str(kind.spelling());
        out.push('\'');
    }
    out
}

/// Buffers the whole lexeme sequence up front. Lexical errors surface
/// during construction, which is still "the first stage to fail".
pub struct EagerTokenStream {
    tokens: Vec<Token>,
    next: usize,
    eof: Token,
    last_consumed_end: SourcePosition,
}

impl EagerTokenStream {
    pub fn from_lexer(mut lexer: Lexer<'_>) -> Result<Self, CompileError> {
        let mut tokens = Vec::new();
        let eof = loop {
            let token = lexer.pop()?;
            if token.kind == TokenKind::Eof {
                break token;
            }
            tokens.push(token);
        };

        Ok(Self {
            tokens,
            next: 0,
            eof,
            last_consumed_end: SourcePosition::START,
        })
    }
}

impl TokenStream for EagerTokenStream {
    fn peek(&mut self) -> Result<Token, CompileError> {
        Ok(self
            .tokens
            .get(self.next)
            .cloned()
            .unwrap_or_else(|| self.eof.clone()))
    }

    fn pop(&mut self) -> Result<Token, CompileError> {
        let token = self.peek()?;
        if self.next < self.tokens.len() {
            self.next += 1;
        }
        self.last_consumed_end = token.end;
        Ok(token)
    }

    fn position(&self) -> SourcePosition {
        self.last_consumed_end
    }
}

/// Forwards every call to the lexer; no buffering.
pub struct LazyTokenStream<'src> {
    lexer: Lexer<'src>,
}

impl<'src> LazyTokenStream<'src> {
    pub fn from_lexer(lexer: Lexer<'src>) -> Self {
        Self { lexer }
    }
}

impl TokenStream for LazyTokenStream<'_> {
    fn peek(&mut self) -> Result<Token, CompileError> {
        self.lexer.peek()
    }

    fn pop(&mut self) -> Result<Token, CompileError> {
        self.lexer.pop()
    }

    fn position(&self) -> SourcePosition {
        self.lexer.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::FaultConfig;

    fn eager(source: &str) -> EagerTokenStream {
        EagerTokenStream::from_lexer(Lexer::new(source, FaultConfig::NONE)).unwrap()
    }

    fn lazy(source: &str) -> LazyTokenStream<'_> {
        LazyTokenStream::from_lexer(Lexer::new(source, FaultConfig::NONE))
    }

    fn drain(stream: &mut dyn TokenStream) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = stream.pop().expect("valid input");
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    const CORPUS: &[&str] = &[
        "",
        "int x;",
        "void main() { print(1 + 2 * 3); }",
        "int f(int a, int b) { return a + b; }\nint main() { return f(2, 3); }",
        "// comment\nint x; /* block\ncomment */ int y;",
        "a<=b >= c != d == e || f && g",
        "while (1) { x = x - 1; }",
    ];

    #[test]
    fn eager_and_lazy_yield_identical_token_sequences() {
        for source in CORPUS {
            let eager_tokens = drain(&mut eager(source));
            let lazy_tokens = drain(&mut lazy(source));
            assert_eq!(eager_tokens, lazy_tokens, "diverged on {source:?}");
        }
    }

    #[test]
    fn both_strategies_return_eof_forever() {
        for stream in [
            &mut eager("x") as &mut dyn TokenStream,
            &mut lazy("x") as &mut dyn TokenStream,
        ] {
            stream.pop().unwrap();
            let first = stream.pop().unwrap();
            let again = stream.pop().unwrap();
            assert_eq!(first.kind, TokenKind::Eof);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn position_reports_after_last_consumed_token() {
        for stream in [
            &mut eager("int x;") as &mut dyn TokenStream,
            &mut lazy("int x;") as &mut dyn TokenStream,
        ] {
            assert_eq!(stream.position(), SourcePosition::START);
            let int_token = stream.pop().unwrap();
            assert_eq!(stream.position(), int_token.end);
        }
    }

    #[test]
    fn eager_surfaces_lexical_errors_at_construction() {
        let result = EagerTokenStream::from_lexer(Lexer::new("int ? x;", FaultConfig::NONE));
        assert!(matches!(
            result,
            Err(CompileError::LexicallyInvalid { .. })
        ));
    }

    #[test]
    fn assert_pop_reports_expected_and_found() {
        let mut stream = eager("int x;");
        let err = stream.assert_pop(TokenKind::KwVoid).unwrap_err();
        assert_eq!(err.message(), "expected 'void', but found 'int'");
    }

    #[test]
    fn assert_peek_lists_alternatives() {
        let mut stream = eager("1");
        let err = stream
            .assert_peek(&[TokenKind::KwInt, TokenKind::KwVoid, TokenKind::Identifier])
            .unwrap_err();
        assert!(err
            .message()
            .contains("expected 'int', 'void' or '<IDENTIFIER>', but found '1'"));
    }

    #[test]
    fn skip_consumes_only_on_match() {
        let mut stream = eager("; x");
        assert!(stream.skip(TokenKind::Semicolon).unwrap());
        assert!(!stream.skip(TokenKind::Semicolon).unwrap());
        assert_eq!(stream.peek().unwrap().kind, TokenKind::Identifier);
    }
}
