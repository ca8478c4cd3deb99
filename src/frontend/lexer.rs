// src/frontend/lexer.rs

use crate::errors::CompileError;
use crate::faults::{Fault, FaultConfig};
use crate::frontend::pos::SourcePosition;
use crate::frontend::token::{Token, TokenKind};

/// Hand-written longest-match lexer.
///
/// Keeps two cursors: the committed position (advanced only by [`pop`]) and
/// a lookahead cursor consumed by [`peek`]. Repeated `peek` calls without an
/// intervening `pop` return an identical token.
///
/// [`peek`]: Lexer::peek
/// [`pop`]: Lexer::pop
pub struct Lexer<'src> {
    source: &'src [u8],
    faults: FaultConfig,
    pos: SourcePosition,
    look: SourcePosition,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, faults: FaultConfig) -> Self {
        Self {
            source: source.as_bytes(),
            faults,
            pos: SourcePosition::START,
            look: SourcePosition::START,
        }
    }

    /// The position immediately after the last consumed token.
    pub fn position(&self) -> SourcePosition {
        self.pos
    }

    /// Commit the scan cursor, e.g. to the end of a peeked token.
    fn advance_to(&mut self, position: SourcePosition) {
        self.pos = position;
    }

    /// Return and consume the next token.
    pub fn pop(&mut self) -> Result<Token, CompileError> {
        let token = self.peek()?;
        self.advance_to(token.end);
        Ok(token)
    }

    /// Return the next token without consuming input.
    pub fn peek(&mut self) -> Result<Token, CompileError> {
        self.look = self.pos;

        'skip: loop {
            let Some(first) = self.current() else {
                return Ok(Token::eof(self.look));
            };

            // consecutive whitespace
            if is_whitespace(first) {
                while let Some(c) = self.current() {
                    if !is_whitespace(c) {
                        break;
                    }
                    self.bump(c);
                }
                continue 'skip;
            }

            // line comments
            if first == b'/' && self.next() == Some(b'/') {
                while let Some(c) = self.current() {
                    self.bump(c);
                    if c == b'\n' {
                        continue 'skip;
                    }
                }
                // comment runs to end of input
                continue 'skip;
            }

            // block comments
            if first == b'/' && self.next() == Some(b'*') {
                self.look.offset += 2;
                self.look.column += 2;

                while self.next().is_some() {
                    let c = self.current().expect("current exists when next does");
                    let after = self.next();
                    self.bump(c);
                    if c == b'*' && after == Some(b'/') {
                        self.look.offset += 1;
                        self.look.column += 1;
                        continue 'skip;
                    }
                }

                return Err(CompileError::lexically_invalid(
                    self.pos,
                    "unterminated block comment",
                ));
            }

            let begin = self.look;

            return match first {
                b';' => Ok(Token::fixed(TokenKind::Semicolon, begin)),
                b'=' => {
                    if self.faults.is_enabled(Fault::NoEqualsToken) {
                        return Ok(Token::fixed(TokenKind::Assign, begin));
                    }
                    self.two_char(begin, b'=', TokenKind::EqEq, Some(TokenKind::Assign))
                }
                b'<' => self.two_char(begin, b'=', TokenKind::LtEq, Some(TokenKind::Lt)),
                b'>' => self.two_char(begin, b'=', TokenKind::GtEq, Some(TokenKind::Gt)),
                b'!' => self.two_char(begin, b'=', TokenKind::NotEq, None),
                b'|' => self.two_char(begin, b'|', TokenKind::OrOr, None),
                b'&' => {
                    if self.faults.is_enabled(Fault::WrongRegexAnd) {
                        return self.two_char(begin, b'|', TokenKind::AndAnd, None);
                    }
                    self.two_char(begin, b'&', TokenKind::AndAnd, None)
                }
                b',' => Ok(Token::fixed(TokenKind::Comma, begin)),
                b'(' => Ok(Token::fixed(TokenKind::LParen, begin)),
                b')' => Ok(Token::fixed(TokenKind::RParen, begin)),
                b'{' => Ok(Token::fixed(TokenKind::LBrace, begin)),
                b'}' => Ok(Token::fixed(TokenKind::RBrace, begin)),
                b'+' => {
                    if self.faults.is_enabled(Fault::WrongTokenPlus) {
                        return Ok(Token::fixed(TokenKind::Star, begin));
                    }
                    Ok(Token::fixed(TokenKind::Plus, begin))
                }
                b'-' => Ok(Token::fixed(TokenKind::Minus, begin)),
                b'*' => Ok(Token::fixed(TokenKind::Star, begin)),
                b'/' => Ok(Token::fixed(TokenKind::Slash, begin)),
                b'0'..=b'9' => {
                    let text = self.scan_run(|c| c.is_ascii_digit());
                    Ok(Token::with_text(TokenKind::Num, begin, self.look, text))
                }
                c if c.is_ascii_alphabetic() || c == b'_' => {
                    let text = self.scan_run(|c| c.is_ascii_alphanumeric() || c == b'_');

                    if self.faults.is_enabled(Fault::MissingTokenElse) && text == "else" {
                        continue 'skip;
                    }
                    if self.faults.is_enabled(Fault::MissingTokenWhile) && text == "while" {
                        continue 'skip;
                    }
                    if self.faults.is_enabled(Fault::WrongTokenIf) && text == "if" {
                        return Ok(Token::with_text(
                            TokenKind::Identifier,
                            begin,
                            self.look,
                            text,
                        ));
                    }

                    match TokenKind::keyword(&text) {
                        Some(kind) => Ok(Token::fixed(kind, begin)),
                        None => Ok(Token::with_text(
                            TokenKind::Identifier,
                            begin,
                            self.look,
                            text,
                        )),
                    }
                }
                c => Err(CompileError::lexically_invalid(
                    self.pos,
                    format!("invalid character '{}'", c as char),
                )),
            };
        }
    }

    fn current(&self) -> Option<u8> {
        self.source.get(self.look.offset as usize).copied()
    }

    fn next(&self) -> Option<u8> {
        self.source.get(self.look.offset as usize + 1).copied()
    }

    /// Advance the lookahead cursor over `c`, tracking line/column.
    fn bump(&mut self, c: u8) {
        self.look.offset += 1;
        self.look.column += 1;
        if c == b'\n' {
            self.look.line += 1;
            self.look.column = 1;
        }
    }

    /// Classify a one-or-two-character operator. The lookahead cursor only
    /// moves over the first character; fixed tokens derive their end
    /// position from the spelling.
    fn two_char(
        &mut self,
        begin: SourcePosition,
        expected: u8,
        then_kind: TokenKind,
        else_kind: Option<TokenKind>,
    ) -> Result<Token, CompileError> {
        let first = self.current().expect("two_char starts on a character");
        self.look.offset += 1;
        self.look.column += 1;

        if self.current() == Some(expected) {
            Ok(Token::fixed(then_kind, begin))
        } else {
            match else_kind {
                Some(kind) => Ok(Token::fixed(kind, begin)),
                None => Err(CompileError::lexically_invalid(
                    self.pos,
                    format!("invalid character '{}'", first as char),
                )),
            }
        }
    }

    /// Consume a run of matching characters starting at the lookahead cursor.
    fn scan_run(&mut self, matches: impl Fn(u8) -> bool) -> String {
        let start = self.look.offset as usize;

        while let Some(c) = self.current() {
            if !matches(c) {
                break;
            }
            debug_assert!(c != b'\n');
            self.look.offset += 1;
            self.look.column += 1;
        }

        let end = self.look.offset as usize;

        if self.faults.is_enabled(Fault::AdditionalSkip) {
            self.look.offset += 1;
            self.look.column += 1;
        }

        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\n' | b'\r' | b'\t')
}
