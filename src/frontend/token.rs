// src/frontend/token.rs

use crate::frontend::ast::BinaryOp;
use crate::frontend::pos::SourcePosition;

/// All token kinds in the MiniC language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,

    // Keywords
    KwVoid,
    KwInt,
    KwIf,
    KwElse,
    KwWhile,
    KwReturn,

    // Punctuation
    Semicolon,
    Assign,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,

    // Variable-length tokens
    Num,
    Identifier,

    // Boolean operators
    OrOr,
    AndAnd,

    // Compare operators
    EqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    NotEq,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
}

impl TokenKind {
    /// Canonical spelling, used for fixed-token text and error messages.
    pub fn spelling(&self) -> &'static str {
        match self {
            Self::Eof => "<EOF>",
            Self::KwVoid => "void",
            Self::KwInt => "int",
            Self::KwIf => "if",
            Self::KwElse => "else",
            Self::KwWhile => "while",
            Self::KwReturn => "return",
            Self::Semicolon => ";",
            Self::Assign => "=",
            Self::Comma => ",",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Num => "<NUM>",
            Self::Identifier => "<IDENTIFIER>",
            Self::OrOr => "||",
            Self::AndAnd => "&&",
            Self::EqEq => "==",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::NotEq => "!=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
        }
    }

    /// The binary operator this token spells, if any.
    pub fn operator(&self) -> Option<BinaryOp> {
        match self {
            Self::OrOr => Some(BinaryOp::Or),
            Self::AndAnd => Some(BinaryOp::And),
            Self::EqEq => Some(BinaryOp::Equals),
            Self::Lt => Some(BinaryOp::LessThan),
            Self::Gt => Some(BinaryOp::GreaterThan),
            Self::LtEq => Some(BinaryOp::LessEquals),
            Self::GtEq => Some(BinaryOp::GreaterEquals),
            Self::NotEq => Some(BinaryOp::NotEquals),
            Self::Plus => Some(BinaryOp::Add),
            Self::Minus => Some(BinaryOp::Sub),
            Self::Star => Some(BinaryOp::Mul),
            Self::Slash => Some(BinaryOp::Div),
            _ => None,
        }
    }

    /// Check if a scanned word is a keyword.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "void" => Some(Self::KwVoid),
            "int" => Some(Self::KwInt),
            "if" => Some(Self::KwIf),
            "else" => Some(Self::KwElse),
            "while" => Some(Self::KwWhile),
            "return" => Some(Self::KwReturn),
            _ => None,
        }
    }
}

/// A classified lexeme with its source span.
///
/// `text` is present only for variable-length tokens (`Num`, `Identifier`);
/// fixed tokens derive their text from the kind's canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub begin: SourcePosition,
    pub end: SourcePosition,
    text: Option<String>,
}

impl Token {
    /// A fixed token; the end position follows from the canonical spelling.
    pub fn fixed(kind: TokenKind, begin: SourcePosition) -> Self {
        let len = kind.spelling().len() as u32;
        let end = SourcePosition::new(begin.offset + len, begin.line, begin.column + len);
        Self {
            kind,
            begin,
            end,
            text: None,
        }
    }

    /// The zero-length end-of-input token. Popping it does not advance, so
    /// every stream returns it forever once reached.
    pub fn eof(at: SourcePosition) -> Self {
        Self {
            kind: TokenKind::Eof,
            begin: at,
            end: at,
            text: None,
        }
    }

    /// A variable-length token carrying its literal substring.
    pub fn with_text(
        kind: TokenKind,
        begin: SourcePosition,
        end: SourcePosition,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            begin,
            end,
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_else(|| self.kind.spelling())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TK<{:?}:'{}', {}, {}>",
            self.kind,
            self.text(),
            self.begin,
            self.end
        )
    }
}
