// src/frontend/pos.rs
//! Positions in MiniC source text.

use std::cmp::Ordering;
use std::fmt;

/// A position in the source, tracked as byte offset plus 1-based
/// line/column for display. Ordered by offset alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    /// Start of the input.
    pub const START: SourcePosition = SourcePosition {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Sentinel for diagnostics with no source location (built-ins,
    /// whole-program verdicts).
    pub const UNKNOWN: SourcePosition = SourcePosition {
        offset: u32::MAX,
        line: 0,
        column: 0,
    };

    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl PartialOrd for SourcePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "?:?")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_offset() {
        let earlier = SourcePosition::new(3, 2, 1);
        let later = SourcePosition::new(7, 1, 9);
        assert!(earlier < later);
        assert!(later < SourcePosition::UNKNOWN);
    }

    #[test]
    fn displays_line_and_column() {
        assert_eq!(SourcePosition::new(10, 2, 5).to_string(), "2:5");
        assert_eq!(SourcePosition::UNKNOWN.to_string(), "?:?");
        assert!(!SourcePosition::START.is_unknown());
    }
}
