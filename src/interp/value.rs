// src/interp/value.rs
//! Runtime values with three-valued semantics.
//!
//! Every value is either a defined number/boolean or the undefined value of
//! that type. Undefined propagates through arithmetic and, like a NaN,
//! compares unequal to everything including itself.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum Value {
    Number(Option<i64>),
    Boolean(Option<bool>),
}

impl Value {
    pub const UNDEFINED_NUMBER: Value = Value::Number(None);
    pub const UNDEFINED_BOOLEAN: Value = Value::Boolean(None);
    pub const TRUE: Value = Value::Boolean(Some(true));
    pub const FALSE: Value = Value::Boolean(Some(false));

    pub fn number(value: i64) -> Self {
        Value::Number(Some(value))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Number(None) | Value::Boolean(None))
    }

    /// Numeric view: booleans become 1/0, undefined stays undefined.
    pub fn to_number(self) -> Option<i64> {
        match self {
            Value::Number(number) => number,
            Value::Boolean(Some(true)) => Some(1),
            Value::Boolean(Some(false)) => Some(0),
            Value::Boolean(None) => None,
        }
    }

    /// Boolean view: numbers are true iff nonzero, undefined stays undefined.
    pub fn to_boolean(self) -> Option<bool> {
        match self {
            Value::Boolean(boolean) => boolean,
            Value::Number(Some(number)) => Some(number != 0),
            Value::Number(None) => None,
        }
    }

    /// Undefined counts as not-true.
    pub fn is_true(&self) -> bool {
        self.to_boolean() == Some(true)
    }

    /// Undefined counts as not-false either.
    pub fn is_false(&self) -> bool {
        self.to_boolean() == Some(false)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // undefined values are never equal, not even to themselves
            (Value::Number(Some(a)), Value::Number(Some(b))) => a == b,
            (Value::Boolean(Some(a)), Value::Boolean(Some(b))) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(Some(number)) => write!(f, "{number}"),
            Value::Boolean(Some(boolean)) => write!(f, "{boolean}"),
            Value::Number(None) | Value::Boolean(None) => f.write_str("UNDEF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_is_never_equal() {
        assert_ne!(Value::UNDEFINED_NUMBER, Value::UNDEFINED_NUMBER);
        assert_ne!(Value::UNDEFINED_NUMBER, Value::number(0));
        assert_ne!(Value::UNDEFINED_BOOLEAN, Value::FALSE);
        assert_eq!(Value::number(3), Value::number(3));
    }

    #[test]
    fn coercions_cross_the_type_boundary() {
        assert_eq!(Value::TRUE.to_number(), Some(1));
        assert_eq!(Value::FALSE.to_number(), Some(0));
        assert_eq!(Value::number(7).to_boolean(), Some(true));
        assert_eq!(Value::number(0).to_boolean(), Some(false));
        assert_eq!(Value::UNDEFINED_BOOLEAN.to_number(), None);
        assert_eq!(Value::UNDEFINED_NUMBER.to_boolean(), None);
    }

    #[test]
    fn undefined_is_neither_true_nor_false() {
        assert!(!Value::UNDEFINED_BOOLEAN.is_true());
        assert!(!Value::UNDEFINED_BOOLEAN.is_false());
        assert!(Value::number(1).is_true());
        assert!(Value::number(0).is_false());
    }

    #[test]
    fn display_marks_undefined_values() {
        assert_eq!(Value::number(-4).to_string(), "-4");
        assert_eq!(Value::UNDEFINED_NUMBER.to_string(), "UNDEF");
        assert_eq!(Value::TRUE.to_string(), "true");
    }
}
