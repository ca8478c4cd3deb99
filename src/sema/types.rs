// src/sema/types.rs
//! The MiniC type lattice.
//!
//! Three atomic types plus function types. `BOOLEAN` is internal: it is the
//! type of conditions and comparison results but cannot be spelled in
//! source, so no variable ever holds one.

use crate::frontend::ast::BinaryOp;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Void,
    Boolean,
    Function(FunctionType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub return_type: Box<Type>,
    pub params: Vec<Type>,
}

impl Type {
    pub fn function(return_type: Type, params: Vec<Type>) -> Self {
        Type::Function(FunctionType {
            return_type: Box::new(return_type),
            params,
        })
    }

    /// Whether a value of `self` may flow into a slot of type `target`.
    /// Atomic types convert only to themselves, except that `INT` is
    /// accepted wherever a `BOOLEAN` is expected (conditions, logical
    /// operands). Function types convert to nothing.
    pub fn assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Type::Int, Type::Int) => true,
            (Type::Int, Type::Boolean) => true,
            (Type::Void, Type::Void) => true,
            (Type::Boolean, Type::Boolean) => true,
            _ => false,
        }
    }

    /// Whether variables of this type can be declared.
    pub fn is_variable_type(&self) -> bool {
        matches!(self, Type::Int)
    }

    /// The type both operands of `op` must be assignable to.
    pub fn operand_of(op: BinaryOp) -> Type {
        match op {
            BinaryOp::Or | BinaryOp::And => Type::Boolean,
            _ => Type::Int,
        }
    }

    /// The type an application of `op` produces.
    pub fn result_of(op: BinaryOp) -> Type {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Type::Int,
            _ => Type::Boolean,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("INT"),
            Type::Void => f.write_str("VOID"),
            Type::Boolean => f.write_str("BOOLEAN"),
            Type::Function(function) => {
                f.write_str("(")?;
                for (index, param) in function.params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {}", function.return_type)
            }
        }
    }
}
