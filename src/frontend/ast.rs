// src/frontend/ast.rs
//! The MiniC abstract syntax tree.
//!
//! A closed sum type, built once by the parser and never mutated. Analysis
//! results (resolved symbols, types) live in a side table keyed by the
//! [`NodeId`] the parser stamps on every annotatable node; see
//! [`crate::sema::Analysis`].

use crate::frontend::pos::SourcePosition;

/// Stable identifier of an annotatable AST node, unique within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Hands out node ids during parsing.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// A complete program: the sequence of global declarations.
#[derive(Debug)]
pub struct Program {
    pub declarations: Vec<Decl>,
    pub position: SourcePosition,
}

/// Top-level declarations.
#[derive(Debug)]
pub enum Decl {
    Variable(VariableDecl),
    Function(FunctionDecl),
}

impl Decl {
    pub fn position(&self) -> SourcePosition {
        match self {
            Decl::Variable(decl) => decl.position,
            Decl::Function(decl) => decl.position,
        }
    }
}

/// `int x;` at global scope, as a statement, or as a parameter.
#[derive(Debug)]
pub struct VariableDecl {
    pub type_name: TypeName,
    pub name: Identifier,
    pub position: SourcePosition,
}

/// `int f(int a, int b) { ... }`
#[derive(Debug)]
pub struct FunctionDecl {
    pub return_type: TypeName,
    pub name: Identifier,
    pub params: Vec<VariableDecl>,
    pub body: Block,
    pub position: SourcePosition,
}

/// A spelled type: `int` or `void`.
#[derive(Debug)]
pub struct TypeName {
    pub id: NodeId,
    pub kind: TypeNameKind,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameKind {
    Int,
    Void,
}

impl TypeNameKind {
    pub fn spelling(&self) -> &'static str {
        match self {
            TypeNameKind::Int => "int",
            TypeNameKind::Void => "void",
        }
    }
}

/// A use or declaration of a name.
#[derive(Debug)]
pub struct Identifier {
    pub id: NodeId,
    pub name: String,
    pub position: SourcePosition,
}

/// `{ statement* }`
#[derive(Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub position: SourcePosition,
}

/// Statements.
#[derive(Debug)]
pub enum Stmt {
    Assign(AssignStmt),
    Call(CallStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Declaration(DeclarationStmt),
    Block(Block),
}

impl Stmt {
    pub fn position(&self) -> SourcePosition {
        match self {
            Stmt::Assign(stmt) => stmt.position,
            Stmt::Call(stmt) => stmt.position,
            Stmt::If(stmt) => stmt.position,
            Stmt::While(stmt) => stmt.position,
            Stmt::Return(stmt) => stmt.position,
            Stmt::Declaration(stmt) => stmt.position,
            Stmt::Block(block) => block.position,
        }
    }
}

/// `x = expr;`
#[derive(Debug)]
pub struct AssignStmt {
    pub target: Identifier,
    pub value: Expr,
    pub position: SourcePosition,
}

/// `f(args);`
#[derive(Debug)]
pub struct CallStmt {
    pub call: FunctionCall,
    pub position: SourcePosition,
}

/// `if (cond) block (else block)?`
#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub position: SourcePosition,
}

/// `while (cond) block`
#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub position: SourcePosition,
}

/// `return;` or `return expr;`
#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: SourcePosition,
}

/// A local variable declaration in statement position.
#[derive(Debug)]
pub struct DeclarationStmt {
    pub declaration: VariableDecl,
    pub position: SourcePosition,
}

/// Expressions.
#[derive(Debug)]
pub enum Expr {
    Identifier(Identifier),
    Literal(Literal),
    Binary(BinaryExpr),
    Call(FunctionCall),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Identifier(identifier) => identifier.id,
            Expr::Literal(literal) => literal.id,
            Expr::Binary(binary) => binary.id,
            Expr::Call(call) => call.id,
        }
    }

    pub fn position(&self) -> SourcePosition {
        match self {
            Expr::Identifier(identifier) => identifier.position,
            Expr::Literal(literal) => literal.position,
            Expr::Binary(binary) => binary.position,
            Expr::Call(call) => call.position,
        }
    }
}

/// An integer literal, kept as its source text.
#[derive(Debug)]
pub struct Literal {
    pub id: NodeId,
    pub text: String,
    pub position: SourcePosition,
}

/// `lhs op rhs`
#[derive(Debug)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub position: SourcePosition,
}

/// `callee(args)` in expression or statement position.
#[derive(Debug)]
pub struct FunctionCall {
    pub id: NodeId,
    pub callee: Identifier,
    pub arguments: Vec<Expr>,
    pub position: SourcePosition,
}

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Equals,
    LessThan,
    LessEquals,
    GreaterThan,
    GreaterEquals,
    NotEquals,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn spelling(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equals => "==",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Precedence level, `||` lowest.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equals
            | BinaryOp::LessThan
            | BinaryOp::LessEquals
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterEquals
            | BinaryOp::NotEquals => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_gen_is_sequential() {
        let mut gen = NodeIdGen::new();
        assert_eq!(gen.next(), NodeId(0));
        assert_eq!(gen.next(), NodeId(1));
        assert_eq!(gen.count(), 2);
    }

    #[test]
    fn operator_precedence_orders_levels() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() < BinaryOp::Equals.precedence());
        assert!(BinaryOp::Add.precedence() < BinaryOp::Mul.precedence());
        assert_eq!(BinaryOp::Add.precedence(), BinaryOp::Sub.precedence());
    }
}
