// src/sema/analyzer.rs
//! Name resolution and type checking.
//!
//! A single pass over the AST that fills the [`Analysis`] side tables. The
//! tree itself is never annotated; every result is keyed by [`NodeId`].

use crate::errors::CompileError;
use crate::faults::{Fault, FaultConfig};
use crate::frontend::ast::*;
use crate::frontend::pos::SourcePosition;
use crate::sema::symbol::{Symbol, SymbolId, SymbolTable};
use crate::sema::types::Type;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Everything semantic analysis learned about one program.
#[derive(Debug)]
pub struct Analysis {
    symbols: Vec<Symbol>,
    resolved: FxHashMap<NodeId, SymbolId>,
    types: FxHashMap<NodeId, Type>,
    print_symbol: SymbolId,
}

impl Analysis {
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// The symbol a name use or declaration resolved to.
    pub fn resolved(&self, node: NodeId) -> Option<SymbolId> {
        self.resolved.get(&node).copied()
    }

    /// The computed type of an expression or type name.
    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    /// The pre-declared `print` built-in.
    pub fn print_symbol(&self) -> SymbolId {
        self.print_symbol
    }
}

/// Check `program` and build its analysis side tables.
pub fn analyze(program: &Program, faults: FaultConfig) -> Result<Analysis, CompileError> {
    debug!(faults = %faults, "analyzing program");

    let mut table = SymbolTable::new(faults);
    table.enter_scope();

    let print_symbol = table.declare(
        Symbol {
            name: "print".to_owned(),
            ty: Type::function(Type::Void, vec![Type::Int]),
            is_global: true,
            decl: None,
        },
        SourcePosition::UNKNOWN,
    )?;

    let mut analyzer = Analyzer {
        table,
        resolved: FxHashMap::default(),
        types: FxHashMap::default(),
        expected_return_type: None,
        faults,
    };

    for declaration in &program.declarations {
        match declaration {
            Decl::Variable(variable) => {
                analyzer.check_variable_declaration(variable)?;
            }
            Decl::Function(function) => analyzer.check_function_declaration(function)?,
        }
    }

    Ok(Analysis {
        symbols: analyzer.table.into_arena(),
        resolved: analyzer.resolved,
        types: analyzer.types,
        print_symbol,
    })
}

struct Analyzer {
    table: SymbolTable,
    resolved: FxHashMap<NodeId, SymbolId>,
    types: FxHashMap<NodeId, Type>,
    expected_return_type: Option<Type>,
    faults: FaultConfig,
}

impl Analyzer {
    fn check_variable_declaration(
        &mut self,
        declaration: &VariableDecl,
    ) -> Result<Type, CompileError> {
        let ty = self.check_type_name(&declaration.type_name);

        if !ty.is_variable_type() {
            return Err(CompileError::semantically_invalid(
                declaration.position,
                format!("{ty} is not a valid type for variables"),
            ));
        }

        let symbol = Symbol {
            name: declaration.name.name.clone(),
            ty: ty.clone(),
            is_global: self.table.depth() == 1,
            decl: Some(declaration.name.id),
        };

        let id = self.table.declare(symbol, declaration.position)?;
        self.resolved.insert(declaration.name.id, id);

        Ok(ty)
    }

    fn check_function_declaration(
        &mut self,
        declaration: &FunctionDecl,
    ) -> Result<(), CompileError> {
        let return_type = self.check_type_name(&declaration.return_type);

        let symbol = Symbol {
            name: declaration.name.name.clone(),
            ty: Type::function(return_type.clone(), Vec::new()),
            is_global: self.table.depth() == 1,
            decl: Some(declaration.name.id),
        };

        let id = self.table.declare(symbol, declaration.position)?;
        self.resolved.insert(declaration.name.id, id);

        self.table.enter_scope();

        let mut param_types = Vec::with_capacity(declaration.params.len());
        for param in &declaration.params {
            param_types.push(self.check_variable_declaration(param)?);
        }

        // complete the signature before the body so recursive calls see it
        self.table.symbol_mut(id).ty = Type::function(return_type.clone(), param_types);

        let outer_expected = self.expected_return_type.replace(return_type);
        self.check_block(&declaration.body)?;
        self.expected_return_type = outer_expected;

        self.table.leave_scope();
        Ok(())
    }

    fn check_type_name(&mut self, type_name: &TypeName) -> Type {
        let ty = match type_name.kind {
            TypeNameKind::Int => Type::Int,
            TypeNameKind::Void => {
                if self.faults.is_enabled(Fault::MissingTypeTypeName) {
                    Type::Int
                } else {
                    Type::Void
                }
            }
        };

        self.types.insert(type_name.id, ty.clone());
        ty
    }

    fn check_block(&mut self, block: &Block) -> Result<(), CompileError> {
        self.table.enter_scope();
        for statement in &block.statements {
            self.check_statement(statement)?;
        }
        self.table.leave_scope();
        Ok(())
    }

    fn check_statement(&mut self, statement: &Stmt) -> Result<(), CompileError> {
        match statement {
            Stmt::Assign(assign) => {
                let target_type = self.check_identifier(&assign.target)?;
                let value_type = self.check_expression(&assign.value)?;

                if !value_type.assignable_to(&target_type) {
                    return Err(CompileError::semantically_invalid(
                        assign.position,
                        format!("{value_type} cannot be assigned to {target_type}"),
                    ));
                }
                Ok(())
            }
            Stmt::Call(call) => self.check_function_call(&call.call).map(|_| ()),
            Stmt::If(if_stmt) => {
                self.check_condition(&if_stmt.condition, "if")?;
                self.check_block(&if_stmt.then_block)?;
                if let Some(else_block) = &if_stmt.else_block {
                    self.check_block(else_block)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.check_condition(&while_stmt.condition, "while")?;
                self.check_block(&while_stmt.body)
            }
            Stmt::Return(ret) => self.check_return(ret),
            Stmt::Declaration(declaration) => self
                .check_variable_declaration(&declaration.declaration)
                .map(|_| ()),
            Stmt::Block(block) => self.check_block(block),
        }
    }

    fn check_condition(&mut self, condition: &Expr, keyword: &str) -> Result<(), CompileError> {
        let ty = self.check_expression(condition)?;
        if !ty.assignable_to(&Type::Boolean) {
            return Err(CompileError::semantically_invalid(
                condition.position(),
                format!("{keyword} condition must be of type {}", Type::Boolean),
            ));
        }
        Ok(())
    }

    fn check_return(&mut self, ret: &ReturnStmt) -> Result<(), CompileError> {
        let expected = self
            .expected_return_type
            .clone()
            .unwrap_or_else(|| unreachable!("return statement outside a function"));

        match &ret.value {
            Some(value) => {
                // the fault silences both complaints about a value-carrying
                // return in a void function, not just the first
                let void_unchecked =
                    expected == Type::Void && self.faults.is_enabled(Fault::MissingCheckReturnVoid);

                if expected == Type::Void && !void_unchecked {
                    return Err(CompileError::semantically_invalid(
                        ret.position,
                        format!("cannot return a value from a {} function", Type::Void),
                    ));
                }

                let value_type = self.check_expression(value)?;
                if !void_unchecked && !value_type.assignable_to(&expected) {
                    return Err(CompileError::semantically_invalid(
                        ret.position,
                        format!("{value_type} cannot be assigned to {expected}"),
                    ));
                }
                Ok(())
            }
            None => {
                if expected != Type::Void
                    && !self.faults.is_enabled(Fault::MissingCheckReturnNonVoid)
                {
                    return Err(CompileError::semantically_invalid(
                        ret.position,
                        format!("has to return a value of type {expected}"),
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_expression(&mut self, expression: &Expr) -> Result<Type, CompileError> {
        let ty = match expression {
            Expr::Identifier(identifier) => self.check_identifier(identifier)?,
            Expr::Literal(literal) => self.check_literal(literal)?,
            Expr::Binary(binary) => self.check_binary(binary)?,
            Expr::Call(call) => self.check_function_call(call)?,
        };

        self.types.insert(expression.id(), ty.clone());
        Ok(ty)
    }

    fn check_identifier(&mut self, identifier: &Identifier) -> Result<Type, CompileError> {
        let id = self.table.lookup(&identifier.name, identifier.position)?;
        self.resolved.insert(identifier.id, id);
        self.types
            .insert(identifier.id, self.table.symbol(id).ty.clone());
        Ok(self.table.symbol(id).ty.clone())
    }

    fn check_literal(&mut self, literal: &Literal) -> Result<Type, CompileError> {
        if literal.text.parse::<i32>().is_err() {
            return Err(CompileError::semantically_invalid(
                literal.position,
                format!("invalid literal '{}'", literal.text),
            ));
        }
        Ok(Type::Int)
    }

    fn check_binary(&mut self, binary: &BinaryExpr) -> Result<Type, CompileError> {
        let operand_type = Type::operand_of(binary.op);

        for side in [&binary.lhs, &binary.rhs] {
            let side_type = self.check_expression(side)?;
            if !side_type.assignable_to(&operand_type) {
                return Err(CompileError::semantically_invalid(
                    side.position(),
                    format!("{side_type} cannot be assigned to {operand_type}"),
                ));
            }
        }

        Ok(Type::result_of(binary.op))
    }

    fn check_function_call(&mut self, call: &FunctionCall) -> Result<Type, CompileError> {
        let callee_type = self.check_identifier(&call.callee)?;

        if self.faults.is_enabled(Fault::MissingSymbolCallee) {
            self.resolved.remove(&call.callee.id);
        }

        let Type::Function(function_type) = callee_type else {
            return Err(CompileError::semantically_invalid(
                call.position,
                format!(
                    "{} of type {callee_type} is not a function",
                    call.callee.name
                ),
            ));
        };

        if function_type.params.len() != call.arguments.len() {
            return Err(CompileError::semantically_invalid(
                call.position,
                format!(
                    "expected {} arguments, but found {}",
                    function_type.params.len(),
                    call.arguments.len()
                ),
            ));
        }

        for (argument, param_type) in call.arguments.iter().zip(&function_type.params) {
            let argument_type = self.check_expression(argument)?;
            if !argument_type.assignable_to(param_type) {
                return Err(CompileError::semantically_invalid(
                    argument.position(),
                    format!("{argument_type} cannot be assigned to {param_type}"),
                ));
            }
        }

        Ok(*function_type.return_type)
    }
}
