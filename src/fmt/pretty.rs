// src/fmt/pretty.rs
//! Renders an AST back to MiniC source.
//!
//! The output is canonical: two-space indentation, one statement per line,
//! and parentheses around every binary child the parent binds at least as
//! tightly as. Printing a parse of the printed output reproduces it byte
//! for byte.

use crate::frontend::ast::*;

pub fn pretty_print(program: &Program) -> String {
    let mut printer = Printer {
        out: String::new(),
        indent: 0,
    };
    printer.program(program);
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn program(&mut self, program: &Program) {
        for (index, declaration) in program.declarations.iter().enumerate() {
            if index > 0 {
                self.out.push('\n');
            }

            match declaration {
                Decl::Variable(variable) => self.variable_decl(variable, true),
                Decl::Function(function) => self.function_decl(function),
            }
        }
    }

    fn variable_decl(&mut self, declaration: &VariableDecl, terminated: bool) {
        self.out.push_str(declaration.type_name.kind.spelling());
        self.out.push(' ');
        self.out.push_str(&declaration.name.name);
        if terminated {
            self.out.push(';');
        }
    }

    fn function_decl(&mut self, declaration: &FunctionDecl) {
        self.out.push_str(declaration.return_type.kind.spelling());
        self.out.push(' ');
        self.out.push_str(&declaration.name.name);
        self.out.push('(');

        for (index, param) in declaration.params.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.variable_decl(param, false);
        }

        self.out.push_str(") ");
        self.block(&declaration.body);
        self.out.push('\n');
    }

    fn block(&mut self, block: &Block) {
        self.out.push_str("{\n");
        self.indent += 2;

        for statement in &block.statements {
            self.write_indent();
            self.statement(statement);
            self.out.push('\n');
        }

        self.indent -= 2;
        self.write_indent();
        self.out.push('}');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push(' ');
        }
    }

    fn statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Assign(assign) => {
                self.out.push_str(&assign.target.name);
                self.out.push_str(" = ");
                self.expression(&assign.value);
                self.out.push(';');
            }
            Stmt::Call(call) => {
                self.function_call(&call.call);
                self.out.push(';');
            }
            Stmt::If(if_stmt) => {
                self.out.push_str("if (");
                self.expression(&if_stmt.condition);
                self.out.push_str(") ");
                self.block(&if_stmt.then_block);

                if let Some(else_block) = &if_stmt.else_block {
                    self.out.push_str(" else ");
                    self.block(else_block);
                }
            }
            Stmt::While(while_stmt) => {
                self.out.push_str("while (");
                self.expression(&while_stmt.condition);
                self.out.push_str(") ");
                self.block(&while_stmt.body);
            }
            Stmt::Return(ret) => {
                self.out.push_str("return");
                if let Some(value) = &ret.value {
                    self.out.push(' ');
                    self.expression(value);
                }
                self.out.push(';');
            }
            Stmt::Declaration(declaration) => {
                self.variable_decl(&declaration.declaration, false);
                self.out.push(';');
            }
            Stmt::Block(block) => self.block(block),
        }
    }

    fn expression(&mut self, expression: &Expr) {
        match expression {
            Expr::Identifier(identifier) => self.out.push_str(&identifier.name),
            Expr::Literal(literal) => self.out.push_str(&literal.text),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Call(call) => self.function_call(call),
        }
    }

    fn binary(&mut self, binary: &BinaryExpr) {
        self.operand(binary, &binary.lhs);
        self.out.push(' ');
        self.out.push_str(binary.op.spelling());
        self.out.push(' ');
        self.operand(binary, &binary.rhs);
    }

    /// Operands parenthesized whenever the parent binds at least as
    /// tightly, which keeps left-associative chains unambiguous.
    fn operand(&mut self, parent: &BinaryExpr, child: &Expr) {
        let parenthesize = matches!(
            child,
            Expr::Binary(inner) if parent.op.precedence() >= inner.op.precedence()
        );

        if parenthesize {
            self.out.push('(');
        }
        self.expression(child);
        if parenthesize {
            self.out.push(')');
        }
    }

    fn function_call(&mut self, call: &FunctionCall) {
        self.out.push_str(&call.callee.name);
        self.out.push('(');

        for (index, argument) in call.arguments.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.expression(argument);
        }

        self.out.push(')');
    }
}
