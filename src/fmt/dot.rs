// src/fmt/dot.rs
//! Graphviz export of the AST.
//!
//! One box per node, edges in source order (`ordering="out"`), leaves
//! filled darker than interior nodes.

use crate::frontend::ast::*;
use std::fmt::Write;

pub fn to_dot(program: &Program) -> String {
    let mut writer = DotWriter {
        out: String::new(),
        next_id: 0,
    };

    writer.out.push_str("digraph G {\n");
    writer
        .out
        .push_str("  graph [ordering=\"out\"];\n  node [fontname=\"Droid Sans Mono\"];\n");

    writer.program(program);

    writer.out.push_str("}\n");
    writer.out
}

struct DotWriter {
    out: String,
    next_id: u32,
}

impl DotWriter {
    fn node(&mut self, label: &str, terminal: bool) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let fill = if terminal {
            "goldenrod"
        } else {
            "lightgoldenrod1"
        };
        let _ = writeln!(
            self.out,
            "  node_{id} [label=\"{label}\", shape=box, style=filled, fillcolor={fill}];"
        );
        id
    }

    fn edge(&mut self, from: u32, to: u32) {
        let _ = writeln!(self.out, "  node_{from} -> node_{to};");
    }

    fn program(&mut self, program: &Program) {
        let id = self.node("Program", false);

        for declaration in &program.declarations {
            let child = match declaration {
                Decl::Variable(variable) => self.variable_decl(variable),
                Decl::Function(function) => self.function_decl(function),
            };
            self.edge(id, child);
        }
    }

    fn variable_decl(&mut self, declaration: &VariableDecl) -> u32 {
        let id = self.node("VariableDecl", false);

        let type_name = self.type_name(&declaration.type_name);
        self.edge(id, type_name);

        let name = self.identifier(&declaration.name);
        self.edge(id, name);

        id
    }

    fn function_decl(&mut self, declaration: &FunctionDecl) -> u32 {
        let id = self.node("FunctionDecl", false);

        let return_type = self.type_name(&declaration.return_type);
        self.edge(id, return_type);

        let name = self.identifier(&declaration.name);
        self.edge(id, name);

        for param in &declaration.params {
            let child = self.variable_decl(param);
            self.edge(id, child);
        }

        let body = self.block(&declaration.body);
        self.edge(id, body);

        id
    }

    fn type_name(&mut self, type_name: &TypeName) -> u32 {
        self.node(type_name.kind.spelling(), true)
    }

    fn identifier(&mut self, identifier: &Identifier) -> u32 {
        self.node(&identifier.name, true)
    }

    fn block(&mut self, block: &Block) -> u32 {
        let id = self.node("Block", false);

        for statement in &block.statements {
            let child = self.statement(statement);
            self.edge(id, child);
        }

        id
    }

    fn statement(&mut self, statement: &Stmt) -> u32 {
        match statement {
            Stmt::Assign(assign) => {
                let id = self.node("AssignStmt", false);
                let target = self.identifier(&assign.target);
                self.edge(id, target);
                let value = self.expression(&assign.value);
                self.edge(id, value);
                id
            }
            Stmt::Call(call) => {
                let id = self.node("CallStmt", false);
                let child = self.function_call(&call.call);
                self.edge(id, child);
                id
            }
            Stmt::If(if_stmt) => {
                let id = self.node("IfStmt", false);
                let condition = self.expression(&if_stmt.condition);
                self.edge(id, condition);
                let then_block = self.block(&if_stmt.then_block);
                self.edge(id, then_block);
                if let Some(else_block) = &if_stmt.else_block {
                    let child = self.block(else_block);
                    self.edge(id, child);
                }
                id
            }
            Stmt::While(while_stmt) => {
                let id = self.node("WhileStmt", false);
                let condition = self.expression(&while_stmt.condition);
                self.edge(id, condition);
                let body = self.block(&while_stmt.body);
                self.edge(id, body);
                id
            }
            Stmt::Return(ret) => {
                let id = self.node("ReturnStmt", false);
                if let Some(value) = &ret.value {
                    let child = self.expression(value);
                    self.edge(id, child);
                }
                id
            }
            Stmt::Declaration(declaration) => {
                let id = self.node("DeclarationStmt", false);
                let child = self.variable_decl(&declaration.declaration);
                self.edge(id, child);
                id
            }
            Stmt::Block(block) => self.block(block),
        }
    }

    fn expression(&mut self, expression: &Expr) -> u32 {
        match expression {
            Expr::Identifier(identifier) => self.identifier(identifier),
            Expr::Literal(literal) => self.node(&literal.text, true),
            Expr::Binary(binary) => {
                let id = self.node(binary.op.spelling(), false);
                let lhs = self.expression(&binary.lhs);
                self.edge(id, lhs);
                let rhs = self.expression(&binary.rhs);
                self.edge(id, rhs);
                id
            }
            Expr::Call(call) => self.function_call(call),
        }
    }

    fn function_call(&mut self, call: &FunctionCall) -> u32 {
        let id = self.node("FunctionCall", false);

        let callee = self.identifier(&call.callee);
        self.edge(id, callee);

        for argument in &call.arguments {
            let child = self.expression(argument);
            self.edge(id, child);
        }

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::FaultConfig;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::frontend::stream::LazyTokenStream;

    fn dot(source: &str) -> String {
        let stream = LazyTokenStream::from_lexer(Lexer::new(source, FaultConfig::NONE));
        let program = Parser::new(stream, FaultConfig::NONE)
            .parse_program()
            .expect("valid program");
        to_dot(&program)
    }

    #[test]
    fn wraps_the_graph_and_pins_child_order() {
        let out = dot("int x;");
        assert!(out.starts_with("digraph G {\n"));
        assert!(out.ends_with("}\n"));
        assert!(out.contains("graph [ordering=\"out\"];"));
    }

    #[test]
    fn leaves_are_filled_darker() {
        let out = dot("int main() { return 42; }");
        assert!(out.contains("[label=\"42\", shape=box, style=filled, fillcolor=goldenrod]"));
        assert!(out.contains("[label=\"main\", shape=box, style=filled, fillcolor=goldenrod]"));
        assert!(
            out.contains("[label=\"Program\", shape=box, style=filled, fillcolor=lightgoldenrod1]")
        );
    }

    #[test]
    fn edges_follow_the_tree() {
        let out = dot("void f() { x = 1 + 2; }");
        // Program -> FunctionDecl is always the first edge
        assert!(out.contains("node_0 -> node_1;"));
        assert!(out.contains("[label=\"+\""));
        // ten nodes, nine edges
        assert_eq!(out.matches(" -> ").count(), 9);
    }
}
