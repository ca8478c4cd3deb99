// src/frontend/parser.rs
//! Recursive-descent parser for MiniC.
//!
//! One method per nonterminal; binary expressions share a single
//! left-associative helper parameterised over the operand parser and the
//! operator set of the precedence level.

use crate::errors::CompileError;
use crate::faults::{Fault, FaultConfig};
use crate::frontend::ast::*;
use crate::frontend::pos::SourcePosition;
use crate::frontend::stream::TokenStream;
use crate::frontend::token::TokenKind;

pub struct Parser<S> {
    tokens: S,
    faults: FaultConfig,
    nodes: NodeIdGen,
}

impl<S: TokenStream> Parser<S> {
    pub fn new(tokens: S, faults: FaultConfig) -> Self {
        Self {
            tokens,
            faults,
            nodes: NodeIdGen::new(),
        }
    }

    pub fn parse_program(mut self) -> Result<Program, CompileError> {
        // program
        //   : ( global_declaration )* EOF
        //   ;
        let position = self.here()?;

        let mut declarations = Vec::new();
        while !self.tokens.peek_is(&[TokenKind::Eof])? {
            declarations.push(self.parse_global_declaration()?);
        }

        Ok(Program {
            declarations,
            position,
        })
    }

    /// Position of the node about to be parsed.
    fn here(&mut self) -> Result<SourcePosition, CompileError> {
        Ok(self.tokens.peek()?.begin)
    }

    fn parse_global_declaration(&mut self) -> Result<Decl, CompileError> {
        // global_declaration
        //   : type_name IDENTIFIER SEMICOLON
        //   | type_name IDENTIFIER function_declaration_part
        //   ;
        let position = self.here()?;

        let type_name = self.parse_type_name()?;
        let name = self.parse_identifier()?;

        self.tokens
            .assert_peek(&[TokenKind::Semicolon, TokenKind::LParen])?;

        if self.tokens.skip(TokenKind::Semicolon)? {
            Ok(Decl::Variable(VariableDecl {
                type_name,
                name,
                position,
            }))
        } else {
            self.parse_function_declaration_part(position, type_name, name)
                .map(Decl::Function)
        }
    }

    fn parse_function_declaration_part(
        &mut self,
        position: SourcePosition,
        return_type: TypeName,
        name: Identifier,
    ) -> Result<FunctionDecl, CompileError> {
        // function_declaration_part
        //   : LPAREN parameter_declaration_list RPAREN block
        //   ;
        self.tokens.assert_pop(TokenKind::LParen)?;
        let params = self.parse_parameter_declaration_list()?;
        self.tokens.assert_pop(TokenKind::RParen)?;

        let body = self.parse_block()?;

        Ok(FunctionDecl {
            return_type,
            name,
            params,
            body,
            position,
        })
    }

    fn parse_parameter_declaration_list(&mut self) -> Result<Vec<VariableDecl>, CompileError> {
        // parameter_declaration_list
        //   : ( parameter_declaration ( COMMA parameter_declaration )* )?
        //   ;
        let mut params = Vec::new();

        if !self.tokens.peek_is(&[TokenKind::RParen])? {
            params.push(self.parse_parameter_declaration()?);

            while self.tokens.peek_is(&[TokenKind::Comma])? {
                self.tokens.assert_pop(TokenKind::Comma)?;
                params.push(self.parse_parameter_declaration()?);
            }
        }

        Ok(params)
    }

    fn parse_parameter_declaration(&mut self) -> Result<VariableDecl, CompileError> {
        // parameter_declaration
        //   : type_name IDENTIFIER
        //   ;
        let position = self.here()?;

        let type_name = self.parse_type_name()?;
        let name = self.parse_identifier()?;

        Ok(VariableDecl {
            type_name,
            name,
            position,
        })
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDecl, CompileError> {
        // variable_declaration
        //   : type_name IDENTIFIER SEMICOLON
        //   ;
        let position = self.here()?;

        let type_name = self.parse_type_name()?;
        let name = self.parse_identifier()?;
        self.tokens.assert_pop(TokenKind::Semicolon)?;

        Ok(VariableDecl {
            type_name,
            name,
            position,
        })
    }

    fn parse_type_name(&mut self) -> Result<TypeName, CompileError> {
        // type_name
        //   : INT
        //   | VOID
        //   ;
        self.tokens
            .assert_peek(&[TokenKind::KwInt, TokenKind::KwVoid])?;
        let token = self.tokens.pop()?;

        let kind = match token.kind {
            TokenKind::KwInt => TypeNameKind::Int,
            _ => TypeNameKind::Void,
        };

        Ok(TypeName {
            id: self.nodes.next(),
            kind,
            position: token.begin,
        })
    }

    fn parse_identifier(&mut self) -> Result<Identifier, CompileError> {
        let token = self.tokens.assert_pop(TokenKind::Identifier)?;

        Ok(Identifier {
            id: self.nodes.next(),
            name: token.text().to_owned(),
            position: token.begin,
        })
    }

    fn parse_block(&mut self) -> Result<Block, CompileError> {
        // block
        //   : LBRACE ( statement )* RBRACE
        //   ;
        let position = self.here()?;

        self.tokens.assert_pop(TokenKind::LBrace)?;

        let mut statements = Vec::new();
        while !self.tokens.peek_is(&[TokenKind::RBrace])? {
            statements.push(self.parse_statement()?);
        }

        self.tokens.assert_pop(TokenKind::RBrace)?;

        Ok(Block {
            statements,
            position,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        // statement
        //   : IDENTIFIER ASSIGN expression SEMICOLON
        //   | IDENTIFIER function_call_part SEMICOLON
        //   | IF LPAREN expression RPAREN block ( ELSE block )?
        //   | WHILE LPAREN expression RPAREN block
        //   | RETURN ( expression )? SEMICOLON
        //   | variable_declaration
        //   | block
        //   ;
        let position = self.here()?;

        if self.tokens.peek_is(&[TokenKind::Identifier])? {
            let identifier = self.parse_identifier()?;

            let call_alternative_dropped = self
                .faults
                .is_enabled(Fault::MissingAlternativeCallStmt);

            if self.tokens.peek_is(&[TokenKind::Assign])? || call_alternative_dropped {
                self.tokens.assert_pop(TokenKind::Assign)?;
                let value = self.parse_expression()?;
                self.tokens.assert_pop(TokenKind::Semicolon)?;

                Ok(Stmt::Assign(AssignStmt {
                    target: identifier,
                    value,
                    position,
                }))
            } else {
                let call = self.parse_function_call_part(position, identifier)?;
                self.tokens.assert_pop(TokenKind::Semicolon)?;

                Ok(Stmt::Call(CallStmt { call, position }))
            }
        } else if self.tokens.skip(TokenKind::KwIf)? {
            self.tokens.assert_pop(TokenKind::LParen)?;
            let condition = self.parse_expression()?;
            self.tokens.assert_pop(TokenKind::RParen)?;

            let then_block = self.parse_block()?;

            let else_block = if self.tokens.skip(TokenKind::KwElse)? {
                let else_block = self.parse_block()?;
                if self.faults.is_enabled(Fault::MissingTreeElse) {
                    None
                } else {
                    Some(else_block)
                }
            } else {
                None
            };

            Ok(Stmt::If(IfStmt {
                condition,
                then_block,
                else_block,
                position,
            }))
        } else if self.tokens.skip(TokenKind::KwWhile)? {
            self.tokens.assert_pop(TokenKind::LParen)?;
            let condition = self.parse_expression()?;
            self.tokens.assert_pop(TokenKind::RParen)?;

            let body = self.parse_block()?;

            Ok(Stmt::While(WhileStmt {
                condition,
                body,
                position,
            }))
        } else if self.tokens.skip(TokenKind::KwReturn)? {
            let value = if self.tokens.peek_is(&[TokenKind::Semicolon])? {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.tokens.assert_pop(TokenKind::Semicolon)?;

            if value.is_some() && self.faults.is_enabled(Fault::AdditionalSemicolonReturn) {
                self.tokens.assert_pop(TokenKind::Semicolon)?;
            }

            Ok(Stmt::Return(ReturnStmt { value, position }))
        } else if self.tokens.peek_is(&[TokenKind::LBrace])? {
            Ok(Stmt::Block(self.parse_block()?))
        } else {
            let declaration = self.parse_variable_declaration()?;
            Ok(Stmt::Declaration(DeclarationStmt {
                declaration,
                position,
            }))
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        // expression
        //   : or_expression
        //   ;
        self.parse_or_expression()
    }

    /// `<operand> ( <OPERATOR> <operand> )*`, folded left-associatively.
    fn parse_binary_expression(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, CompileError>,
        operators: &[TokenKind],
    ) -> Result<Expr, CompileError> {
        let position = self.here()?;

        let mut expression = operand(self)?;

        while self.tokens.peek_is(operators)? {
            let token = self.tokens.pop()?;
            let op = token
                .kind
                .operator()
                .unwrap_or_else(|| unreachable!("{:?} is not an operator", token.kind));

            let other = operand(self)?;
            expression = self.combine(position, op, expression, other);
        }

        Ok(expression)
    }

    /// Same grammar, but folded right-associatively.
    fn parse_binary_expression_right_associative(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, CompileError>,
        operators: &[TokenKind],
    ) -> Result<Expr, CompileError> {
        let position = self.here()?;

        let expression = operand(self)?;

        if self.tokens.peek_is(operators)? {
            let token = self.tokens.pop()?;
            let op = token
                .kind
                .operator()
                .unwrap_or_else(|| unreachable!("{:?} is not an operator", token.kind));

            let other = self.parse_binary_expression_right_associative(operand, operators)?;
            return Ok(self.combine(position, op, expression, other));
        }

        Ok(expression)
    }

    fn combine(&mut self, position: SourcePosition, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let (lhs, rhs) = if op == BinaryOp::Add && self.faults.is_enabled(Fault::SwappedOperandsPlus)
        {
            (rhs, lhs)
        } else {
            (lhs, rhs)
        };

        Expr::Binary(BinaryExpr {
            id: self.nodes.next(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            position,
        })
    }

    fn parse_or_expression(&mut self) -> Result<Expr, CompileError> {
        // or_expression
        //   : and_expression ( OR_OP and_expression )*
        //   ;
        self.parse_binary_expression(Self::parse_and_expression, &[TokenKind::OrOr])
    }

    fn parse_and_expression(&mut self) -> Result<Expr, CompileError> {
        // and_expression
        //   : compare_expression ( AND_OP compare_expression )*
        //   ;
        self.parse_binary_expression(Self::parse_compare_expression, &[TokenKind::AndAnd])
    }

    fn parse_compare_expression(&mut self) -> Result<Expr, CompileError> {
        // compare_expression
        //   : add_expression ( compare_operator add_expression )*
        //   ;
        const OPERATORS: &[TokenKind] = &[
            TokenKind::EqEq,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::NotEq,
        ];

        let operators = if self.faults.is_enabled(Fault::MissingAlternativeNotEquals) {
            &OPERATORS[..OPERATORS.len() - 1]
        } else {
            OPERATORS
        };

        self.parse_binary_expression(Self::parse_add_expression, operators)
    }

    fn parse_add_expression(&mut self) -> Result<Expr, CompileError> {
        // add_expression
        //   : mul_expression ( add_operator mul_expression )*
        //   ;
        const OPERATORS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

        if self.faults.is_enabled(Fault::RightAssociativeAddExpr) {
            self.parse_binary_expression_right_associative(Self::parse_mul_expression, OPERATORS)
        } else {
            self.parse_binary_expression(Self::parse_mul_expression, OPERATORS)
        }
    }

    fn parse_mul_expression(&mut self) -> Result<Expr, CompileError> {
        // mul_expression
        //   : factor ( mul_operator factor )*
        //   ;
        self.parse_binary_expression(Self::parse_factor, &[TokenKind::Star, TokenKind::Slash])
    }

    fn parse_factor(&mut self) -> Result<Expr, CompileError> {
        // factor
        //   : IDENTIFIER function_call_part
        //   | IDENTIFIER
        //   | NUM
        //   | LPAREN expression RPAREN
        //   ;
        let position = self.here()?;

        self.tokens
            .assert_peek(&[TokenKind::Identifier, TokenKind::Num, TokenKind::LParen])?;

        if self.tokens.peek_is(&[TokenKind::Num])? {
            let token = self.tokens.assert_pop(TokenKind::Num)?;

            Ok(Expr::Literal(Literal {
                id: self.nodes.next(),
                text: token.text().to_owned(),
                position,
            }))
        } else if self.tokens.skip(TokenKind::LParen)? {
            let expression = self.parse_expression()?;
            self.tokens.assert_pop(TokenKind::RParen)?;

            Ok(expression)
        } else {
            let name = self.parse_identifier()?;

            if self.tokens.peek_is(&[TokenKind::LParen])? {
                self.parse_function_call_part(position, name).map(Expr::Call)
            } else {
                Ok(Expr::Identifier(name))
            }
        }
    }

    fn parse_function_call_part(
        &mut self,
        position: SourcePosition,
        callee: Identifier,
    ) -> Result<FunctionCall, CompileError> {
        // function_call_part
        //   : LPAREN argument_list RPAREN
        //   ;
        self.tokens.assert_pop(TokenKind::LParen)?;
        let arguments = self.parse_argument_list()?;
        self.tokens.assert_pop(TokenKind::RParen)?;

        Ok(FunctionCall {
            id: self.nodes.next(),
            callee,
            arguments,
            position,
        })
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        // argument_list
        //   : ( expression ( COMMA expression )* )?
        //   ;
        let mut arguments = Vec::new();

        if !self.tokens.peek_is(&[TokenKind::RParen])? {
            arguments.push(self.parse_expression()?);

            while self.tokens.peek_is(&[TokenKind::Comma])? {
                if !self.faults.is_enabled(Fault::MissingCommaArguments) {
                    self.tokens.assert_pop(TokenKind::Comma)?;
                }

                arguments.push(self.parse_expression()?);
            }
        }

        Ok(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::stream::LazyTokenStream;

    fn parse(source: &str) -> Result<Program, CompileError> {
        parse_with(source, FaultConfig::NONE)
    }

    fn parse_with(source: &str, faults: FaultConfig) -> Result<Program, CompileError> {
        let stream = LazyTokenStream::from_lexer(Lexer::new(source, faults));
        Parser::new(stream, faults).parse_program()
    }

    fn sole_function(program: &Program) -> &FunctionDecl {
        match program.declarations.as_slice() {
            [Decl::Function(function)] => function,
            other => panic!("expected a single function, got {other:?}"),
        }
    }

    fn sole_expression(program: &Program) -> &Expr {
        match sole_function(program).body.statements.as_slice() {
            [Stmt::Assign(assign)] => &assign.value,
            other => panic!("expected a single assignment, got {other:?}"),
        }
    }

    fn expr(source: &str) -> Program {
        parse(&format!("void f() {{ x = {source}; }}")).expect("valid program")
    }

    #[test]
    fn empty_program_parses() {
        let program = parse("").unwrap();
        assert!(program.declarations.is_empty());
    }

    #[test]
    fn global_variable_and_function_disambiguate_on_lookahead() {
        let program = parse("int x;\nint f() { return 1; }").unwrap();
        assert!(matches!(
            program.declarations.as_slice(),
            [Decl::Variable(_), Decl::Function(_)]
        ));
    }

    #[test]
    fn parameters_are_comma_separated() {
        let program = parse("int f(int a, int b, int c) { return a; }").unwrap();
        let function = sole_function(&program);
        let names: Vec<_> = function
            .params
            .iter()
            .map(|param| param.name.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn addition_is_left_associative() {
        // 1 - 2 - 3 must parse as (1 - 2) - 3
        let program = expr("1 - 2 - 3");
        let Expr::Binary(outer) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert_eq!(outer.op, BinaryOp::Sub);
        assert!(matches!(
            outer.lhs.as_ref(),
            Expr::Binary(inner) if inner.op == BinaryOp::Sub
        ));
        assert!(matches!(outer.rhs.as_ref(), Expr::Literal(lit) if lit.text == "3"));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = expr("1 + 2 * 3");
        let Expr::Binary(outer) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert_eq!(outer.op, BinaryOp::Add);
        assert!(matches!(
            outer.rhs.as_ref(),
            Expr::Binary(inner) if inner.op == BinaryOp::Mul
        ));
    }

    #[test]
    fn parentheses_override_precedence() {
        let program = expr("(1 + 2) * 3");
        let Expr::Binary(outer) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert_eq!(outer.op, BinaryOp::Mul);
        assert!(matches!(
            outer.lhs.as_ref(),
            Expr::Binary(inner) if inner.op == BinaryOp::Add
        ));
    }

    #[test]
    fn else_block_attaches_to_if() {
        let program = parse("void f() { if (1) { x = 1; } else { x = 2; } }").unwrap();
        let [Stmt::If(if_stmt)] = sole_function(&program).body.statements.as_slice() else {
            panic!("expected if statement");
        };
        assert!(if_stmt.else_block.is_some());
    }

    #[test]
    fn call_statement_and_assignment_share_identifier_prefix() {
        let program = parse("void f() { g(); x = g(1, 2); }").unwrap();
        let statements = sole_function(&program).body.statements.as_slice();
        assert!(matches!(statements[0], Stmt::Call(_)));
        let Stmt::Assign(assign) = &statements[1] else {
            panic!("expected assignment");
        };
        let Expr::Call(call) = &assign.value else {
            panic!("expected call expression");
        };
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn return_without_value_parses() {
        let program = parse("void f() { return; }").unwrap();
        let [Stmt::Return(ret)] = sole_function(&program).body.statements.as_slice() else {
            panic!("expected return statement");
        };
        assert!(ret.value.is_none());
    }

    #[test]
    fn missing_semicolon_is_reported_at_the_following_token() {
        let err = parse("void f() { x = 1 }").unwrap_err();
        assert!(matches!(err, CompileError::SyntacticallyInvalid { .. }));
        assert_eq!(err.message(), "expected ';', but found '}'");
    }

    #[test]
    fn statement_error_lists_missing_factor_alternatives() {
        let err = parse("void f() { x = ; }").unwrap_err();
        assert!(err.message().starts_with("expected"));
        assert!(err.message().ends_with("but found ';'"));
    }

    #[test]
    fn node_ids_are_unique_per_parse() {
        let program = parse("int f(int a) { return a + 1; }").unwrap();
        let function = sole_function(&program);
        let [Stmt::Return(ret)] = function.body.statements.as_slice() else {
            panic!("expected return statement");
        };
        let Some(Expr::Binary(binary)) = &ret.value else {
            panic!("expected binary return value");
        };
        let mut ids = vec![
            function.return_type.id,
            function.name.id,
            function.params[0].type_name.id,
            function.params[0].name.id,
            binary.id,
            binary.lhs.id(),
            binary.rhs.id(),
        ];
        ids.sort_by_key(|id| id.0);
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn dropped_else_fault_discards_parsed_else_block() {
        let faults = FaultConfig::NONE.with(Fault::MissingTreeElse);
        let program = parse_with("void f() { if (1) { x = 1; } else { x = 2; } }", faults).unwrap();
        let [Stmt::If(if_stmt)] = sole_function(&program).body.statements.as_slice() else {
            panic!("expected if statement");
        };
        assert!(if_stmt.else_block.is_none());
    }

    #[test]
    fn swapped_operands_fault_flips_addition_only() {
        let faults = FaultConfig::NONE.with(Fault::SwappedOperandsPlus);
        let program = parse_with("void f() { x = 1 + 2; }", faults).unwrap();
        let Expr::Binary(binary) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert!(matches!(binary.lhs.as_ref(), Expr::Literal(lit) if lit.text == "2"));
        assert!(matches!(binary.rhs.as_ref(), Expr::Literal(lit) if lit.text == "1"));

        let program = parse_with("void f() { x = 1 - 2; }", faults).unwrap();
        let Expr::Binary(binary) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert!(matches!(binary.lhs.as_ref(), Expr::Literal(lit) if lit.text == "1"));
    }

    #[test]
    fn right_associative_fault_regroups_addition() {
        // 1 - 2 - 3 becomes 1 - (2 - 3)
        let faults = FaultConfig::NONE.with(Fault::RightAssociativeAddExpr);
        let program = parse_with("void f() { x = 1 - 2 - 3; }", faults).unwrap();
        let Expr::Binary(outer) = sole_expression(&program) else {
            panic!("expected binary expression");
        };
        assert!(matches!(outer.lhs.as_ref(), Expr::Literal(lit) if lit.text == "1"));
        assert!(matches!(
            outer.rhs.as_ref(),
            Expr::Binary(inner) if inner.op == BinaryOp::Sub
        ));
    }

    #[test]
    fn dropped_not_equals_fault_rejects_the_operator() {
        let faults = FaultConfig::NONE.with(Fault::MissingAlternativeNotEquals);
        let err = parse_with("void f() { x = 1 != 2; }", faults).unwrap_err();
        assert!(matches!(err, CompileError::SyntacticallyInvalid { .. }));
    }

    #[test]
    fn dropped_call_statement_fault_rejects_call_statements() {
        let faults = FaultConfig::NONE.with(Fault::MissingAlternativeCallStmt);
        let err = parse_with("void f() { g(); }", faults).unwrap_err();
        assert_eq!(err.message(), "expected '=', but found '('");
    }

    #[test]
    fn extra_semicolon_fault_demands_a_second_semicolon() {
        let faults = FaultConfig::NONE.with(Fault::AdditionalSemicolonReturn);
        assert!(parse_with("int f() { return 1; }", faults).is_err());
        assert!(parse_with("int f() { return 1;; }", faults).is_ok());
        // value-less returns are unaffected
        assert!(parse_with("void f() { return; }", faults).is_ok());
    }

    #[test]
    fn dropped_comma_fault_rejects_multi_argument_calls() {
        let faults = FaultConfig::NONE.with(Fault::MissingCommaArguments);
        assert!(parse_with("void f() { g(1); }", faults).is_ok());
        // comma is seen but never consumed, so the argument list cannot continue
        assert!(parse_with("void f() { g(1, 2); }", faults).is_err());
    }
}
