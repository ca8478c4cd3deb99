// src/interp/mod.rs
//! Tree-walking interpreter with bounded execution.
//!
//! Statements return a [`Flow`] value so that `return` unwinds to the
//! enclosing function call without unwinding the host stack. Execution is
//! bounded by an overall step budget plus a per-invocation loop iteration
//! budget; exhausting either aborts with a timeout.

pub mod value;

pub use value::Value;

use crate::errors::CompileError;
use crate::faults::{Fault, FaultConfig};
use crate::frontend::ast::*;
use crate::frontend::pos::SourcePosition;
use crate::sema::{Analysis, SymbolId, Type};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Execution budgets; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub max_steps: Option<u64>,
    pub max_loop_iterations: Option<u64>,
}

impl Limits {
    pub const UNBOUNDED: Limits = Limits {
        max_steps: None,
        max_loop_iterations: None,
    };
}

/// What a finished execution produced.
#[derive(Debug, PartialEq)]
pub struct Outcome {
    /// `main`'s return value; `None` when `main` returns `void`.
    pub exit_value: Option<Value>,
    /// Values passed to `print`, in order.
    pub output: Vec<Value>,
}

impl Outcome {
    /// Process exit code: a defined exit value truncated to a byte,
    /// everything else zero.
    pub fn exit_code(&self) -> u8 {
        match self.exit_value {
            Some(Value::Number(Some(number))) => number as u8,
            _ => 0,
        }
    }
}

/// Run `program` to completion.
pub fn interpret(
    program: &Program,
    analysis: &Analysis,
    faults: FaultConfig,
    limits: Limits,
) -> Result<Outcome, CompileError> {
    Interpreter::new(program, analysis, faults, limits, false).run()
}

/// Run `program` and additionally abort as dynamically invalid whenever an
/// undefined value reaches control flow, output, or the exit value.
pub fn check_dynamically_valid(
    program: &Program,
    analysis: &Analysis,
    faults: FaultConfig,
    limits: Limits,
) -> Result<Outcome, CompileError> {
    let outcome = Interpreter::new(program, analysis, faults, limits, true).run()?;

    if matches!(outcome.exit_value, Some(value) if value.is_undefined()) {
        return Err(CompileError::dynamically_invalid(
            SourcePosition::UNKNOWN,
            "undefined exit value",
        ));
    }

    Ok(outcome)
}

/// Non-exceptional statement outcomes.
enum Flow {
    Normal,
    Return(Option<Value>),
}

struct Interpreter<'p> {
    analysis: &'p Analysis,
    faults: FaultConfig,
    limits: Limits,
    check_undefined: bool,

    program: &'p Program,
    functions: FxHashMap<SymbolId, &'p FunctionDecl>,
    globals: FxHashMap<SymbolId, Value>,
    stack: Vec<FxHashMap<SymbolId, Value>>,
    output: Vec<Value>,
    steps: u64,
}

impl<'p> Interpreter<'p> {
    fn new(
        program: &'p Program,
        analysis: &'p Analysis,
        faults: FaultConfig,
        limits: Limits,
        check_undefined: bool,
    ) -> Self {
        Self {
            analysis,
            faults,
            limits,
            check_undefined,
            program,
            functions: FxHashMap::default(),
            globals: FxHashMap::default(),
            stack: Vec::new(),
            output: Vec::new(),
            steps: 0,
        }
    }

    fn run(mut self) -> Result<Outcome, CompileError> {
        debug!(faults = %self.faults, "interpreting program");

        let mut main = None;

        for declaration in &self.program.declarations {
            match declaration {
                Decl::Function(function) => {
                    let symbol = self.resolved(&function.name);
                    self.functions.insert(symbol, function);

                    if function.name.name == "main" {
                        main = Some(function);
                    }
                }
                Decl::Variable(variable) => self.init_global(variable),
            }
        }

        let exit_value = match main {
            Some(main) => self.call(main, FxHashMap::default())?,
            // a program without main does nothing and exits cleanly
            None => Some(Value::number(0)),
        };

        Ok(Outcome {
            exit_value,
            output: self.output,
        })
    }

    fn init_global(&mut self, declaration: &VariableDecl) {
        if self.faults.is_enabled(Fault::MissingInitGlobals) {
            return;
        }

        let symbol = self.resolved(&declaration.name);
        self.globals.insert(symbol, Value::number(0));
    }

    /// The symbol an identifier resolved to during analysis.
    fn resolved(&self, identifier: &Identifier) -> SymbolId {
        match self.analysis.resolved(identifier.id) {
            Some(symbol) => symbol,
            None => panic!("no symbol resolved for '{}'", identifier.name),
        }
    }

    fn call(
        &mut self,
        function: &'p FunctionDecl,
        frame: FxHashMap<SymbolId, Value>,
    ) -> Result<Option<Value>, CompileError> {
        self.stack.push(frame);
        let flow = self.exec_block(&function.body);
        self.stack.pop();

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => {
                // fell off the end of the body
                if matches!(
                    self.analysis.type_of(function.return_type.id),
                    Some(Type::Void)
                ) {
                    Ok(None)
                } else {
                    Ok(Some(Value::UNDEFINED_NUMBER))
                }
            }
        }
    }

    fn count_step(&mut self) -> Result<(), CompileError> {
        self.steps += 1;
        match self.limits.max_steps {
            Some(max) if self.steps > max => {
                Err(CompileError::timeout("maximum number of steps exceeded"))
            }
            _ => Ok(()),
        }
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow, CompileError> {
        for statement in &block.statements {
            if let Flow::Return(value) = self.exec_statement(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_statement(&mut self, statement: &Stmt) -> Result<Flow, CompileError> {
        match statement {
            Stmt::Assign(assign) => {
                self.count_step()?;

                let value = self.eval(&assign.value)?;
                let target = self.resolved(&assign.target);
                self.write_variable(target, value);
                Ok(Flow::Normal)
            }
            Stmt::Call(call) => {
                self.count_step()?;
                self.eval_call(&call.call)?;
                Ok(Flow::Normal)
            }
            Stmt::If(if_stmt) => {
                self.count_step()?;

                if self.eval_condition(&if_stmt.condition)? {
                    self.exec_block(&if_stmt.then_block)
                } else if let Some(else_block) = &if_stmt.else_block {
                    self.exec_block(else_block)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(while_stmt) => {
                let mut iterations: u64 = 0;

                loop {
                    self.count_step()?;

                    if !self.eval_condition(&while_stmt.condition)? {
                        return Ok(Flow::Normal);
                    }

                    iterations += 1;
                    if matches!(self.limits.max_loop_iterations, Some(max) if iterations > max) {
                        return Err(CompileError::timeout(
                            "maximum number of loop iterations exceeded",
                        ));
                    }

                    if let Flow::Return(value) = self.exec_block(&while_stmt.body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Stmt::Return(ret) => {
                self.count_step()?;

                match &ret.value {
                    Some(value) => {
                        let value = self.eval(value)?;
                        Ok(Flow::Return(Some(Value::Number(value.to_number()))))
                    }
                    None => Ok(Flow::Return(None)),
                }
            }
            // locals start out undefined; only globals are initialized
            Stmt::Declaration(_) => Ok(Flow::Normal),
            Stmt::Block(block) => self.exec_block(block),
        }
    }

    fn eval_condition(&mut self, condition: &Expr) -> Result<bool, CompileError> {
        let value = self.eval(condition)?;

        if self.check_undefined && value.is_undefined() {
            return Err(CompileError::dynamically_invalid(
                condition.position(),
                "undefined control flow",
            ));
        }

        Ok(value.is_true())
    }

    fn eval(&mut self, expression: &Expr) -> Result<Value, CompileError> {
        match expression {
            Expr::Identifier(identifier) => {
                let symbol = self.resolved(identifier);
                Ok(self.read_variable(symbol))
            }
            Expr::Literal(literal) => {
                let number = literal
                    .text
                    .parse::<i64>()
                    .unwrap_or_else(|_| unreachable!("literal validated during analysis"));
                Ok(Value::number(number))
            }
            Expr::Binary(binary) => self.eval_binary(binary),
            // a void call in value position yields an undefined number
            Expr::Call(call) => Ok(self
                .eval_call(call)?
                .unwrap_or(Value::UNDEFINED_NUMBER)),
        }
    }

    fn eval_binary(&mut self, binary: &BinaryExpr) -> Result<Value, CompileError> {
        match binary.op {
            BinaryOp::Or if !self.faults.is_enabled(Fault::NoShortcutOr) => {
                let left = Value::Boolean(self.eval(&binary.lhs)?.to_boolean());
                if left.is_undefined() {
                    Ok(Value::UNDEFINED_BOOLEAN)
                } else if left.is_true() {
                    Ok(Value::TRUE)
                } else {
                    Ok(Value::Boolean(self.eval(&binary.rhs)?.to_boolean()))
                }
            }
            BinaryOp::And if !self.faults.is_enabled(Fault::NoShortcutAnd) => {
                let left = Value::Boolean(self.eval(&binary.lhs)?.to_boolean());
                if left.is_undefined() {
                    Ok(Value::UNDEFINED_BOOLEAN)
                } else if left.is_false() {
                    Ok(Value::FALSE)
                } else {
                    Ok(Value::Boolean(self.eval(&binary.rhs)?.to_boolean()))
                }
            }
            op => {
                let left = self.eval(&binary.lhs)?;
                let right = self.eval(&binary.rhs)?;

                if left.is_undefined() || right.is_undefined() {
                    // a defined true operand decides a non-shortcut OR even
                    // when the other side is undefined
                    if op == BinaryOp::Or && (left.is_true() || right.is_true()) {
                        return Ok(Value::TRUE);
                    }

                    return Ok(match Type::result_of(op) {
                        Type::Int => Value::UNDEFINED_NUMBER,
                        _ => Value::UNDEFINED_BOOLEAN,
                    });
                }

                Ok(self.apply(op, left, right))
            }
        }
    }

    /// Apply `op` to two defined operands.
    fn apply(&self, op: BinaryOp, left: Value, right: Value) -> Value {
        if matches!(op, BinaryOp::Or | BinaryOp::And) {
            let (Some(l), Some(r)) = (left.to_boolean(), right.to_boolean()) else {
                unreachable!("operands checked for definedness");
            };
            return match op {
                BinaryOp::Or => Value::Boolean(Some(l || r)),
                _ => Value::Boolean(Some(l && r)),
            };
        }

        let (Some(l), Some(r)) = (left.to_number(), right.to_number()) else {
            unreachable!("operands checked for definedness");
        };

        match op {
            BinaryOp::Equals => Value::Boolean(Some(l == r)),
            BinaryOp::NotEquals => Value::Boolean(Some(l != r)),
            BinaryOp::LessThan => Value::Boolean(Some(l < r)),
            BinaryOp::LessEquals => Value::Boolean(Some(l <= r)),
            BinaryOp::GreaterThan => Value::Boolean(Some(l > r)),
            BinaryOp::GreaterEquals => Value::Boolean(Some(l >= r)),
            BinaryOp::Add => Value::number(l.wrapping_add(r)),
            BinaryOp::Sub => Value::number(l.wrapping_sub(r)),
            BinaryOp::Mul => {
                if self.faults.is_enabled(Fault::WrongShiftMul) && is_power_of_two(r) {
                    Value::number(r)
                } else {
                    Value::number(l.wrapping_mul(r))
                }
            }
            BinaryOp::Div => {
                if r == 0 {
                    if self.faults.is_enabled(Fault::DivByZero) {
                        Value::number(0)
                    } else {
                        Value::UNDEFINED_NUMBER
                    }
                } else {
                    Value::number(l.wrapping_div(r))
                }
            }
            BinaryOp::Or | BinaryOp::And => unreachable!("handled above"),
        }
    }

    fn eval_call(&mut self, call: &FunctionCall) -> Result<Option<Value>, CompileError> {
        let callee = self.resolved(&call.callee);

        if callee == self.analysis.print_symbol() {
            let argument = &call.arguments[0];
            let value = self.eval(argument)?;

            if self.check_undefined && value.is_undefined() {
                return Err(CompileError::dynamically_invalid(
                    argument.position(),
                    "undefined output",
                ));
            }

            self.output.push(value);
            return Ok(None);
        }

        let Some(function) = self.functions.get(&callee) else {
            panic!("call to '{}' which is not a function", call.callee.name);
        };
        let function = *function;

        let mut frame = FxHashMap::default();
        for (argument, param) in call.arguments.iter().zip(&function.params) {
            let value = self.eval(argument)?;
            let symbol = self.resolved(&param.name);
            frame.insert(symbol, value);
        }

        self.call(function, frame)
    }

    fn write_variable(&mut self, symbol: SymbolId, value: Value) {
        if self.analysis.symbol(symbol).is_global {
            self.globals.insert(symbol, value);
        } else {
            let Some(frame) = self.stack.last_mut() else {
                unreachable!("local write outside any function");
            };
            frame.insert(symbol, value);
        }
    }

    /// Variables that were never written read as undefined.
    fn read_variable(&self, symbol: SymbolId) -> Value {
        let frame = if self.analysis.symbol(symbol).is_global {
            &self.globals
        } else {
            match self.stack.last() {
                Some(frame) => frame,
                None => unreachable!("local read outside any function"),
            }
        };

        frame.get(&symbol).copied().unwrap_or(Value::UNDEFINED_NUMBER)
    }
}

fn is_power_of_two(value: i64) -> bool {
    value > 1 && (value & (value - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::frontend::stream::LazyTokenStream;
    use crate::sema;

    fn run(source: &str) -> Outcome {
        run_with(source, FaultConfig::NONE, Limits::UNBOUNDED).expect("program runs")
    }

    fn run_with(
        source: &str,
        faults: FaultConfig,
        limits: Limits,
    ) -> Result<Outcome, CompileError> {
        let stream = LazyTokenStream::from_lexer(Lexer::new(source, faults));
        let program = Parser::new(stream, faults).parse_program()?;
        let analysis = sema::analyze(&program, faults)?;
        interpret(&program, &analysis, faults, limits)
    }

    fn check(source: &str, limits: Limits) -> Result<Outcome, CompileError> {
        let faults = FaultConfig::NONE;
        let stream = LazyTokenStream::from_lexer(Lexer::new(source, faults));
        let program = Parser::new(stream, faults).parse_program()?;
        let analysis = sema::analyze(&program, faults)?;
        check_dynamically_valid(&program, &analysis, faults, limits)
    }

    fn numbers(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::number(*v)).collect()
    }

    #[test]
    fn arithmetic_with_precedence() {
        let outcome = run("int main() { print(1 + 2 * 3); return 0; }");
        assert_eq!(outcome.output, numbers(&[7]));
        assert_eq!(outcome.exit_value, Some(Value::number(0)));
    }

    #[test]
    fn function_calls_pass_arguments_by_value() {
        let source = "int add(int a, int b) { return a + b; }\n\
                      int main() { print(add(2, 3)); return add(2, 3); }";
        let outcome = run(source);
        assert_eq!(outcome.output, numbers(&[5]));
        assert_eq!(outcome.exit_value, Some(Value::number(5)));
        assert_eq!(outcome.exit_code(), 5);
    }

    #[test]
    fn recursion_terminates() {
        let source = "int fib(int n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); }\n\
                      int main() { print(fib(10)); return 0; }";
        assert_eq!(run(source).output, numbers(&[55]));
    }

    #[test]
    fn globals_start_at_zero_and_persist_across_calls() {
        let source = "int counter;\n\
                      void bump() { counter = counter + 1; }\n\
                      int main() { print(counter); bump(); bump(); print(counter); return 0; }";
        assert_eq!(run(source).output, numbers(&[0, 2]));
    }

    #[test]
    fn locals_shadow_globals() {
        let source = "int x;\n\
                      int main() { int x; x = 5; print(x); return 0; }";
        assert_eq!(run(source).output, numbers(&[5]));
    }

    #[test]
    fn uninitialized_locals_are_undefined() {
        let outcome = run("int main() { int x; print(x); return 0; }");
        assert_eq!(outcome.output.len(), 1);
        assert!(outcome.output[0].is_undefined());
    }

    #[test]
    fn division_by_zero_is_undefined() {
        let outcome = run("int main() { print(1 / 0); return 0; }");
        assert!(outcome.output[0].is_undefined());
    }

    #[test]
    fn division_truncates() {
        assert_eq!(
            run("int main() { print(7 / 2); print(0 - 7 / 2); return 0; }").output,
            numbers(&[3, -3])
        );
    }

    #[test]
    fn undefined_propagates_through_arithmetic() {
        let outcome = run("int main() { int x; print(x + 1); return 0; }");
        assert!(outcome.output[0].is_undefined());
    }

    #[test]
    fn short_circuit_skips_the_right_operand() {
        // the division never runs, so its undefined result cannot leak out
        let source = "int main() { if (1 || 1 / 0) { print(1); } return 0; }";
        assert_eq!(run(source).output, numbers(&[1]));

        let source = "int main() { if (0 && 1 / 0) { } if (1) { print(2); } return 0; }";
        assert_eq!(run(source).output, numbers(&[2]));
    }

    #[test]
    fn undefined_left_operand_short_circuits_to_undefined() {
        let source = "int main() { int x; if (x || 1) { print(1); } return 0; }";
        // condition is undefined, which counts as not-true
        assert_eq!(run(source).output, numbers(&[]));
    }

    #[test]
    fn void_main_exits_cleanly() {
        let outcome = run("void main() { print(1); }");
        assert_eq!(outcome.exit_value, None);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn missing_main_is_a_clean_exit() {
        let outcome = run("int x;");
        assert_eq!(outcome.exit_value, Some(Value::number(0)));
    }

    #[test]
    fn falling_off_an_int_function_yields_an_undefined_exit() {
        let outcome = run("int main() { if (0) { return 1; } }");
        assert!(matches!(outcome.exit_value, Some(value) if value.is_undefined()));
    }

    #[test]
    fn step_budget_stops_endless_loops() {
        let limits = Limits {
            max_steps: Some(1000),
            max_loop_iterations: None,
        };
        let err = run_with("int main() { while (1) { } return 0; }", FaultConfig::NONE, limits)
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn loop_iteration_budget_resets_per_invocation() {
        let limits = Limits {
            max_steps: None,
            max_loop_iterations: Some(10),
        };
        let source = "void count() { int i; i = 0; while (i < 5) { i = i + 1; } }\n\
                      int main() { count(); count(); count(); return 0; }";
        assert!(run_with(source, FaultConfig::NONE, limits).is_ok());

        let source = "int main() { int i; i = 0; while (i < 20) { i = i + 1; } return 0; }";
        let err = run_with(source, FaultConfig::NONE, limits).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn check_mode_rejects_undefined_conditions() {
        let err = check("int main() { int x; if (x) { } return 0; }", Limits::UNBOUNDED)
            .unwrap_err();
        assert_eq!(err.message(), "undefined control flow");
    }

    #[test]
    fn check_mode_rejects_undefined_output() {
        let err = check("int main() { print(1 / 0); return 0; }", Limits::UNBOUNDED).unwrap_err();
        assert_eq!(err.message(), "undefined output");
    }

    #[test]
    fn check_mode_rejects_undefined_exit_values() {
        let err = check("int main() { int x; return x; }", Limits::UNBOUNDED).unwrap_err();
        assert_eq!(err.message(), "undefined exit value");
    }

    #[test]
    fn check_mode_accepts_defined_programs() {
        assert!(check("int main() { print(42); return 0; }", Limits::UNBOUNDED).is_ok());
    }

    #[test]
    fn no_shortcut_or_fault_evaluates_both_operands() {
        let faults = FaultConfig::NONE.with(Fault::NoShortcutOr);
        // 1/0 is undefined, but the defined true operand still wins
        let source = "int main() { if (1 || 1 / 0) { print(1); } return 0; }";
        let outcome = run_with(source, faults, Limits::UNBOUNDED).unwrap();
        assert_eq!(outcome.output, numbers(&[1]));
    }

    #[test]
    fn no_shortcut_and_fault_leaks_undefined() {
        let faults = FaultConfig::NONE.with(Fault::NoShortcutAnd);
        let source = "int main() { if (0 && 1 / 0) { print(1); } if (1) { print(2); } return 0; }";
        let outcome = run_with(source, faults, Limits::UNBOUNDED).unwrap();
        // undefined condition counts as not-true, so only the second print runs
        assert_eq!(outcome.output, numbers(&[2]));
    }

    #[test]
    fn div_by_zero_fault_returns_zero() {
        let faults = FaultConfig::NONE.with(Fault::DivByZero);
        let outcome = run_with("int main() { print(1 / 0); return 0; }", faults, Limits::UNBOUNDED)
            .unwrap();
        assert_eq!(outcome.output, numbers(&[0]));
    }

    #[test]
    fn wrong_shift_mul_fault_mangles_power_of_two_factors() {
        let faults = FaultConfig::NONE.with(Fault::WrongShiftMul);
        let source = "int main() { print(3 * 4); print(3 * 5); return 0; }";
        let outcome = run_with(source, faults, Limits::UNBOUNDED).unwrap();
        assert_eq!(outcome.output, numbers(&[4, 15]));
    }

    #[test]
    fn missing_init_globals_fault_leaves_globals_undefined() {
        let faults = FaultConfig::NONE.with(Fault::MissingInitGlobals);
        let outcome = run_with("int g;\nint main() { print(g); return 0; }", faults, Limits::UNBOUNDED)
            .unwrap();
        assert!(outcome.output[0].is_undefined());
    }

    #[test]
    #[should_panic(expected = "no symbol resolved")]
    fn missing_callee_symbol_fault_aborts_interpretation() {
        let faults = FaultConfig::NONE.with(Fault::MissingSymbolCallee);
        let _ = run_with("int main() { print(1); return 0; }", faults, Limits::UNBOUNDED);
    }
}
