//! Statement execution and expression evaluation

use super::array::resolve_index;
use super::callable::{Callable, UserFunction};
use super::env::{child_env, EnvRef, Environment};
use super::error::{InterpResult, RuntimeError};
use super::runtime::Monitor;
use super::task::{GlideWait, Grow};
use super::value::Value;
use crate::ast::{BinOp, Expr, LogicalOp, Span, Spanned, Stmt, UnOp};
use crate::config::Config;
use crate::library;
use crate::turtle::TurtleRef;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Sink for `print` output
pub type Output = Rc<dyn Fn(&str)>;

/// Why execution stopped before reaching the end of a statement
#[derive(Debug)]
pub(crate) enum Unwind {
    Error(RuntimeError),
    Killed,
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

impl Unwind {
    fn at(self, span: Span) -> Self {
        match self {
            Unwind::Error(err) => Unwind::Error(err.at(span)),
            Unwind::Killed => Unwind::Killed,
        }
    }
}

type Exec<T> = Result<T, Unwind>;

/// Control flow out of a statement
pub(crate) enum Flow {
    Normal,
    Return(Value),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    Failed(RuntimeError),
    Killed,
}

/// The interpreter
pub struct Interpreter {
    /// Global environment, holding library bindings
    globals: EnvRef,
    /// Innermost environment of the statement being executed
    environment: EnvRef,
    turtle: TurtleRef,
    config: Config,
    monitor: Rc<RefCell<Monitor>>,
    output: Output,
    /// Current user function nesting
    call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter with the standard and drawing libraries and the
    /// screen globals installed
    pub(crate) fn new(
        config: Config,
        turtle: TurtleRef,
        monitor: Rc<RefCell<Monitor>>,
        output: Output,
    ) -> InterpResult<Self> {
        let globals = Environment::new().into_ref();
        library::standard().import(&globals)?;
        library::drawing().import(&globals)?;
        {
            let mut env = globals.borrow_mut();
            env.define_library("screenWidth", Value::Number(config.screen_width))?;
            env.define_library("screenHeight", Value::Number(config.screen_height))?;
        }
        Ok(Interpreter {
            environment: Rc::clone(&globals),
            globals,
            turtle,
            config,
            monitor,
            output,
            call_depth: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Write one line of program output
    pub fn print(&self, text: &str) {
        (self.output)(text);
    }

    /// Drop all global bindings so closures referring back to them are freed
    pub(crate) fn clear(&self) {
        self.globals.borrow_mut().clear();
    }

    /// Run top-level statements in the global environment
    pub(crate) async fn run_program(&mut self, statements: &[Spanned<Stmt>]) -> Outcome {
        debug!(statements = statements.len(), "program started");
        self.call_depth = 0;
        self.environment = Rc::clone(&self.globals);
        self.monitor.borrow_mut().enter_block(statements.len());
        let result = self.execute_statements(statements).await;
        {
            let mut monitor = self.monitor.borrow_mut();
            monitor.exit_block();
            monitor.set_environment(Rc::clone(&self.globals));
        }
        match result {
            // a top-level return just ends the program
            Ok(_) => Outcome::Completed,
            Err(Unwind::Error(err)) => Outcome::Failed(err),
            Err(Unwind::Killed) => Outcome::Killed,
        }
    }

    // ============================================
    // Statements
    // ============================================

    fn execute<'a>(&'a mut self, stmt: &'a Spanned<Stmt>) -> Grow<'a, Exec<Flow>> {
        Grow::new(async move {
            self.checkpoint().await?;
            trace!(kind = stmt.node.kind(), line = stmt.span.line, "execute");
            self.execute_inner(stmt).await.map_err(|unwind| unwind.at(stmt.span))
        })
    }

    /// Runs before every statement: honours kill requests and waits out glides
    async fn checkpoint(&mut self) -> Exec<()> {
        self.check_killed()?;
        self.monitor
            .borrow_mut()
            .set_environment(Rc::clone(&self.environment));
        if self.turtle.borrow().gliding() {
            debug!("waiting for glide");
            GlideWait::new(Rc::clone(&self.turtle), Rc::clone(&self.monitor)).await;
            self.check_killed()?;
            debug!("glide finished");
        }
        Ok(())
    }

    fn check_killed(&self) -> Exec<()> {
        if self.monitor.borrow().kill_requested {
            self.turtle.borrow_mut().stop_glide();
            return Err(Unwind::Killed);
        }
        Ok(())
    }

    async fn execute_inner(&mut self, stmt: &Spanned<Stmt>) -> Exec<Flow> {
        match &stmt.node {
            Stmt::Expression(expr) => {
                self.evaluate(expr).await?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init).await?,
                    None => Value::Null,
                };
                self.environment
                    .borrow_mut()
                    .define(&name.node, value)
                    .map_err(|e| e.at(name.span))?;
                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                let function = UserFunction {
                    decl: Rc::clone(decl),
                    closure: Rc::clone(&self.environment),
                };
                let value = Value::Callable(Callable::User(Rc::new(function)));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.node, value)
                    .map_err(|e| e.at(decl.name.span))?;
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env = child_env(&self.environment);
                self.execute_block(statements, env).await
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(cond).await?.is_truthy() {
                    self.execute(then_branch).await
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch).await
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { cond, body } => {
                let limit = self.config.max_loop_iterations;
                let mut iterations = 0usize;
                loop {
                    // the condition may read turtle state left by the last iteration
                    if iterations > 0 {
                        self.checkpoint().await?;
                    }
                    if !self.evaluate(cond).await?.is_truthy() {
                        break;
                    }
                    iterations += 1;
                    if iterations > limit {
                        return Err(RuntimeError::infinite_loop(limit).into());
                    }
                    if let Flow::Return(value) = self.execute(body).await? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr).await?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Run `statements` in `env`, restoring the current environment afterwards
    /// whether or not they complete
    async fn execute_block(&mut self, statements: &[Spanned<Stmt>], env: EnvRef) -> Exec<Flow> {
        let previous = std::mem::replace(&mut self.environment, env);
        self.monitor.borrow_mut().enter_block(statements.len());
        let result = self.execute_statements(statements).await;
        self.monitor.borrow_mut().exit_block();
        self.environment = previous;
        result
    }

    async fn execute_statements(&mut self, statements: &[Spanned<Stmt>]) -> Exec<Flow> {
        for (index, stmt) in statements.iter().enumerate() {
            self.monitor.borrow_mut().at_statement(index, stmt.span);
            if let Flow::Return(value) = self.execute(stmt).await? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    // ============================================
    // Expressions
    // ============================================

    fn evaluate<'a>(&'a mut self, expr: &'a Spanned<Expr>) -> Grow<'a, Exec<Value>> {
        Grow::new(async move {
            self.evaluate_inner(expr)
                .await
                .map_err(|unwind| unwind.at(expr.span))
        })
    }

    async fn evaluate_inner(&mut self, expr: &Spanned<Expr>) -> Exec<Value> {
        match &expr.node {
            Expr::Literal(lit) => Ok(Value::from(lit)),

            Expr::Grouping(inner) => self.evaluate(inner).await,

            Expr::Var(name) => {
                let value = self.environment.borrow().get(name)?;
                Ok(value)
            }

            Expr::Assign { name, value } => {
                let value = self.evaluate(value).await?;
                self.environment.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }

            Expr::Unary { op, expr: operand } => {
                let value = self.evaluate(operand).await?;
                Ok(unary(*op, value)?)
            }

            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left).await?;
                let right = self.evaluate(right).await?;
                Ok(binary(*op, left, right)?)
            }

            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left).await?;
                let decided = match op {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right).await
                }
            }

            Expr::Call { callee, args } => {
                let Value::Callable(function) = self.evaluate(callee).await? else {
                    return Err(RuntimeError::not_callable(&callee.node.describe()).into());
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg).await?);
                }
                self.call(function, values, expr.span).await
            }

            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item).await?);
                }
                Ok(Value::array(values))
            }

            Expr::Index { target, index } => {
                let target = self.evaluate(target).await?;
                let index = self.evaluate(index).await?;
                Ok(index_value(&target, &index)?)
            }
        }
    }

    async fn call(&mut self, function: Callable, args: Vec<Value>, span: Span) -> Exec<Value> {
        if args.len() != function.arity() {
            return Err(
                RuntimeError::arity_mismatch(function.name(), function.arity(), args.len()).into(),
            );
        }
        trace!(function = function.name(), line = span.line, "call");

        match function {
            Callable::Host(host) => {
                let turtle = Rc::clone(&self.turtle);
                let mut turtle = turtle.borrow_mut();
                Ok(host.invoke(self, &mut *turtle, &args)?)
            }
            Callable::User(user) => {
                if self.call_depth >= self.config.max_call_depth {
                    return Err(RuntimeError::stack_overflow(self.config.max_call_depth).into());
                }
                let env = child_env(&user.closure);
                for (param, arg) in user.decl.params.iter().zip(args) {
                    env.borrow_mut()
                        .define(&param.node, arg)
                        .map_err(|e| e.at(param.span))?;
                }

                self.call_depth += 1;
                let result = self.execute_block(&user.decl.body, env).await;
                self.call_depth -= 1;

                match result? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Null),
                }
            }
        }
    }
}

fn unary(op: UnOp, value: Value) -> InterpResult<Value> {
    match (op, value) {
        (UnOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnOp::Neg, other) => Err(RuntimeError::type_error(format!(
            "Operand of '-' must be a number, got {}.",
            other.type_name()
        ))),
        (UnOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
    }
}

fn binary(op: BinOp, left: Value, right: Value) -> InterpResult<Value> {
    use Value::{Bool, Number, Str};

    match (op, &left, &right) {
        (BinOp::Eq, _, _) => Ok(Bool(left == right)),
        (BinOp::Ne, _, _) => Ok(Bool(left != right)),

        (BinOp::Add, Number(a), Number(b)) => Ok(Number(a + b)),
        (BinOp::Add, Str(a), Str(b)) => Ok(Value::string(&format!("{a}{b}"))),
        (BinOp::Add, _, _) => Err(RuntimeError::type_error(format!(
            "Operands of '+' must be two numbers or two strings, got {} and {}.",
            left.type_name(),
            right.type_name()
        ))),

        (BinOp::Sub, Number(a), Number(b)) => Ok(Number(a - b)),
        (BinOp::Mul, Number(a), Number(b)) => Ok(Number(a * b)),
        (BinOp::Div, Number(a), Number(b)) => Ok(Number(a / b)),
        (BinOp::Lt, Number(a), Number(b)) => Ok(Bool(a < b)),
        (BinOp::Gt, Number(a), Number(b)) => Ok(Bool(a > b)),
        (BinOp::Le, Number(a), Number(b)) => Ok(Bool(a <= b)),
        (BinOp::Ge, Number(a), Number(b)) => Ok(Bool(a >= b)),

        _ => Err(RuntimeError::type_error(format!(
            "Operands of '{op}' must be numbers, got {} and {}.",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Integer index from a number value
pub(crate) fn integer_index(index: &Value) -> InterpResult<i64> {
    match index {
        Value::Number(n) if n.fract() == 0.0 => Ok(*n as i64),
        _ => Err(RuntimeError::type_error("Indexes must be integer numbers.")),
    }
}

fn index_value(target: &Value, index: &Value) -> InterpResult<Value> {
    match target {
        Value::Str(s) => {
            let position = integer_index(index)?;
            let len = s.chars().count();
            resolve_index(position, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::string(&c.to_string()))
                .ok_or_else(|| RuntimeError::index_out_of_range("String", position, len))
        }
        Value::Array(array) => {
            let position = integer_index(index)?;
            array.borrow().get(position)
        }
        other => Err(RuntimeError::not_indexable(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::{ErrorCategory, ErrorKind};

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(binary(BinOp::Add, num(1.0), num(2.0)).unwrap(), num(3.0));
        assert_eq!(binary(BinOp::Sub, num(1.0), num(2.0)).unwrap(), num(-1.0));
        assert_eq!(binary(BinOp::Mul, num(3.0), num(2.0)).unwrap(), num(6.0));
        assert_eq!(binary(BinOp::Div, num(1.0), num(4.0)).unwrap(), num(0.25));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let value = binary(BinOp::Div, num(1.0), num(0.0)).unwrap();
        assert_eq!(value.as_number(), Some(f64::INFINITY));
    }

    #[test]
    fn test_string_concatenation() {
        let value = binary(BinOp::Add, Value::string("ab"), Value::string("c")).unwrap();
        assert_eq!(value, Value::string("abc"));
    }

    #[test]
    fn test_mixed_addition_is_type_error() {
        let err = binary(BinOp::Add, Value::string("a"), num(1.0)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert_eq!(
            err.message,
            "Operands of '+' must be two numbers or two strings, got string and number."
        );
    }

    #[test]
    fn test_comparison_requires_numbers() {
        assert_eq!(binary(BinOp::Le, num(2.0), num(2.0)).unwrap(), Value::Bool(true));
        let err = binary(BinOp::Lt, Value::string("a"), Value::string("b")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn test_equality_across_types() {
        assert_eq!(binary(BinOp::Eq, num(1.0), Value::Null).unwrap(), Value::Bool(false));
        assert_eq!(binary(BinOp::Ne, Value::Null, Value::Null).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnOp::Neg, num(2.0)).unwrap(), num(-2.0));
        assert_eq!(unary(UnOp::Not, num(0.0)).unwrap(), Value::Bool(true));
        assert_eq!(unary(UnOp::Not, Value::string("")).unwrap(), Value::Bool(false));
        assert!(unary(UnOp::Neg, Value::Bool(true)).is_err());
    }

    #[test]
    fn test_string_indexing() {
        let s = Value::string("héllo");
        assert_eq!(index_value(&s, &num(1.0)).unwrap(), Value::string("é"));
        assert_eq!(index_value(&s, &num(-1.0)).unwrap(), Value::string("o"));
        let err = index_value(&s, &num(5.0)).unwrap_err();
        assert_eq!(err.message, "String index 5 out of range for length 5.");
    }

    #[test]
    fn test_index_must_be_integer() {
        let array = Value::array(vec![num(1.0)]);
        let err = index_value(&array, &num(0.5)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        let err = index_value(&array, &Value::string("0")).unwrap_err();
        assert_eq!(err.message, "Indexes must be integer numbers.");
    }

    #[test]
    fn test_only_strings_and_arrays_index() {
        let err = index_value(&num(3.0), &num(0.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotIndexable);
        assert_eq!(err.category(), ErrorCategory::Runtime);
    }
}
