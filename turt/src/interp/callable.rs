//! Callable values: host-provided builtins and user-declared functions

use super::env::EnvRef;
use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::value::Value;
use crate::ast::FnDecl;
use crate::turtle::Turtle;
use std::fmt;
use std::rc::Rc;

/// Type-erased builtin body. Receives exactly `arity` arguments.
pub type BuiltinFn = dyn Fn(&mut Interpreter, &mut dyn Turtle, &[Value]) -> InterpResult<Value>;

/// Conversion of a builtin's return type into an interpreter result
pub trait IntoBuiltinResult {
    fn into_builtin_result(self) -> InterpResult<Value>;
}

impl IntoBuiltinResult for Value {
    fn into_builtin_result(self) -> InterpResult<Value> {
        Ok(self)
    }
}

impl IntoBuiltinResult for () {
    fn into_builtin_result(self) -> InterpResult<Value> {
        Ok(Value::Null)
    }
}

impl IntoBuiltinResult for f64 {
    fn into_builtin_result(self) -> InterpResult<Value> {
        Ok(Value::Number(self))
    }
}

impl IntoBuiltinResult for bool {
    fn into_builtin_result(self) -> InterpResult<Value> {
        Ok(Value::Bool(self))
    }
}

impl<T: IntoBuiltinResult> IntoBuiltinResult for InterpResult<T> {
    fn into_builtin_result(self) -> InterpResult<Value> {
        self.and_then(IntoBuiltinResult::into_builtin_result)
    }
}

/// A Rust function usable as a builtin.
///
/// Implemented for functions taking the interpreter, the turtle and then
/// zero to four [`Value`] parameters. The program-visible arity is the
/// number of trailing `Value` parameters.
pub trait Builtin<Args>: 'static {
    const ARITY: usize;

    fn call(
        &self,
        interp: &mut Interpreter,
        turtle: &mut dyn Turtle,
        args: &[Value],
    ) -> InterpResult<Value>;
}

macro_rules! impl_builtin {
    (@value $arg:ident) => { Value };
    ($count:expr; $($arg:ident),*) => {
        impl<F, R> Builtin<($(impl_builtin!(@value $arg),)*)> for F
        where
            F: Fn(&mut Interpreter, &mut dyn Turtle $(, impl_builtin!(@value $arg))*) -> R
                + 'static,
            R: IntoBuiltinResult,
        {
            const ARITY: usize = $count;

            fn call(
                &self,
                interp: &mut Interpreter,
                turtle: &mut dyn Turtle,
                args: &[Value],
            ) -> InterpResult<Value> {
                match args {
                    [$($arg),*] => (self)(interp, turtle $(, $arg.clone())*).into_builtin_result(),
                    _ => Err(RuntimeError::arity_mismatch("builtin", $count, args.len())),
                }
            }
        }
    };
}

impl_builtin!(0;);
impl_builtin!(1; a);
impl_builtin!(2; a, b);
impl_builtin!(3; a, b, c);
impl_builtin!(4; a, b, c, d);

/// A function implemented by the host
pub struct HostFunction {
    name: String,
    arity: usize,
    body: Box<BuiltinFn>,
}

impl HostFunction {
    pub fn new<Args, F: Builtin<Args>>(name: &str, f: F) -> Self {
        HostFunction {
            name: name.to_string(),
            arity: F::ARITY,
            body: Box::new(
                move |interp: &mut Interpreter, turtle: &mut dyn Turtle, args: &[Value]| {
                    f.call(interp, turtle, args)
                },
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn invoke(
        &self,
        interp: &mut Interpreter,
        turtle: &mut dyn Turtle,
        args: &[Value],
    ) -> InterpResult<Value> {
        (self.body)(interp, turtle, args)
    }
}

/// A function declared by a program, with its captured environment
pub struct UserFunction {
    pub decl: Rc<FnDecl>,
    pub closure: EnvRef,
}

/// Anything that can be called
#[derive(Clone)]
pub enum Callable {
    Host(Rc<HostFunction>),
    User(Rc<UserFunction>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Host(f) => f.name(),
            Callable::User(f) => &f.decl.name.node,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Callable::Host(f) => f.arity(),
            Callable::User(f) => f.decl.params.len(),
        }
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Host(a), Callable::Host(b)) => Rc::ptr_eq(a, b),
            (Callable::User(a), Callable::User(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}/{}>", self.name(), self.arity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nothing(_: &mut Interpreter, _: &mut dyn Turtle) {}

    fn identity(_: &mut Interpreter, _: &mut dyn Turtle, value: Value) -> Value {
        value
    }

    fn sum3(
        _: &mut Interpreter,
        _: &mut dyn Turtle,
        a: Value,
        b: Value,
        c: Value,
    ) -> InterpResult<f64> {
        Ok([a, b, c].iter().filter_map(Value::as_number).sum())
    }

    #[test]
    fn test_arity_follows_value_parameters() {
        assert_eq!(HostFunction::new("nothing", nothing).arity(), 0);
        assert_eq!(HostFunction::new("identity", identity).arity(), 1);
        assert_eq!(HostFunction::new("sum3", sum3).arity(), 3);
    }

    #[test]
    fn test_host_functions_compare_by_identity() {
        let a = Callable::Host(Rc::new(HostFunction::new("identity", identity)));
        let b = Callable::Host(Rc::new(HostFunction::new("identity", identity)));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert_eq!(format!("{a:?}"), "<function identity/1>");
    }
}
