//! Tree-walking interpreter for TurtLang
//!
//! Executes a parsed [`Program`](crate::ast::Program) against a
//! [`Turtle`](crate::turtle::Turtle), suspending while the turtle glides.

mod array;
mod callable;
mod env;
mod error;
mod eval;
mod runtime;
mod task;
mod value;

pub use array::{resolve_index, Array, ArrayRef};
pub use callable::{Builtin, BuiltinFn, Callable, HostFunction, IntoBuiltinResult, UserFunction};
pub use env::{child_env, visible_variables, EnvRef, Environment, VariableView};
pub use error::{ErrorCategory, ErrorKind, InterpResult, RuntimeError};
pub use eval::{Interpreter, Outcome, Output};
pub(crate) use eval::integer_index;
pub use runtime::{DisplayBlock, RunState, Runtime};
pub use value::Value;
