//! Builtin libraries installed into every program's global environment

mod draw;
mod standard;

pub use draw::drawing;
pub use standard::standard;

use crate::interp::{
    ArrayRef, Builtin, Callable, EnvRef, HostFunction, InterpResult, RuntimeError, Value,
};
use std::rc::Rc;
use tracing::trace;

/// A named table of builtin functions and constants
pub struct Library {
    name: &'static str,
    entries: Vec<(String, Value)>,
}

impl Library {
    pub fn new(name: &'static str) -> Self {
        Library {
            name,
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a function; its arity is the number of `Value` parameters it takes
    pub fn function<Args, F: Builtin<Args>>(mut self, name: &str, f: F) -> Self {
        let function = HostFunction::new(name, f);
        self.entries.push((
            name.to_string(),
            Value::Callable(Callable::Host(Rc::new(function))),
        ));
        self
    }

    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.entries.push((name.to_string(), value));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Bind every entry in `env` as a protected library name
    pub fn import(&self, env: &EnvRef) -> InterpResult<()> {
        let mut env = env.borrow_mut();
        for (name, value) in &self.entries {
            env.define_library(name, value.clone())?;
        }
        trace!(library = self.name, entries = self.entries.len(), "imported");
        Ok(())
    }
}

/// The array argument of an array builtin
fn expect_array<'a>(function: &str, value: &'a Value) -> InterpResult<&'a ArrayRef> {
    value
        .as_array()
        .ok_or_else(|| RuntimeError::invalid_argument(function, "requires an array."))
}

/// A numeric argument
fn expect_number(function: &str, value: &Value) -> InterpResult<f64> {
    value.as_number().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{function}() expects a number, got {}.",
            value.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Environment, ErrorKind};
    use std::collections::HashSet;

    #[test]
    fn test_library_names_are_disjoint() {
        let standard: HashSet<_> = standard().names().map(str::to_string).collect();
        let drawing: HashSet<_> = drawing().names().map(str::to_string).collect();
        assert!(standard.is_disjoint(&drawing));
        assert!(standard.contains("print"));
        assert!(drawing.contains("forward"));
    }

    #[test]
    fn test_import_protects_names() {
        let globals = Environment::new().into_ref();
        standard().import(&globals).unwrap();
        let err = globals
            .borrow_mut()
            .assign("print", Value::Null)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProtectedName);

        // importing twice collides
        assert!(standard().import(&globals).is_err());
    }

    #[test]
    fn test_imported_arity() {
        let globals = Environment::new().into_ref();
        drawing().import(&globals).unwrap();
        let Value::Callable(set_pos) = globals.borrow().get("setPos").unwrap() else {
            panic!("setPos should be callable");
        };
        assert_eq!(set_pos.arity(), 2);
    }
}
