//! Environment for variable bindings

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// A single name binding
#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    /// Installed by a library; cannot be redefined or assigned by programs
    library: bool,
}

/// Environment holding variable bindings
#[derive(Debug, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Binding>,
    /// Parent environment for lexical scoping
    parent: Option<EnvRef>,
    /// Global environment; `None` when this is the global environment
    globals: Option<EnvRef>,
}

/// One visible variable in a snapshot of the scope chain
#[derive(Debug, Clone, PartialEq)]
pub struct VariableView {
    pub name: String,
    pub value: Value,
    /// Number of scopes between this binding and the innermost scope
    pub depth: usize,
    /// Whether this binding hides one of the same name further out
    pub shadows: bool,
}

impl Environment {
    /// Create a new global environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new environment with a parent
    pub fn with_parent(parent: EnvRef) -> Self {
        let globals = parent
            .borrow()
            .globals
            .clone()
            .unwrap_or_else(|| Rc::clone(&parent));
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
            globals: Some(globals),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Whether `name` is bound by a library in the global environment
    pub fn is_protected(&self, name: &str) -> bool {
        match &self.globals {
            Some(globals) => globals.borrow().is_protected(name),
            None => self.bindings.get(name).is_some_and(|b| b.library),
        }
    }

    /// Define a new variable in the current scope
    pub fn define(&mut self, name: &str, value: Value) -> InterpResult<()> {
        self.insert(name, value, false)
    }

    /// Define a library-protected name
    pub fn define_library(&mut self, name: &str, value: Value) -> InterpResult<()> {
        self.insert(name, value, true)
    }

    fn insert(&mut self, name: &str, value: Value, library: bool) -> InterpResult<()> {
        if self.is_protected(name) {
            return Err(RuntimeError::protected_name(name));
        }
        if self.bindings.contains_key(name) {
            return Err(RuntimeError::redefinition(name));
        }
        self.bindings.insert(name.to_string(), Binding { value, library });
        Ok(())
    }

    /// Look up a variable in the scope chain
    pub fn get(&self, name: &str) -> InterpResult<Value> {
        if let Some(binding) = self.bindings.get(name) {
            Ok(binding.value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Update the nearest binding of `name` in the scope chain
    pub fn assign(&mut self, name: &str, value: Value) -> InterpResult<()> {
        if let Some(binding) = self.bindings.get_mut(name) {
            if binding.library {
                return Err(RuntimeError::protected_name(name));
            }
            binding.value = value;
            Ok(())
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Check if a variable exists in this scope only
    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn parent(&self) -> Option<&EnvRef> {
        self.parent.as_ref()
    }

    /// Drop every binding; breaks reference cycles through closures
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}

/// Visible program variables from `env` outward, innermost first.
///
/// Library bindings are left out. A name hidden by an inner binding is not
/// listed again; the inner one is flagged as shadowing.
pub fn visible_variables(env: &EnvRef) -> Vec<VariableView> {
    let mut frames = vec![Rc::clone(env)];
    loop {
        let parent = frames[frames.len() - 1].borrow().parent.clone();
        match parent {
            Some(parent) => frames.push(parent),
            None => break,
        }
    }

    let mut seen = HashSet::new();
    let mut views = Vec::new();
    for (depth, frame) in frames.iter().enumerate() {
        let frame = frame.borrow();
        let mut names: Vec<_> = frame
            .bindings
            .iter()
            .filter(|(_, b)| !b.library)
            .map(|(name, b)| (name.clone(), b.value.clone()))
            .collect();
        names.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in names {
            if !seen.insert(name.clone()) {
                continue;
            }
            let shadows = frames[depth + 1..]
                .iter()
                .any(|outer| outer.borrow().contains_local(&name));
            views.push(VariableView {
                name,
                value,
                depth,
                shadows,
            });
        }
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", num(42.0)).unwrap();
        assert_eq!(env.get("x").unwrap(), num(42.0));
        assert_eq!(env.get("y").unwrap_err().kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn test_scope_chain() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().define("x", num(1.0)).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().define("y", num(2.0)).unwrap();

        // Child can see parent's bindings
        assert_eq!(child.borrow().get("x").unwrap(), num(1.0));
        assert_eq!(child.borrow().get("y").unwrap(), num(2.0));

        // Parent cannot see child's bindings
        assert!(parent.borrow().get("y").is_err());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().define("x", num(1.0)).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().define("x", num(2.0)).unwrap();

        assert_eq!(child.borrow().get("x").unwrap(), num(2.0));
        assert_eq!(parent.borrow().get("x").unwrap(), num(1.0));
    }

    #[test]
    fn test_redefinition_in_same_scope() {
        let mut env = Environment::new();
        env.define("x", num(1.0)).unwrap();
        let err = env.define("x", num(2.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redefinition);
        assert_eq!(env.get("x").unwrap(), num(1.0));
    }

    #[test]
    fn test_assign_in_parent_scope() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().define("x", num(1.0)).unwrap();

        let child = child_env(&parent);
        child.borrow_mut().assign("x", num(99.0)).unwrap();
        assert_eq!(parent.borrow().get("x").unwrap(), num(99.0));
    }

    #[test]
    fn test_assign_undefined() {
        let mut env = Environment::new();
        let err = env.assign("x", num(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn test_library_names_are_protected_everywhere() {
        let globals = Environment::new().into_ref();
        globals
            .borrow_mut()
            .define_library("print", Value::Null)
            .unwrap();

        let err = globals.borrow_mut().assign("print", num(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProtectedName);

        let inner = child_env(&child_env(&globals));
        let err = inner.borrow_mut().define("print", num(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProtectedName);
        let err = inner.borrow_mut().assign("print", num(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProtectedName);
    }

    #[test]
    fn test_visible_variables_marks_shadowing() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define_library("print", Value::Null).unwrap();
        globals.borrow_mut().define("a", num(1.0)).unwrap();
        globals.borrow_mut().define("b", num(2.0)).unwrap();
        let inner = child_env(&globals);
        inner.borrow_mut().define("a", num(10.0)).unwrap();

        let views = visible_variables(&inner);
        let summary: Vec<_> = views
            .iter()
            .map(|v| (v.name.as_str(), v.depth, v.shadows))
            .collect();
        assert_eq!(summary, vec![("a", 0, true), ("b", 1, false)]);
        assert_eq!(views[0].value, num(10.0));
    }
}
