//! Runtime errors for the interpreter

use crate::ast::Span;
use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Location of the statement or expression that failed, once known
    pub span: Option<Span>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Undefined variable (lookup or assignment)
    UndefinedVariable,
    /// Name defined twice in one scope
    Redefinition,
    /// Write to a library-protected name
    ProtectedName,
    /// Argument count mismatch
    ArityMismatch,
    /// Calling something that is not a function
    NotCallable,
    /// Indexing something that is neither a string nor an array
    NotIndexable,
    /// A library function rejected its arguments
    InvalidArgument,
    /// Too many nested calls
    StackOverflow,
    /// Operand type mismatch
    TypeError,
    /// Index out of range
    IndexOutOfRange,
    /// Loop exceeded the configured iteration limit
    InfiniteLoop,
}

/// The user-facing error taxonomy a kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Runtime,
    Type,
    Range,
    InfiniteLoop,
}

impl ErrorKind {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::TypeError => ErrorCategory::Type,
            ErrorKind::IndexOutOfRange => ErrorCategory::Range,
            ErrorKind::InfiniteLoop => ErrorCategory::InfiniteLoop,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Runtime => write!(f, "Runtime error"),
            ErrorCategory::Type => write!(f, "Type error"),
            ErrorCategory::Range => write!(f, "Range error"),
            ErrorCategory::InfiniteLoop => write!(f, "Infinite loop error"),
        }
    }
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("Undefined variable '{name}'."))
    }

    pub fn redefinition(name: &str) -> Self {
        Self::new(
            ErrorKind::Redefinition,
            format!("Variable '{name}' is already defined in this scope."),
        )
    }

    pub fn protected_name(name: &str) -> Self {
        Self::new(
            ErrorKind::ProtectedName,
            format!("'{name}' is a library name and cannot be redefined or assigned."),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!(
                "Incorrect number of arguments for function '{name}' \
                 (expected {expected}, received {got})."
            ),
        )
    }

    pub fn not_callable(name: &str) -> Self {
        Self::new(ErrorKind::NotCallable, format!("'{name}' is not a function."))
    }

    pub fn not_indexable(type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotIndexable,
            format!("Only strings and arrays can be indexed, got {type_name}."),
        )
    }

    pub fn invalid_argument(function: &str, message: &str) -> Self {
        Self::new(ErrorKind::InvalidArgument, format!("{function}() {message}"))
    }

    pub fn stack_overflow(depth: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("Stack overflow: more than {depth} nested function calls."),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message.into())
    }

    pub fn index_out_of_range(what: &str, index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfRange,
            format!("{what} index {index} out of range for length {len}."),
        )
    }

    pub fn infinite_loop(limit: usize) -> Self {
        Self::new(
            ErrorKind::InfiniteLoop,
            format!("Loop exceeded the maximum of {limit} iterations."),
        )
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn line(&self) -> Option<usize> {
        self.span.map(|span| span.line)
    }

    /// Attach a location unless a more precise one is already set
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "{} (line {line}): {}", self.category(), self.message),
            None => write!(f, "{}: {}", self.category(), self.message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
