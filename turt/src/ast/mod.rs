//! Abstract Syntax Tree definitions

mod expr;
mod span;
mod stmt;

pub use expr::*;
pub use span::*;
pub use stmt::*;

use serde::Serialize;

/// A program is a sequence of top-level statements
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub statements: Vec<Spanned<Stmt>>,
}
