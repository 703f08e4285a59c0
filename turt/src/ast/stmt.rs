//! Statement AST nodes

use super::{Expr, Spanned};
use serde::Serialize;
use std::rc::Rc;

/// Statement
#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    /// Block: { stmt1 stmt2 ... }
    Block(Vec<Spanned<Stmt>>),

    /// Expression evaluated for its side effects
    Expression(Spanned<Expr>),

    /// Function declaration. Shared so closures can keep the body alive.
    Function(Rc<FnDecl>),

    /// if (cond) then_branch [else else_branch]
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },

    /// return [value];
    Return(Option<Spanned<Expr>>),

    /// var name [= initializer];
    Var {
        name: Spanned<String>,
        initializer: Option<Spanned<Expr>>,
    },

    /// while (cond) body
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
}

/// Function declaration: function name(params) { body }
#[derive(Debug, Serialize)]
pub struct FnDecl {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Spanned<Stmt>>,
}

impl Stmt {
    /// Short label used in traces
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Block(_) => "block",
            Stmt::Expression(_) => "expression",
            Stmt::Function(_) => "function",
            Stmt::If { .. } => "if",
            Stmt::Return(_) => "return",
            Stmt::Var { .. } => "var",
            Stmt::While { .. } => "while",
        }
    }
}
