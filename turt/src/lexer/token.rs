//! Token definitions

use crate::ast::Span;
use logos::Logos;
use serde::Serialize;

/// Token kind, recognized by logos
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    // Keywords
    #[token("and")]
    And,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("function")]
    Function,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("null")]
    Null,
    #[token("or")]
    Or,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    /// The closing quote is optional so an unterminated string is still one token;
    /// the scanner reports it.
    #[regex(r#""[^"]*"?"#)]
    Str,
    #[regex(r"[A-Za-z][A-Za-z0-9]*")]
    Ident,

    // Two-character operators
    #[token("!=")]
    BangEq,
    #[token("==")]
    EqEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Single-character operators
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,

    /// End of input, appended by the scanner
    Eof,
}

impl TokenKind {
    /// Keywords that begin a declaration or statement; used for parser synchronization
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenKind::And => "and",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::Function => "function",
            TokenKind::For => "for",
            TokenKind::If => "if",
            TokenKind::Null => "null",
            TokenKind::Or => "or",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::Var => "var",
            TokenKind::While => "while",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Ident => "identifier",
            TokenKind::BangEq => "!=",
            TokenKind::EqEq => "==",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semi => ";",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// Literal payload carried by number and string tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenLiteral {
    Number(f64),
    Str(String),
}

/// A scanned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text
    pub lexeme: String,
    pub literal: Option<TokenLiteral>,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<TokenLiteral>,
        span: Span,
    ) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal,
            line: span.line,
            span,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(TokenLiteral::Number(n)) => write!(f, "{:?} {} {}", self.kind, self.lexeme, n),
            Some(TokenLiteral::Str(s)) => write!(f, "{:?} {} {}", self.kind, self.lexeme, s),
            None => write!(f, "{:?} {}", self.kind, self.lexeme),
        }
    }
}
