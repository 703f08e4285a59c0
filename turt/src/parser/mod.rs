//! Recursive-descent parser with statement-level error recovery

use crate::ast::{BinOp, Expr, FnDecl, Literal, LogicalOp, Program, Span, Spanned, Stmt, UnOp};
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind, TokenLiteral};
use std::rc::Rc;

#[cfg(test)]
mod tests;

/// Stack growth parameters for deeply nested expressions
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Deepest statement or expression nesting accepted. Bounds the depth of
/// every tree the parser builds, and so of everything that later walks or
/// drops it.
pub const MAX_NESTING: usize = 256;

/// Marker returned once an error has been recorded; the caller decides where to resynchronize
#[derive(Debug)]
struct Abort;

type ParseResult<T> = std::result::Result<T, Abort>;

/// Parse tokens into a program, collecting every error found in one pass
pub fn parse(tokens: Vec<Token>) -> Result<Program, Vec<CompileError>> {
    Parser::new(tokens).parse()
}

/// Converts a token sequence (terminated by `Eof`) into statements
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<CompileError>,
    /// Current nesting of statements and expressions
    depth: usize,
    /// Set once `MAX_NESTING` is exceeded; parsing stops without recovery
    too_deep: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span).unwrap_or_default();
            let line = end.line.max(1);
            tokens.push(Token::new(TokenKind::Eof, "", None, Span::point(end.end, line)));
        }
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
            depth: 0,
            too_deep: false,
        }
    }

    /// Whether any parse error has been recorded so far
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        let mut statements = Vec::new();
        while !self.at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(Abort) if self.too_deep => break,
                Err(Abort) => self.synchronize(),
            }
        }

        if self.had_error() {
            Err(self.errors)
        } else {
            Ok(Program { statements })
        }
    }

    // ---- token helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.at_end() && self.peek().kind == kind
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error_at_current(message))
    }

    fn error_at_current(&mut self, message: &str) -> Abort {
        let token = self.peek().clone();
        self.error_at(&token, message)
    }

    fn error_at(&mut self, token: &Token, message: &str) -> Abort {
        let lexeme = if token.kind == TokenKind::Eof { "" } else { token.lexeme.as_str() };
        self.errors.push(CompileError::parser(message, lexeme, token.span));
        Abort
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous().span)
    }

    /// Run `parse` one nesting level deeper, on a grown stack if needed
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let depth = self.depth;
        self.deepen()?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || parse(self));
        self.depth = depth;
        result
    }

    /// One more level; left-associative loops call this per node they fold
    fn deepen(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            self.too_deep = true;
            return Err(self.error_at_current("Too much nesting."));
        }
        self.depth += 1;
        Ok(())
    }

    /// Discard tokens until the next statement boundary
    fn synchronize(&mut self) {
        self.advance();
        while !self.at_end() {
            if self.previous().kind == TokenKind::Semi {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // ---- declarations and statements ----

    fn declaration(&mut self) -> ParseResult<Spanned<Stmt>> {
        self.nested(Self::declaration_inner)
    }

    fn declaration_inner(&mut self) -> ParseResult<Spanned<Stmt>> {
        if self.matches(&[TokenKind::Function]) {
            return self.function_declaration();
        }
        if self.matches(&[TokenKind::Var]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn function_declaration(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        let name = self.consume(TokenKind::Ident, "Expected function name.")?;
        self.consume(TokenKind::LParen, "Expected '(' after function name.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param = self.consume(TokenKind::Ident, "Expected parameter name.")?;
                params.push(Spanned::new(param.lexeme, param.span));
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "Expected ')' after parameters.")?;
        self.consume(TokenKind::LBrace, "Expected '{' before function body.")?;
        let body = self.block()?;

        let decl = FnDecl {
            name: Spanned::new(name.lexeme, name.span),
            params,
            body,
        };
        Ok(Spanned::new(Stmt::Function(Rc::new(decl)), self.span_from(start)))
    }

    fn var_declaration(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        let name = self.consume(TokenKind::Ident, "Expected variable name.")?;
        let initializer = if self.matches(&[TokenKind::Eq]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semi, "Expected ';' after variable declaration.")?;

        let stmt = Stmt::Var {
            name: Spanned::new(name.lexeme, name.span),
            initializer,
        };
        Ok(Spanned::new(stmt, self.span_from(start)))
    }

    fn statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::LBrace]) {
            let start = self.previous().span;
            let statements = self.block()?;
            return Ok(Spanned::new(Stmt::Block(statements), self.span_from(start)));
        }
        self.expression_statement()
    }

    /// Parses the statements of a block after its opening brace, through the closing brace
    fn block(&mut self) -> ParseResult<Vec<Spanned<Stmt>>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(Abort) if self.too_deep => return Err(Abort),
                Err(Abort) => self.synchronize(),
            }
        }
        self.consume(TokenKind::RBrace, "Expected '}' after block.")?;
        Ok(statements)
    }

    /// for (init; cond; incr) body  =>  { init; while (cond) { body; incr; } }
    fn for_statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        self.consume(TokenKind::LParen, "Expected '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semi]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let cond = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        let semi = self.consume(TokenKind::Semi, "Expected ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RParen, "Expected ')' after for clauses.")?;

        let mut body = self.nested(Self::statement)?;
        let span = self.span_from(start);

        if let Some(increment) = increment {
            let incr_span = increment.span;
            body = Spanned::new(
                Stmt::Block(vec![body, Spanned::new(Stmt::Expression(increment), incr_span)]),
                span,
            );
        }

        let cond =
            cond.unwrap_or_else(|| Spanned::new(Expr::Literal(Literal::Bool(true)), semi.span));
        let mut stmt = Spanned::new(
            Stmt::While {
                cond,
                body: Box::new(body),
            },
            span,
        );

        if let Some(initializer) = initializer {
            stmt = Spanned::new(Stmt::Block(vec![initializer, stmt]), span);
        }
        Ok(stmt)
    }

    fn if_statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        self.consume(TokenKind::LParen, "Expected '(' after 'if'.")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after if condition.")?;

        let then_branch = Box::new(self.nested(Self::statement)?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.nested(Self::statement)?))
        } else {
            None
        };

        let stmt = Stmt::If {
            cond,
            then_branch,
            else_branch,
        };
        Ok(Spanned::new(stmt, self.span_from(start)))
    }

    fn return_statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        let value = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semi, "Expected ';' after return value.")?;
        Ok(Spanned::new(Stmt::Return(value), self.span_from(start)))
    }

    fn while_statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.previous().span;
        self.consume(TokenKind::LParen, "Expected '(' after 'while'.")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after condition.")?;
        let body = Box::new(self.nested(Self::statement)?);
        Ok(Spanned::new(Stmt::While { cond, body }, self.span_from(start)))
    }

    fn expression_statement(&mut self) -> ParseResult<Spanned<Stmt>> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semi, "Expected ';' after expression.")?;
        let span = expr.span.to(self.previous().span);
        Ok(Spanned::new(Stmt::Expression(expr), span))
    }

    // ---- expressions, lowest precedence first ----

    fn expression(&mut self) -> ParseResult<Spanned<Expr>> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Spanned<Expr>> {
        let expr = self.logical()?;

        if self.matches(&[TokenKind::Eq]) {
            let equals = self.previous().clone();
            let value = self.nested(Self::assignment)?;
            let span = expr.span.to(value.span);

            if let Expr::Var(name) = expr.node {
                return Ok(Spanned::new(
                    Expr::Assign {
                        name,
                        value: Box::new(value),
                    },
                    span,
                ));
            }
            // Reported, but the surrounding statement still parses
            self.error_at(&equals, "Invalid assignment target.");
            return Ok(expr);
        }

        Ok(expr)
    }

    /// `and` and `or` share one left-associative precedence level
    fn logical(&mut self) -> ParseResult<Spanned<Expr>> {
        let depth = self.depth;
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And, TokenKind::Or]) {
            self.deepen()?;
            let op = match self.previous().kind {
                TokenKind::And => LogicalOp::And,
                _ => LogicalOp::Or,
            };
            let right = self.equality()?;
            let span = expr.span.to(right.span);
            expr = Spanned::new(
                Expr::Logical {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.depth = depth;
        Ok(expr)
    }

    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinOp)],
        operand: fn(&mut Self) -> ParseResult<Spanned<Expr>>,
    ) -> ParseResult<Spanned<Expr>> {
        let depth = self.depth;
        let mut expr = operand(self)?;
        loop {
            let Some(&(_, op)) = operators.iter().find(|(kind, _)| self.check(*kind)) else {
                break;
            };
            self.deepen()?;
            self.advance();
            let right = operand(self)?;
            let span = expr.span.to(right.span);
            expr = Spanned::new(
                Expr::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        self.depth = depth;
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Spanned<Expr>> {
        self.binary_level(
            &[(TokenKind::EqEq, BinOp::Eq), (TokenKind::BangEq, BinOp::Ne)],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Spanned<Expr>> {
        self.binary_level(
            &[
                (TokenKind::Lt, BinOp::Lt),
                (TokenKind::LtEq, BinOp::Le),
                (TokenKind::Gt, BinOp::Gt),
                (TokenKind::GtEq, BinOp::Ge),
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Spanned<Expr>> {
        self.binary_level(
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult<Spanned<Expr>> {
        self.binary_level(
            &[(TokenKind::Star, BinOp::Mul), (TokenKind::Slash, BinOp::Div)],
            Self::unary,
        )
    }

    fn unary(&mut self) -> ParseResult<Spanned<Expr>> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let op = match operator.kind {
                TokenKind::Bang => UnOp::Not,
                _ => UnOp::Neg,
            };
            let operand = self.nested(Self::unary)?;
            let span = operator.span.to(operand.span);
            return Ok(Spanned::new(
                Expr::Unary {
                    op,
                    expr: Box::new(operand),
                },
                span,
            ));
        }
        self.call()
    }

    /// Postfix calls and indexing, chainable: f(a)(b), grid[i][j], f(x)[0]
    fn call(&mut self) -> ParseResult<Spanned<Expr>> {
        let depth = self.depth;
        let mut expr = self.primary()?;
        loop {
            if self.check(TokenKind::LParen) || self.check(TokenKind::LBracket) {
                self.deepen()?;
            }
            if self.matches(&[TokenKind::LParen]) {
                let args = self.arguments(TokenKind::RParen, "Expected ')' after arguments.")?;
                let span = self.span_from(expr.span);
                expr = Spanned::new(
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.matches(&[TokenKind::LBracket]) {
                let index = self.expression()?;
                self.consume(TokenKind::RBracket, "Expected ']' after index.")?;
                let span = self.span_from(expr.span);
                expr = Spanned::new(
                    Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else {
                break;
            }
        }
        self.depth = depth;
        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`
    fn arguments(&mut self, close: TokenKind, message: &str) -> ParseResult<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        if !self.check(close) {
            loop {
                items.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(close, message)?;
        Ok(items)
    }

    fn primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let token = self.peek().clone();
        let node = match token.kind {
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::Null => Expr::Literal(Literal::Null),
            TokenKind::Number | TokenKind::Str => match token.literal {
                Some(TokenLiteral::Number(n)) => Expr::Literal(Literal::Number(n)),
                Some(TokenLiteral::Str(ref s)) => Expr::Literal(Literal::Str(s.clone())),
                None => return Err(self.error_at(&token, "Malformed literal.")),
            },
            TokenKind::Ident => Expr::Var(token.lexeme.clone()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RParen, "Expected ')' after expression.")?;
                return Ok(Spanned::new(
                    Expr::Grouping(Box::new(inner)),
                    self.span_from(token.span),
                ));
            }
            TokenKind::LBracket => {
                self.advance();
                let items =
                    self.arguments(TokenKind::RBracket, "Expected ']' after array elements.")?;
                return Ok(Spanned::new(Expr::Array(items), self.span_from(token.span)));
            }
            _ => return Err(self.error_at(&token, "Expected an expression.")),
        };
        self.advance();
        Ok(Spanned::new(node, token.span))
    }
}
