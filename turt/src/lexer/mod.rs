//! Lexer implementation using logos

mod token;

pub use token::{Token, TokenKind, TokenLiteral};

use crate::ast::Span;
use crate::error::CompileError;
use logos::Logos;

/// Output of a scan: every token that could be recognized plus every scan error.
/// The token list always ends with an `Eof` token.
#[derive(Debug, Clone)]
pub struct Scan {
    pub tokens: Vec<Token>,
    pub errors: Vec<CompileError>,
}

impl Scan {
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Maps byte offsets to 1-based line numbers
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

/// Scan source text, continuing past errors so every one of them is reported
pub fn scan(source: &str) -> Scan {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end, lines.line_of(range.start));
        let slice = lexer.slice();
        match result {
            Ok(TokenKind::Number) => match slice.parse::<f64>() {
                Ok(n) => tokens.push(Token::new(
                    TokenKind::Number,
                    slice,
                    Some(TokenLiteral::Number(n)),
                    span,
                )),
                Err(_) => {
                    errors.push(CompileError::lexer(format!("Invalid number '{slice}'."), span))
                }
            },
            Ok(TokenKind::Str) => {
                if slice.len() < 2 || !slice.ends_with('"') {
                    errors.push(CompileError::lexer("Unterminated string.", span));
                    continue;
                }
                let contents = &slice[1..slice.len() - 1];
                tokens.push(Token::new(
                    TokenKind::Str,
                    slice,
                    Some(TokenLiteral::Str(contents.to_string())),
                    span,
                ));
            }
            Ok(kind) => tokens.push(Token::new(kind, slice, None, span)),
            Err(()) => {
                errors.push(CompileError::lexer(
                    format!("Unexpected character '{slice}'."),
                    span,
                ));
            }
        }
    }

    let end = source.len();
    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        None,
        Span::point(end, lines.line_of(end)),
    ));

    Scan { tokens, errors }
}

/// Tokenize source code, failing with every scan error found
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let scan = scan(source);
    if scan.had_error() {
        Err(scan.errors)
    } else {
        Ok(scan.tokens)
    }
}
