//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compile error: anything found before a program starts running
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("[line {}] Error: {message}", .span.line)]
    Lexer { message: String, span: Span },

    /// `location` is either ` at 'lexeme'` or ` at end`
    #[error("[line {}] Error{location}: {message}", .span.line)]
    Parser {
        message: String,
        location: String,
        span: Span,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    /// Parse error pointing at a token. An empty lexeme means end of input.
    pub fn parser(message: impl Into<String>, lexeme: &str, span: Span) -> Self {
        let location = if lexeme.is_empty() {
            " at end".to_string()
        } else {
            format!(" at '{lexeme}'")
        };
        Self::Parser {
            message: message.into(),
            location,
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.span().map(|span| span.line)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } => message,
            Self::Parser { message, .. } => message,
            Self::Io { message } => message,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Scan",
            Self::Parser { .. } => "Parse",
            Self::Io { .. } => "IO",
        }
    }
}

/// Render a diagnostic with ariadne into a string
pub fn render_diagnostic(
    filename: &str,
    source: &str,
    title: &str,
    message: &str,
    span: Option<Span>,
    color: bool,
) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let config = ariadne::Config::default().with_color(color);
    let mut out = Vec::new();
    let written = match span {
        Some(span) => {
            let range = span.label_range(source.len());
            Report::build(ReportKind::Error, (filename, range.clone()))
                .with_config(config)
                .with_message(title)
                .with_label(
                    Label::new((filename, range))
                        .with_message(message)
                        .with_color(Color::Red),
                )
                .finish()
                .write((filename, Source::from(source)), &mut out)
        }
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_config(config)
            .with_message(format!("{title}: {message}"))
            .finish()
            .write((filename, Source::from(source)), &mut out),
    };
    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        // fall back to the plain one-liner if the report cannot be drawn
        Err(_) => format!("{title}: {message}\n"),
    }
}

/// Report a compile error on stderr
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    let title = match error.line() {
        Some(line) => format!("{} error on line {line}", error.kind()),
        None => format!("{} error", error.kind()),
    };
    eprint!(
        "{}",
        render_diagnostic(filename, source, &title, error.message(), error.span(), true)
    );
}

/// Report a runtime error on stderr, pointing at the failing code when known
pub fn report_runtime_error(filename: &str, source: &str, error: &RuntimeError) {
    let title = match error.line() {
        Some(line) => format!("{} on line {line}", error.category()),
        None => error.category().to_string(),
    };
    eprint!(
        "{}",
        render_diagnostic(filename, source, &title, &error.message, error.span, true)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_error_display_at_lexeme() {
        let err = CompileError::parser("Expected ';' after value.", "}", Span::new(4, 5, 2));
        assert_eq!(err.to_string(), "[line 2] Error at '}': Expected ';' after value.");
    }

    #[test]
    fn test_parser_error_display_at_end() {
        let err = CompileError::parser("Expected an expression.", "", Span::new(9, 9, 3));
        insta::assert_snapshot!(err.to_string(), @"[line 3] Error at end: Expected an expression.");
    }

    #[test]
    fn test_lexer_error_display() {
        let err = CompileError::lexer("Unexpected character '@'.", Span::new(0, 1, 1));
        assert_eq!(err.to_string(), "[line 1] Error: Unexpected character '@'.");
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_io_error_has_no_span() {
        let err = CompileError::io_error("missing.turt: not found");
        assert!(err.span().is_none());
        assert_eq!(err.message(), "missing.turt: not found");
    }

    #[test]
    fn test_render_diagnostic_contains_message() {
        let source = "var x = ;\n";
        let rendered = render_diagnostic(
            "test.turt",
            source,
            "Parse error on line 1",
            "Expected an expression.",
            Some(Span::new(8, 9, 1)),
            false,
        );
        assert!(rendered.contains("Parse error on line 1"));
        assert!(rendered.contains("Expected an expression."));
    }
}
