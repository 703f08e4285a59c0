//! TurtLang
//!
//! A small dynamically typed scripting language for driving a drawing
//! turtle, with a tree-walking interpreter that pauses while the turtle
//! animates.

pub mod ast;
pub mod config;
pub mod error;
pub mod host;
pub mod interp;
pub mod lexer;
pub mod library;
pub mod parser;
pub mod repl;
pub mod turtle;

pub use ast::{Program, Span};
pub use config::Config;
pub use error::{CompileError, Result};
pub use interp::{Outcome, RunState, Runtime, RuntimeError, Value};

/// Scan and parse `source`.
///
/// Parsing runs even when scanning reported errors, so one pass reports
/// every problem it can find. Errors come back in source order.
pub fn compile_source(source: &str) -> std::result::Result<Program, Vec<CompileError>> {
    let scan = lexer::scan(source);
    let mut errors = scan.errors;
    let parsed = parser::parse(scan.tokens);
    match parsed {
        Ok(program) if errors.is_empty() => Ok(program),
        Ok(_) => Err(errors),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            errors.sort_by_key(|e| e.span().map(|s| s.start));
            Err(errors)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::Config;
    use crate::interp::{Outcome, RunState, Runtime, RuntimeError};
    use crate::turtle::{Sprite, TurtleRef};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Run to completion with an instant turtle; returns the sprite and output
    pub fn run_outcome(source: &str) -> (Rc<RefCell<Sprite>>, Vec<String>, Outcome) {
        let config = Config {
            turtle_speed: 0.0,
            ..Config::default()
        };
        let sprite = Rc::new(RefCell::new(Sprite::new(&config)));
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let turtle: TurtleRef = sprite.clone();
        let mut runtime = Runtime::new(config, turtle)
            .with_output(move |line| sink.borrow_mut().push(line.to_string()));
        assert!(runtime.compile(source), "compile failed: {:?}", runtime.diagnostics());
        assert_eq!(runtime.run(), RunState::Finished);
        let outcome = runtime.outcome().cloned().unwrap_or(Outcome::Completed);
        drop(runtime);
        let output = lines.borrow().clone();
        (sprite, output, outcome)
    }

    pub fn run_with_sprite(source: &str) -> (Rc<RefCell<Sprite>>, Vec<String>) {
        let (sprite, output, outcome) = run_outcome(source);
        assert_eq!(outcome, Outcome::Completed);
        (sprite, output)
    }

    pub fn run(source: &str) -> Vec<String> {
        run_with_sprite(source).1
    }

    pub fn run_err(source: &str) -> RuntimeError {
        match run_outcome(source).2 {
            Outcome::Failed(err) => err,
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_source_merges_scan_and_parse_errors() {
        let errors = compile_source("var a = @;\nvar = 2;").unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message()).collect();
        assert_eq!(
            messages,
            vec![
                "Unexpected character '@'.",
                "Expected an expression.",
                "Expected variable name."
            ]
        );
    }

    #[test]
    fn test_scan_errors_alone_fail_compilation() {
        let errors = compile_source("print(1); $").unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
