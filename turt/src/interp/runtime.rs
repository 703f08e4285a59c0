//! Host-facing driver for a loaded program.
//!
//! A run advances until it finishes or reaches a statement while the turtle
//! is gliding. In the latter case it is `Suspended`; the host keeps
//! animating the turtle and calls [`Runtime::resume`] once the glide is
//! over. Everything runs on the host's thread.

use super::env::{visible_variables, EnvRef, VariableView};
use super::error::{InterpResult, RuntimeError};
use super::eval::{Interpreter, Outcome, Output};
use super::task::poll_once;
use crate::ast::{Program, Span};
use crate::config::Config;
use crate::error::CompileError;
use crate::turtle::TurtleRef;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::Poll;
use tracing::{debug, warn};

/// Lifecycle of the loaded program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing compiled
    Idle,
    /// Compiled and loaded, not started
    Ready,
    /// Inside a poll of the run
    Running,
    /// Waiting for the turtle to finish gliding
    Suspended,
    /// Completed, failed or killed
    Finished,
}

/// The statement list currently executing and the position within it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBlock {
    /// Nesting depth; 0 is the program's top level
    pub depth: usize,
    pub index: usize,
    pub len: usize,
    /// Span of the statement at `index`
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy)]
struct BlockCursor {
    len: usize,
    index: usize,
    span: Option<Span>,
}

/// State shared between the host side and a run in progress
#[derive(Debug, Default)]
pub(crate) struct Monitor {
    pub(crate) kill_requested: bool,
    blocks: Vec<BlockCursor>,
    environment: Option<EnvRef>,
}

impl Monitor {
    pub(crate) fn enter_block(&mut self, len: usize) {
        self.blocks.push(BlockCursor {
            len,
            index: 0,
            span: None,
        });
    }

    pub(crate) fn exit_block(&mut self) {
        self.blocks.pop();
    }

    pub(crate) fn at_statement(&mut self, index: usize, span: Span) {
        if let Some(cursor) = self.blocks.last_mut() {
            cursor.index = index;
            cursor.span = Some(span);
        }
    }

    pub(crate) fn set_environment(&mut self, env: EnvRef) {
        self.environment = Some(env);
    }

    fn display_block(&self) -> Option<DisplayBlock> {
        let cursor = self.blocks.last()?;
        Some(DisplayBlock {
            depth: self.blocks.len() - 1,
            index: cursor.index,
            len: cursor.len,
            span: cursor.span,
        })
    }
}

type Task = Pin<Box<dyn Future<Output = (Interpreter, Outcome)>>>;

/// Compiles programs and drives their execution
pub struct Runtime {
    config: Config,
    turtle: TurtleRef,
    output: Output,
    monitor: Rc<RefCell<Monitor>>,
    program: Option<Rc<Program>>,
    diagnostics: Vec<CompileError>,
    /// Interpreter between runs; moved into `task` while one is in progress
    interpreter: Option<Interpreter>,
    task: Option<Task>,
    state: RunState,
    outcome: Option<Outcome>,
}

impl Runtime {
    /// Program output goes to stdout unless replaced with [`Runtime::with_output`]
    pub fn new(config: Config, turtle: TurtleRef) -> Self {
        Runtime {
            config,
            turtle,
            output: Rc::new(|line: &str| println!("{line}")),
            monitor: Rc::new(RefCell::new(Monitor::default())),
            program: None,
            diagnostics: Vec::new(),
            interpreter: None,
            task: None,
            state: RunState::Idle,
            outcome: None,
        }
    }

    pub fn with_output(mut self, output: impl Fn(&str) + 'static) -> Self {
        self.output = Rc::new(output);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile `source` and load it, replacing any previous program.
    ///
    /// Returns false if there were scan or parse errors (see
    /// [`Runtime::diagnostics`]); nothing is loaded in that case.
    pub fn compile(&mut self, source: &str) -> bool {
        self.unload();
        match crate::compile_source(source) {
            Ok(program) => {
                debug!(statements = program.statements.len(), "compiled");
                self.program = Some(Rc::new(program));
                self.load().is_ok()
            }
            Err(errors) => {
                debug!(errors = errors.len(), "compile failed");
                self.diagnostics = errors;
                false
            }
        }
    }

    /// Start the loaded program, resume a suspended one, or rerun a finished
    /// one from a fresh global environment
    pub fn run(&mut self) -> RunState {
        match self.state {
            RunState::Ready => self.start(),
            RunState::Suspended => return self.resume(),
            RunState::Finished if self.program.is_some() => {
                if self.load().is_ok() {
                    self.start();
                }
            }
            RunState::Idle | RunState::Running | RunState::Finished => {}
        }
        self.state
    }

    /// Continue a suspended run. Does nothing while the turtle is still gliding.
    pub fn resume(&mut self) -> RunState {
        if self.state == RunState::Suspended
            && (!self.turtle.borrow().gliding() || self.monitor.borrow().kill_requested)
        {
            debug!("resuming");
            self.poll();
        }
        self.state
    }

    /// Stop the run at its next statement boundary. A suspended run unwinds
    /// immediately and the turtle's glide is cut short.
    pub fn kill(&mut self) {
        match self.state {
            RunState::Running | RunState::Suspended => {
                self.monitor.borrow_mut().kill_requested = true;
                self.poll();
            }
            RunState::Ready => {
                self.state = RunState::Finished;
                self.outcome = Some(Outcome::Killed);
            }
            RunState::Idle | RunState::Finished => {}
        }
        self.turtle.borrow_mut().stop_glide();
    }

    /// Compile and run `source` against the retained global environment,
    /// so definitions persist from one call to the next
    pub fn run_line(&mut self, source: &str) -> RunState {
        if matches!(self.state, RunState::Running | RunState::Suspended) {
            self.kill();
        }
        let program = match crate::compile_source(source) {
            Ok(program) => program,
            Err(errors) => {
                self.diagnostics = errors;
                return self.state;
            }
        };
        self.diagnostics.clear();
        if self.interpreter.is_none() && self.load().is_err() {
            return self.state;
        }
        self.program = Some(Rc::new(program));
        self.outcome = None;
        self.start();
        self.state
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn finished(&self) -> bool {
        self.state == RunState::Finished
    }

    pub fn gliding(&self) -> bool {
        self.turtle.borrow().gliding()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Whether the last compile or run reported an error
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty() || self.last_error().is_some()
    }

    pub fn last_error(&self) -> Option<&RuntimeError> {
        match &self.outcome {
            Some(Outcome::Failed(err)) => Some(err),
            _ => None,
        }
    }

    /// Scan and parse errors from the last compile
    pub fn diagnostics(&self) -> &[CompileError] {
        &self.diagnostics
    }

    pub fn display_block(&self) -> Option<DisplayBlock> {
        self.monitor.borrow().display_block()
    }

    /// Program variables visible from the statement being executed, or the
    /// globals once a run has finished
    pub fn variables(&self) -> Vec<VariableView> {
        let env = self.monitor.borrow().environment.clone();
        match env {
            Some(env) => visible_variables(&env),
            None => self
                .interpreter
                .as_ref()
                .map(|interp| visible_variables(interp.globals()))
                .unwrap_or_default(),
        }
    }

    /// Fresh interpreter for the current program
    fn load(&mut self) -> InterpResult<()> {
        self.retire_interpreter();
        *self.monitor.borrow_mut() = Monitor::default();
        self.outcome = None;
        match Interpreter::new(
            self.config.clone(),
            Rc::clone(&self.turtle),
            Rc::clone(&self.monitor),
            Rc::clone(&self.output),
        ) {
            Ok(interpreter) => {
                self.interpreter = Some(interpreter);
                self.state = RunState::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load libraries");
                self.outcome = Some(Outcome::Failed(err.clone()));
                self.state = RunState::Finished;
                Err(err)
            }
        }
    }

    /// Abandon any run in progress and forget the program
    fn unload(&mut self) {
        if matches!(self.state, RunState::Running | RunState::Suspended) {
            self.kill();
        }
        self.retire_interpreter();
        self.program = None;
        self.diagnostics.clear();
        self.outcome = None;
        *self.monitor.borrow_mut() = Monitor::default();
        self.state = RunState::Idle;
    }

    fn retire_interpreter(&mut self) {
        if let Some(interpreter) = self.interpreter.take() {
            interpreter.clear();
        }
    }

    fn start(&mut self) {
        let Some(program) = self.program.clone() else {
            return;
        };
        let Some(mut interpreter) = self.interpreter.take() else {
            return;
        };
        self.task = Some(Box::pin(async move {
            let outcome = interpreter.run_program(&program.statements).await;
            (interpreter, outcome)
        }));
        self.poll();
    }

    fn poll(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        self.state = RunState::Running;
        match poll_once(task.as_mut()) {
            Poll::Ready((interpreter, outcome)) => {
                self.task = None;
                self.finish(interpreter, outcome);
            }
            Poll::Pending => {
                debug!("suspended while turtle glides");
                self.state = RunState::Suspended;
            }
        }
    }

    fn finish(&mut self, interpreter: Interpreter, outcome: Outcome) {
        match &outcome {
            Outcome::Completed => debug!("program finished"),
            Outcome::Failed(err) => warn!(error = %err, "program failed"),
            Outcome::Killed => debug!("program killed"),
        }
        self.monitor.borrow_mut().kill_requested = false;
        self.interpreter = Some(interpreter);
        self.outcome = Some(outcome);
        self.state = RunState::Finished;
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.monitor.borrow_mut().kill_requested = true;
            self.poll();
        }
        self.retire_interpreter();
    }
}
