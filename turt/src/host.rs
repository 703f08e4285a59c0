//! Headless host: a [`Sprite`] animated by a fixed-rate tick loop

use crate::config::Config;
use crate::interp::{RunState, Runtime};
use crate::turtle::{Sprite, TurtleRef};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::trace;

/// Simulated frame length
pub const TICK_SECONDS: f64 = 1.0 / 60.0;

/// Runs programs against a sprite, advancing glides one tick at a time
/// until each run settles
pub struct Headless {
    runtime: Runtime,
    sprite: Rc<RefCell<Sprite>>,
    ticks: usize,
}

impl Headless {
    /// Program output goes to stdout
    pub fn new(config: Config) -> Self {
        let sprite = Rc::new(RefCell::new(Sprite::new(&config)));
        let turtle: TurtleRef = sprite.clone();
        Headless {
            runtime: Runtime::new(config, turtle),
            sprite,
            ticks: 0,
        }
    }

    pub fn with_output(mut self, output: impl Fn(&str) + 'static) -> Self {
        self.runtime = self.runtime.with_output(output);
        self
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn sprite(&self) -> Ref<'_, Sprite> {
        self.sprite.borrow()
    }

    /// Ticks spent waiting on glides so far
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Simulated seconds spent waiting on glides
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * TICK_SECONDS
    }

    /// Compile a whole program; the sprite starts over from home
    pub fn compile(&mut self, source: &str) -> bool {
        self.sprite.borrow_mut().reset();
        self.ticks = 0;
        self.runtime.compile(source)
    }

    /// Run the compiled program until it finishes
    pub fn run(&mut self) -> RunState {
        let state = self.runtime.run();
        self.settle(state)
    }

    /// Run one REPL entry in the retained globals until it finishes
    pub fn run_line(&mut self, source: &str) -> RunState {
        let state = self.runtime.run_line(source);
        self.settle(state)
    }

    /// Start over: fresh globals and a sprite back at home
    pub fn reset(&mut self) {
        self.runtime.compile("");
        self.sprite.borrow_mut().reset();
        self.ticks = 0;
    }

    fn settle(&mut self, mut state: RunState) -> RunState {
        while state == RunState::Suspended {
            self.sprite.borrow_mut().update(TICK_SECONDS);
            self.ticks += 1;
            if !self.runtime.gliding() {
                trace!(ticks = self.ticks, "glide finished");
                state = self.runtime.resume();
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Outcome;
    use crate::turtle::{Point, Turtle};

    fn headless(speed: f64) -> (Headless, Rc<RefCell<Vec<String>>>) {
        let config = Config {
            turtle_speed: speed,
            ..Config::default()
        };
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let host =
            Headless::new(config).with_output(move |l| sink.borrow_mut().push(l.to_string()));
        (host, lines)
    }

    #[test]
    fn test_glides_take_simulated_time() {
        let (mut host, lines) = headless(60.0);
        assert!(host.compile("forward(60); print(getY()); forward(30);"));
        assert_eq!(host.run(), RunState::Finished);
        assert_eq!(*lines.borrow(), vec!["300"]);
        // 60px at 60px/s is one second; the trailing glide is not waited for
        assert!((59..=61).contains(&host.ticks()), "ticks = {}", host.ticks());
        assert!(host.sprite().gliding());
    }

    #[test]
    fn test_instant_turtle_never_ticks() {
        let (mut host, _) = headless(0.0);
        assert!(host.compile("forward(100); forward(100);"));
        assert_eq!(host.run(), RunState::Finished);
        assert_eq!(host.ticks(), 0);
        assert_eq!(host.sprite().position(), Point::new(640.0, 160.0));
    }

    #[test]
    fn test_run_lines_share_state() {
        let (mut host, lines) = headless(500.0);
        host.run_line("var n = 0;");
        host.run_line("while (n < 3) { forward(10); n = n + 1; }");
        host.run_line("print(n);");
        assert_eq!(*lines.borrow(), vec!["3"]);
        assert_eq!(host.runtime().outcome(), Some(&Outcome::Completed));
        assert_eq!(host.sprite().canvas().segments.len(), 3);
    }

    #[test]
    fn test_reset_clears_globals() {
        let (mut host, _) = headless(0.0);
        host.run_line("var n = 1;");
        host.reset();
        host.run_line("var n = 2;");
        assert!(!host.runtime().had_error());
    }
}
