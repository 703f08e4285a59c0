//! Interactive TurtLang session
//!
//! Each entered line is compiled and run against globals that persist for
//! the whole session, with the headless turtle animating between lines.

use crate::config::Config;
use crate::error::{report_error, report_runtime_error};
use crate::host::Headless;
use crate::turtle::Turtle;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "turt> ";
const HISTORY_FILE: &str = ".turt_history";
const SOURCE_NAME: &str = "<repl>";

/// Session commands, entered with a leading ':'
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    Vars,
    Turtle,
    Reset,
    Clear,
    Unknown(String),
}

impl Command {
    fn parse(input: &str) -> Command {
        match input.trim_start_matches(':') {
            "quit" | "q" | "exit" => Command::Quit,
            "help" | "h" | "?" => Command::Help,
            "vars" => Command::Vars,
            "turtle" => Command::Turtle,
            "reset" => Command::Reset,
            "clear" => Command::Clear,
            _ => Command::Unknown(input.to_string()),
        }
    }
}

/// What to do after handling one line of input
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

pub struct Repl {
    editor: DefaultEditor,
    host: Headless,
    history: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: Config) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = home_dir().map(|home| home.join(HISTORY_FILE));
        if let Some(path) = &history {
            // a missing history file is normal on first use
            let _ = editor.load_history(path);
        }
        Ok(Repl {
            editor,
            host: Headless::new(config),
            history,
        })
    }

    pub fn run(&mut self) -> RlResult<()> {
        println!("TurtLang v{}", env!("CARGO_PKG_VERSION"));
        println!("Enter statements to run them; :help lists commands.\n");

        loop {
            let step = match self.editor.readline(PROMPT) {
                Ok(line) => self.step(&line),
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    Step::Continue
                }
                Err(ReadlineError::Eof) => Step::Stop,
                Err(err) => {
                    eprintln!("Error: {err}");
                    Step::Stop
                }
            };
            if step == Step::Stop {
                break;
            }
        }

        if let Some(path) = &self.history {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }

    fn step(&mut self, line: &str) -> Step {
        let line = line.trim();
        if line.is_empty() {
            return Step::Continue;
        }
        let _ = self.editor.add_history_entry(line);
        if line.starts_with(':') {
            self.command(Command::parse(line))
        } else {
            self.eval_input(line);
            Step::Continue
        }
    }

    fn command(&mut self, command: Command) -> Step {
        match command {
            Command::Quit => return Step::Stop,
            Command::Help => print_help(),
            Command::Vars => {
                for var in self.host.runtime().variables() {
                    println!("  {} = {:?}", var.name, var.value);
                }
            }
            Command::Turtle => println!("{}", self.turtle_summary()),
            Command::Reset => {
                self.host.reset();
                println!("Definitions forgotten, turtle back home.");
            }
            Command::Clear => print!("\x1B[2J\x1B[1;1H"),
            Command::Unknown(input) => println!("Unknown command {input}; try :help"),
        }
        Step::Continue
    }

    fn turtle_summary(&self) -> String {
        let sprite = self.host.sprite();
        format!(
            "at {} heading {}°, pen {}, colour {}, {} segments, {} polygons",
            sprite.position(),
            sprite.heading(),
            if sprite.pen_down() { "down" } else { "up" },
            sprite.color(),
            sprite.canvas().segments.len(),
            sprite.canvas().polygons.len(),
        )
    }

    /// Compile and run one line against the retained globals
    fn eval_input(&mut self, input: &str) {
        self.host.run_line(input);
        let runtime = self.host.runtime();
        for diagnostic in runtime.diagnostics() {
            report_error(SOURCE_NAME, input, diagnostic);
        }
        if let Some(err) = runtime.last_error() {
            report_runtime_error(SOURCE_NAME, input, err);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help, :h, :?        this list");
    println!("  :quit, :q, :exit     leave the session");
    println!("  :vars                program variables and their values");
    println!("  :turtle              where the turtle is and what it has drawn");
    println!("  :reset               forget all definitions and send the turtle home");
    println!("  :clear               clear the terminal");
    println!();
    println!("Definitions persist between lines:");
    println!("  var side = 50;");
    println!("  function square(s) {{");
    println!("    for (var i = 0; i < 4; i = i + 1) {{ forward(s); turn(90); }}");
    println!("  }}");
    println!("  square(side);");
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl() -> Repl {
        Repl::new(Config {
            turtle_speed: 0.0,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":exit"), Command::Quit);
        assert_eq!(Command::parse(":?"), Command::Help);
        assert_eq!(Command::parse(":reset"), Command::Reset);
        assert_eq!(Command::parse(":nope"), Command::Unknown(":nope".to_string()));
    }

    #[test]
    fn test_only_quit_stops() {
        let mut repl = repl();
        assert_eq!(repl.step(":quit"), Step::Stop);
        for input in [":help", ":vars", ":turtle", ":anything", "", "   "] {
            assert_eq!(repl.step(input), Step::Continue, "{input:?}");
        }
    }

    #[test]
    fn test_definitions_persist_between_lines() {
        let mut repl = repl();
        repl.step("var side = 10;");
        repl.step("forward(side);");
        assert!(!repl.host.runtime().had_error());
        assert_eq!(repl.host.sprite().canvas().segments.len(), 1);
    }

    #[test]
    fn test_errors_do_not_poison_session() {
        let mut repl = repl();
        repl.eval_input("var x = ;");
        assert!(repl.host.runtime().had_error());
        repl.eval_input("print(undefinedThing);");
        assert!(repl.host.runtime().last_error().is_some());
        repl.eval_input("var x = 1;");
        assert!(!repl.host.runtime().had_error());
    }

    #[test]
    fn test_reset_command() {
        let mut repl = repl();
        repl.eval_input("var a = 1; forward(5);");
        assert_eq!(repl.step(":reset"), Step::Continue);
        repl.eval_input("var a = 2;");
        assert!(!repl.host.runtime().had_error());
        assert!(repl.host.sprite().canvas().is_empty());
    }

    #[test]
    fn test_turtle_summary() {
        let repl = repl();
        assert_eq!(
            repl.turtle_summary(),
            "at (640.0, 360.0) heading 0°, pen down, colour #000000, 0 segments, 0 polygons"
        );
    }
}
