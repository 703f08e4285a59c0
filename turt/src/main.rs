//! TurtLang CLI

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use turt::error::{report_error, report_runtime_error};
use turt::host::Headless;
use turt::repl::Repl;
use turt::{Config, Outcome};

#[derive(Parser)]
#[command(name = "turt", version, about = "TurtLang - drive a drawing turtle with code")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Turtle speed in pixels per second (0 = instant)
    #[arg(long, global = true)]
    speed: Option<f64>,

    /// Iterations a loop may run before it is stopped
    #[arg(long, global = true)]
    max_loops: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a TurtLang program against a headless turtle
    Run {
        /// Source file to run
        file: PathBuf,
        /// Print what was drawn once the program ends
        #[arg(long)]
        summary: bool,
    },
    /// Scan and parse a source file, reporting every error
    Check {
        /// Source file to check
        file: PathBuf,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

/// Logging is off unless TURT_LOG is set (e.g. `TURT_LOG=turt=debug`)
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Ok(filter) = EnvFilter::try_from_env("TURT_LOG") {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Run { file, summary } => run_file(&file, config, summary),
        Command::Check { file } => check_file(&file),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Repl => Repl::new(config)
            .and_then(|mut repl| repl.run())
            .map(|()| ExitCode::SUCCESS)
            .map_err(Into::into),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, turt::config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(speed) = cli.speed {
        config.turtle_speed = speed.max(0.0);
    }
    if let Some(max_loops) = cli.max_loops {
        config.max_loop_iterations = max_loops;
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path)
        .map_err(|e| turt::CompileError::io_error(format!("{}: {e}", path.display())).into())
}

/// Report compile errors; true when there were any
fn report_compile_errors(filename: &str, source: &str, errors: &[turt::CompileError]) -> bool {
    for error in errors {
        report_error(filename, source, error);
    }
    !errors.is_empty()
}

fn run_file(
    path: &Path,
    config: Config,
    summary: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let mut host = Headless::new(config);
    if !host.compile(&source) {
        report_compile_errors(&filename, &source, host.runtime().diagnostics());
        return Ok(ExitCode::from(65));
    }
    host.run();

    if summary {
        let sprite = host.sprite();
        let canvas = sprite.canvas();
        eprintln!(
            "drew {} segments ({:.1}px of ink) and {} polygons in {:.2}s",
            canvas.segments.len(),
            canvas.ink(),
            canvas.polygons.len(),
            host.elapsed()
        );
    }

    match host.runtime().outcome() {
        Some(Outcome::Failed(err)) => {
            report_runtime_error(&filename, &source, err);
            Ok(ExitCode::from(70))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn check_file(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    match turt::compile_source(&source) {
        Ok(program) => {
            println!(
                "✓ {} parses successfully ({} statements)",
                filename,
                program.statements.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            report_compile_errors(&filename, &source, &errors);
            Ok(ExitCode::from(65))
        }
    }
}

fn parse_file(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    match turt::compile_source(&source) {
        Ok(program) => {
            println!("{}", serde_json::to_string_pretty(&program)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            report_compile_errors(&filename, &source, &errors);
            Ok(ExitCode::from(65))
        }
    }
}

fn tokenize_file(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let scan = turt::lexer::scan(&source);
    for token in &scan.tokens {
        println!(
            "{:>4} {:?} '{}' @ {}",
            token.line, token.kind, token.lexeme, token.span
        );
    }

    if report_compile_errors(&filename, &source, &scan.errors) {
        return Ok(ExitCode::from(65));
    }
    Ok(ExitCode::SUCCESS)
}
