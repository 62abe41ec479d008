use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;

use errors::LoxErrors;
use interpreter::{Interpreter, Value};

#[derive(clap::Parser)]
#[command(about = "Tree-walking interpreter for a small Lox subset")]
struct Args {
    /// Script to run. Without it, an interactive prompt is started.
    file: Option<PathBuf>,

    /// Only scan and parse the script, reporting every syntax error.
    #[arg(long, requires = "file")]
    check: bool,
}

fn run_file(path: PathBuf, interpreter: &mut Interpreter<impl Write>) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    interpreter.run_source(&source).map_err(LoxErrors::from)?;
    Ok(())
}

fn check_file(path: PathBuf) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let errors = check(&source);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

/// Collects all lexical and syntax errors, recovering at statement boundaries.
fn check(source: &str) -> LoxErrors {
    let (tokens, scan_errors) = scanner::scan(source);
    let mut errors: LoxErrors = scan_errors.0.into_iter().collect();
    if let Err(parse_errors) = parser::Parser::new(tokens).parse_all() {
        errors.extend(parse_errors.0);
    }
    errors.sorted()
}

/// A line holding a lone expression is evaluated and its value returned,
/// anything else is run as a sequence of statements.
fn run_line(
    line: &str,
    interpreter: &mut Interpreter<impl Write>,
) -> Result<Option<Value>, LoxErrors> {
    match interpreter.evaluate_source(line) {
        Ok(value) => Ok(Some(value)),
        Err(interpreter::Error::Parse(e)) => {
            log::debug!("Not a lone expression ({e}), running as statements");
            interpreter.run_source(line).map(|()| None).map_err(Into::into)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_prompt(interpreter: &mut Interpreter<impl Write>) -> anyhow::Result<()> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        match run_line(&line, interpreter) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => (),
            Err(e) => println!("{}", e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut interpreter = Interpreter::new(stdout());

    match args.file {
        Some(file) if args.check => check_file(file),
        Some(file) => run_file(file, &mut interpreter),
        None => run_prompt(&mut interpreter),
    }
}
