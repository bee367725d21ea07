// ABOUTME: Command-line entry point — interactive REPL and batch script execution (§4.H)

mod ast;
mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod parser;
mod primitives;
mod reader;
mod repl;
mod value;

use clap::Parser;
use repl::Repl;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;

/// An interactive interpreter for a lexically-scoped Scheme-family Lisp.
#[derive(Parser, Debug)]
#[command(name = "scm")]
#[command(version = config::VERSION)]
#[command(about = "An interactive interpreter for a lexically-scoped Scheme-family Lisp")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

const HISTORY_FILE: &str = ".scm_history";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    if let Some(path) = args.script {
        return run_batch(&path);
    }

    if std::io::stdin().is_terminal() {
        run_interactive()
    } else {
        run_piped()
    }
}

/// Batch mode (§4.H): evaluates every top-level form in the file with the
/// same buffering/flushing/printing semantics as interactive mode, but
/// never prints a prompt.
fn run_batch(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {}", path.display(), e))?;
    let mut repl = Repl::new();
    let mut out = std::io::stdout();
    repl.feed(&source, &mut out);
    repl.finish(&mut out);
    Ok(())
}

/// Piped stdin (§4.H): reads to EOF and evaluates with no prompt, same as
/// batch mode but sourced from standard input instead of a file.
fn run_piped() -> Result<(), Box<dyn std::error::Error>> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    let mut repl = Repl::new();
    let mut out = std::io::stdout();
    repl.feed(&source, &mut out);
    repl.finish(&mut out);
    Ok(())
}

/// Interactive mode (§4.H): prompts via `rustyline`, persisting history to
/// `.scm_history` in the current directory across invocations.
fn run_interactive() -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = Repl::new();
    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let mut out = std::io::stdout();
    loop {
        match rl.readline("scm> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if repl.feed(&line, &mut out) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                repl.finish(&mut out);
                break;
            }
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    out.flush().ok();
    Ok(())
}
