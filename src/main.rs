use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

mod repl;

/// The Gosling programming language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print tokens and exit.
    #[arg(long)]
    debug_scanner: bool,

    /// Print the AST and exit.
    #[arg(long)]
    debug_ast: bool,

    /// Print the parsed program and exit.
    #[arg(long)]
    debug_parser: bool,

    /// Gosling program file. Without it, an interactive session starts.
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let options = repl::Options {
        debug_scanner: args.debug_scanner,
        debug_ast: args.debug_ast,
        debug_parser: args.debug_parser,
    };

    match &args.file {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let scope = repl::program_scope();
            repl::eval_source(&source, &scope, &options);
            Ok(())
        }
        None => {
            repl::start(&options)?;
            Ok(())
        }
    }
}
