use std::cell::RefCell;
use std::io;
use std::io::Write;
use std::rc::Rc;

use gosling::builtin::{builtin_scope, Output};
use gosling::interpreter::{Config as InterpreterConfig, Context, Interpreter};
use gosling::parser::{Config as ParserConfig, Parser};
use gosling::scanner::{Config as ScannerConfig, Scanner};
use gosling::scope::Scope;
use gosling::token::TokenType;

const PROMPT: &str = ">> ";

/// Debug switches shared by the REPL and file evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    pub debug_scanner: bool,
    pub debug_ast: bool,
    pub debug_parser: bool,
}

/// Creates the scope programs are evaluated in, with the built-ins writing
/// to standard output.
pub fn program_scope() -> Rc<RefCell<Scope>> {
    let out: Output = Rc::new(RefCell::new(io::stdout()));
    Scope::new(Some(builtin_scope(out).shared())).shared()
}

/// Scans, parses, and evaluates one source text in the given scope, honoring
/// the debug switches. Failures are reported on stderr; the scope survives
/// for the next call.
pub fn eval_source(source: &str, scope: &Rc<RefCell<Scope>>, options: &Options) {
    let mut scanner = match Scanner::new(source, ScannerConfig { skip_shebang: true }) {
        Ok(scanner) => scanner,
        Err(err) => {
            eprintln!("scanner error: {}", err);
            return;
        }
    };

    if options.debug_scanner {
        loop {
            let tok = scanner.next_token();
            println!("{}", tok);
            match tok.token_type {
                TokenType::Eof | TokenType::Illegal => return,
                _ => {}
            }
        }
    }

    let mut parser = Parser::new(scanner, ParserConfig::default());
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        eprintln!("parser errors:");
        for err in parser.errors() {
            eprintln!("\t{}", err);
        }
        return;
    }
    let program = match program {
        Some(program) => program,
        None => return,
    };

    if options.debug_ast {
        println!("{:#?}", program);
        return;
    }
    if options.debug_parser {
        println!("{}", program);
        return;
    }

    let interpreter = Interpreter::new(InterpreterConfig::default());
    match interpreter.eval(&Context::new(), &program, scope) {
        Ok(Some(res)) => println!("{}", res),
        Ok(None) => {}
        Err(err) => eprintln!("runtime error: {}", err),
    }
}

/// Runs the interactive session. One scope stays alive across lines, so
/// definitions carry over.
pub fn start(options: &Options) -> io::Result<()> {
    let scope = program_scope();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(());
        }
        eval_source(&line, &scope, options);
    }
}
