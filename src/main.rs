use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use lox_interpreter as lox;

use lox::ast::Ast;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Emit the token list as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Read a source file into memory.  Non-empty files are memory-mapped and
/// copied out of the map; zero-length files skip the mapping since an empty
/// mmap is an error on some platforms.
fn read_source(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);

    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;

    let metadata = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?;

    if metadata.len() == 0 {
        info!("File {:?} is empty", filename);

        return Ok(Vec::new());
    }

    let mmap =
        unsafe { Mmap::map(&file) }.context(format!("Failed to mmap file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap.to_vec())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Write to file with the crate prefix stripped from module paths.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lox_interpreter::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

/// Scan the whole buffer, printing every lexical error.  Returns the token
/// list (EOF included) and whether scanning was clean.
fn scan_all(src: &[u8]) -> (Vec<Token<'_>>, bool) {
    let mut tokens = Vec::new();
    let mut clean = true;

    for item in Scanner::new(src) {
        match item {
            Ok(token) => tokens.push(token),

            Err(e) => {
                debug!("Lex error: {}", e);

                clean = false;
                eprintln!("{}", e);
            }
        }
    }

    (tokens, clean)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Minimal logger so log macros have a sink.
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");

                let buf = read_source(filename)?;
                let mut tokenized = true;
                let mut tokens = Vec::new();

                for token in Scanner::new(&buf) {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            if json {
                                tokens.push(token);
                            } else {
                                println!("{}", token);
                            }
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization error: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if json {
                    println!("{}", serde_json::to_string(&tokens)?);
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }

            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");

                let buf = read_source(filename)?;

                let (tokens, clean) = scan_all(&buf);

                if !clean {
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");

                        let ast_str = Ast.print(&expr);

                        debug!("AST: {}", ast_str);
                        println!("{}", ast_str);
                    }

                    Err(e) => {
                        debug!("Parse error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }

            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let buf = read_source(filename)?;

                let (tokens, clean) = scan_all(&buf);

                if !clean {
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);

                let expr = match parser.parse_expression() {
                    Ok(expr) => expr,

                    Err(e) => {
                        debug!("Parse error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                let mut interpreter = Interpreter::new();

                match interpreter.evaluate_expression(&expr) {
                    Ok(value) => {
                        debug!("Evaluated to: {}", value);
                        println!("{}", value);
                    }

                    Err(e) => {
                        debug!("Evaluation error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");

                let buf = read_source(filename)?;

                let (tokens, clean) = scan_all(&buf);

                if !clean {
                    debug!("Lexing failed, exiting with code 65");
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);
                let (statements, errors) = parser.parse();

                if !errors.is_empty() {
                    for e in &errors {
                        debug!("Parse error: {}", e);
                        eprintln!("{}", e);
                    }

                    std::process::exit(65);
                }

                info!("Parsed {} statements", statements.len());

                let mut interpreter = Interpreter::new();

                let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);

                if !resolve_errors.is_empty() {
                    for e in &resolve_errors {
                        debug!("Resolve error: {}", e);
                        eprintln!("{}", e);
                    }

                    std::process::exit(65);
                }

                match interpreter.interpret(&statements) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime error: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
