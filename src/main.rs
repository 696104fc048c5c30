use anyhow::Result;
use clap::Parser as ClapParser;
use nazg::diagnostics;
use nazg::interpreter::value::Value;
use nazg::interpreter::Interpreter;
use nazg::keywords::load_keywords;
use nazg::parser::Parser;
use nazg::scanner::token::TokenType;
use nazg::scanner::Scanner;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::io::{BufRead, BufReader, Write};
use std::process;

#[derive(ClapParser)]
#[command(name = "nazg")]
#[command(about = "The Nazg scripting language")]
struct Cli {
    /// Script file to run (omit for REPL)
    script: Option<String>,

    /// Path to keywords JSON file
    #[arg(short, long)]
    keywords: Option<String>,
}

// Lex/parse failures and runtime failures map to different exit codes
enum Failure {
    Static,
    Runtime,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let keywords = load_keywords(cli.keywords.as_deref())?;

    match cli.script {
        None => run_prompt(&keywords)?,
        Some(path) => run_file(&path, &keywords),
    }

    Ok(())
}

fn run_file(path: &str, keywords: &HashMap<String, TokenType>) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path, e);
            process::exit(66);
        }
    };

    let mut interpreter = Interpreter::new();
    match run(&contents, keywords, &mut interpreter) {
        Ok(_) => {}
        Err(Failure::Static) => process::exit(65),
        Err(Failure::Runtime) => process::exit(70),
    }
}

fn run_prompt(keywords: &HashMap<String, TokenType>) -> Result<()> {
    let stdin = io::stdin();
    let reader = BufReader::new(stdin.lock());
    let mut interpreter = Interpreter::new();

    print!("> ");
    io::stdout().flush()?;

    for line in reader.lines() {
        // errors have already been rendered; the session just continues
        if let Ok(value) = run(&line?, keywords, &mut interpreter) {
            if !matches!(value, Value::Null) {
                println!("{}", value);
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}

fn run(
    source: &str,
    keywords: &HashMap<String, TokenType>,
    interpreter: &mut Interpreter,
) -> Result<Value, Failure> {
    let scanner = Scanner::new(source, keywords);
    let tokens = match scanner.scan_tokens() {
        Ok(tokens) => tokens,
        Err(errors) => {
            for e in &errors {
                report(source, "LexError", e.span, &e.message);
            }
            return Err(Failure::Static);
        }
    };

    let parser = Parser::new(tokens);
    let program = match parser.parse() {
        Ok(program) => program,
        Err(errors) => {
            for e in &errors {
                report(source, "SyntaxError", e.span, &e.message);
            }
            return Err(Failure::Static);
        }
    };

    interpreter.interpret(&program).map_err(|e| {
        report(source, e.kind.as_str(), e.span, &e.message);
        Failure::Runtime
    })
}

fn report(source: &str, kind: &str, span: nazg::span::Span, message: &str) {
    let hint = diagnostics::suggest_hint(message);
    eprint!(
        "{}",
        diagnostics::render(source, kind, span, message, hint.as_deref())
    );
}
