//! Immediate values CLI
//!
//! Evaluates expressions and runs variable scripts against an in-memory store.

use imv_eval::{EvalContext, Expression, LogSink, MemoryStore};
use imv_parse::CompileOptions;
use imv_types::TypeRegistry;
use imvc::{init_tracing, ScriptRunner, SystemHost};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "eval" => {
            let mut options = CompileOptions::default();
            let mut show_code = false;
            let mut source = None;

            for arg in args.iter().skip(2) {
                if arg == "--no-fold" {
                    options = options.without_folding();
                } else if arg == "--code" {
                    show_code = true;
                } else if let Some(namespace) = arg.strip_prefix("--namespace=") {
                    options = options.with_namespace(namespace);
                } else if source.is_none() {
                    source = Some(arg.as_str());
                }
            }

            let Some(source) = source else {
                eprintln!("Usage: imvc eval <expr> [--code] [--no-fold] [--namespace=<ns>]");
                std::process::exit(1);
            };

            eval_expression(source, &options, show_code);
        }
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: imvc run <script>");
                std::process::exit(1);
            }
            run_script(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("imvc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn eval_expression(source: &str, options: &CompileOptions, show_code: bool) {
    let registry = TypeRegistry::new();
    let expression = match Expression::compile(source, &registry, options) {
        Ok(expression) => expression,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if show_code {
        println!("{expression}");
        return;
    }

    let store = MemoryStore::new();
    let ctx = EvalContext::new(&store, &SystemHost, &LogSink);
    match expression.evaluate(ctx) {
        Ok(result) => println!("{}", result.collect()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
}

fn run_script(path: &str) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            std::process::exit(1);
        }
    };

    let mut runner = ScriptRunner::default();
    if let Err(err) = runner.run(&source, |line| println!("{line}")) {
        eprintln!("error: {path}:{err}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Immediate values evaluator");
    println!();
    println!("Usage: imvc <command> [options]");
    println!();
    println!("Commands:");
    println!("  eval <expr>          Evaluate an expression and print the result");
    println!("  run <script>         Run a script of variable commands");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Eval options:");
    println!("  --code               Print the compiled instructions instead");
    println!("  --no-fold            Do not pre-evaluate constant expressions");
    println!("  --namespace=<ns>     Namespace for unqualified variables (default: global)");
    println!();
    println!("Script commands (one per line, '#' starts a comment):");
    println!("  add <id> <type>              Declare a variable");
    println!("  set <path> = <expr>          Assign through a path");
    println!("  get <path>                   Read through a path");
    println!("  remove <path>                Remove a variable or slots");
    println!("  eval <expr>                  Evaluate an expression");
    println!("  list                         Show every variable");
    println!("  compare <expr> <op> <expr>   Compare with == != < <= > >=");
    println!("  encode <id>                  Show a variable's binary encoding");
}
