use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
};

use clap::Parser;
use loxcalc::{Config, InterpretStatus, VM};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Compile and run arithmetic expressions on a bytecode virtual machine.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// File containing a single expression
    path: Option<PathBuf>,
    /// Evaluate the given expression instead of reading a file
    #[arg(short, long, conflicts_with = "path")]
    eval: Option<String>,
    /// Log the stack and each instruction as it executes, implies `--log-level trace`
    #[arg(long)]
    trace: bool,
    /// Log the disassembled bytecode after compiling
    #[arg(long)]
    print_code: bool,
    /// Maximum depth of the operand stack
    #[arg(long, default_value_t = loxcalc::STACK_MAX)]
    stack_max: usize,
    /// Default log level, `RUST_LOG` takes precedence
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() {
    let cli = Cli::parse();
    let mut level = cli.log_level;
    if cli.trace {
        level = Level::TRACE;
    } else if cli.print_code {
        level = level.max(Level::DEBUG);
    }
    init_logging(level);

    let config = Config::default()
        .with_stack_max(cli.stack_max)
        .with_trace_execution(cli.trace)
        .with_print_code(cli.print_code);
    let mut vm = VM::new(config, io::stdout());

    let status = match (&cli.eval, &cli.path) {
        (Some(src), _) => run(&mut vm, src),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(src) => run(&mut vm, &src),
            Err(err) => {
                eprintln!("Could not read file \"{}\": {}", path.display(), err);
                process::exit(74);
            }
        },
        (None, None) => repl(&mut vm),
    };
    process::exit(status.exit_code());
}

fn run<W: Write>(vm: &mut VM<W>, src: &str) -> InterpretStatus {
    match vm.interpret_source(src) {
        Ok(_) => InterpretStatus::Ok,
        Err(err) => {
            eprintln!("{err}");
            err.status()
        }
    }
}

fn repl<W: Write>(vm: &mut VM<W>) -> InterpretStatus {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return InterpretStatus::Ok;
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!();
                return InterpretStatus::Ok;
            }
            Ok(_) if line.trim().is_empty() => {}
            Ok(_) => {
                run(vm, &line);
            }
            Err(err) => {
                eprintln!("{err}");
                return InterpretStatus::Ok;
            }
        }
    }
}

fn init_logging(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}
