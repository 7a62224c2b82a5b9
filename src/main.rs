use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use regsim::bench::{self, BenchConfig};
use regsim::error::Error;
use regsim::log::{self, Level};
use regsim::processor::Processor;
use regsim::response::Response;
use regsim::session::{self, OutputFormat, Session, SessionConfig};

#[derive(Parser)]
#[command(name = "regsim", about = "Four-register microprocessor simulator")]
struct Cli {
    /// Output format for register snapshots and errors.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log every executed instruction to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute instructions given as arguments. More than one runs as a batch.
    Exec {
        /// Instructions, e.g. "SET A 10" "ADR B A".
        #[arg(required = true)]
        instructions: Vec<String>,
    },

    /// Execute a program file as one batch. Blank lines and `#` comments are ignored.
    Run {
        file: PathBuf,
    },

    /// Read instructions and dot-commands (.regs, .get R, .reset, .quit) from stdin.
    Repl {
        /// Stop at the first failing line.
        #[arg(long)]
        stop_on_error: bool,
    },

    /// Replay random instruction streams on many processors in parallel.
    Bench {
        /// Random seed for reproducibility.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Number of independent processors.
        #[arg(long, default_value_t = 64)]
        processors: usize,

        /// Instructions per processor.
        #[arg(long, default_value_t = 1 << 14)]
        program_len: usize,

        /// Fraction of generated lines that are malformed (0 to disable).
        #[arg(long, default_value_t = 0.01)]
        error_rate: f64,
    },
}

fn main() {
    let cli = Cli::parse();
    log::set_max_level(if cli.verbose {
        Level::Debug
    } else if cli.quiet {
        Level::Error
    } else {
        Level::Warn
    });

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            regsim::error!("{e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the simulator reported a failure on stdout.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let format = cli.format;
    match cli.command {
        Command::Exec { instructions } => {
            let mut cpu = Processor::new();
            let result = match instructions.as_slice() {
                [single] => cpu.execute(single),
                many => cpu.execute_batch(many),
            };
            respond(format, result)
        }
        Command::Run { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            run_program(format, &text)
        }
        Command::Repl { stop_on_error } => {
            let stdin = io::stdin();
            let config = SessionConfig {
                format,
                stop_on_error,
                prompt: stdin.is_terminal().then(|| "> ".to_string()),
            };
            let mut session = Session::new(config);
            let summary = session.run(stdin.lock(), &mut io::stdout().lock())?;
            Ok(summary.failed == 0)
        }
        Command::Bench {
            seed,
            processors,
            program_len,
            error_rate,
        } => {
            if !(0.0..=1.0).contains(&error_rate) {
                bail!("--error-rate must be between 0 and 1, got {error_rate}");
            }
            let config = BenchConfig {
                processors,
                program_len,
                error_rate,
            };
            run_benchmark(&config, seed);
            Ok(true)
        }
    }
}

fn run_program(format: OutputFormat, text: &str) -> anyhow::Result<bool> {
    let lines = session::program_lines(text);
    let instructions: Vec<&str> = lines.iter().map(|&(_, code)| code).collect();
    let mut cpu = Processor::new();
    let result = cpu.execute_batch(&instructions);
    if let Err(Error::Batch(failure)) = &result {
        let (line_no, _) = lines[failure.index];
        regsim::error!("program stopped at line {line_no}");
    }
    respond(format, result)
}

fn respond(format: OutputFormat, result: regsim::Result<regsim::register::Snapshot>) -> anyhow::Result<bool> {
    let response = Response::from(result);
    let mut out = io::stdout().lock();
    session::emit(&mut out, format, &response)?;
    out.flush()?;
    Ok(response.is_success())
}

fn run_benchmark(config: &BenchConfig, seed: u64) {
    let report = bench::run(config, seed);

    eprintln!("Benchmark results:");
    eprintln!("  Processors:        {}", config.processors);
    eprintln!("  Program length:    {}", config.program_len);
    eprintln!("  Instructions:      {}", report.instructions);
    eprintln!("  Failed lines:      {}", report.failures);
    eprintln!("  Elapsed:           {:.2?}", report.elapsed);
    eprintln!("  Instructions/sec:  {:.0}", report.instructions_per_sec());
}
