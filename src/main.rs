//! FlatCopy CLI - flatten a directory tree into one directory
//!
//! Prints one line per file: `<source> -> <destination>: OK` when copied,
//! `FAIL` when the name was already taken in the target.

use clap::Parser;
use flatcopy::config::{CliArgs, FlattenConfig, FlattenMode};
use flatcopy::core::{CopyResult, FlattenSummary, Flattener};
use flatcopy::error::{FlattenError, Result};
use flatcopy::progress::ProgressReporter;
use std::io::Write;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CliArgs::parse();

    init_logging(args.verbose);

    if args.source.is_none() || args.target.is_none() {
        eprintln!("Usage: flatcopy <SOURCE> <TARGET> [OPTIONS]");
        eprintln!("       flatcopy --help for more information");
        std::process::exit(1);
    }

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    if let Err(e) = run(&args, &mut out) {
        let _ = out.flush();
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs, out: &mut impl Write) -> Result<()> {
    let config = FlattenConfig::from_cli(args).map_err(FlattenError::ConfigError)?;

    if args.verbose > 0 {
        if let Ok(json) = serde_json::to_string_pretty(&config) {
            eprintln!("{}", json);
        }
    }

    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    let start_time = Instant::now();
    let mut flattener = Flattener::new(config).with_progress(progress);

    let mode = flattener.config().mode;
    let (results, outcome) = match mode {
        FlattenMode::Sync => (flattener.flatten_sync()?, Ok(())),
        FlattenMode::Async => {
            flattener.start_async()?;
            let outcome = flattener.join();
            (flattener.drain_results(), outcome)
        }
    };

    if !args.quiet {
        print_results(&results, args.json, out)?;
    }

    if args.summary {
        FlattenSummary::from_results(&results, start_time.elapsed()).print_summary();
    }

    outcome
}

fn print_results(results: &[CopyResult], json: bool, out: &mut impl Write) -> Result<()> {
    for result in results {
        let written = if json {
            serde_json::to_string(result)
                .map_err(std::io::Error::other)
                .and_then(|line| writeln!(out, "{}", line))
        } else {
            writeln!(out, "{}", result)
        };
        written.map_err(|e| FlattenError::io("<stdout>", e))?;
    }

    out.flush().map_err(|e| FlattenError::io("<stdout>", e))
}
