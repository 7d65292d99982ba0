//! Configuration settings for FlatCopy
//!
//! Defines the CLI arguments and the runtime configuration of a flatten
//! operation.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// FlatCopy - copy every file of a directory tree into one flat directory
#[derive(Parser, Debug, Clone)]
#[command(name = "flatcopy")]
#[command(author = "FlatCopy Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Flatten a nested directory tree into a single directory")]
#[command(long_about = r#"
FlatCopy copies all files found anywhere under SOURCE into TARGET, dropping
the subdirectory structure. Files whose name already exists in TARGET are
skipped and reported as FAIL.

Examples:
  flatcopy ./photos ./all-photos            # Parallel flatten
  flatcopy ./build ./artifacts --threads 2  # Limit worker count
  flatcopy ./src ./flat --sync --summary    # Single-threaded, with totals
"#)]
pub struct CliArgs {
    /// Source directory
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Flat target directory (created if missing)
    #[arg(value_name = "TARGET")]
    pub target: Option<PathBuf>,

    /// Maximum number of parallel workers (0 = auto-detect)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM", env = "FLATCOPY_THREADS")]
    pub threads: usize,

    /// Use the single-threaded path
    #[arg(long)]
    pub sync: bool,

    /// Print each result as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Show a progress bar on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Print totals after the results
    #[arg(long)]
    pub summary: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress per-file result lines)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// How the flatten is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlattenMode {
    /// Chunked, one OS thread per chunk
    #[default]
    Async,
    /// Single-threaded walk in tree order
    Sync,
}

/// Runtime configuration for one flatten operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Source directory
    pub source: PathBuf,
    /// Flat target directory
    pub target: PathBuf,
    /// Maximum number of workers (0 = auto-detect)
    pub max_workers: usize,
    /// Execution mode
    pub mode: FlattenMode,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            max_workers: 0,
            mode: FlattenMode::Async,
        }
    }
}

impl FlattenConfig {
    /// Create a configuration with auto-detected worker count
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let source = args.source.clone().ok_or("Source directory is required")?;
        let target = args.target.clone().ok_or("Target directory is required")?;

        if source.as_os_str().is_empty() || target.as_os_str().is_empty() {
            return Err("Source and target must not be empty".to_string());
        }

        Ok(Self {
            source,
            target,
            max_workers: args.threads,
            mode: if args.sync { FlattenMode::Sync } else { FlattenMode::Async },
        })
    }

    /// Worker count to use, resolving 0 to the available parallelism
    pub fn effective_workers(&self) -> usize {
        if self.max_workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_workers
        }
    }
}
