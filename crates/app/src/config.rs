//! Command-line configuration for the `encode`, `decode` and `gencodes`
//! programs.
//!
//! `encode` and `decode` take exactly three positional arguments; anything
//! else is a usage error reported by clap before any file is touched.

use std::path::PathBuf;

use clap::Parser;
use prefix_transcode_core::MAX_CODE_LEN;

/// Arguments shared by `encode` and `decode`.
#[derive(Debug, Clone, Parser)]
#[command(about = "Transcode a file with a prefix-code table")]
pub struct TranscodeArgs {
    /// Codes file: 256 lines of '0'/'1', line i is the code for byte i
    #[arg(value_name = "CODE-FILE")]
    pub code_file: PathBuf,

    /// File to read
    #[arg(value_name = "INFILE")]
    pub infile: PathBuf,

    /// File to write
    #[arg(value_name = "OUTFILE")]
    pub outfile: PathBuf,

    /// Print a size and timing summary to stderr
    #[arg(long)]
    pub stats: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for `gencodes`.
#[derive(Debug, Clone, Parser)]
#[command(about = "Write a random, valid, prefix-free codes file")]
pub struct GenCodesArgs {
    /// Codes file to write
    #[arg(value_name = "OUTFILE")]
    pub outfile: PathBuf,

    /// Random seed for determinism (default: time-based, printed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Longest code to generate, in bits
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u8).range(8..=MAX_CODE_LEN as i64))]
    pub max_len: u8,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenCodesArgs {
    /// The explicit seed, or one derived from the clock.
    pub fn seed_or_now(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|t| t.as_millis() as u64)
                .unwrap_or(0)
        })
    }
}

/// Initialise `env_logger`; `RUST_LOG` wins over the default level.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
