//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// iosweep - concurrent read throughput benchmark for block devices and files
///
/// Measures IO/s and bandwidth at doubling block sizes, starting from the
/// device's sector size, until throughput collapses or the block reaches the
/// size of the medium.
#[derive(Parser, Debug, Default)]
#[command(name = "iosweep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Device or file to benchmark
    ///
    /// May be omitted when a config file names the device.
    #[arg(value_name = "DEVICE")]
    pub device: Option<PathBuf>,

    /// Number of concurrent workers [default: 32]
    #[arg(short = 'n', long, env = "IOSWEEP_WORKERS")]
    pub num_workers: Option<u32>,

    /// Sampling time per block size (e.g., 2, 2s, 1m) [default: 2s]
    #[arg(short = 't', long, env = "IOSWEEP_TIME")]
    pub time: Option<String>,

    /// Measure a single block size (e.g., 512, 4k, 1M) instead of sweeping
    #[arg(short = 'b', long)]
    pub block_size: Option<String>,

    /// Read pattern [default: random]
    #[arg(short = 'p', long, value_enum)]
    pub pattern: Option<PatternArg>,

    /// Print raw numbers instead of unit-prefixed values
    #[arg(short = 'm', long)]
    pub machine_readable: bool,

    /// Use SI (1000-based) prefixes for byte quantities
    #[arg(long)]
    pub si: bool,

    /// Report format [default: text]
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Bypass the page cache (O_DIRECT / F_NOCACHE)
    #[arg(long)]
    pub direct: bool,

    /// Seed for random offsets (worker i uses seed + i)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML configuration file; command-line options take precedence
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Read pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    Random,
    Sequential,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
