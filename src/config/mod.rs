//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The result is one immutable [`BenchmarkConfig`] built at startup.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::util::units::UnitMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent workers
pub const DEFAULT_NUM_WORKERS: u32 = 32;

/// Default sampling window per block size, in seconds
pub const DEFAULT_DURATION_SECONDS: u32 = 2;

/// Complete benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// File or block device to read from
    pub device: PathBuf,
    /// Concurrent workers per measurement (>= 1)
    pub num_workers: u32,
    /// Sampling window per block size (>= 1)
    pub duration_seconds: u32,
    /// Offset pattern
    pub pattern: Pattern,
    /// Measure this block size only instead of sweeping
    pub fixed_block_size: Option<u32>,
    /// Bypass the page cache
    pub direct: bool,
    /// Seed for random offsets; worker `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Report rendering
    pub output: OutputConfig,
}

impl BenchmarkConfig {
    /// Configuration with default settings for `device`
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            num_workers: DEFAULT_NUM_WORKERS,
            duration_seconds: DEFAULT_DURATION_SECONDS,
            pattern: Pattern::default(),
            fixed_block_size: None,
            direct: false,
            seed: None,
            output: OutputConfig::default(),
        }
    }

    /// Sampling window as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }
}

/// Read offset pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Uniform random, sector-aligned offsets
    #[default]
    Random,
    /// Consecutive blocks from offset 0, wrapping at the end of the medium
    Sequential,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Random => write!(f, "random"),
            Pattern::Sequential => write!(f, "sequential"),
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per block size
    #[default]
    Text,
    /// One JSON object per block size plus a summary object
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub units: UnitMode,
}
