//! iosweep - concurrent read throughput benchmark
//!
//! iosweep measures how many reads per second a block device (or a file)
//! sustains under concurrent load, sweeping the block size from the native
//! sector size upward by doubling.
//!
//! # Architecture
//!
//! - **Sweep**: [`coordinator::sweep::SweepController`] decides the next block size
//! - **Sampling**: [`coordinator::sampler::Sampler`] runs N workers for a fixed window
//! - **Workers**: [`worker::Worker`] owns one device handle and counts completed reads
//! - **Geometry**: [`target::GeometryProbe`] queries media and sector size once
//! - **Output**: text lines or JSON lines through [`output::Reporter`]

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::BenchmarkConfig;
pub use error::{BenchError, BenchResult};
pub use target::DeviceGeometry;

/// Result type used at the CLI and configuration boundary
pub type Result<T> = anyhow::Result<T>;
