//! Coordinator module
//!
//! Orchestrates workers and aggregates results. [`Benchmark`] ties the pieces
//! together for one run: validate the configuration, discover the device
//! geometry once, then hand a [`sampler::Sampler`] to the
//! [`sweep::SweepController`].

pub mod sampler;
pub mod sweep;

use crate::config::validator::{validate_against_geometry, validate_config};
use crate::config::BenchmarkConfig;
use crate::engine::ReadSource;
use crate::error::BenchResult;
use crate::output::Reporter;
use crate::target::GeometryProbe;
use crate::util::time::{Clock, MonotonicClock};
use sampler::{AggregateResult, Sampler};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use sweep::{SweepController, SweepPolicy, SweepSummary};
use tracing::info;

/// Anything that can measure aggregate throughput at one block size
pub trait Measure {
    fn measure(&self, block_size: u32) -> BenchResult<AggregateResult>;
}

/// One benchmark run against one device
pub struct Benchmark {
    config: BenchmarkConfig,
    source: Arc<dyn ReadSource>,
    clock: Arc<dyn Clock>,
    stop_flag: Arc<AtomicBool>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig, source: Arc<dyn ReadSource>) -> Self {
        Self {
            config,
            source,
            clock: Arc::new(MonotonicClock::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    /// Run the sweep, writing every iteration to `reporter`
    ///
    /// Nothing is read from the device until the configuration has been
    /// validated and the geometry discovered.
    pub fn run(&self, probe: &dyn GeometryProbe, reporter: &mut dyn Reporter) -> BenchResult<SweepSummary> {
        validate_config(&self.config)?;

        let geometry = probe.discover(&self.config.device)?;
        validate_against_geometry(&self.config, &geometry)?;

        info!(
            device = %self.config.device.display(),
            %geometry,
            workers = self.config.num_workers,
            pattern = %self.config.pattern,
            duration_s = self.config.duration_seconds,
            "starting benchmark"
        );

        let sampler = Sampler::new(&self.config, geometry, Arc::clone(&self.source))
            .with_clock(Arc::clone(&self.clock))
            .with_stop_flag(Arc::clone(&self.stop_flag));

        let policy = SweepPolicy {
            num_workers: self.config.num_workers,
            fixed_block_size: self.config.fixed_block_size,
        };

        SweepController::new(sampler, geometry, policy).run(reporter)
    }
}
