//! Concurrent sampling at one block size
//!
//! [`Sampler::measure`] runs `num_workers` workers in parallel, waits for all of
//! them, and turns their summed operation counts into one IOPS figure.
//!
//! # Lifecycle of a measurement
//!
//! 1. Spawn one thread per worker; each opens its own device handle
//! 2. Every thread reports at the start line once its handle is open (or failed to
//!    open); the start time is taken and all of them are released together
//! 3. Every thread is joined, the end time is taken
//! 4. `iops = Σ ops / (end - start)`, `bandwidth = block_size * iops`
//!
//! No result is produced until every worker has returned. If any worker fails
//! the measurement fails as a whole.

use super::Measure;
use crate::config::BenchmarkConfig;
use crate::engine::ReadSource;
use crate::error::{BenchError, BenchResult};
use crate::target::DeviceGeometry;
use crate::util::time::{calculate_iops, Clock, MonotonicClock};
use crate::worker::{SampleParams, SampleResult, Worker};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Throughput at one block size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    pub block_size_bytes: u32,
    pub iops_total: f64,
    pub bandwidth_bytes_per_sec: f64,
    /// Reads completed across all workers
    pub ops_completed: u64,
    /// Wall-clock span of the measurement
    pub elapsed_seconds: f64,
}

impl AggregateResult {
    /// Combine per-worker results measured over `elapsed`
    pub fn from_samples(block_size: u32, samples: &[SampleResult], elapsed: Duration) -> Self {
        let ops_completed: u64 = samples.iter().map(|s| s.ops_completed).sum();
        let iops_total = calculate_iops(ops_completed, elapsed);

        Self {
            block_size_bytes: block_size,
            iops_total,
            bandwidth_bytes_per_sec: f64::from(block_size) * iops_total,
            ops_completed,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }
}

#[derive(Debug, Default)]
struct StartState {
    arrived: usize,
    go: Option<bool>,
}

/// Start line shared by the workers of one measurement
///
/// Releasing with `false` sends waiting workers home without reading.
#[derive(Debug, Default)]
struct StartLine {
    state: Mutex<StartState>,
    cond: Condvar,
}

impl StartLine {
    /// Report ready and wait for the release; returns whether to run
    fn arrive(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.arrived += 1;
        self.cond.notify_all();

        let state = self
            .cond
            .wait_while(state, |s| s.go.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        state.go.unwrap_or(false)
    }

    /// Block until `workers` threads have arrived
    fn wait_for(&self, workers: usize) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let _state = self
            .cond
            .wait_while(state, |s| s.arrived < workers)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn release(&self, go: bool) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).go = Some(go);
        self.cond.notify_all();
    }
}

/// Runs the configured number of workers against one device
pub struct Sampler {
    num_workers: usize,
    params: SampleParams,
    geometry: DeviceGeometry,
    source: Arc<dyn ReadSource>,
    clock: Arc<dyn Clock>,
    stop_flag: Arc<AtomicBool>,
}

impl Sampler {
    /// Create a sampler on the real monotonic clock
    pub fn new(config: &BenchmarkConfig, geometry: DeviceGeometry, source: Arc<dyn ReadSource>) -> Self {
        Self {
            num_workers: config.num_workers as usize,
            params: SampleParams {
                block_size: geometry.sector_size_bytes(),
                pattern: config.pattern,
                duration: config.duration(),
                seed: config.seed,
            },
            geometry,
            source,
            clock: Arc::new(MonotonicClock::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use `clock` for worker loops and the measurement span
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Abort measurements when `stop_flag` is raised
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    /// Measure aggregate throughput at `block_size`
    ///
    /// Blocks until every worker has finished.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] if `block_size` is not a positive
    /// multiple of the sector size, [`BenchError::Spawn`] if a worker thread
    /// cannot be started, and otherwise the first worker failure. Operator
    /// interrupts are reported only when no worker hit a real fault.
    pub fn measure(&self, block_size: u32) -> BenchResult<AggregateResult> {
        let sector = self.geometry.sector_size_bytes();
        if block_size == 0 || block_size % sector != 0 {
            return Err(BenchError::Config(format!(
                "block size {} is not a positive multiple of the {}-byte sector size",
                block_size, sector
            )));
        }

        if self.stop_flag.load(Ordering::SeqCst) {
            return Err(BenchError::Interrupted);
        }

        let params = SampleParams {
            block_size,
            ..self.params
        };

        let start_line = Arc::new(StartLine::default());
        let mut handles = Vec::with_capacity(self.num_workers);

        for id in 0..self.num_workers {
            let source = Arc::clone(&self.source);
            let clock = Arc::clone(&self.clock);
            let stop_flag = Arc::clone(&self.stop_flag);
            let worker_start = Arc::clone(&start_line);
            let geometry = self.geometry;

            let spawned = thread::Builder::new()
                .name(format!("iosweep-worker-{}", id))
                .spawn(move || {
                    // A panicking open must still reach the start line
                    let worker = panic::catch_unwind(AssertUnwindSafe(|| {
                        Worker::open(id, source.as_ref(), &geometry, &params, clock, stop_flag)
                    }))
                    .unwrap_or_else(|_| Err(BenchError::WorkerPanicked(id)));

                    if !worker_start.arrive() {
                        return Err(BenchError::Interrupted);
                    }
                    worker?.run()
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    warn!(worker = id, error = %source, "failed to spawn worker thread");
                    start_line.release(false);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(BenchError::Spawn { worker: id, source });
                }
            }
        }

        start_line.wait_for(handles.len());
        let start = self.clock.now();
        start_line.release(true);

        let mut samples = Vec::with_capacity(self.num_workers);
        let mut failure: Option<BenchError> = None;

        for (id, handle) in handles.into_iter().enumerate() {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(BenchError::WorkerPanicked(id)));
            match outcome {
                Ok(sample) => samples.push(sample),
                Err(err) => {
                    let replace = match &failure {
                        None => true,
                        Some(existing) => existing.is_interrupted() && !err.is_interrupted(),
                    };
                    if replace {
                        failure = Some(err);
                    }
                }
            }
        }

        let elapsed = self.clock.now().saturating_sub(start);

        if let Some(err) = failure {
            return Err(err);
        }

        let result = AggregateResult::from_samples(block_size, &samples, elapsed);
        debug!(
            block_size,
            workers = self.num_workers,
            ops = result.ops_completed,
            iops = result.iops_total,
            elapsed_s = result.elapsed_seconds,
            "measurement complete"
        );
        Ok(result)
    }
}

impl Measure for Sampler {
    fn measure(&self, block_size: u32) -> BenchResult<AggregateResult> {
        Sampler::measure(self, block_size)
    }
}
