//! Worker thread implementation
//!
//! A [`Worker`] is one concurrent read stream. It owns its read handle, its
//! offset pattern and its buffer, issues reads of one block size for a fixed
//! wall-clock window, and reports how many reads completed.
//!
//! # Loop
//!
//! The clock is checked before every read and the loop continues strictly while
//! the elapsed time is below the configured duration. A read already in flight
//! always completes, so the measured window is never shorter than requested.
//!
//! Reads that come back short (end of medium) are not counted. A failed read
//! ends the worker with [`BenchError::ReadFault`]; nothing is retried.
//!
//! # Example
//!
//! ```
//! use iosweep::config::Pattern;
//! use iosweep::engine::mock::MockDevice;
//! use iosweep::target::DeviceGeometry;
//! use iosweep::util::time::ManualClock;
//! use iosweep::worker::{SampleParams, Worker};
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new());
//! let device = MockDevice::new(65536).with_clock(Arc::clone(&clock), Duration::from_millis(10));
//! let geometry = DeviceGeometry::new(65536, 512).unwrap();
//! let params = SampleParams {
//!     block_size: 512,
//!     pattern: Pattern::Random,
//!     duration: Duration::from_secs(1),
//!     seed: Some(1),
//! };
//!
//! let worker = Worker::open(0, &device, &geometry, &params, clock, Arc::new(AtomicBool::new(false)))?;
//! let result = worker.run()?;
//! assert_eq!(result.ops_completed, 100);
//! # Ok::<(), iosweep::BenchError>(())
//! ```

use crate::config::Pattern;
use crate::distribution::{create_pattern, OffsetPattern};
use crate::engine::{BlockReader, ReadSource};
use crate::error::{BenchError, BenchResult};
use crate::target::DeviceGeometry;
use crate::util::buffer::AlignedBuffer;
use crate::util::time::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Settings shared by every worker of one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleParams {
    /// Bytes per read
    pub block_size: u32,
    /// Offset pattern
    pub pattern: Pattern,
    /// Sampling window
    pub duration: Duration,
    /// Base seed for random offsets; worker `i` uses `seed + i`
    pub seed: Option<u64>,
}

/// Outcome of one worker's loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult {
    /// Full-length reads completed
    pub ops_completed: u64,
    /// Time spent in the loop
    pub elapsed: Duration,
}

impl SampleParams {
    /// Seed for worker `id`, if seeding is enabled
    pub fn worker_seed(&self, id: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(id as u64))
    }
}

/// One read stream with an exclusively-owned device handle
pub struct Worker {
    /// Worker ID, used in logs and error messages
    id: usize,

    /// Private read handle
    reader: Box<dyn BlockReader>,

    /// Offset generator
    pattern: Box<dyn OffsetPattern>,

    /// Destination of every read, one block long
    buffer: AlignedBuffer,

    duration: Duration,
    clock: Arc<dyn Clock>,

    /// Raised on operator interrupt
    stop_flag: Arc<AtomicBool>,
}

impl Worker {
    /// Open a handle on `source` and prepare a worker for one measurement
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Open`] if the handle cannot be opened and
    /// [`BenchError::Config`] if the read buffer cannot be laid out.
    pub fn open(
        id: usize,
        source: &dyn ReadSource,
        geometry: &DeviceGeometry,
        params: &SampleParams,
        clock: Arc<dyn Clock>,
        stop_flag: Arc<AtomicBool>,
    ) -> BenchResult<Self> {
        let reader = source.open().map_err(|source_err| BenchError::Open {
            worker: id,
            path: source.path().to_path_buf(),
            source: source_err,
        })?;

        let buffer = AlignedBuffer::new(
            params.block_size as usize,
            geometry.sector_size_bytes() as usize,
        )
        .map_err(|e| {
            BenchError::Config(format!(
                "cannot allocate {}-byte read buffer: {}",
                params.block_size, e
            ))
        })?;

        let pattern = create_pattern(params.pattern, geometry, params.block_size, params.worker_seed(id));

        Ok(Self {
            id,
            reader,
            pattern,
            buffer,
            duration: params.duration,
            clock,
            stop_flag,
        })
    }

    /// Run the read loop until the sampling window has elapsed
    ///
    /// # Errors
    ///
    /// - [`BenchError::ReadFault`] on the first failed read
    /// - [`BenchError::Interrupted`] once the stop flag is raised
    pub fn run(mut self) -> BenchResult<SampleResult> {
        let block_size = self.buffer.len();
        let start = self.clock.now();
        let mut ops_completed = 0u64;
        let mut short_reads = 0u64;

        trace!(worker = self.id, block_size, "worker loop starting");

        loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= self.duration {
                debug!(
                    worker = self.id,
                    ops_completed,
                    short_reads,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "worker finished"
                );
                return Ok(SampleResult {
                    ops_completed,
                    elapsed,
                });
            }

            if self.stop_flag.load(Ordering::Relaxed) {
                return Err(BenchError::Interrupted);
            }

            let offset = self.pattern.next_offset();
            let bytes_read = self
                .reader
                .read_at(self.buffer.as_mut_slice(), offset)
                .map_err(|source| BenchError::ReadFault {
                    worker: self.id,
                    offset,
                    length: block_size,
                    source,
                })?;

            if bytes_read < block_size {
                short_reads += 1;
                self.pattern.on_short_read();
                continue;
            }

            ops_completed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockDevice;
    use crate::util::time::{ManualClock, MonotonicClock};

    const STEP: Duration = Duration::from_millis(10);

    fn params(block_size: u32, pattern: Pattern, duration: Duration) -> SampleParams {
        SampleParams {
            block_size,
            pattern,
            duration,
            seed: Some(7),
        }
    }

    fn not_stopped() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_ops_match_virtual_clock() {
        let clock = Arc::new(ManualClock::new());
        let device = MockDevice::new(65536).with_clock(Arc::clone(&clock), STEP);
        let geometry = DeviceGeometry::new(65536, 512).unwrap();

        let worker = Worker::open(
            0,
            &device,
            &geometry,
            &params(512, Pattern::Random, Duration::from_secs(1)),
            clock,
            not_stopped(),
        )
        .unwrap();
        let result = worker.run().unwrap();

        // 1 s of virtual time at 10 ms per read
        assert_eq!(result.ops_completed, 100);
        assert_eq!(result.elapsed, Duration::from_secs(1));
        assert_eq!(device.read_count(), 100);
    }

    #[test]
    fn test_elapsed_never_below_duration() {
        let clock = Arc::new(ManualClock::new());
        // 300 ms per read does not divide 1 s: the fourth read overshoots
        let device = MockDevice::new(65536).with_clock(Arc::clone(&clock), Duration::from_millis(300));
        let geometry = DeviceGeometry::new(65536, 512).unwrap();

        let worker = Worker::open(
            0,
            &device,
            &geometry,
            &params(512, Pattern::Random, Duration::from_secs(1)),
            clock,
            not_stopped(),
        )
        .unwrap();
        let result = worker.run().unwrap();

        assert_eq!(result.ops_completed, 4);
        assert_eq!(result.elapsed, Duration::from_millis(1200));
    }

    #[test]
    fn test_sequential_wraparound_not_counted() {
        let clock = Arc::new(ManualClock::new());
        let device = MockDevice::new(4096)
            .with_clock(Arc::clone(&clock), STEP)
            .record_offsets();
        let geometry = DeviceGeometry::new(4096, 512).unwrap();

        let worker = Worker::open(
            0,
            &device,
            &geometry,
            &params(4096, Pattern::Sequential, Duration::from_millis(40)),
            clock,
            not_stopped(),
        )
        .unwrap();
        let result = worker.run().unwrap();

        // full, short (wrap), full, short (wrap)
        assert_eq!(device.offsets(), vec![0, 4096, 0, 4096]);
        assert_eq!(result.ops_completed, 2);
    }

    #[test]
    fn test_random_offsets_aligned() {
        let clock = Arc::new(ManualClock::new());
        let device = MockDevice::new(1 << 20)
            .with_clock(Arc::clone(&clock), Duration::from_millis(1))
            .record_offsets();
        let geometry = DeviceGeometry::new(1 << 20, 512).unwrap();

        let worker = Worker::open(
            0,
            &device,
            &geometry,
            &params(8192, Pattern::Random, Duration::from_millis(500)),
            clock,
            not_stopped(),
        )
        .unwrap();
        worker.run().unwrap();

        let offsets = device.offsets();
        assert_eq!(offsets.len(), 500);
        for offset in offsets {
            assert_eq!(offset % 512, 0);
            assert!(offset + 8192 <= 1 << 20);
        }
    }

    #[test]
    fn test_read_fault_aborts_worker() {
        let clock = Arc::new(ManualClock::new());
        let device = MockDevice::new(65536)
            .with_clock(Arc::clone(&clock), STEP)
            .fail_after(5);
        let geometry = DeviceGeometry::new(65536, 512).unwrap();

        let worker = Worker::open(
            3,
            &device,
            &geometry,
            &params(512, Pattern::Random, Duration::from_secs(1)),
            clock,
            not_stopped(),
        )
        .unwrap();
        let err = worker.run().unwrap_err();

        assert!(matches!(err, BenchError::ReadFault { worker: 3, .. }));
        assert_eq!(device.read_count(), 6);
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let device = MockDevice::new(65536);
        let geometry = DeviceGeometry::new(65536, 512).unwrap();
        let stop = Arc::new(AtomicBool::new(true));

        let worker = Worker::open(
            0,
            &device,
            &geometry,
            &params(512, Pattern::Random, Duration::from_secs(60)),
            Arc::new(MonotonicClock::new()),
            stop,
        )
        .unwrap();

        assert!(worker.run().unwrap_err().is_interrupted());
        assert_eq!(device.read_count(), 0);
    }

    #[test]
    fn test_worker_seed() {
        let mut p = params(512, Pattern::Random, Duration::from_secs(1));
        assert_eq!(p.worker_seed(0), Some(7));
        assert_eq!(p.worker_seed(3), Some(10));
        p.seed = None;
        assert_eq!(p.worker_seed(3), None);
    }

    #[test]
    fn test_open_failure() {
        let device = MockDevice::new(65536).fail_open();
        let geometry = DeviceGeometry::new(65536, 512).unwrap();

        let err = Worker::open(
            2,
            &device,
            &geometry,
            &params(512, Pattern::Random, Duration::from_secs(1)),
            Arc::new(MonotonicClock::new()),
            not_stopped(),
        )
        .err()
        .unwrap();

        assert!(matches!(err, BenchError::Open { worker: 2, .. }));
    }
}
