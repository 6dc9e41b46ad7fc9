//! Block-size sweep
//!
//! [`SweepController`] measures throughput at the starting block size (the
//! sector size, or the requested fixed size), reports it, and then doubles the
//! block size until one of the stop conditions holds:
//!
//! - a fixed block size was requested (exactly one iteration)
//! - the doubled size would reach or exceed the media size
//! - the last measurement no longer exceeds one IO/s per worker
//! - the doubled size no longer fits in a `u32`
//!
//! Iterations are strictly sequential: every worker of iteration *k* has
//! finished before iteration *k + 1* starts.

use super::sampler::AggregateResult;
use super::Measure;
use crate::error::BenchResult;
use crate::output::Reporter;
use crate::target::DeviceGeometry;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// State carried from one iteration to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepState {
    pub current_block_size: u32,
    pub previous_iops: f64,
}

/// Why the sweep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    FixedBlockSize,
    MediaSizeReached,
    ThroughputCollapsed,
    BlockSizeOverflow,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::FixedBlockSize => "fixed block size measured",
            StopReason::MediaSizeReached => "next block size would reach the media size",
            StopReason::ThroughputCollapsed => "throughput fell to one IO/s per worker or less",
            StopReason::BlockSizeOverflow => "next block size overflows",
        };
        f.write_str(text)
    }
}

/// Next step after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue(u32),
    Stop(StopReason),
}

/// Sweep settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    pub num_workers: u32,
    pub fixed_block_size: Option<u32>,
}

impl SweepPolicy {
    /// Block size of the first iteration
    pub fn initial_block_size(&self, geometry: &DeviceGeometry) -> u32 {
        self.fixed_block_size
            .unwrap_or_else(|| geometry.sector_size_bytes())
    }

    /// Decide what follows the iteration described by `state`
    pub fn decide(&self, geometry: &DeviceGeometry, state: &SweepState) -> Decision {
        if self.fixed_block_size.is_some() {
            return Decision::Stop(StopReason::FixedBlockSize);
        }

        if !(state.previous_iops > f64::from(self.num_workers)) {
            return Decision::Stop(StopReason::ThroughputCollapsed);
        }

        match state.current_block_size.checked_mul(2) {
            None => Decision::Stop(StopReason::BlockSizeOverflow),
            Some(next) if u64::from(next) >= geometry.media_size_bytes() => {
                Decision::Stop(StopReason::MediaSizeReached)
            }
            Some(next) => Decision::Continue(next),
        }
    }
}

/// What a finished sweep produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepSummary {
    pub iterations: u32,
    pub stop_reason: StopReason,
    /// Iteration with the highest IO/s
    pub peak_iops: AggregateResult,
    /// Iteration with the highest bandwidth
    pub peak_bandwidth: AggregateResult,
}

/// Drives measurements at doubling block sizes
pub struct SweepController<M: Measure> {
    measurer: M,
    geometry: DeviceGeometry,
    policy: SweepPolicy,
}

impl<M: Measure> SweepController<M> {
    pub fn new(measurer: M, geometry: DeviceGeometry, policy: SweepPolicy) -> Self {
        Self {
            measurer,
            geometry,
            policy,
        }
    }

    /// Run the sweep, reporting each iteration as soon as it is measured
    ///
    /// # Errors
    ///
    /// Any measurement failure or report write failure ends the sweep; results
    /// already reported stay reported.
    pub fn run(&self, reporter: &mut dyn Reporter) -> BenchResult<SweepSummary> {
        let mut block_size = self.policy.initial_block_size(&self.geometry);
        let mut iterations = 0u32;
        let mut peak: Option<(AggregateResult, AggregateResult)> = None;

        loop {
            let result = self.measurer.measure(block_size)?;
            iterations += 1;
            reporter.report(&result)?;

            peak = Some(match peak {
                None => (result, result),
                Some((best_iops, best_bandwidth)) => (
                    if result.iops_total > best_iops.iops_total { result } else { best_iops },
                    if result.bandwidth_bytes_per_sec > best_bandwidth.bandwidth_bytes_per_sec {
                        result
                    } else {
                        best_bandwidth
                    },
                ),
            });

            let state = SweepState {
                current_block_size: block_size,
                previous_iops: result.iops_total,
            };

            match self.policy.decide(&self.geometry, &state) {
                Decision::Continue(next) => {
                    debug!(from = block_size, to = next, iops = result.iops_total, "doubling block size");
                    block_size = next;
                }
                Decision::Stop(stop_reason) => {
                    info!(iterations, %stop_reason, "sweep finished");
                    // peak is always set after the first iteration
                    let (peak_iops, peak_bandwidth) = peak.unwrap_or((result, result));
                    let summary = SweepSummary {
                        iterations,
                        stop_reason,
                        peak_iops,
                        peak_bandwidth,
                    };
                    reporter.finish(&summary)?;
                    return Ok(summary);
                }
            }
        }
    }
}
