//! Error taxonomy for the sampling engine
//!
//! Every failure the core can produce surfaces as a [`BenchError`]. Nothing is
//! retried and nothing is downgraded to a partial result: a failed read or an
//! operator interrupt aborts the whole run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by geometry discovery, workers, the sampler and the sweep
#[derive(Debug, Error)]
pub enum BenchError {
    /// Device could not be opened or its size/sector size could not be determined
    #[error("geometry discovery failed for {path}: {reason}")]
    Geometry {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// A worker could not open its own read handle
    #[error("worker {worker}: failed to open {path}: {source}")]
    Open {
        worker: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A read call failed inside a worker loop
    #[error("worker {worker}: read of {length} bytes at offset {offset} failed: {source}")]
    ReadFault {
        worker: usize,
        offset: u64,
        length: usize,
        #[source]
        source: io::Error,
    },

    /// Invalid combination of inputs, rejected before any read is issued
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Operator requested a stop
    #[error("interrupted")]
    Interrupted,

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked instead of returning a result
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// Writing a result line failed
    #[error("failed to write results: {0}")]
    Output(#[from] io::Error),
}

impl BenchError {
    /// Build a geometry error without an underlying OS error
    pub fn geometry(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Geometry {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Build a geometry error wrapping the OS error that caused it
    pub fn geometry_io(path: impl Into<PathBuf>, reason: impl Into<String>, source: io::Error) -> Self {
        Self::Geometry {
            path: path.into(),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// True when the run stopped because of an operator interrupt
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Result alias for core operations
pub type BenchResult<T> = std::result::Result<T, BenchError>;
