//! Stub device for testing
//!
//! [`MockDevice`] answers reads from a fixed-size virtual medium without touching
//! the filesystem. It can advance a [`ManualClock`] per read so worker loops run
//! on virtual time, fail after a given number of reads, hold every read behind a
//! [`Gate`], and record the offsets it was asked for.
//!
//! # Example
//!
//! ```
//! use iosweep::engine::{ReadSource, mock::MockDevice};
//!
//! let device = MockDevice::new(65536).record_offsets();
//! let mut reader = device.open().unwrap();
//! let mut buf = vec![0u8; 512];
//! assert_eq!(reader.read_at(&mut buf, 0).unwrap(), 512);
//! assert_eq!(device.offsets(), vec![0]);
//! ```

use super::{BlockReader, ReadSource};
use crate::util::time::ManualClock;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Barrier that holds reads until opened
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every waiting and future read
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
    }
}

/// Counters shared by every handle of one mock device
#[derive(Debug, Default)]
struct Shared {
    reads: AtomicU64,
    opens: AtomicUsize,
    offsets: Mutex<Vec<u64>>,
}

/// In-memory stub implementing [`ReadSource`]
///
/// Clones share counters, so a test can keep one clone and hand another to
/// the sampler.
#[derive(Debug, Clone)]
pub struct MockDevice {
    path: PathBuf,
    size: u64,
    clock: Option<(Arc<ManualClock>, Duration)>,
    fail_after: Option<u64>,
    fail_open: bool,
    panic_open: bool,
    gate: Option<Arc<Gate>>,
    record: bool,
    shared: Arc<Shared>,
}

impl MockDevice {
    /// Stub medium of `size` bytes on which every read succeeds instantly
    pub fn new(size: u64) -> Self {
        Self {
            path: PathBuf::from("mock://device"),
            size,
            clock: None,
            fail_after: None,
            fail_open: false,
            panic_open: false,
            gate: None,
            record: false,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Advance `clock` by `step` on every read
    pub fn with_clock(mut self, clock: Arc<ManualClock>, step: Duration) -> Self {
        self.clock = Some((clock, step));
        self
    }

    /// Fail every read after the first `reads` succeed (counted across handles)
    pub fn fail_after(mut self, reads: u64) -> Self {
        self.fail_after = Some(reads);
        self
    }

    /// Make `open` fail
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make `open` panic
    pub fn panic_open(mut self) -> Self {
        self.panic_open = true;
        self
    }

    /// Block every read until `gate` is opened
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Keep a log of requested offsets
    pub fn record_offsets(mut self) -> Self {
        self.record = true;
        self
    }

    /// Total reads attempted across all handles
    pub fn read_count(&self) -> u64 {
        self.shared.reads.load(Ordering::SeqCst)
    }

    /// Number of handles opened
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Offsets requested so far, in arrival order
    pub fn offsets(&self) -> Vec<u64> {
        self.shared.offsets.lock().unwrap().clone()
    }
}

impl ReadSource for MockDevice {
    fn open(&self) -> io::Result<Box<dyn BlockReader>> {
        if self.panic_open {
            panic!("mock open panic");
        }
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "mock open failure"));
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockReader {
            device: self.clone(),
        }))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

struct MockReader {
    device: MockDevice,
}

impl BlockReader for MockReader {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let device = &self.device;

        if let Some(gate) = &device.gate {
            gate.wait();
        }

        let index = device.shared.reads.fetch_add(1, Ordering::SeqCst);
        if device.record {
            device.shared.offsets.lock().unwrap().push(offset);
        }
        if let Some((clock, step)) = &device.clock {
            clock.advance(*step);
        }

        if let Some(limit) = device.fail_after {
            if index >= limit {
                return Err(io::Error::new(io::ErrorKind::Other, "mock read fault"));
            }
        }

        if offset >= device.size {
            return Ok(0);
        }
        let available = (device.size - offset).min(buf.len() as u64) as usize;
        buf[..available].fill(0);
        Ok(available)
    }
}
