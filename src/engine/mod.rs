//! Read engine abstraction
//!
//! Workers never touch file descriptors directly. A [`ReadSource`] hands each
//! worker its own [`BlockReader`], so no positioning state is ever shared
//! between workers.
//!
//! # Engines
//!
//! - **Sync** ([`sync::DeviceSource`]): blocking `pread` against a file or device
//! - **Mock** ([`mock::MockDevice`]): in-memory stub with fault injection, used by tests
//!
//! # Example
//!
//! ```no_run
//! use iosweep::engine::{ReadSource, sync::DeviceSource};
//!
//! let source = DeviceSource::new("/dev/sdb", false);
//! let mut reader = source.open()?;
//! let mut buf = vec![0u8; 4096];
//! let n = reader.read_at(&mut buf, 0)?;
//! assert!(n <= 4096);
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod mock;
pub mod sync;

use std::io;
use std::path::Path;

/// One exclusively-owned read handle
///
/// Implementations must be `Send` so a handle can be moved onto its worker
/// thread. They are not required to be `Sync`.
pub trait BlockReader: Send {
    /// Read up to `buf.len()` bytes at `offset`
    ///
    /// Returns the number of bytes read. A count below `buf.len()` means the
    /// end of the medium was reached.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error if the read fails.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

/// Factory for independent read handles to one device
pub trait ReadSource: Send + Sync {
    /// Open a fresh handle
    fn open(&self) -> io::Result<Box<dyn BlockReader>>;

    /// Path of the device, for error messages
    fn path(&self) -> &Path;
}
