//! Synchronous read engine
//!
//! Uses blocking `pread` so each read is positioned explicitly and no handle
//! carries a file offset between calls.
//!
//! # Features
//!
//! - Positioned reads, no `lseek` round trip
//! - Optional direct IO (`O_DIRECT` on Linux, `F_NOCACHE` on macOS)
//! - Partial reads are retried until the block is complete or EOF is reached

use super::{BlockReader, ReadSource};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Opens read-only handles to a file or block device
#[derive(Debug, Clone)]
pub struct DeviceSource {
    path: PathBuf,
    direct: bool,
}

impl DeviceSource {
    /// Create a source for `path`
    ///
    /// With `direct` set, handles bypass the page cache where the platform
    /// supports it. Buffers passed to `read_at` must then be sector-aligned.
    pub fn new(path: impl Into<PathBuf>, direct: bool) -> Self {
        Self {
            path: path.into(),
            direct,
        }
    }

    fn open_file(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true);
        if self.direct {
            request_direct(&mut options, &self.path);
        }

        let file = options.open(&self.path)?;
        if self.direct {
            disable_cache(&file)?;
        }

        Ok(file)
    }
}

#[cfg(target_os = "linux")]
fn request_direct(options: &mut OpenOptions, _path: &Path) {
    use std::os::unix::fs::OpenOptionsExt;
    options.custom_flags(libc::O_DIRECT);
}

#[cfg(target_os = "macos")]
fn request_direct(_options: &mut OpenOptions, _path: &Path) {}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn request_direct(_options: &mut OpenOptions, path: &Path) {
    tracing::warn!(path = %path.display(), "direct IO not supported on this platform, using buffered reads");
}

#[cfg(target_os = "macos")]
fn disable_cache(file: &File) -> io::Result<()> {
    // SAFETY: file is open; F_NOCACHE takes an int argument.
    if unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn disable_cache(_file: &File) -> io::Result<()> {
    Ok(())
}

impl ReadSource for DeviceSource {
    fn open(&self) -> io::Result<Box<dyn BlockReader>> {
        let file = self.open_file()?;
        Ok(Box::new(SyncReader { file }))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Read handle owned by one worker
pub struct SyncReader {
    file: File,
}

impl BlockReader for SyncReader {
    #[inline(always)]
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let fd = self.file.as_raw_fd();
        let length = buf.len();
        let mut total_read = 0;

        while total_read < length {
            let remaining = &mut buf[total_read..];

            // SAFETY: remaining is a valid writable slice for its whole length and
            // fd stays open while self is borrowed.
            let result = unsafe {
                libc::pread(
                    fd,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    (offset + total_read as u64) as libc::off_t,
                )
            };

            if result < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            if result == 0 {
                // End of medium
                break;
            }

            total_read += result as usize;
        }

        Ok(total_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_device(len: usize) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        tmp.write_all(&data).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn test_sync_read_full_block() {
        let tmp = temp_device(8192);
        let source = DeviceSource::new(tmp.path(), false);
        let mut reader = source.open().unwrap();

        let mut buf = vec![0u8; 512];
        let n = reader.read_at(&mut buf, 1024).unwrap();
        assert_eq!(n, 512);
        assert_eq!(buf[0], (1024 % 251) as u8);
    }

    #[test]
    fn test_sync_read_short_at_end() {
        let tmp = temp_device(4096);
        let source = DeviceSource::new(tmp.path(), false);
        let mut reader = source.open().unwrap();

        let mut buf = vec![0u8; 4096];
        assert_eq!(reader.read_at(&mut buf, 2048).unwrap(), 2048);
        assert_eq!(reader.read_at(&mut buf, 4096).unwrap(), 0);
    }

    #[test]
    fn test_sync_handles_are_independent() {
        let tmp = temp_device(4096);
        let source = DeviceSource::new(tmp.path(), false);
        let mut a = source.open().unwrap();
        let mut b = source.open().unwrap();

        let mut buf_a = vec![0u8; 16];
        let mut buf_b = vec![0u8; 16];
        a.read_at(&mut buf_a, 100).unwrap();
        b.read_at(&mut buf_b, 200).unwrap();
        assert_eq!(buf_a[0], 100);
        assert_eq!(buf_b[0], 200);
    }

    #[test]
    fn test_sync_open_missing_file() {
        let source = DeviceSource::new("/nonexistent/iosweep", false);
        assert!(source.open().is_err());
        assert_eq!(source.path(), Path::new("/nonexistent/iosweep"));
    }
}
