//! Block device geometry
//!
//! Raw devices report their size through platform ioctls:
//!
//! - **Linux**: `BLKGETSIZE64` (bytes) and `BLKSSZGET` (logical sector size)
//! - **macOS**: `DKIOCGETBLOCKCOUNT` and `DKIOCGETBLOCKSIZE`
//! - **FreeBSD**: `DIOCGMEDIASIZE` and `DIOCGSECTORSIZE`
//!
//! Regular files are delegated to [`FileProbe`], so a single [`BlockProbe`]
//! handles every path a user can pass on the command line.
//!
//! # Requirements
//!
//! Opening a raw device usually needs root or membership in the `disk` group.

use super::file::FileProbe;
use super::{DeviceGeometry, GeometryProbe};
use crate::error::{BenchError, BenchResult};
use std::fs::File;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

#[cfg(target_os = "linux")]
mod sys {
    use std::io;
    use std::os::unix::io::RawFd;

    // ioctl request codes from <linux/fs.h>
    const BLKGETSIZE64: libc::c_ulong = 0x80081272;
    const BLKSSZGET: libc::c_ulong = 0x1268;

    pub fn query(fd: RawFd) -> io::Result<(u64, u32)> {
        let mut size: u64 = 0;
        // SAFETY: fd is open for the duration of the call and size is a valid u64 out-pointer.
        if unsafe { libc::ioctl(fd, BLKGETSIZE64 as _, &mut size) } < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut sector: libc::c_int = 0;
        // SAFETY: as above, with a c_int out-pointer.
        if unsafe { libc::ioctl(fd, BLKSSZGET as _, &mut sector) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok((size, sector as u32))
    }
}

#[cfg(target_os = "macos")]
mod sys {
    use std::io;
    use std::os::unix::io::RawFd;

    // ioctl request codes from <sys/disk.h>
    const DKIOCGETBLOCKSIZE: libc::c_ulong = 0x40046418;
    const DKIOCGETBLOCKCOUNT: libc::c_ulong = 0x40086419;

    pub fn query(fd: RawFd) -> io::Result<(u64, u32)> {
        let mut block_size: u32 = 0;
        // SAFETY: fd is open and block_size is a valid u32 out-pointer.
        if unsafe { libc::ioctl(fd, DKIOCGETBLOCKSIZE as _, &mut block_size) } < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut block_count: u64 = 0;
        // SAFETY: fd is open and block_count is a valid u64 out-pointer.
        if unsafe { libc::ioctl(fd, DKIOCGETBLOCKCOUNT as _, &mut block_count) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok((block_count.saturating_mul(u64::from(block_size)), block_size))
    }
}

#[cfg(target_os = "freebsd")]
mod sys {
    use std::io;
    use std::os::unix::io::RawFd;

    // ioctl request codes from <sys/disk.h>
    const DIOCGSECTORSIZE: libc::c_ulong = 0x40046480;
    const DIOCGMEDIASIZE: libc::c_ulong = 0x40086481;

    pub fn query(fd: RawFd) -> io::Result<(u64, u32)> {
        let mut media_size: libc::off_t = 0;
        // SAFETY: fd is open and media_size is a valid off_t out-pointer.
        if unsafe { libc::ioctl(fd, DIOCGMEDIASIZE as _, &mut media_size) } < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut sector: libc::c_uint = 0;
        // SAFETY: fd is open and sector is a valid c_uint out-pointer.
        if unsafe { libc::ioctl(fd, DIOCGSECTORSIZE as _, &mut sector) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok((media_size as u64, sector))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
mod sys {
    use std::io;
    use std::os::unix::io::RawFd;

    pub fn query(_fd: RawFd) -> io::Result<(u64, u32)> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "device size query not supported on this platform",
        ))
    }
}

/// Geometry probe for raw devices, falling back to [`FileProbe`] for files
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockProbe;

impl BlockProbe {
    pub fn new() -> Self {
        Self
    }

    fn query_device(path: &Path, fd: RawFd) -> BenchResult<DeviceGeometry> {
        let (media, sector) = sys::query(fd)
            .map_err(|e| BenchError::geometry_io(path, "device size ioctl failed", e))?;
        DeviceGeometry::new(media, sector).map_err(|reason| BenchError::geometry(path, reason))
    }
}

impl GeometryProbe for BlockProbe {
    fn discover(&self, path: &Path) -> BenchResult<DeviceGeometry> {
        let file = File::open(path).map_err(|e| BenchError::geometry_io(path, "open failed", e))?;
        let metadata = file
            .metadata()
            .map_err(|e| BenchError::geometry_io(path, "stat failed", e))?;
        let file_type = metadata.file_type();

        if file_type.is_block_device() || file_type.is_char_device() {
            Self::query_device(path, file.as_raw_fd())
        } else if file_type.is_file() {
            FileProbe::from_metadata(path, &metadata)
        } else {
            Err(BenchError::geometry_io(
                path,
                "not a block device or regular file",
                io::Error::from(io::ErrorKind::InvalidInput),
            ))
        }
    }
}
