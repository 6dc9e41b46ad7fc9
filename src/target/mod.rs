//! Device geometry discovery
//!
//! A benchmark target is described by two numbers: its total media size and its
//! native sector size. They are queried once at startup through a
//! [`GeometryProbe`] and the resulting [`DeviceGeometry`] value is handed to the
//! sampler and the sweep controller. Nothing caches it globally.
//!
//! # Probes
//!
//! - **Block devices**: platform ioctls (see [`block`])
//! - **Regular files**: file length and a 512-byte sector (see [`file`])
//!
//! [`platform_probe`] picks the implementation for the running OS; callers only
//! ever see the trait.
//!
//! # Example
//!
//! ```no_run
//! use iosweep::target::{platform_probe, GeometryProbe};
//! use std::path::Path;
//!
//! let probe = platform_probe();
//! let geometry = probe.discover(Path::new("/dev/sdb"))?;
//! println!("{} bytes, {} byte sectors", geometry.media_size_bytes(), geometry.sector_size_bytes());
//! # Ok::<(), iosweep::BenchError>(())
//! ```

pub mod block;
pub mod file;

use crate::error::BenchResult;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Size information for one device or file
///
/// Invariants: the sector size is a non-zero power of two and the media holds at
/// least one sector. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceGeometry {
    media_size_bytes: u64,
    sector_size_bytes: u32,
}

impl DeviceGeometry {
    /// Build a geometry, checking its invariants
    ///
    /// Returns a description of the violated invariant on failure; probes turn it
    /// into a geometry error naming the device.
    pub fn new(media_size_bytes: u64, sector_size_bytes: u32) -> Result<Self, String> {
        if sector_size_bytes == 0 {
            return Err("sector size is zero".to_string());
        }
        if !sector_size_bytes.is_power_of_two() {
            return Err(format!("sector size {} is not a power of two", sector_size_bytes));
        }
        if media_size_bytes < u64::from(sector_size_bytes) {
            return Err(format!(
                "media size {} is smaller than one {}-byte sector",
                media_size_bytes, sector_size_bytes
            ));
        }
        Ok(Self {
            media_size_bytes,
            sector_size_bytes,
        })
    }

    /// Total addressable bytes
    #[inline]
    pub fn media_size_bytes(&self) -> u64 {
        self.media_size_bytes
    }

    /// Native sector size in bytes
    #[inline]
    pub fn sector_size_bytes(&self) -> u32 {
        self.sector_size_bytes
    }

    /// Mask that rounds an offset down to a sector boundary
    #[inline]
    pub fn sector_mask(&self) -> u64 {
        !(u64::from(self.sector_size_bytes) - 1)
    }
}

impl fmt::Display for DeviceGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes, {}-byte sectors",
            self.media_size_bytes, self.sector_size_bytes
        )
    }
}

/// Platform-specific geometry query
///
/// Implementations open the path read-only, query it, and close it again. The
/// probe never keeps the handle.
pub trait GeometryProbe: Send + Sync {
    /// Discover media and sector size of `path`
    ///
    /// # Errors
    ///
    /// Returns a geometry error if the path cannot be opened, is neither a
    /// regular file nor a device, or the platform query is unsupported.
    fn discover(&self, path: &Path) -> BenchResult<DeviceGeometry>;
}

/// Geometry probe for the operating system this binary was built for
pub fn platform_probe() -> Box<dyn GeometryProbe> {
    Box::new(block::BlockProbe::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_valid() {
        let g = DeviceGeometry::new(1_048_576, 512).unwrap();
        assert_eq!(g.media_size_bytes(), 1_048_576);
        assert_eq!(g.sector_size_bytes(), 512);
        assert_eq!(g.sector_mask(), !511u64);
    }

    #[test]
    fn test_geometry_rejects_zero_sector() {
        assert!(DeviceGeometry::new(4096, 0).is_err());
    }

    #[test]
    fn test_geometry_rejects_non_power_of_two() {
        assert!(DeviceGeometry::new(4096, 520).is_err());
    }

    #[test]
    fn test_geometry_rejects_tiny_media() {
        assert!(DeviceGeometry::new(100, 512).is_err());
        assert!(DeviceGeometry::new(512, 512).is_ok());
    }

    #[test]
    fn test_platform_probe_missing_path() {
        let probe = platform_probe();
        let err = probe
            .discover(Path::new("/nonexistent/iosweep-device"))
            .unwrap_err();
        assert!(matches!(err, crate::BenchError::Geometry { .. }));
    }
}
