//! Regular file geometry
//!
//! Regular files have no native sector size. Reads are aligned to 512 bytes,
//! the smallest sector size in common use, and the media size is the file
//! length at discovery time.

use super::{DeviceGeometry, GeometryProbe};
use crate::error::{BenchError, BenchResult};
use std::fs::{self, Metadata};
use std::path::Path;

/// Sector size assumed for regular files
pub const DEFAULT_SECTOR_SIZE: u32 = 512;

/// Geometry probe for regular files
#[derive(Debug, Default, Clone, Copy)]
pub struct FileProbe;

impl FileProbe {
    pub fn new() -> Self {
        Self
    }

    /// Geometry from already-fetched metadata
    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> BenchResult<DeviceGeometry> {
        if !metadata.is_file() {
            return Err(BenchError::geometry(path, "not a regular file"));
        }
        DeviceGeometry::new(metadata.len(), DEFAULT_SECTOR_SIZE)
            .map_err(|reason| BenchError::geometry(path, reason))
    }
}

impl GeometryProbe for FileProbe {
    fn discover(&self, path: &Path) -> BenchResult<DeviceGeometry> {
        let metadata = fs::metadata(path)
            .map_err(|e| BenchError::geometry_io(path, "stat failed", e))?;
        Self::from_metadata(path, &metadata)
    }
}
