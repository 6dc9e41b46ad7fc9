//! Configuration validation
//!
//! Checks run in two stages. [`validate_config`] runs before the device is
//! touched at all; [`validate_against_geometry`] runs once the geometry is known
//! and before any worker is spawned.

use super::*;
use crate::error::{BenchError, BenchResult};
use crate::target::DeviceGeometry;

/// Validate complete configuration
pub fn validate_config(config: &BenchmarkConfig) -> BenchResult<()> {
    if config.device.as_os_str().is_empty() {
        return Err(BenchError::Config("device path is empty".to_string()));
    }

    if config.num_workers == 0 {
        return Err(BenchError::Config("num_workers must be at least 1".to_string()));
    }

    if config.duration_seconds == 0 {
        return Err(BenchError::Config("time must be at least 1 second".to_string()));
    }

    if config.fixed_block_size == Some(0) {
        return Err(BenchError::Config("block size must be greater than 0".to_string()));
    }

    Ok(())
}

/// Validate the configuration against the discovered device geometry
pub fn validate_against_geometry(config: &BenchmarkConfig, geometry: &DeviceGeometry) -> BenchResult<()> {
    if let Some(block_size) = config.fixed_block_size {
        let sector = geometry.sector_size_bytes();
        if block_size % sector != 0 {
            return Err(BenchError::Config(format!(
                "block size {} is not a multiple of the {}-byte sector size",
                block_size, sector
            )));
        }
        if u64::from(block_size) > geometry.media_size_bytes() {
            return Err(BenchError::Config(format!(
                "block size {} exceeds media size {}",
                block_size,
                geometry.media_size_bytes()
            )));
        }
    }

    Ok(())
}
