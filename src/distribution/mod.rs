//! Read offset patterns
//!
//! A pattern decides where each read of a worker lands. Every worker owns its
//! own pattern instance, so cursors and RNG state are never shared.
//!
//! # Patterns
//!
//! - **Uniform**: random, sector-aligned offsets that keep the whole block on the medium
//! - **Sequential**: a cursor that walks the medium block by block and wraps at the end
//!
//! # Example
//!
//! ```
//! use iosweep::distribution::{OffsetPattern, uniform::UniformDistribution};
//! use iosweep::target::DeviceGeometry;
//!
//! let geometry = DeviceGeometry::new(1 << 20, 512).unwrap();
//! let mut pattern = UniformDistribution::with_seed(&geometry, 4096, 7);
//! let offset = pattern.next_offset();
//! assert_eq!(offset % 512, 0);
//! assert!(offset + 4096 <= 1 << 20);
//! ```

pub mod sequential;
pub mod uniform;

use crate::config::Pattern;
use crate::target::DeviceGeometry;

/// Offset generator owned by one worker
pub trait OffsetPattern: Send {
    /// Byte offset for the next read
    fn next_offset(&mut self) -> u64;

    /// Called when the read at the last offset came back short
    fn on_short_read(&mut self) {}
}

/// Build the pattern a worker uses for one measurement
///
/// `seed` makes random offsets reproducible; `None` seeds from entropy.
pub fn create_pattern(
    pattern: Pattern,
    geometry: &DeviceGeometry,
    block_size: u32,
    seed: Option<u64>,
) -> Box<dyn OffsetPattern> {
    match pattern {
        Pattern::Random => match seed {
            Some(seed) => Box::new(uniform::UniformDistribution::with_seed(geometry, block_size, seed)),
            None => Box::new(uniform::UniformDistribution::new(geometry, block_size)),
        },
        Pattern::Sequential => Box::new(sequential::SequentialDistribution::new(block_size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sequential_pattern() {
        let geometry = DeviceGeometry::new(65536, 512).unwrap();
        let mut pattern = create_pattern(Pattern::Sequential, &geometry, 4096, None);
        assert_eq!(pattern.next_offset(), 0);
        assert_eq!(pattern.next_offset(), 4096);
    }

    #[test]
    fn test_create_seeded_random_pattern_is_reproducible() {
        let geometry = DeviceGeometry::new(1 << 30, 4096).unwrap();
        let mut a = create_pattern(Pattern::Random, &geometry, 4096, Some(99));
        let mut b = create_pattern(Pattern::Random, &geometry, 4096, Some(99));
        for _ in 0..16 {
            assert_eq!(a.next_offset(), b.next_offset());
        }
    }
}
