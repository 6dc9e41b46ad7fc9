//! Uniform random offsets
//!
//! Offsets are drawn uniformly from `[0, media_size - block_size]` and then
//! rounded down to a sector boundary with a bit mask (sector sizes are powers
//! of two). Rounding down never pushes the block past the end of the medium.
//!
//! Uses the xoshiro256++ PRNG, which is fast enough to call once per read.

use super::OffsetPattern;
use crate::target::DeviceGeometry;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Sector-aligned uniform random offsets
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
    max_offset: u64,
    sector_mask: u64,
}

impl UniformDistribution {
    /// Create a distribution seeded from entropy
    pub fn new(geometry: &DeviceGeometry, block_size: u32) -> Self {
        Self::with_rng(geometry, block_size, Xoshiro256PlusPlus::from_entropy())
    }

    /// Create a distribution with a fixed seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(geometry: &DeviceGeometry, block_size: u32, seed: u64) -> Self {
        Self::with_rng(geometry, block_size, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(geometry: &DeviceGeometry, block_size: u32, rng: Xoshiro256PlusPlus) -> Self {
        Self {
            rng,
            max_offset: geometry
                .media_size_bytes()
                .saturating_sub(u64::from(block_size)),
            sector_mask: geometry.sector_mask(),
        }
    }
}

impl OffsetPattern for UniformDistribution {
    #[inline(always)]
    fn next_offset(&mut self) -> u64 {
        self.rng.gen_range(0..=self.max_offset) & self.sector_mask
    }
}
