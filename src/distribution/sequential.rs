//! Sequential offsets
//!
//! Walks the medium from offset 0 in steps of one block. The pattern does not
//! know the media size: when a read comes back short the worker reports it and
//! the cursor wraps to 0.

use super::OffsetPattern;

/// Wrapping sequential cursor
#[derive(Debug)]
pub struct SequentialDistribution {
    cursor: u64,
    block_size: u64,
}

impl SequentialDistribution {
    pub fn new(block_size: u32) -> Self {
        Self {
            cursor: 0,
            block_size: u64::from(block_size),
        }
    }
}

impl OffsetPattern for SequentialDistribution {
    fn next_offset(&mut self) -> u64 {
        let offset = self.cursor;
        self.cursor = self.cursor.saturating_add(self.block_size);
        offset
    }

    fn on_short_read(&mut self) {
        self.cursor = 0;
    }
}
