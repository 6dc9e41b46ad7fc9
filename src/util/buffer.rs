//! Sector-aligned read buffers
//!
//! `O_DIRECT` reads require the destination buffer to be aligned to the device's
//! logical sector size. Each worker allocates one [`AlignedBuffer`] sized to the
//! current block size and reuses it for every read of a measurement.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout, LayoutError};
use thiserror::Error;

/// Why a buffer could not be laid out
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer size must be greater than 0")]
    Empty,

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Heap buffer with a caller-chosen power-of-two alignment
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` bytes aligned to `alignment`
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero, `alignment` is not a power of two,
    /// or `size` overflows when rounded up to the alignment.
    pub fn new(size: usize, alignment: usize) -> Result<Self, BufferError> {
        if size == 0 {
            return Err(BufferError::Empty);
        }

        let layout = Layout::from_size_align(size, alignment)?;

        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }

        Ok(Self { ptr, size, layout })
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr points to `size` initialised bytes owned by self.
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr points to `size` initialised bytes exclusively borrowed through self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    /// Size of the buffer in bytes
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Alignment of the buffer
    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Verify that the buffer start is properly aligned
    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.ptr as usize) % self.layout.align() == 0
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout.
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_buffer_creation() {
        let buf = AlignedBuffer::new(4096, 512).unwrap();
        assert_eq!(buf.len(), 4096);
        assert_eq!(buf.alignment(), 512);
        assert!(buf.is_aligned());
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_aligned_buffer_4k_alignment() {
        let buf = AlignedBuffer::new(512, 4096).unwrap();
        assert!(buf.is_aligned());
        assert_eq!(buf.as_slice().len(), 512);
    }

    #[test]
    fn test_invalid_alignment() {
        assert!(AlignedBuffer::new(4096, 1000).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(AlignedBuffer::new(0, 512), Err(BufferError::Empty)));
    }

    #[test]
    fn test_mutable_access() {
        let mut buf = AlignedBuffer::new(1024, 512).unwrap();
        buf.as_mut_slice()[10] = 0xAB;
        assert_eq!(buf.as_slice()[10], 0xAB);
    }
}
