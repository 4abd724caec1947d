use crate::errors::BufferError;
use memmap2::{MmapMut, MmapOptions};
use std::io;
use std::ptr::NonNull;
use std::sync::Arc;

/// Fixed-length byte storage that typed views point into.
///
/// The memory comes from an anonymous mapping, so it is zero-filled and
/// page-aligned. It is never resized, and it is unmapped only when the last
/// `Arc` is dropped, so any view holding a clone may hand out raw addresses
/// into it.
///
/// A shared buffer may be accessed from several agents at once; every cell
/// access the crate performs on it is a hardware atomic.
#[derive(Debug)]
pub struct ArrayBuffer {
    _map: MmapMut,
    base: NonNull<u8>,
    byte_length: usize,
    shared: bool,
}

// SAFETY: the mapping is owned for the buffer's whole lifetime and, after
// `base` is taken, its bytes are only reached through `base` with
// `std::sync::atomic` types.
unsafe impl Send for ArrayBuffer {}
unsafe impl Sync for ArrayBuffer {}

impl ArrayBuffer {
    /// Allocate a buffer that may be accessed concurrently by several agents.
    pub fn new_shared(byte_length: usize) -> Result<Arc<Self>, BufferError> {
        Self::allocate(byte_length, true)
    }

    /// Allocate a buffer owned by a single agent. Atomics reject views over it.
    pub fn new(byte_length: usize) -> Result<Arc<Self>, BufferError> {
        Self::allocate(byte_length, false)
    }

    fn allocate(byte_length: usize, shared: bool) -> Result<Arc<Self>, BufferError> {
        // The OS refuses zero-length maps
        let mut map = MmapOptions::new().len(byte_length.max(1)).map_anon()?;
        let base = NonNull::new(map.as_mut_ptr())
            .ok_or_else(|| io::Error::other("anonymous map returned a null address"))?;

        tracing::debug!(byte_length, shared, "Allocated array buffer");

        Ok(Arc::new(Self {
            _map: map,
            base,
            byte_length,
            shared,
        }))
    }

    #[inline]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    #[inline]
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Address of the first byte of the backing store.
    #[inline]
    pub fn backing_address(&self) -> NonNull<u8> {
        self.base
    }

    pub(crate) fn type_name(&self) -> &'static str {
        if self.shared {
            "SharedArrayBuffer"
        } else {
            "ArrayBuffer"
        }
    }
}
