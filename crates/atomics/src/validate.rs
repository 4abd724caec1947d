//! Request validation: everything that can reject an atomic access runs here,
//! before any shared memory is touched.

use crate::buffer::ArrayBuffer;
use crate::coercion::{to_number, truncate_to_i32};
use crate::errors::AtomicsError;
use crate::typed_array::AtomicKind;
use crate::value::Value;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// An integer view over shared memory, ready for atomic access.
///
/// Borrowed from the `Value` it was validated from, which keeps the backing
/// buffer alive for as long as the view exists.
#[derive(Debug, Clone, Copy)]
pub struct SharedView<'a> {
    kind: AtomicKind,
    base: NonNull<u8>,
    element_count: usize,
    _buffer: PhantomData<&'a ArrayBuffer>,
}

impl<'a> SharedView<'a> {
    #[inline]
    pub fn kind(&self) -> AtomicKind {
        self.kind
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Backing store address plus the view's byte offset.
    #[inline]
    pub fn backing_address(&self) -> NonNull<u8> {
        self.base
    }

    /// Reinterpret cell `index` as the atomic type `A`.
    ///
    /// # Safety
    ///
    /// `index` must have passed [`check_bounds`] against this view, and `A`
    /// must be exactly as wide as one element of `self.kind()`.
    #[inline]
    pub(crate) unsafe fn cell<A>(&self, index: u32) -> &'a A {
        debug_assert_eq!(std::mem::size_of::<A>(), 1 << self.kind.size_log2());
        debug_assert!((index as usize) < self.element_count);

        let offset = (index as usize) << self.kind.size_log2();
        // SAFETY: the view was checked to lie inside its buffer with an
        // element-aligned offset, the caller guarantees `index` is in bounds
        // and the buffer outlives `'a`.
        unsafe { &*self.base.as_ptr().add(offset).cast::<A>() }
    }
}

/// An index that converted to a 32-bit integer without loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedIndex {
    /// Truncated index; may still be negative or past the end.
    pub word: i32,
    /// The coerced numeric value the index came from.
    pub number: f64,
}

impl NormalizedIndex {
    /// The index as an unsigned comparand. Negative indices become huge.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.word as u32
    }
}

/// Accept only integer-kind views over shared buffers.
pub fn validate_shared_view(value: &Value) -> Result<SharedView<'_>, AtomicsError> {
    let Value::TypedArray(view) = value else {
        tracing::trace!(operand = value.type_name(), "Rejected non-view operand");
        return Err(AtomicsError::NotIntegerSharedView(value.type_name()));
    };

    if !view.buffer().is_shared() {
        tracing::trace!(view = view.kind().type_name(), "Rejected view over unshared buffer");
        return Err(AtomicsError::NotIntegerSharedView(view.kind().type_name()));
    }

    let Some(kind) = view.kind().atomic_kind() else {
        tracing::trace!(view = view.kind().type_name(), "Rejected non-integer view");
        return Err(AtomicsError::NotIntegerSharedView(view.kind().type_name()));
    };

    // SAFETY: the byte offset was checked to lie inside the buffer when the
    // view was constructed.
    let base = unsafe { view.buffer().backing_address().add(view.byte_offset()) };

    Ok(SharedView {
        kind,
        base,
        element_count: view.element_count(),
        _buffer: PhantomData,
    })
}

/// Convert an index operand to an exact 32-bit integer.
///
/// Fractional, NaN and out-of-range numbers fail: the truncated integer must
/// convert back to exactly the coerced number.
pub fn normalize_index(value: &Value) -> Result<NormalizedIndex, AtomicsError> {
    if let Value::SmallInt(word) = *value {
        return Ok(NormalizedIndex {
            word,
            number: f64::from(word),
        });
    }

    let number = to_number(value)?;
    let word = truncate_to_i32(number);

    if f64::from(word) != number {
        tracing::trace!(index = number, "Rejected inexact atomic index");
        return Err(AtomicsError::InvalidAtomicIndex);
    }

    Ok(NormalizedIndex { word, number })
}

/// Unsigned `index < element_count`, so negative indices fail too.
pub fn check_bounds(index: NormalizedIndex, element_count: usize) -> Result<u32, AtomicsError> {
    let word = index.as_u32();
    if (word as usize) < element_count {
        Ok(word)
    } else {
        tracing::trace!(index = index.word, element_count, "Rejected out-of-bounds atomic index");
        Err(AtomicsError::InvalidAtomicIndex)
    }
}
