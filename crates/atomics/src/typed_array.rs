use crate::buffer::ArrayBuffer;
use crate::errors::BufferError;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Largest element count a view may expose.
///
/// Keeping it within `i32::MAX` means a negative 32-bit index reinterpreted
/// as unsigned is always out of bounds.
pub const MAX_ELEMENT_COUNT: usize = i32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    pub const fn element_size(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 => 8,
        }
    }

    /// The atomics-eligible kind, or `None` for float and clamped views.
    pub const fn atomic_kind(self) -> Option<AtomicKind> {
        match self {
            ElementKind::Int8 => Some(AtomicKind::Int8),
            ElementKind::Uint8 => Some(AtomicKind::Uint8),
            ElementKind::Int16 => Some(AtomicKind::Int16),
            ElementKind::Uint16 => Some(AtomicKind::Uint16),
            ElementKind::Int32 => Some(AtomicKind::Int32),
            ElementKind::Uint32 => Some(AtomicKind::Uint32),
            ElementKind::Uint8Clamped | ElementKind::Float32 | ElementKind::Float64 => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "int8",
            ElementKind::Uint8 => "uint8",
            ElementKind::Uint8Clamped => "uint8clamped",
            ElementKind::Int16 => "int16",
            ElementKind::Uint16 => "uint16",
            ElementKind::Int32 => "int32",
            ElementKind::Uint32 => "uint32",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
        }
    }

    pub const fn type_name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8Array",
            ElementKind::Uint8 => "Uint8Array",
            ElementKind::Uint8Clamped => "Uint8ClampedArray",
            ElementKind::Int16 => "Int16Array",
            ElementKind::Uint16 => "Uint16Array",
            ElementKind::Int32 => "Int32Array",
            ElementKind::Uint32 => "Uint32Array",
            ElementKind::Float32 => "Float32Array",
            ElementKind::Float64 => "Float64Array",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown element kind: {0}")]
pub struct ParseElementKindError(String);

impl FromStr for ElementKind {
    type Err = ParseElementKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| ParseElementKindError(s.to_string()))
    }
}

/// The integer element kinds atomics operate on.
///
/// Converting from [`ElementKind`] is the only way to obtain one, so code
/// that matches on it never needs a fallback arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
}

impl AtomicKind {
    /// Shift turning an element index into a byte offset.
    #[inline]
    pub const fn size_log2(self) -> u32 {
        match self {
            AtomicKind::Int8 | AtomicKind::Uint8 => 0,
            AtomicKind::Int16 | AtomicKind::Uint16 => 1,
            AtomicKind::Int32 | AtomicKind::Uint32 => 2,
        }
    }

    pub const fn element_kind(self) -> ElementKind {
        match self {
            AtomicKind::Int8 => ElementKind::Int8,
            AtomicKind::Uint8 => ElementKind::Uint8,
            AtomicKind::Int16 => ElementKind::Int16,
            AtomicKind::Uint16 => ElementKind::Uint16,
            AtomicKind::Int32 => ElementKind::Int32,
            AtomicKind::Uint32 => ElementKind::Uint32,
        }
    }
}

/// A typed window over an [`ArrayBuffer`].
///
/// Offset alignment and extent are checked once here; afterwards every
/// element index below `element_count` addresses an aligned cell inside the
/// buffer.
#[derive(Debug, Clone)]
pub struct TypedArray {
    buffer: Arc<ArrayBuffer>,
    kind: ElementKind,
    byte_offset: usize,
    element_count: usize,
}

impl TypedArray {
    pub fn new(
        buffer: Arc<ArrayBuffer>,
        kind: ElementKind,
        byte_offset: usize,
        element_count: usize,
    ) -> Result<Self, BufferError> {
        let element_size = kind.element_size();

        if byte_offset % element_size != 0 {
            return Err(BufferError::MisalignedOffset {
                offset: byte_offset,
                element_size,
            });
        }

        if element_count > MAX_ELEMENT_COUNT {
            return Err(BufferError::LengthTooLarge(element_count));
        }

        let byte_length = element_count * element_size;
        let in_range = byte_offset
            .checked_add(byte_length)
            .is_some_and(|end| end <= buffer.byte_length());
        if !in_range {
            return Err(BufferError::OutOfRange {
                offset: byte_offset,
                byte_length,
                buffer_length: buffer.byte_length(),
            });
        }

        Ok(Self {
            buffer,
            kind,
            byte_offset,
            element_count,
        })
    }

    /// View the whole buffer.
    pub fn over(buffer: Arc<ArrayBuffer>, kind: ElementKind) -> Result<Self, BufferError> {
        let element_size = kind.element_size();
        let byte_length = buffer.byte_length();

        if byte_length % element_size != 0 {
            return Err(BufferError::MisalignedLength {
                byte_length,
                element_size,
            });
        }

        Self::new(buffer, kind, 0, byte_length / element_size)
    }

    #[inline]
    pub fn buffer(&self) -> &Arc<ArrayBuffer> {
        &self.buffer
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    #[inline]
    pub fn byte_length(&self) -> usize {
        self.element_count * self.kind.element_size()
    }
}
