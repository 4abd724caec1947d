use std::io;
use thiserror::Error;

/// Exception class the host should raise for an [`AtomicsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    TypeError,
    RangeError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtomicsError {
    #[error("Method {method} called on incompatible receiver {receiver}")]
    IncompatibleReceiver {
        method: &'static str,
        receiver: &'static str,
    },

    #[error("{0} is not an integer shared typed array")]
    NotIntegerSharedView(&'static str),

    #[error("Invalid atomic access index")]
    InvalidAtomicIndex,

    #[error("Cannot convert a {0} value to a number")]
    NotConvertibleToNumber(&'static str),
}

impl AtomicsError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AtomicsError::InvalidAtomicIndex => ErrorClass::RangeError,
            AtomicsError::IncompatibleReceiver { .. }
            | AtomicsError::NotIntegerSharedView(_)
            | AtomicsError::NotConvertibleToNumber(_) => ErrorClass::TypeError,
        }
    }
}

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Byte offset {offset} is not a multiple of element size {element_size}")]
    MisalignedOffset { offset: usize, element_size: usize },

    #[error("Buffer length {byte_length} is not a multiple of element size {element_size}")]
    MisalignedLength {
        byte_length: usize,
        element_size: usize,
    },

    #[error("View of {byte_length} bytes at offset {offset} exceeds buffer of {buffer_length} bytes")]
    OutOfRange {
        offset: usize,
        byte_length: usize,
        buffer_length: usize,
    },

    #[error("Element count {0} exceeds the maximum view length")]
    LengthTooLarge(usize),
}
