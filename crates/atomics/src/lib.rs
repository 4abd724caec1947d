//! Sequentially consistent Load/Store/Exchange on integer views over shared memory.
//!
//! A request flows through four stages, each of which may reject it before any
//! memory is touched:
//!
//! 1. [`validate::validate_shared_view`] checks the operand is an integer view
//!    over a shared buffer and extracts its base address.
//! 2. [`validate::normalize_index`] turns an arbitrary value into an exact
//!    32-bit index.
//! 3. [`validate::check_bounds`] compares the index against the element count.
//! 4. [`dispatch::AtomicRequest::execute`] runs the width-matched hardware
//!    atomic and encodes the result.
//!
//! The [`builtins`] module wires the stages together behind the three entry
//! points.

#[cfg(not(all(
    target_has_atomic = "8",
    target_has_atomic = "16",
    target_has_atomic = "32"
)))]
compile_error!("native 8, 16 and 32-bit atomic instructions are required");

pub mod buffer;
pub mod builtins;
pub mod coercion;
pub mod dispatch;
pub mod errors;
pub mod typed_array;
pub mod validate;
pub mod value;

pub use buffer::ArrayBuffer;
pub use builtins::{
    atomics_exchange, atomics_load, atomics_store, shared_array_buffer_byte_length,
};
pub use errors::{AtomicsError, BufferError, ErrorClass};
pub use typed_array::{ElementKind, TypedArray};
pub use value::Value;
