//! Entry points taking raw operands and returning a result value.

use crate::dispatch::{AtomicRequest, Operation};
use crate::errors::AtomicsError;
use crate::validate::{normalize_index, validate_shared_view};
use crate::value::Value;

const BYTE_LENGTH_GETTER: &str = "get SharedArrayBuffer.prototype.byteLength";

/// Atomically read `array[index]`.
pub fn atomics_load(array: &Value, index: &Value) -> Result<Value, AtomicsError> {
    run(array, index, Operation::Load)
}

/// Atomically write `value` to `array[index]`.
///
/// Returns the operand after integer coercion, before narrowing to the
/// element width.
pub fn atomics_store(array: &Value, index: &Value, value: &Value) -> Result<Value, AtomicsError> {
    run(array, index, Operation::Store(value))
}

/// Atomically replace `array[index]` with `value`, returning the old element.
pub fn atomics_exchange(
    array: &Value,
    index: &Value,
    value: &Value,
) -> Result<Value, AtomicsError> {
    run(array, index, Operation::Exchange(value))
}

fn run<'a>(
    array: &'a Value,
    index: &Value,
    operation: Operation<'a>,
) -> Result<Value, AtomicsError> {
    let view = validate_shared_view(array)?;
    let index = normalize_index(index)?;

    AtomicRequest {
        operation,
        view,
        index,
    }
    .execute()
}

/// Byte length of a shared buffer; any other receiver is rejected.
pub fn shared_array_buffer_byte_length(receiver: &Value) -> Result<Value, AtomicsError> {
    match receiver {
        Value::ArrayBuffer(buffer) if buffer.is_shared() => {
            Ok(Value::from_f64(buffer.byte_length() as f64))
        }
        _ => Err(AtomicsError::IncompatibleReceiver {
            method: BYTE_LENGTH_GETTER,
            receiver: receiver.type_name(),
        }),
    }
}
