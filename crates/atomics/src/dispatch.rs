//! Width-matched atomic operations on a validated cell.
//!
//! SAFETY & MEMORY ORDERING:
//!
//! Every access uses the `std::sync::atomic` type exactly as wide as the
//! element, so no access is ever split into smaller pieces, and every access
//! is `Ordering::SeqCst`: all agents observe the operations on one location in
//! a single total order. Signed and unsigned kinds of one width share the same
//! instruction; only the conversion of the returned bits differs.

use crate::coercion::{to_int32_bits, to_integer};
use crate::errors::AtomicsError;
use crate::typed_array::AtomicKind;
use crate::validate::{NormalizedIndex, SharedView, check_bounds};
use crate::value::Value;
use std::sync::atomic::{
    AtomicI8, AtomicI16, AtomicI32, AtomicU8, AtomicU16, AtomicU32, Ordering,
};

/// What to do with the addressed cell. Writes carry their operand.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Load,
    Store(&'a Value),
    Exchange(&'a Value),
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Store(_) => "store",
            Operation::Exchange(_) => "exchange",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AtomicRequest<'a> {
    pub operation: Operation<'a>,
    pub view: SharedView<'a>,
    pub index: NormalizedIndex,
}

impl AtomicRequest<'_> {
    /// Perform the operation and encode its result.
    ///
    /// The index is bounds-checked and the operand coerced before the cell is
    /// touched, so a failing request never writes.
    pub fn execute(&self) -> Result<Value, AtomicsError> {
        self.perform().inspect_err(|err| {
            tracing::trace!(
                op = self.operation.name(),
                view = self.view.kind().element_kind().type_name(),
                index = self.index.word,
                error = %err,
                "Rejected atomic request"
            );
        })
    }

    fn perform(&self) -> Result<Value, AtomicsError> {
        let index = check_bounds(self.index, self.view.element_count())?;

        match self.operation {
            Operation::Load => Ok(self.load(index)),
            Operation::Store(operand) => {
                let integer = to_integer(operand)?;
                self.store(index, to_int32_bits(integer));
                // The coerced operand, not the narrowed value written
                Ok(Value::from_f64(integer))
            }
            Operation::Exchange(operand) => {
                let integer = to_integer(operand)?;
                Ok(self.exchange(index, to_int32_bits(integer)))
            }
        }
    }

    fn load(&self, index: u32) -> Value {
        let view = &self.view;
        // SAFETY (all arms): `index` passed `check_bounds` and each atomic type
        // matches the element width of its kind.
        unsafe {
            match view.kind() {
                AtomicKind::Int8 => view.cell::<AtomicI8>(index).load(Ordering::SeqCst).into(),
                AtomicKind::Uint8 => view.cell::<AtomicU8>(index).load(Ordering::SeqCst).into(),
                AtomicKind::Int16 => view.cell::<AtomicI16>(index).load(Ordering::SeqCst).into(),
                AtomicKind::Uint16 => view.cell::<AtomicU16>(index).load(Ordering::SeqCst).into(),
                AtomicKind::Int32 => view.cell::<AtomicI32>(index).load(Ordering::SeqCst).into(),
                AtomicKind::Uint32 => view.cell::<AtomicU32>(index).load(Ordering::SeqCst).into(),
            }
        }
    }

    fn store(&self, index: u32, bits: u32) {
        let view = &self.view;
        // SAFETY: as in `load`.
        unsafe {
            match view.kind() {
                AtomicKind::Int8 | AtomicKind::Uint8 => {
                    view.cell::<AtomicU8>(index).store(bits as u8, Ordering::SeqCst)
                }
                AtomicKind::Int16 | AtomicKind::Uint16 => {
                    view.cell::<AtomicU16>(index).store(bits as u16, Ordering::SeqCst)
                }
                AtomicKind::Int32 | AtomicKind::Uint32 => {
                    view.cell::<AtomicU32>(index).store(bits, Ordering::SeqCst)
                }
            }
        }
    }

    fn exchange(&self, index: u32, bits: u32) -> Value {
        let view = &self.view;
        // SAFETY: as in `load`.
        unsafe {
            match view.kind() {
                AtomicKind::Int8 => view
                    .cell::<AtomicI8>(index)
                    .swap(bits as i8, Ordering::SeqCst)
                    .into(),
                AtomicKind::Uint8 => view
                    .cell::<AtomicU8>(index)
                    .swap(bits as u8, Ordering::SeqCst)
                    .into(),
                AtomicKind::Int16 => view
                    .cell::<AtomicI16>(index)
                    .swap(bits as i16, Ordering::SeqCst)
                    .into(),
                AtomicKind::Uint16 => view
                    .cell::<AtomicU16>(index)
                    .swap(bits as u16, Ordering::SeqCst)
                    .into(),
                AtomicKind::Int32 => view
                    .cell::<AtomicI32>(index)
                    .swap(bits as i32, Ordering::SeqCst)
                    .into(),
                AtomicKind::Uint32 => view
                    .cell::<AtomicU32>(index)
                    .swap(bits, Ordering::SeqCst)
                    .into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ArrayBuffer;
    use crate::typed_array::{ElementKind, TypedArray};
    use crate::validate::{normalize_index, validate_shared_view};

    fn shared_view(kind: ElementKind, length: usize) -> Value {
        let buffer = ArrayBuffer::new_shared(length * kind.element_size()).unwrap();
        Value::from(TypedArray::over(buffer, kind).unwrap())
    }

    fn run(view: &Value, index: i32, operation: Operation<'_>) -> Result<Value, AtomicsError> {
        AtomicRequest {
            operation,
            view: validate_shared_view(view)?,
            index: normalize_index(&Value::SmallInt(index))?,
        }
        .execute()
    }

    #[test]
    fn test_store_narrows_per_width() {
        let cases: [(ElementKind, f64, Value); 6] = [
            (ElementKind::Int8, 200.0, Value::SmallInt(-56)),
            (ElementKind::Uint8, -1.0, Value::SmallInt(255)),
            (ElementKind::Int16, 40_000.0, Value::SmallInt(-25_536)),
            (ElementKind::Uint16, 65_537.0, Value::SmallInt(1)),
            (ElementKind::Int32, 4_294_967_295.0, Value::SmallInt(-1)),
            (ElementKind::Uint32, -1.0, Value::Number(4_294_967_295.0)),
        ];

        for (kind, operand, expected) in cases {
            let view = shared_view(kind, 2);
            let operand = Value::from_f64(operand);
            run(&view, 1, Operation::Store(&operand)).unwrap();

            assert_eq!(
                run(&view, 1, Operation::Load).unwrap(),
                expected,
                "{kind:?} cell should hold the narrowed value"
            );
            assert_eq!(
                run(&view, 0, Operation::Load).unwrap(),
                Value::SmallInt(0),
                "{kind:?} neighbouring cell must be untouched"
            );
        }
    }

    #[test]
    fn test_store_returns_coerced_operand_not_stored_value() {
        let view = shared_view(ElementKind::Int8, 1);

        let operand = Value::SmallInt(300);
        assert_eq!(
            run(&view, 0, Operation::Store(&operand)).unwrap(),
            Value::SmallInt(300)
        );
        assert_eq!(run(&view, 0, Operation::Load).unwrap(), Value::SmallInt(44));

        let operand = Value::Number(7.8);
        assert_eq!(
            run(&view, 0, Operation::Store(&operand)).unwrap(),
            Value::SmallInt(7)
        );

        let operand = Value::Number(f64::INFINITY);
        assert_eq!(
            run(&view, 0, Operation::Store(&operand)).unwrap(),
            Value::Number(f64::INFINITY)
        );
        assert_eq!(run(&view, 0, Operation::Load).unwrap(), Value::SmallInt(0));
    }

    #[test]
    fn test_store_keeps_sign_of_zero_result() {
        let view = shared_view(ElementKind::Int32, 1);
        let seed = Value::SmallInt(17);

        for operand in [Value::Number(-0.0), Value::Number(-0.5)] {
            run(&view, 0, Operation::Store(&seed)).unwrap();

            let result = run(&view, 0, Operation::Store(&operand)).unwrap();
            match result {
                Value::Number(n) => assert_eq!(
                    n.to_bits(),
                    (-0.0f64).to_bits(),
                    "{operand:?} should return -0"
                ),
                other => panic!("{operand:?} returned {other:?}, expected -0"),
            }
            assert_eq!(
                run(&view, 0, Operation::Load).unwrap(),
                Value::SmallInt(0),
                "The cell holds plain zero"
            );
        }

        let nan = Value::Number(f64::NAN);
        assert_eq!(
            run(&view, 0, Operation::Store(&nan)).unwrap(),
            Value::SmallInt(0),
            "NaN stores and returns +0"
        );
    }

    #[test]
    fn test_exchange_returns_previous_value() {
        let view = shared_view(ElementKind::Uint16, 3);

        let first = Value::SmallInt(1234);
        assert_eq!(
            run(&view, 2, Operation::Exchange(&first)).unwrap(),
            Value::SmallInt(0)
        );

        let second = Value::SmallInt(-2);
        assert_eq!(
            run(&view, 2, Operation::Exchange(&second)).unwrap(),
            Value::SmallInt(1234)
        );
        assert_eq!(
            run(&view, 2, Operation::Load).unwrap(),
            Value::SmallInt(65534)
        );
    }

    #[test]
    fn test_wide_results_leave_compact_encoding() {
        let view = shared_view(ElementKind::Int32, 1);

        let big = Value::Number(2_000_000_000.0);
        run(&view, 0, Operation::Store(&big)).unwrap();
        assert_eq!(
            run(&view, 0, Operation::Load).unwrap(),
            Value::Number(2_000_000_000.0)
        );

        let small = Value::SmallInt(5);
        assert_eq!(
            run(&view, 0, Operation::Exchange(&small)).unwrap(),
            Value::Number(2_000_000_000.0)
        );
    }

    #[test]
    fn test_failed_operand_coercion_leaves_cell_untouched() {
        let view = shared_view(ElementKind::Int32, 1);
        let seed = Value::SmallInt(9);
        run(&view, 0, Operation::Store(&seed)).unwrap();

        let symbol = Value::Symbol("v".into());
        assert_eq!(
            run(&view, 0, Operation::Exchange(&symbol)).unwrap_err(),
            AtomicsError::NotConvertibleToNumber("symbol")
        );
        assert_eq!(
            run(&view, 0, Operation::Store(&symbol)).unwrap_err(),
            AtomicsError::NotConvertibleToNumber("symbol")
        );
        assert_eq!(run(&view, 0, Operation::Load).unwrap(), Value::SmallInt(9));
    }

    #[test]
    fn test_execute_rechecks_bounds() {
        let view = shared_view(ElementKind::Uint8, 2);
        assert_eq!(
            run(&view, 2, Operation::Load).unwrap_err(),
            AtomicsError::InvalidAtomicIndex
        );
    }

    #[test]
    fn test_operation_names() {
        let operand = Value::Undefined;
        assert_eq!(Operation::Load.name(), "load");
        assert_eq!(Operation::Store(&operand).name(), "store");
        assert_eq!(Operation::Exchange(&operand).name(), "exchange");
    }
}
