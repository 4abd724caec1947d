use crate::buffer::ArrayBuffer;
use crate::typed_array::TypedArray;
use std::sync::Arc;

/// Lower bound of the compact integer encoding.
pub const SMALL_INT_MIN: i32 = -(1 << 30);
/// Upper bound of the compact integer encoding.
pub const SMALL_INT_MAX: i32 = (1 << 30) - 1;

/// A host value handed to, or returned from, an entry point.
///
/// Numbers have two encodings: `SmallInt` for integers inside
/// `SMALL_INT_MIN..=SMALL_INT_MAX` and `Number` for everything else.
/// Constructors in this module always pick the compact one when it fits.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    SmallInt(i32),
    Number(f64),
    String(String),
    Symbol(String),
    ArrayBuffer(Arc<ArrayBuffer>),
    TypedArray(TypedArray),
    Object,
}

impl Value {
    pub fn from_f64(number: f64) -> Self {
        let is_negative_zero = number == 0.0 && number.is_sign_negative();
        if number.fract() == 0.0
            && !is_negative_zero
            && number >= f64::from(SMALL_INT_MIN)
            && number <= f64::from(SMALL_INT_MAX)
        {
            Value::SmallInt(number as i32)
        } else {
            Value::Number(number)
        }
    }

    fn from_integer(integer: i64) -> Self {
        if (i64::from(SMALL_INT_MIN)..=i64::from(SMALL_INT_MAX)).contains(&integer) {
            Value::SmallInt(integer as i32)
        } else {
            Value::Number(integer as f64)
        }
    }

    /// Numeric payload of a number value, `None` for everything else.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::SmallInt(i) => Some(f64::from(*i)),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::SmallInt(_) | Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::ArrayBuffer(buffer) => buffer.type_name(),
            Value::TypedArray(view) => view.kind().type_name(),
            Value::Object => "Object",
        }
    }
}

macro_rules! impl_from_narrow_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::SmallInt(i32::from(value))
                }
            }
        )*
    };
}

macro_rules! impl_from_word {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::from_integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_narrow_int!(i8, u8, i16, u16);
impl_from_word!(i32, u32);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::from_f64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<TypedArray> for Value {
    fn from(view: TypedArray) -> Self {
        Value::TypedArray(view)
    }
}

impl From<Arc<ArrayBuffer>> for Value {
    fn from(buffer: Arc<ArrayBuffer>) -> Self {
        Value::ArrayBuffer(buffer)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Object, Value::Object) => false,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::SmallInt(a), Value::SmallInt(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(_), Value::Symbol(_)) => false,
            (Value::ArrayBuffer(a), Value::ArrayBuffer(b)) => Arc::ptr_eq(a, b),
            (Value::TypedArray(a), Value::TypedArray(b)) => {
                Arc::ptr_eq(a.buffer(), b.buffer())
                    && a.kind() == b.kind()
                    && a.byte_offset() == b.byte_offset()
                    && a.element_count() == b.element_count()
            }
            _ => false,
        }
    }
}
