//! Numeric coercions the atomics pipeline relies on.
//!
//! Only the subset needed for indices and operands is modelled: primitives
//! convert per the usual rules, symbols cannot be converted, and objects have
//! no conversion hooks so they all become NaN.

use crate::errors::AtomicsError;
use crate::value::Value;

const TWO_POW_32: f64 = 4_294_967_296.0;

pub fn to_number(value: &Value) -> Result<f64, AtomicsError> {
    let number = match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::SmallInt(i) => f64::from(*i),
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Symbol(_) => return Err(AtomicsError::NotConvertibleToNumber("symbol")),
        Value::ArrayBuffer(_) | Value::TypedArray(_) | Value::Object => f64::NAN,
    };
    Ok(number)
}

/// Coerce to a number, then drop the fractional part.
///
/// NaN maps to `+0`; the sign of a zero and infinities are kept.
pub fn to_integer(value: &Value) -> Result<f64, AtomicsError> {
    to_number(value).map(integer_part)
}

pub fn integer_part(number: f64) -> f64 {
    if number.is_nan() {
        return 0.0;
    }
    number.trunc()
}

/// Low 32 bits of the integer part of `number`, wrapping modulo 2^32.
///
/// Non-finite inputs produce zero.
pub fn to_int32_bits(number: f64) -> u32 {
    if !number.is_finite() {
        return 0;
    }
    number.trunc().rem_euclid(TWO_POW_32) as u32
}

#[inline]
pub fn truncate_to_i32(number: f64) -> i32 {
    to_int32_bits(number) as i32
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [
        ("0x", 16),
        ("0X", 16),
        ("0o", 8),
        ("0O", 8),
        ("0b", 2),
        ("0B", 2),
    ] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // f64::from_str also accepts spellings like "inf" and "NaN"
    let is_decimal_literal = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !is_decimal_literal {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    let mut result = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => result = result * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    result
}
