//! Module for coercion: best-effort conversion between value kinds
//!
//! Two independent families live here, and they deliberately do not agree:
//!
//! - The *convert* family ([`convert_bool`](Value::convert_bool),
//!   [`convert_f64`](Value::convert_f64), ...) reinterprets a value as a
//!   requested scalar type where a sensible conversion exists, for example
//!   the string `"1.5"` as the number `1.5`.
//! - The *truthy* family ([`as_truthy`](Value::as_truthy),
//!   [`is_truish`](Value::is_truish), [`is_falsish`](Value::is_falsish))
//!   classifies a value as loosely true, loosely false, or unclassifiable.
//!
//! The families differ on purpose: strict boolean conversion accepts the
//! strings `"0"` and `"1"`, truthy classification does not. Code asking "is
//! this flag set" wants `"1"` to count; code classifying arbitrary data must
//! not guess that a numeric string is a boolean.
//!
//! Unlike the accessors in [`crate::value`], conversions here may allocate
//! (string formatting) and may inspect string content.

use crate::value::{AccessError, Value};

/// Loose three-way boolean classification, see [`Value::as_truthy`]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum Truthy {
    /// Loosely true: `true`, a nonzero finite number, or a string
    /// case-insensitively equal to `"true"`
    Truish,
    /// Loosely false: `null`, `false`, the number `0`, the empty string, or
    /// a string case-insensitively equal to `"false"`
    Falsish,
    /// Not classifiable as a boolean
    Gibberish,
}

impl Value {
    /// Classifies this value as loosely true, loosely false, or neither
    ///
    /// - `null`, `false`, the number `0` and the empty string are
    ///   [`Falsish`](Truthy::Falsish)
    /// - `true` and any other finite number are [`Truish`](Truthy::Truish)
    /// - non-empty strings are classified only if they case-insensitively
    ///   equal `"true"` or `"false"`
    /// - everything else, including objects, arrays and NaN, is
    ///   [`Gibberish`](Truthy::Gibberish)
    ///
    /// Note that numeric strings are *not* classified, while
    /// [`convert_bool`](Value::convert_bool) accepts `"0"` and `"1"`.
    pub fn as_truthy(&self) -> Truthy {
        match self {
            Value::Null => Truthy::Falsish,
            Value::Bool(true) => Truthy::Truish,
            Value::Bool(false) => Truthy::Falsish,
            Value::Number(n) => {
                if *n == 0.0 {
                    Truthy::Falsish
                } else if n.is_finite() {
                    Truthy::Truish
                } else {
                    Truthy::Gibberish
                }
            }
            Value::String(s) => {
                if s.is_empty() || s.eq_ignore_ascii_case("false") {
                    Truthy::Falsish
                } else if s.eq_ignore_ascii_case("true") {
                    Truthy::Truish
                } else {
                    Truthy::Gibberish
                }
            }
            Value::Object(_) | Value::Array(_) => Truthy::Gibberish,
        }
    }

    /// Returns true if this value classifies as loosely true, see
    /// [`as_truthy`](Value::as_truthy)
    pub fn is_truish(&self) -> bool {
        self.as_truthy() == Truthy::Truish
    }

    /// Returns true if this value classifies as loosely false, see
    /// [`as_truthy`](Value::as_truthy)
    pub fn is_falsish(&self) -> bool {
        self.as_truthy() == Truthy::Falsish
    }

    /// Classifies the value at the key, or
    /// [`Gibberish`](Truthy::Gibberish) if this is not an object or the key
    /// is absent
    pub fn truthy_at_key(&self, key: &str) -> Truthy {
        self.get_key(key).map_or(Truthy::Gibberish, Value::as_truthy)
    }

    /// Classifies the value at the index, or
    /// [`Gibberish`](Truthy::Gibberish) if this is not an array or the index
    /// is out of bounds
    pub fn truthy_at_index(&self, index: usize) -> Truthy {
        self.get_index(index)
            .map_or(Truthy::Gibberish, Value::as_truthy)
    }

    /// Returns true if the value at the key classifies as loosely true;
    /// false on any lookup failure
    pub fn is_truish_at_key(&self, key: &str) -> bool {
        self.truthy_at_key(key) == Truthy::Truish
    }

    /// Returns true if the value at the key classifies as loosely false;
    /// false on any lookup failure
    pub fn is_falsish_at_key(&self, key: &str) -> bool {
        self.truthy_at_key(key) == Truthy::Falsish
    }

    /// Returns true if the value at the index classifies as loosely true;
    /// false on any lookup failure
    pub fn is_truish_at_index(&self, index: usize) -> bool {
        self.truthy_at_index(index) == Truthy::Truish
    }

    /// Returns true if the value at the index classifies as loosely false;
    /// false on any lookup failure
    pub fn is_falsish_at_index(&self, index: usize) -> bool {
        self.truthy_at_index(index) == Truthy::Falsish
    }

    /// Converts this value to a string
    ///
    /// `null` becomes the empty string, booleans become `"true"`/`"false"`,
    /// numbers are formatted the way the printer formats them. Objects and
    /// arrays do not convert.
    pub fn convert_string(&self) -> Result<String, AccessError> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Bool(true) => Ok("true".to_owned()),
            Value::Bool(false) => Ok("false".to_owned()),
            Value::Number(n) => Ok(format!("{n}")),
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) | Value::Array(_) => Err(AccessError::WrongType),
        }
    }

    /// Converts this value to a boolean
    ///
    /// `null` converts to false, the number `0` to false and any other
    /// finite number to true. Strings convert on a case-insensitive match
    /// against `"true"`/`"false"`, or exactly `"0"`/`"1"`. Everything else,
    /// including NaN, fails.
    pub fn convert_bool(&self) -> Result<bool, AccessError> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => {
                if *n == 0.0 {
                    Ok(false)
                } else if *n > 0.0 || *n < 0.0 {
                    Ok(true)
                } else {
                    // NaN
                    Err(AccessError::WrongType)
                }
            }
            Value::String(s) => {
                if s.eq_ignore_ascii_case("true") || s == "1" {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") || s == "0" {
                    Ok(false)
                } else {
                    Err(AccessError::WrongType)
                }
            }
            Value::Object(_) | Value::Array(_) => Err(AccessError::WrongType),
        }
    }

    /// Converts this value to a number
    ///
    /// `null` converts to `0.0`. Strings are scanned tolerating ASCII
    /// whitespace at both ends; the scan must consume the entire remainder,
    /// so trailing garbage after the number fails the conversion.
    pub fn convert_f64(&self) -> Result<f64, AccessError> {
        match self {
            Value::Null => Ok(0.0),
            Value::Number(n) => Ok(*n),
            Value::String(s) => s.trim_matches(|c: char| c.is_ascii_whitespace())
                .parse()
                .map_err(|_| AccessError::WrongType),
            _ => Err(AccessError::WrongType),
        }
    }

    /// Converts this value to a 64-bit signed integer
    ///
    /// `null` converts to `0`; numbers truncate toward zero. Strings must
    /// contain a plain decimal integer (tolerating ASCII whitespace at both
    /// ends), so `"1.5"` fails.
    pub fn convert_i64(&self) -> Result<i64, AccessError> {
        match self {
            Value::Null => Ok(0),
            Value::Number(n) => Ok(*n as i64),
            Value::String(s) => s.trim_matches(|c: char| c.is_ascii_whitespace())
                .parse()
                .map_err(|_| AccessError::WrongType),
            _ => Err(AccessError::WrongType),
        }
    }

    /// Converts this value to a 64-bit unsigned integer
    ///
    /// Numbers convert only when non-negative and below 2^53; above that an
    /// `f64` has already lost precision, and a value which must round-trip
    /// exactly has to travel as a string (see
    /// [`set_u64_as_string`](Value::set_u64_as_string)). `null` does not
    /// convert.
    pub fn convert_u64(&self) -> Result<u64, AccessError> {
        match self {
            Value::Number(n) => {
                // The negated comparison also rejects NaN
                if !(*n >= 0.0) || *n >= (1u64 << 53) as f64 {
                    return Err(AccessError::WrongType);
                }
                Ok(*n as u64)
            }
            Value::String(s) => s.trim_matches(|c: char| c.is_ascii_whitespace())
                .parse()
                .map_err(|_| AccessError::WrongType),
            _ => Err(AccessError::WrongType),
        }
    }

    /// Converts to a string, or returns the default if the conversion fails,
    /// see [`convert_string`](Value::convert_string)
    pub fn to_string_or(&self, default: &str) -> String {
        self.convert_string().unwrap_or_else(|_| default.to_owned())
    }

    /// Converts to a boolean, or returns the default if the conversion
    /// fails, see [`convert_bool`](Value::convert_bool)
    pub fn to_bool_or(&self, default: bool) -> bool {
        self.convert_bool().unwrap_or(default)
    }

    /// Converts to a number, or returns the default if the conversion fails,
    /// see [`convert_f64`](Value::convert_f64)
    pub fn to_f64_or(&self, default: f64) -> f64 {
        self.convert_f64().unwrap_or(default)
    }

    /// Converts to a signed integer, or returns the default if the
    /// conversion fails, see [`convert_i64`](Value::convert_i64)
    pub fn to_i64_or(&self, default: i64) -> i64 {
        self.convert_i64().unwrap_or(default)
    }

    /// Converts to an unsigned integer, or returns the default if the
    /// conversion fails, see [`convert_u64`](Value::convert_u64)
    pub fn to_u64_or(&self, default: u64) -> u64 {
        self.convert_u64().unwrap_or(default)
    }
}
