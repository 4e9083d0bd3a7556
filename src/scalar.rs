//! Primitive scalar types and their lenient coercion from raw values.
//!
//! The typed getters of a dynamically-typed store are forgiving: a port
//! written as `"8080"` still reads as an integer, and a flag written as
//! `"yes"` still reads as `true`. Values that cannot be coerced without
//! losing information (fractional floats into integers, out-of-range
//! numbers, tables, arrays) are rejected.

use toml::Value;

/// A primitive configuration type with a zero value and coercion rules.
pub trait Scalar: Sized + Clone + Send + Sync + 'static {
    /// Name used in coercion errors.
    const TYPE_NAME: &'static str;

    /// The value a declaration falls back to when no default is given.
    fn zero() -> Self;

    /// Convert a raw stored value, or `None` if it cannot be represented.
    fn coerce(raw: &Value) -> Option<Self>;

    fn into_raw(self) -> Value;
}

impl Scalar for String {
    const TYPE_NAME: &'static str = "string";

    fn zero() -> Self {
        String::new()
    }

    fn coerce(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Datetime(d) => Some(d.to_string()),
            Value::Array(_) | Value::Table(_) => None,
        }
    }

    fn into_raw(self) -> Value {
        Value::String(self)
    }
}

impl Scalar for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn zero() -> Self {
        false
    }

    fn coerce(raw: &Value) -> Option<Self> {
        match raw {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => {
                let s = s.trim();
                if ["true", "yes", "on", "1"]
                    .iter()
                    .any(|t| s.eq_ignore_ascii_case(t))
                {
                    Some(true)
                } else if ["false", "no", "off", "0"]
                    .iter()
                    .any(|f| s.eq_ignore_ascii_case(f))
                {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn into_raw(self) -> Value {
        Value::Boolean(self)
    }
}

/// Integer view of a raw value: integers, integral floats, numeric strings.
fn as_i64(raw: &Value) -> Option<i64> {
    match raw {
        Value::Integer(i) => Some(*i),
        Value::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
            Some(*f as i64)
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float view of a raw value: floats, widened integers, numeric strings.
fn as_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Scalar for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn zero() -> Self {
        0
    }

    fn coerce(raw: &Value) -> Option<Self> {
        as_i64(raw).and_then(|i| i32::try_from(i).ok())
    }

    fn into_raw(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl Scalar for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn zero() -> Self {
        0
    }

    fn coerce(raw: &Value) -> Option<Self> {
        as_i64(raw)
    }

    fn into_raw(self) -> Value {
        Value::Integer(self)
    }
}

impl Scalar for f32 {
    const TYPE_NAME: &'static str = "f32";

    fn zero() -> Self {
        0.0
    }

    fn coerce(raw: &Value) -> Option<Self> {
        let f = as_f64(raw)?;
        if f.is_finite() && f.abs() > f32::MAX as f64 {
            return None;
        }
        Some(f as f32)
    }

    fn into_raw(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl Scalar for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn zero() -> Self {
        0.0
    }

    fn coerce(raw: &Value) -> Option<Self> {
        as_f64(raw)
    }

    fn into_raw(self) -> Value {
        Value::Float(self)
    }
}
