//! Engine-native values and JSON sanitization.
//!
//! The engine hands back plain ordered arrays of scalars whose concrete
//! types are its own business. [`RawValue`] models the shapes the adapter
//! treats specially; [`sanitize`] turns any of them into a value that is
//! safe to embed in a JSON response.

use serde_json::Value;

/// A scalar produced by the engine for one (entity, variable, period) cell.
///
/// The set is intentionally open-ended: anything the adapter has no special
/// handling for travels through the `Other` arm untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    Other(Value),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    RawValue::Float(f)
                } else {
                    RawValue::Other(Value::Number(n))
                }
            }
            Value::String(s) => RawValue::Text(s),
            other => RawValue::Other(other),
        }
    }
}

/// Convert an engine scalar into a JSON-safe value.
///
/// - booleans and integers pass through unchanged
/// - NaN and infinite floats become `null` (JSON has no spelling for them)
/// - byte sequences decode as UTF-8, falling back to a lowercase hex string
/// - anything else passes through unchanged
///
/// Pure and total: no input can make this fail.
pub fn sanitize(raw: RawValue) -> Value {
    match raw {
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::Int(i) => Value::from(i),
        RawValue::Float(f) => {
            if f.is_finite() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        RawValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => Value::String(to_hex(err.as_bytes())),
        },
        RawValue::Text(text) => Value::String(text),
        RawValue::Other(value) => value,
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
