use serde_json::{Number, Value};

use crate::ir::ValueKind;

/// Discriminate a JSON value by shape.
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(n) => classify_number(n),
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

/// Integer iff the value survives a round trip through `i64` unchanged.
/// Purely value-based: `30.0` is an integer, `u64::MAX` is not.
pub fn classify_number(n: &Number) -> ValueKind {
    if n.is_i64() {
        return ValueKind::Integer;
    }
    match n.as_f64() {
        Some(f) if fits_i64(f) => ValueKind::Integer,
        _ => ValueKind::Float,
    }
}

fn fits_i64(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 && (f as i64) as f64 == f
}
