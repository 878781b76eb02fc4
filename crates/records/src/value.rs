//! Loose conversions over JSON field values.
//!
//! CMS payloads mix numbers, numeric strings and booleans freely, so the
//! filter and the projector go through these helpers instead of matching on
//! `Value` themselves.

use serde_json::{Number, Value};

/// String form of a value, matching what a browser's `String(v)` produces.
///
/// Integral floats lose their fraction (`35.0` → `"35"`), arrays are joined
/// with `,` and nulls inside arrays become empty segments.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) if f.is_finite() && f != 0.0 && (f.abs() >= 1e21 || f.abs() < 1e-6) => {
            exponent_string(f)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `1e+21`, `1.5e-7`: the exponent always carries its sign.
fn exponent_string(f: f64) -> String {
    let formatted = format!("{f:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => formatted,
    }
}

/// Numeric reading of a coordinate value: numbers, or strings that parse as
/// finite floats.
pub fn as_coordinate(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
