//! Lenient numeric coercion for loosely-typed payloads.
//!
//! Request bodies may come from HTML forms or hand-written JSON, so
//! numbers can arrive as strings, booleans or nulls. None of these fail a
//! request: anything that does not parse resolves to the caller's default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert a JSON value to `f64`, returning `default` when it can't be read
/// as a finite number.
pub fn to_float(value: &Value, default: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Interpret a JSON value as an on/off flag.
///
/// Accepts booleans, non-zero numbers and the usual form spellings
/// (`"true"`, `"on"`, `"yes"`, `"1"`).
pub fn to_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        ),
        _ => false,
    }
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_float(&value, 0.0))
}

/// Optional number: null or unparseable input is `None`.
pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let n = to_float(&value, f64::NAN);
    Ok(Some(n).filter(|v| v.is_finite()))
}

/// Player counts: negative or unparseable values count as zero.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let n = to_float(&value, 0.0);
    if n <= 0.0 {
        Ok(0)
    } else {
        Ok(n.min(u32::MAX as f64).floor() as u32)
    }
}

pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_flag(&value))
}
