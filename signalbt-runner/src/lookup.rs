//! Safe nested lookup into analyzer output.
//!
//! Every helper here answers "value or default" and never fails: a missing
//! key, a `null` anywhere along the path, a non-object intermediate and a
//! non-finite number all fall back to the caller's default.

use serde_json::Value;

/// Walk `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        return None;
    }
    if let Some(n) = current.as_f64() {
        if !n.is_finite() {
            return None;
        }
    }
    Some(current)
}

/// `lookup` with a JSON default.
pub fn safe_get(value: &Value, path: &[&str], default: Value) -> Value {
    lookup(value, path).cloned().unwrap_or(default)
}

/// Finite number at `path`.
pub fn safe_f64(value: &Value, path: &[&str]) -> Option<f64> {
    lookup(value, path)?.as_f64().filter(|n| n.is_finite())
}

/// Non-negative integer at `path`; integral floats are accepted, fractional ones are not.
pub fn safe_u64(value: &Value, path: &[&str]) -> Option<u64> {
    let v = lookup(value, path)?;
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    })
}

/// [`safe_u64`] defaulting to 0.
pub fn safe_count(value: &Value, path: &[&str]) -> u64 {
    safe_u64(value, path).unwrap_or(0)
}
