//! Numeric helpers shared by every metric
//!
//! All coercion of feed values to numbers goes through [`parse_numeric_or_zero`]
//! so that partial or malformed records degrade to zero instead of failing.
//! The two averaging conventions used across the crate live here as well:
//! [`mean_over`] (zero-inclusive, fixed divisor) and [`mean_nonzero`]
//! (zero-exclusive).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a finite number, falling back to 0.
///
/// Numbers are taken as-is, strings are read like a lenient float parser
/// (leading numeric prefix, surrounding whitespace ignored). Everything else,
/// including non-finite results, becomes 0.
pub fn parse_numeric_or_zero(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Serde adapter for [`parse_numeric_or_zero`]
///
/// Use with `#[serde(default, deserialize_with = "numeric_or_zero")]`.
pub fn numeric_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_numeric_or_zero(&value))
}

/// Parse the longest leading float literal of `input`
///
/// Accepts an optional sign, digits with an optional fractional part and an
/// optional exponent. Returns `None` when no digit is found.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// `numerator / denominator` when the denominator is positive, else 0
#[inline]
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// `part / whole * 100` when `whole` is positive, else 0
#[inline]
pub fn percent_or_zero(part: f64, whole: f64) -> f64 {
    ratio_or_zero(part, whole) * 100.0
}

/// Zero-inclusive mean: `sum / count`, 0 for an empty count
///
/// The divisor is supplied by the caller so that entries which were guarded
/// to zero still pull the mean down.
#[inline]
pub fn mean_over(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Zero-exclusive mean: average of the values that are non-zero and finite
///
/// Returns 0 when no value qualifies.
pub fn mean_nonzero<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| *v != 0.0 && v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    mean_over(sum, count)
}
