//! Coercion of user-entered numbers.
//!
//! Nothing here fails. Quantity falls back to 1, price and tax fall back
//! to 0, so the ledger never sees a malformed value. Text is read the way
//! a browser number field does: the longest numeric prefix counts, the
//! rest is ignored (`"12abc"` is 12).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn default_quantity() -> u32 {
    1
}

/// Parse a quantity field. Invalid, zero or negative input gives 1.
pub fn parse_quantity(text: &str) -> u32 {
    match integer_prefix(text) {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Parse a unit price field. Invalid, non-finite or negative input gives 0.
pub fn parse_price(text: &str) -> f64 {
    decimal_prefix(text).map_or(0.0, coerce_price)
}

/// Parse a tax-percent field. Like price, additionally capped at 100.
pub fn parse_tax(text: &str) -> f64 {
    decimal_prefix(text).map_or(0.0, coerce_tax)
}

pub fn coerce_quantity(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.trunc().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

pub fn coerce_price(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn coerce_tax(value: f64) -> f64 {
    coerce_price(value).min(100.0)
}

/// Leading optionally-signed integer, e.g. `" 42kg"` → 42.
fn integer_prefix(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (sign, rest) = split_sign(s);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

/// Leading optionally-signed decimal with an optional exponent,
/// e.g. `"1.5e2 USD"` → 150.
fn decimal_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    // Exponent only counts when at least one digit follows it.
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

fn split_sign(s: &str) -> (i64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (1, rest)
    } else {
        (1, s)
    }
}

fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => decimal_prefix(s),
        _ => None,
    }
}

pub(crate) fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::String(s) => parse_quantity(s),
        other => value_as_number(other).map_or(1, coerce_quantity),
    })
}

pub(crate) fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_number(&value).map_or(0.0, coerce_price))
}

pub(crate) fn lenient_tax<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_number(&value).map_or(0.0, coerce_tax))
}
