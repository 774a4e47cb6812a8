//! Tolerant readers for values that arrive from operator forms or older rows.
//!
//! Stored records mix numbers, numeric strings and empty strings for the same
//! field. Everything is funnelled through these helpers so the rest of the
//! crate only sees one schema.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use super::models::MAX_ROUNDS_PER_DAY;

/// Reads an integer out of a JSON number or a numeric string.
///
/// Floats are truncated toward zero; anything else (empty string, text,
/// null, objects) yields `None`.
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s.trim()),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Non-negative count; negatives clamp to zero.
pub fn to_count(value: &Value) -> Option<u32> {
    to_i64(value).map(|n| n.clamp(0, u32::MAX as i64) as u32)
}

// Mirrors form-field integer parsing: "12abc" reads as 12, "abc" as nothing.
fn parse_leading_int(text: &str) -> Option<i64> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

pub fn points_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_i64(&value).unwrap_or(0))
}

pub fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_count(&value).unwrap_or(0))
}

/// Schedule round count, clamped to `MAX_ROUNDS_PER_DAY`.
pub fn rounds_per_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_count(&value).unwrap_or(0).min(MAX_ROUNDS_PER_DAY))
}

/// Empty input stays `None` so "not entered" is distinguishable from zero.
pub fn optional_points<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_i64(&value))
}

pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_count(&value))
}

pub fn kill_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(kill_map_from_value(&value))
}

pub fn kill_map_from_value(value: &Value) -> BTreeMap<String, Option<u32>> {
    match value {
        Value::Object(entries) => entries
            .iter()
            .map(|(member, kills)| (member.clone(), to_count(kills)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_i64_accepts_numbers_and_numeric_strings() {
        assert_eq!(to_i64(&json!(7)), Some(7));
        assert_eq!(to_i64(&json!(7.9)), Some(7));
        assert_eq!(to_i64(&json!("12")), Some(12));
        assert_eq!(to_i64(&json!(" -3 ")), Some(-3));
        assert_eq!(to_i64(&json!("4kills")), Some(4));
    }

    #[test]
    fn test_to_i64_rejects_empty_and_text() {
        assert_eq!(to_i64(&json!("")), None);
        assert_eq!(to_i64(&json!("abc")), None);
        assert_eq!(to_i64(&Value::Null), None);
        assert_eq!(to_i64(&json!(true)), None);
    }

    #[test]
    fn test_to_count_clamps_negative() {
        assert_eq!(to_count(&json!(-5)), Some(0));
        assert_eq!(to_count(&json!("3")), Some(3));
    }

    #[test]
    fn test_kill_map_keeps_empty_distinct_from_zero() {
        let map = kill_map_from_value(&json!({"p1": 3, "p2": "", "p3": 0, "p4": "x"}));
        assert_eq!(map.get("p1"), Some(&Some(3)));
        assert_eq!(map.get("p2"), Some(&None));
        assert_eq!(map.get("p3"), Some(&Some(0)));
        assert_eq!(map.get("p4"), Some(&None));
    }
}
