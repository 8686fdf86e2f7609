//! Lenient numeric parsing and money formatting
//!
//! Upstream payloads carry numbers as JSON numbers, numeric strings, or
//! strings with unit suffixes ("4oz", "$12.50"). Everything here degrades to
//! zero instead of failing.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parse a physical measure, dropping every character that is not a digit or `.`
///
/// Only the leading number of what remains counts, so a second `.` ends it.
/// `"4oz"` → 4.0, `"2.5"` → 2.5, `"4.5."` → 4.5, `"1.2.3"` → 1.2, `"bad"` → 0.0
pub fn parse_measure(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let end = cleaned
        .match_indices('.')
        .nth(1)
        .map_or(cleaned.len(), |(i, _)| i);
    match cleaned[..end].trim_end_matches('.').parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a monetary amount; keeps a leading minus sign, drops currency symbols
pub fn parse_money(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('-');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match Decimal::from_str(&cleaned) {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) => Decimal::ZERO,
    }
}

/// Round half away from zero to cents
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a monetary amount with exactly two decimals
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

fn value_to_measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0)),
        Value::String(s) => Some(parse_measure(s)),
        _ => None,
    }
}

fn value_to_money(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => parse_money(s),
        _ => Decimal::ZERO,
    }
}

/// `Option<f64>` field: absent/null → None, anything else parsed leniently
pub fn de_opt_measure<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_measure))
}

/// `Decimal` field: absent/null/unparsable → 0
pub fn de_money<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_money).unwrap_or(Decimal::ZERO))
}

/// Identifier field that may arrive as a string or a number; blank → None
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_id))
}

/// Extract an identifier from a string, a number, or an object carrying `_id`/`id`
pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(value_to_id),
        _ => None,
    }
}

/// `String` field accepting strings or numbers; anything else → empty
pub fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_id).unwrap_or_default())
}

/// Boolean flag accepting `true`, `"true"`, `"yes"` or `1`
pub fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        _ => false,
    })
}

/// Quantity field: absent/null/unparsable → 1, negative → 0
pub fn de_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|q| q.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_i64().map(|_| 0))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u32))
            .unwrap_or(1),
        Some(Value::String(s)) => parse_quantity(s.trim()).unwrap_or(1),
        _ => 1,
    })
}

fn parse_quantity(raw: &str) -> Option<u32> {
    if let Ok(q) = raw.parse::<i64>() {
        return Some(q.clamp(0, u32::MAX as i64) as u32);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.max(0.0) as u32)
}

/// Serialize a `Decimal` as a two-decimal string
pub fn serialize_money<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_money(*value))
}
