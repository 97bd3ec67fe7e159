//! Forgiving field deserializers for semi-structured session JSON.
//!
//! Session records are written by the browser client and may carry `null`,
//! numeric strings or missing keys where the analytics expect numbers. These
//! helpers turn anything unusable into `None` instead of failing the whole
//! record.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::session::{Domain, LogEntry};

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub fn number_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .iter()
        .filter_map(|(key, raw)| value_to_f64(raw).map(|number| (key.clone(), number)))
        .collect())
}

/// Any value that does not fit `T` (wrong shape, `null`) becomes `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|err| {
        log::debug!("replacing malformed field with its default: {err}");
        T::default()
    }))
}

/// Strategy log entries. A non-array log reads as empty and entries that are
/// not objects are skipped.
pub fn log_entries<'de, D>(deserializer: D) -> Result<Vec<LogEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| LogEntry::deserialize(item).ok())
        .collect())
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => Some(raw),
        _ => None,
    })
}

/// Accepts RFC 3339 strings or epoch milliseconds.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

pub fn domain<'de, D>(deserializer: D) -> Result<Option<Domain>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => raw.parse().ok(),
        _ => None,
    })
}
