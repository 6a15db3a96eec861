//! Attribute transformation for Fractal-style envelopes
//!
//! Incoming resources arrive as `{ object, attributes }` items (or lists of
//! them under `data`). `from_attributes` turns one attribute bag into the
//! in-memory shape: camelCase keys and epoch-millisecond timestamps.
//! `into_json` goes the other way for request bodies.

use crate::conversions::{camel_case, to_camel_case, to_snake_case, ConvertOptions};
use crate::error::{PteroError, Result};
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys carrying ISO-8601 timestamps on the wire
pub const DATE_KEYS: [&str; 3] = ["created_at", "updated_at", "last_used_at"];

/// Transform a single resource's attribute bag
pub fn from_attributes(raw: &Value) -> Value {
    from_attributes_with(raw, &ConvertOptions::default())
}

/// Transform a single resource's attribute bag with conversion options
pub fn from_attributes_with(raw: &Value, options: &ConvertOptions) -> Value {
    let Value::Object(obj) = raw else {
        return raw.clone();
    };

    let mut out = Map::with_capacity(obj.len());

    for (key, value) in obj {
        if options.ignore.iter().any(|k| k == key) {
            continue;
        }

        let value = if DATE_KEYS.contains(&key.as_str()) {
            parse_timestamp(value)
        } else if options.pass.iter().any(|k| k == key) {
            Some(value.clone())
        } else {
            match value {
                Value::Null => None,
                v => Some(to_camel_case(v, options)),
            }
        };

        if let Some(v) = value {
            let renamed = options.map.get(key).map(String::as_str).unwrap_or(key);
            out.insert(camel_case(renamed), v);
        }
    }

    Value::Object(out)
}

/// Transform every item of a list envelope's `data` array
pub fn from_data(items: &[Value]) -> Vec<Value> {
    from_data_with(items, &ConvertOptions::default())
}

pub fn from_data_with(items: &[Value], options: &ConvertOptions) -> Vec<Value> {
    items
        .iter()
        .map(|item| match item.get("attributes") {
            Some(attrs) => from_attributes_with(attrs, options),
            None => Value::Object(Map::new()),
        })
        .collect()
}

/// Prepare an outgoing request body
pub fn into_json(value: &Value) -> Value {
    into_json_with(value, &ConvertOptions::default())
}

pub fn into_json_with(value: &Value, options: &ConvertOptions) -> Value {
    to_snake_case(value, options)
}

/// Bind a transformed value to a typed DTO
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| PteroError::DeserializeFailed(e.to_string()))
}

/// Serialize an options struct and convert it into a wire body
pub fn encode<T: Serialize>(options: &T, convert: &ConvertOptions) -> Result<Value> {
    let value = serde_json::to_value(options)?;
    Ok(into_json_with(&value, convert))
}

fn parse_timestamp(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) if !s.is_empty() => parse_iso_millis(s).map(Value::from),
        Value::Number(n) => Some(Value::Number(n.clone())),
        _ => None,
    }
}

/// Epoch milliseconds for the ISO-8601 forms the panel emits
///
/// Date-only strings are taken as UTC midnight.
fn parse_iso_millis(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
