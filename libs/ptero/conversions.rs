//! Key case conversion between the panel's wire format and in-memory values
//!
//! The panel speaks snake_case; values handed to callers use camelCase keys.
//! Conversion is purely syntactic: only object keys change, arrays are walked
//! element by element, and every other value is returned as is.
//!
//! ## Options
//!
//! - **ignore**: keys dropped from the output entirely
//! - **map**: keys renamed before case conversion
//! - **pass**: keys whose value is copied without descending into it (the key
//!   itself is still converted)
//!
//! Options apply at every depth of the walk.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Per-call conversion options
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub ignore: Vec<String>,
    pub map: HashMap<String, String>,
    pub pass: Vec<String>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.map.insert(from.into(), to.into());
        self
    }

    pub fn with_pass<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass.extend(keys.into_iter().map(Into::into));
        self
    }

    fn ignores(&self, key: &str) -> bool {
        self.ignore.iter().any(|k| k == key)
    }

    fn passes(&self, key: &str) -> bool {
        self.pass.iter().any(|k| k == key)
    }
}

/// Convert a single snake_case key to camelCase
///
/// Every `_` is dropped and the character after it is uppercased.
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;

    for c in s.chars() {
        if upper_next {
            upper_next = false;
            out.extend(c.to_uppercase());
        } else if c == '_' {
            upper_next = true;
        } else {
            out.push(c);
        }
    }

    out
}

/// Convert a single camelCase key to snake_case
///
/// Only ASCII `A`-`Z` count as uppercase.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Recursively convert object keys to camelCase
pub fn to_camel_case(value: &Value, options: &ConvertOptions) -> Value {
    convert(value, options, camel_case)
}

/// Recursively convert object keys to snake_case
pub fn to_snake_case(value: &Value, options: &ConvertOptions) -> Value {
    convert(value, options, snake_case)
}

fn convert(value: &Value, options: &ConvertOptions, case: fn(&str) -> String) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| convert(item, options, case))
                .collect(),
        ),
        Value::Object(obj) => {
            let mut out = Map::with_capacity(obj.len());

            for (key, v) in obj {
                if options.ignores(key) {
                    continue;
                }

                let renamed = options.map.get(key).map(String::as_str).unwrap_or(key);
                let converted = if options.passes(key) {
                    v.clone()
                } else {
                    convert(v, options, case)
                };

                out.insert(case(renamed), converted);
            }

            Value::Object(out)
        }
        other => other.clone(),
    }
}
