//! Deserializers for values that arrive as delimited strings
//!
//! Environment variables can only carry strings, so list-valued settings
//! accept either a native list (TOML arrays) or a single delimited string.

use serde::{Deserialize, Deserializer};

use crate::models::Airport;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText<T> {
    List(Vec<T>),
    Text(String),
}

/// Comma-delimited list of strings; blank entries are dropped
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match ListOrText::<String>::deserialize(deserializer)? {
        ListOrText::List(values) => values,
        ListOrText::Text(text) => text.split(',').map(str::to_string).collect(),
    };

    Ok(values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

/// Airport list given as a TOML array, a JSON array string, or the legacy
/// `-`-delimited sequence of JSON objects
pub fn airports<'de, D>(deserializer: D) -> Result<Vec<Airport>, D::Error>
where
    D: Deserializer<'de>,
{
    match ListOrText::<Airport>::deserialize(deserializer)? {
        ListOrText::List(airports) => Ok(airports),
        ListOrText::Text(text) => parse_airport_list(&text).map_err(serde::de::Error::custom),
    }
}

pub fn parse_airport_list(text: &str) -> Result<Vec<Airport>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if text.starts_with('[') {
        return serde_json::from_str(text).map_err(|e| format!("Invalid airport list: {e}"));
    }

    text.split('-')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            serde_json::from_str::<Airport>(item)
                .map_err(|e| format!("Invalid airport entry '{item}': {e}"))
        })
        .collect()
}
