//! Outline Import / Export
//!
//! The exchange format is the storage shape: `{ "outlines": [...] }`.
//! A bare array of outlines is accepted on import as well.

use std::collections::HashSet;

use serde::de::{Deserialize, DeserializeOwned};
use serde::Serialize;
use serde_json::de::Read;
use serde_json::Value;

use crate::config::OUTLINES_KEY;
use crate::domain::{DomainError, DomainResult, Outline};

#[derive(Serialize)]
struct ExportBundle<'a> {
    outlines: &'a [Outline],
}

/// Pretty JSON of the given outlines
pub fn export_outlines(outlines: &[Outline]) -> DomainResult<String> {
    serde_json::to_string_pretty(&ExportBundle { outlines })
        .map_err(|e| DomainError::Storage(format!("Failed to serialize outlines: {}", e)))
}

/// Parse JSON text with no nesting limit.
///
/// Every node level adds two levels of JSON nesting, so deep outlines go
/// past serde_json's default limit of 128. The stack grows on demand instead.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    deserialize_unbounded(serde_json::Deserializer::from_str(json))
}

/// Byte-slice variant of [`from_json_str`]
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    deserialize_unbounded(serde_json::Deserializer::from_slice(bytes))
}

fn deserialize_unbounded<'de, R, T>(mut de: serde_json::Deserializer<R>) -> serde_json::Result<T>
where
    R: Read<'de>,
    T: Deserialize<'de>,
{
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Parse an export produced by `export_outlines` (or a bare array).
///
/// Everything is validated before anything is returned.
pub fn parse_outlines(json: &str) -> DomainResult<Vec<Outline>> {
    let value: Value = from_json_str(json)
        .map_err(|e| DomainError::MalformedImport(format!("Invalid JSON data: {}", e)))?;

    let outlines = match value {
        array @ Value::Array(_) => array,
        Value::Object(mut map) => map.remove(OUTLINES_KEY).ok_or_else(|| {
            DomainError::MalformedImport(format!("Missing '{}' key", OUTLINES_KEY))
        })?,
        _ => {
            return Err(DomainError::MalformedImport(
                "Expected an object or an array of outlines".to_string(),
            ))
        }
    };
    outlines_from_value(outlines)
}

/// Decode a stored/imported outline array, rejecting duplicate outline ids
pub fn outlines_from_value(value: Value) -> DomainResult<Vec<Outline>> {
    let outlines = Vec::<Outline>::deserialize(serde_stacker::Deserializer::new(value))?;

    let mut seen = HashSet::new();
    for outline in &outlines {
        if !seen.insert(&outline.id) {
            return Err(DomainError::MalformedImport(format!(
                "Duplicate outline id {}",
                outline.id
            )));
        }
    }
    Ok(outlines)
}
