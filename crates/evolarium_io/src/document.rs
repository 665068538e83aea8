//! On-disk snapshot schema.
//!
//! ```text
//! meta:        { version, date }
//! config:      { <flat tunables> }
//! world:       { size, simSpeed, flags: { predation, zones, debug }, camera: { x, y, zoom } }
//! environment: { zones: [ { pos: { x, y }, radius, vel: { x, y } } ] }
//! entities:    { organisms: [ [x, y, vx, vy, energy, <8 traits>] ], food: [ [x, y] ] }
//! ```
//!
//! Every section and every key is required on input. `SimConfig` and
//! `WorldSettings` fill missing keys from their defaults when read from TOML,
//! so the document checks their keys against the defaults' keys first. Only keys
//! whose default is `null` (the optional seed) may be left out.

use evolarium_core::SimConfig;
use evolarium_data::{WorldSettings, Zone};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DOCUMENT_VERSION: &str = "1.0";
/// Width of a persisted food tuple.
pub const FOOD_FIELDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    /// RFC 3339 timestamp of the export.
    pub date: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            date: String::new(),
        }
    }
}

impl Meta {
    #[must_use]
    pub fn now() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            date: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSection {
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesSection {
    pub organisms: Vec<Vec<f64>>,
    pub food: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub meta: Meta,
    #[serde(deserialize_with = "required_keys")]
    pub config: SimConfig,
    #[serde(deserialize_with = "required_keys")]
    pub world: WorldSettings,
    pub environment: EnvironmentSection,
    pub entities: EntitiesSection,
}

/// Deserializes `T` only if every key of `T::default()`'s serialized form is
/// present, nested objects included.
fn required_keys<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Serialize + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let template = serde_json::to_value(T::default()).map_err(D::Error::custom)?;
    let mut missing = Vec::new();
    collect_missing(&template, &value, "", &mut missing);
    if !missing.is_empty() {
        return Err(D::Error::custom(format!(
            "missing field(s): {}",
            missing.join(", ")
        )));
    }
    serde_json::from_value(value).map_err(D::Error::custom)
}

fn collect_missing(template: &Value, actual: &Value, prefix: &str, out: &mut Vec<String>) {
    let Value::Object(fields) = template else {
        return;
    };
    for (key, expected) in fields {
        if expected.is_null() {
            continue;
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match actual.get(key) {
            None => out.push(path),
            Some(found) => collect_missing(expected, found, &path, out),
        }
    }
}
