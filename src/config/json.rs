//! JSON settings file loading
//!
//! Settings files are flat JSON objects. String values are taken as-is,
//! numbers and booleans keep their literal JSON spelling. Nested objects,
//! arrays and nulls are skipped.

use super::dotenv::UTF8_BOM;
use super::table::normalize_value;
use crate::error::{Result, StrataError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Base settings file, loaded for every environment
pub const BASE_SETTINGS_FILE: &str = "appsettings.json";

/// `{env}.json`
pub fn environment_file(env: &str) -> String {
    format!("{}.json", env)
}

/// `appsettings.{env}.json`
pub fn environment_settings_file(env: &str) -> String {
    format!("appsettings.{}.json", env)
}

/// JSON files for `env`, lowest precedence first.
pub fn settings_files(env: &str) -> Vec<String> {
    vec![
        BASE_SETTINGS_FILE.to_string(),
        environment_file(env),
        environment_settings_file(env),
    ]
}

/// Parse a flat JSON object into string pairs.
///
/// `origin` only labels errors and log lines. A leading UTF-8 byte-order
/// mark is ignored.
pub fn parse_json(contents: &str, origin: &Path) -> Result<BTreeMap<String, String>> {
    let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);
    let document: Value = serde_json::from_str(contents)
        .map_err(|e| StrataError::invalid_json(origin, e.to_string()))?;

    let Value::Object(object) = document else {
        return Err(StrataError::invalid_json(
            origin,
            "top-level value must be an object",
        ));
    };

    let mut values = BTreeMap::new();
    for (key, value) in object {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => {
                warn!("Skipping null value for '{}' in {}", key, origin.display());
                continue;
            }
            Value::Array(_) | Value::Object(_) => {
                warn!(
                    "Skipping nested value for '{}' in {}: only flat settings are supported",
                    key,
                    origin.display()
                );
                continue;
            }
        };
        values.insert(key, normalize_value(&text));
    }

    Ok(values)
}

/// Read and parse a JSON settings file.
pub fn load_json(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = std::fs::read_to_string(path)?;
    let values = parse_json(&contents, path)?;
    debug!("Loaded {} entries from {}", values.len(), path.display());
    Ok(values)
}
