//! General utility helper functions
//!
//! Vault URI handling and Azure naming rules for vaults and secrets.

use crate::error::{Result, StrataError};
use regex::Regex;

/// Get vault URI from vault name
pub fn get_vault_uri(vault_name: &str) -> String {
    format!("https://{}.vault.azure.net/", vault_name)
}

/// Extract vault name from vault URI
pub fn extract_vault_name_from_uri(vault_uri: &str) -> Result<String> {
    let re = Regex::new(r"^https://([^./]+)\.vault\.azure\.net/?$")?;

    if let Some(captures) = re.captures(vault_uri) {
        if let Some(name) = captures.get(1) {
            return Ok(name.as_str().to_string());
        }
    }

    Err(StrataError::invalid_argument(format!(
        "Invalid vault URI format: {}",
        vault_uri
    )))
}

/// Azure vault names: 3-24 characters, letters, digits and hyphens, starting
/// with a letter, ending with a letter or digit, no consecutive hyphens.
pub fn is_valid_vault_name(name: &str) -> bool {
    if name.len() < 3 || name.len() > 24 || name.contains("--") {
        return false;
    }
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]*[a-zA-Z0-9]$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Key Vault secret names: 1-127 letters, digits and hyphens.
pub fn is_valid_secret_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 127 {
        return false;
    }
    Regex::new(r"^[a-zA-Z0-9-]+$")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Accept either a bare vault name or a full vault URI and return the name.
pub fn vault_name_from_identifier(identifier: &str) -> Result<String> {
    let identifier = identifier.trim();

    let name = if identifier.starts_with("https://") {
        extract_vault_name_from_uri(identifier)?
    } else {
        identifier.to_string()
    };

    if !is_valid_vault_name(&name) {
        return Err(StrataError::invalid_argument(format!(
            "Invalid vault name: {}",
            name
        )));
    }

    Ok(name)
}
