//! `.env` file loading
//!
//! One `KEY=value` pair per line. A `#` in the first column marks a comment.
//! The key is everything before the first `=` and the value everything after
//! it, so values may themselves contain `=`. There is no escaping syntax.
//! Double quotes are removed from values wherever they appear.

use super::table::normalize_value;
use crate::error::Result;
use std::path::Path;
use tracing::{debug, trace};

/// Default dotenv file name
pub const DOTENV_FILE: &str = ".env";

/// Byte-order mark some editors write at the start of UTF-8 files
pub(crate) const UTF8_BOM: char = '\u{feff}';

/// Parse dotenv text into pairs, in file order.
///
/// Comment lines and lines without a usable `=` are skipped silently.
/// Duplicate keys are kept; the later pair wins once inserted into a table.
/// A leading UTF-8 byte-order mark is ignored.
pub fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);
    let mut pairs = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        if line.starts_with('#') {
            continue;
        }

        match line.find('=') {
            Some(idx) if idx > 0 => {
                let key = &line[..idx];
                let value = &line[idx + 1..];
                pairs.push((key.to_string(), normalize_value(value)));
            }
            _ => trace!("Skipping dotenv line {}: no key/value delimiter", index + 1),
        }
    }

    pairs
}

/// Read and parse a dotenv file.
pub fn load_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    let contents = std::fs::read_to_string(path)?;
    let pairs = parse_dotenv(&contents);
    debug!("Loaded {} entries from {}", pairs.len(), path.display());
    Ok(pairs)
}
