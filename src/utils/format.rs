//! Output formatting for resolved configuration
//!
//! Renders resolved entries as a table, JSON, YAML or `KEY=value` lines.

use crate::config::ResolvedEntry;
use crate::error::{Result, StrataError};
use clap::ValueEnum;
use tabled::{settings::Style, Table};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    /// `KEY=value` lines readable by the dotenv loader
    Env,
}

/// Render entries in the requested format.
pub fn render_entries(entries: &[ResolvedEntry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            if entries.is_empty() {
                return Ok("No configuration values resolved".to_string());
            }
            let mut table = Table::new(entries);
            table.with(Style::rounded());
            Ok(table.to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
        OutputFormat::Yaml => {
            serde_yaml::to_string(entries).map_err(|e| StrataError::serialization(e.to_string()))
        }
        OutputFormat::Env => Ok(entries
            .iter()
            .map(|entry| format!("{}={}", entry.key, entry.value))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
