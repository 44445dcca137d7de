//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap.
//! Every command builds a resolver from the global options first, the same
//! way an application embedding the library would.

use crate::config::{Resolver, ResolverOptions, SearchPath};
use crate::error::{Result, StrataError};
use crate::utils::format::{render_entries, OutputFormat};
use crate::utils::retry::{retry_with_backoff, RetryOptions};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Resolve layered configuration from settings files, .env and the environment")]
#[command(version, author)]
pub struct Cli {
    /// Environment name (overrides STRATA_ENV / APP_ENV detection)
    #[arg(long = "env", global = true)]
    pub environment: Option<String>,

    /// Directory to search for configuration files, in order (repeatable)
    #[arg(long = "dir", global = true)]
    pub dirs: Vec<PathBuf>,

    /// Default value as KEY=VALUE, lowest precedence (repeatable)
    #[arg(long = "default", global = true, value_parser = parse_key_val)]
    pub defaults: Vec<(String, String)>,

    /// File that must be found, otherwise loading fails (repeatable)
    #[arg(long, global = true)]
    pub require: Vec<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved value of a key
    Get {
        key: String,
        /// Printed when the key is not set
        #[arg(long)]
        fallback: Option<String>,
    },
    /// Print the active environment name
    Env,
    /// Print every resolved key with its value and source
    Dump {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show where a configuration file would be searched for
    Locate { file: String },
    /// Fetch a secret from the configured vault (production only)
    Vault {
        key: String,
        /// Retry transient failures this many times
        #[arg(long, default_value_t = 0)]
        retries: usize,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

/// Parse a `KEY=VALUE` argument, splitting on the first `=`.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match &self.command {
            Commands::Get { key, fallback } => {
                let resolver = self.build_resolver()?;
                match resolver.get(key).or_else(|| fallback.clone()) {
                    Some(value) => println!("{}", value),
                    None => {
                        return Err(StrataError::invalid_argument(format!(
                            "'{}' is not set in the '{}' environment",
                            key,
                            resolver.environment()
                        )))
                    }
                }
            }
            Commands::Env => {
                let resolver = self.build_resolver()?;
                println!("{}", resolver.environment());
            }
            Commands::Dump { format } => {
                let resolver = self.build_resolver()?;
                println!("{}", render_entries(&resolver.entries(), *format)?);
            }
            Commands::Locate { file } => {
                let search_path = self.search_path()?;
                let found = search_path.locate(file);
                for candidate in search_path.candidates(file) {
                    let marker = if Some(&candidate) == found.as_ref() {
                        "found"
                    } else if candidate.is_file() {
                        "shadowed"
                    } else {
                        "missing"
                    };
                    println!("{:<8} {}", marker, candidate.display());
                }
            }
            Commands::Vault { key, retries } => {
                let resolver = self.build_resolver()?;
                let resolver = &resolver;
                let key = key.as_str();
                let options = RetryOptions::default().with_max_retries(*retries);

                match retry_with_backoff(move || resolver.from_vault(key), options).await? {
                    Some(value) => println!("{}", value),
                    None => eprintln!("Secret '{}' not found", key),
                }
            }
            Commands::Completions { shell } => {
                let mut command = Cli::command();
                clap_complete::generate(*shell, &mut command, "strata", &mut std::io::stdout());
            }
        }

        Ok(())
    }

    fn search_path(&self) -> Result<SearchPath> {
        if self.dirs.is_empty() {
            SearchPath::current()
        } else {
            Ok(SearchPath::new(self.dirs.iter().cloned()))
        }
    }

    /// Resolver options described by the global flags.
    pub fn resolver_options(&self) -> Result<ResolverOptions> {
        let mut options = ResolverOptions::new()
            .defaults(self.defaults.iter().cloned())
            .search_path(self.search_path()?);

        if let Some(environment) = &self.environment {
            options = options.environment(environment.clone()).publish_environment(true);
        }
        for name in &self.require {
            options = options.require(name.clone());
        }

        debug!("Resolver options: {:?}", options);
        Ok(options)
    }

    fn build_resolver(&self) -> Result<Resolver> {
        self.resolver_options()?.build()
    }
}
