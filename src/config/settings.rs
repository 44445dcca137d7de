//! Resolver construction options
//!
//! [`ResolverOptions`] collects everything a resolver needs before loading:
//! the explicit environment (if any), defaults, where to search for files,
//! which variables name the environment, and the vault settings.

use super::environment::EnvironmentVars;
use super::locator::SearchPath;
use super::mirror::{EnvMirror, ProcessEnv};
use super::resolver::Resolver;
use crate::error::Result;
use crate::secret::store::SecretStore;
use std::fmt;
use std::sync::Arc;

/// Config key holding the vault name or URI
pub const VAULT_NAME_KEY: &str = "KEY_VAULT_NAME";

/// The only environment allowed to read from the vault
pub const PRODUCTION_ENVIRONMENT: &str = super::environment::PRODUCTION;

pub struct ResolverOptions {
    pub environment: Option<String>,
    pub defaults: Vec<(String, String)>,
    /// `None` searches relative to the current directory
    pub search_path: Option<SearchPath>,
    pub env_vars: EnvironmentVars,
    /// Write the chosen environment name into both environment variables
    pub publish_environment: bool,
    /// Files that must be found, otherwise construction fails
    pub required_files: Vec<String>,
    pub vault_key: String,
    pub production_environment: String,
    pub mirror: Arc<dyn EnvMirror>,
    /// `None` uses Azure Key Vault with the default credential chain
    pub secret_store: Option<Arc<dyn SecretStore>>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            environment: None,
            defaults: Vec::new(),
            search_path: None,
            env_vars: EnvironmentVars::default(),
            publish_environment: false,
            required_files: Vec::new(),
            vault_key: VAULT_NAME_KEY.to_string(),
            production_environment: PRODUCTION_ENVIRONMENT.to_string(),
            mirror: Arc::new(ProcessEnv),
            secret_store: None,
        }
    }
}

impl fmt::Debug for ResolverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverOptions")
            .field("environment", &self.environment)
            .field("defaults", &self.defaults.len())
            .field("search_path", &self.search_path)
            .field("env_vars", &self.env_vars)
            .field("publish_environment", &self.publish_environment)
            .field("required_files", &self.required_files)
            .field("vault_key", &self.vault_key)
            .field("production_environment", &self.production_environment)
            .field("secret_store", &self.secret_store.is_some())
            .finish_non_exhaustive()
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `name` instead of detecting the environment. Blank names are
    /// ignored during detection.
    pub fn environment<S: Into<String>>(mut self, name: S) -> Self {
        self.environment = Some(name.into());
        self
    }

    pub fn defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn default_value<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.defaults.push((key.into(), value.into()));
        self
    }

    pub fn search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = Some(search_path);
        self
    }

    pub fn env_vars(mut self, env_vars: EnvironmentVars) -> Self {
        self.env_vars = env_vars;
        self
    }

    pub fn publish_environment(mut self, publish: bool) -> Self {
        self.publish_environment = publish;
        self
    }

    /// Fail construction when `name` cannot be located.
    pub fn require<S: Into<String>>(mut self, name: S) -> Self {
        self.required_files.push(name.into());
        self
    }

    pub fn vault_key<S: Into<String>>(mut self, key: S) -> Self {
        self.vault_key = key.into();
        self
    }

    pub fn production_environment<S: Into<String>>(mut self, name: S) -> Self {
        self.production_environment = name.into();
        self
    }

    pub fn mirror(mut self, mirror: Arc<dyn EnvMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.secret_store = Some(store);
        self
    }

    /// Load every source and build the resolver.
    pub fn build(self) -> Result<Resolver> {
        Resolver::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mirror::MemoryEnv;

    #[test]
    fn test_default_options() {
        let options = ResolverOptions::default();

        assert_eq!(options.environment, None);
        assert_eq!(options.vault_key, "KEY_VAULT_NAME");
        assert_eq!(options.production_environment, "production");
        assert!(!options.publish_environment);
        assert!(options.secret_store.is_none());
    }

    #[test]
    fn test_builder_accumulates_defaults() {
        let options = ResolverOptions::new()
            .defaults([("xx", "first"), ("yy", "second")])
            .default_value("six", "overwrite");

        assert_eq!(options.defaults.len(), 3);
        assert_eq!(options.defaults[2], ("six".to_string(), "overwrite".to_string()));
    }

    #[test]
    fn test_builder_sets_fields() {
        let options = ResolverOptions::new()
            .environment("staging")
            .require("appsettings.json")
            .vault_key("VAULT")
            .production_environment("prod")
            .mirror(Arc::new(MemoryEnv::new()));

        assert_eq!(options.environment.as_deref(), Some("staging"));
        assert_eq!(options.required_files, vec!["appsettings.json"]);
        assert_eq!(options.vault_key, "VAULT");
        assert_eq!(options.production_environment, "prod");
    }

    #[test]
    fn test_debug_hides_store_details() {
        let rendered = format!("{:?}", ResolverOptions::new());
        assert!(rendered.contains("ResolverOptions"));
        assert!(rendered.contains("secret_store: false"));
    }
}
