//! The resolver facade
//!
//! A [`Resolver`] is built once, loading every source eagerly, and then
//! answers `get` queries. The merged table sits behind a lock so `set` can
//! update the table and the environment mirror as one step.

use super::dotenv::{load_dotenv, DOTENV_FILE};
use super::environment;
use super::json::{load_json, settings_files};
use super::locator::SearchPath;
use super::mirror::{non_blank, EnvMirror};
use super::settings::ResolverOptions;
use super::table::{merge, normalize_value, ConfigTable, MergeInputs, ResolvedEntry, Source};
use crate::error::Result;
use crate::secret::fetcher::SecretFetcher;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info};

pub struct Resolver {
    environment: String,
    table: RwLock<ConfigTable>,
    mirror: Arc<dyn EnvMirror>,
    loaded_files: Vec<PathBuf>,
    fetcher: SecretFetcher,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("environment", &self.environment)
            .field("loaded_files", &self.loaded_files)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Load every source described by `options`.
    ///
    /// Missing settings files and a missing `.env` are skipped unless named
    /// in `required_files`. An existing file that cannot be read or parsed
    /// fails construction.
    pub fn new(options: ResolverOptions) -> Result<Self> {
        let ResolverOptions {
            environment,
            defaults,
            search_path,
            env_vars,
            publish_environment,
            required_files,
            vault_key,
            production_environment,
            mirror,
            secret_store,
        } = options;

        let environment = env_vars.resolve(environment.as_deref(), mirror.as_ref());
        if publish_environment {
            env_vars.publish(&environment, mirror.as_ref());
        }

        let search_path = match search_path {
            Some(search_path) => search_path,
            None => SearchPath::current()?,
        };

        for name in &required_files {
            search_path.require(name)?;
        }

        let mut loaded_files = Vec::new();

        let mut json = Vec::new();
        for name in settings_files(&environment) {
            match search_path.locate(&name) {
                Some(path) => {
                    let values = load_json(&path)?;
                    loaded_files.push(path.clone());
                    json.push((path, values));
                }
                None => debug!("Optional settings file {} not found, skipping", name),
            }
        }

        let dotenv = match search_path.locate(DOTENV_FILE) {
            Some(path) => {
                let pairs = load_dotenv(&path)?;
                loaded_files.push(path.clone());
                Some((path, pairs))
            }
            None => {
                info!("No .env file found");
                None
            }
        };

        let table = merge(
            MergeInputs {
                defaults,
                json,
                dotenv,
            },
            mirror.as_ref(),
        );
        table.mirror_into(mirror.as_ref());

        info!(
            "Resolved configuration for '{}' environment: {} keys from {} files",
            environment,
            table.keys().len(),
            loaded_files.len()
        );

        let mut fetcher = SecretFetcher::new()
            .with_vault_key(vault_key)
            .with_production_environment(production_environment);
        if let Some(store) = secret_store {
            fetcher = fetcher.with_store(store);
        }

        Ok(Self {
            environment,
            table: RwLock::new(table),
            mirror,
            loaded_files,
            fetcher,
        })
    }

    /// Resolve against the process environment, detecting the environment name.
    pub fn from_env() -> Result<Self> {
        Self::new(ResolverOptions::default())
    }

    /// Like [`from_env`](Self::from_env) with caller-supplied defaults at the
    /// lowest precedence.
    pub fn with_defaults<I, K, V>(defaults: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(ResolverOptions::default().defaults(defaults))
    }

    /// Resolve for a named environment, announcing it in the environment
    /// variables first.
    pub fn for_environment<S: Into<String>>(name: S) -> Result<Self> {
        Self::new(
            ResolverOptions::default()
                .environment(name)
                .publish_environment(true),
        )
    }

    pub fn development() -> Result<Self> {
        Self::for_environment(environment::DEVELOPMENT)
    }

    pub fn production() -> Result<Self> {
        Self::for_environment(environment::PRODUCTION)
    }

    pub fn staging() -> Result<Self> {
        Self::for_environment(environment::STAGING)
    }

    pub fn test() -> Result<Self> {
        Self::for_environment(environment::TEST)
    }

    /// Look up `key`.
    ///
    /// A non-blank live variable wins, so values exported after construction
    /// are visible. Otherwise the merged table answers. Absence is `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = non_blank(self.mirror.as_ref(), key) {
            return Some(normalize_value(&value));
        }
        self.read_table().get(key).map(str::to_string)
    }

    /// Write `value` to the table and the environment mirror, replacing any
    /// previous value.
    pub fn set(&self, key: &str, value: &str) {
        let value = normalize_value(value);
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = table.set_override(key, &value) {
            if previous != value {
                debug!("Overwriting configuration value for '{}'", key);
            }
        }
        self.mirror.set(key, &value);
    }

    /// Which source supplies the value `get` would return.
    pub fn source_of(&self, key: &str) -> Option<Source> {
        let table = self.read_table();
        let live = non_blank(self.mirror.as_ref(), key).map(|v| normalize_value(&v));

        match (live, table.resolve(key)) {
            (Some(live), Some((value, source))) if live == value => Some(source.clone()),
            (Some(_), _) => Some(Source::Environment),
            (None, resolved) => resolved.map(|(_, source)| source.clone()),
        }
    }

    /// Every key in the table with the value `get` would return for it.
    pub fn entries(&self) -> Vec<ResolvedEntry> {
        let mut entries = self.read_table().entries();
        for entry in &mut entries {
            if let Some(live) = non_blank(self.mirror.as_ref(), &entry.key) {
                let live = normalize_value(&live);
                if live != entry.value {
                    entry.value = live;
                    entry.source = Source::Environment;
                }
            }
        }
        entries
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn is_production(&self) -> bool {
        self.environment == self.fetcher.production_environment()
    }

    /// Files that contributed values, in load order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    /// Fetch `key` from the secret vault.
    ///
    /// Only permitted in the production environment. The vault is named by
    /// the vault key (`KEY_VAULT_NAME` unless configured otherwise), itself
    /// resolved through this resolver. A secret the vault does not have is
    /// `Ok(None)`.
    pub async fn from_vault(&self, key: &str) -> Result<Option<String>> {
        self.fetcher.fetch(self, key).await
    }

    pub fn secret_fetcher(&self) -> &SecretFetcher {
        &self.fetcher
    }

    fn read_table(&self) -> RwLockReadGuard<'_, ConfigTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mirror::MemoryEnv;
    use crate::error::StrataError;
    use std::fs;
    use tempfile::TempDir;

    fn options(dir: &TempDir, env: &MemoryEnv) -> ResolverOptions {
        ResolverOptions::new()
            .search_path(SearchPath::new([dir.path()]))
            .mirror(Arc::new(env.clone()))
    }

    #[test]
    fn test_empty_directory_resolves_defaults_only() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();

        let resolver = options(&dir, &env)
            .default_value("xx", "first")
            .build()
            .unwrap();

        assert_eq!(resolver.environment(), "development");
        assert_eq!(resolver.get("xx"), Some("first".to_string()));
        assert_eq!(resolver.get("missing"), None);
        assert!(resolver.loaded_files().is_empty());
    }

    #[test]
    fn test_defaults_mirrored_into_environment() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();

        options(&dir, &env)
            .default_value("yy", "second")
            .build()
            .unwrap();

        assert_eq!(env.get("yy"), Some("second".to_string()));
    }

    #[test]
    fn test_environment_json_overrides_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("development.json"), r#"{"six": "sixth"}"#).unwrap();
        let env = MemoryEnv::new();

        let resolver = options(&dir, &env)
            .default_value("six", "overwrite")
            .build()
            .unwrap();

        assert_eq!(resolver.get("six"), Some("sixth".to_string()));
        assert_eq!(
            resolver.source_of("six"),
            Some(Source::Json(dir.path().join("development.json")))
        );
    }

    #[test]
    fn test_publish_environment_sets_variables() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();

        let resolver = options(&dir, &env)
            .environment("staging")
            .publish_environment(true)
            .build()
            .unwrap();

        assert_eq!(resolver.environment(), "staging");
        assert_eq!(env.get("STRATA_ENV"), Some("staging".to_string()));
        assert_eq!(env.get("APP_ENV"), Some("staging".to_string()));
    }

    #[test]
    fn test_required_file_missing_fails() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();

        let err = options(&dir, &env)
            .require("appsettings.json")
            .build()
            .unwrap_err();

        assert!(matches!(err, StrataError::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_json_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("appsettings.json"), "{ broken").unwrap();
        let env = MemoryEnv::new();

        let err = options(&dir, &env).build().unwrap_err();
        assert!(matches!(err, StrataError::InvalidJson { .. }));
    }

    #[test]
    fn test_set_overwrites_and_mirrors() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();
        let resolver = options(&dir, &env).build().unwrap();

        resolver.set("key", "v1");
        resolver.set("key", "v2");

        assert_eq!(resolver.get("key"), Some("v2".to_string()));
        assert_eq!(env.get("key"), Some("v2".to_string()));
        assert_eq!(resolver.source_of("key"), Some(Source::Override));
    }

    #[test]
    fn test_live_variables_set_later_are_visible() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();
        let resolver = options(&dir, &env)
            .default_value("key", "default")
            .build()
            .unwrap();

        env.set("zzzz", "TEST");
        env.set("key", "exported");

        assert_eq!(resolver.get("zzzz"), Some("TEST".to_string()));
        assert_eq!(resolver.get("key"), Some("exported".to_string()));
        assert_eq!(resolver.source_of("key"), Some(Source::Environment));
    }

    #[test]
    fn test_entries_reflect_live_values() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();
        let resolver = options(&dir, &env)
            .defaults([("a", "1"), ("b", "2")])
            .build()
            .unwrap();

        env.set("b", "live");
        let entries = resolver.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].value, "live");
        assert_eq!(entries[1].source, Source::Environment);
    }

    #[test]
    fn test_is_production() {
        let dir = TempDir::new().unwrap();
        let env = MemoryEnv::new();

        let resolver = options(&dir, &env).environment("production").build().unwrap();
        assert!(resolver.is_production());

        let resolver = options(&dir, &env).environment("staging").build().unwrap();
        assert!(!resolver.is_production());
    }
}
