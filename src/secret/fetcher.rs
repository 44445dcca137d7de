//! Environment-gated vault access
//!
//! Secrets may only be read while running in the production environment.
//! The vault itself is named by a configuration key, so its identifier is
//! resolved through the same resolver that gates access.

use std::sync::Arc;
use tracing::{debug, info};

use super::store::{AzureKeyVaultStore, SecretStore};
use crate::config::settings::{PRODUCTION_ENVIRONMENT, VAULT_NAME_KEY};
use crate::config::Resolver;
use crate::error::{Result, StrataError};
use crate::utils::helpers::{is_valid_secret_name, vault_name_from_identifier};

pub struct SecretFetcher {
    store: Option<Arc<dyn SecretStore>>,
    vault_key: String,
    production_environment: String,
}

impl Default for SecretFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretFetcher {
    pub fn new() -> Self {
        Self {
            store: None,
            vault_key: VAULT_NAME_KEY.to_string(),
            production_environment: PRODUCTION_ENVIRONMENT.to_string(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_vault_key<S: Into<String>>(mut self, key: S) -> Self {
        self.vault_key = key.into();
        self
    }

    pub fn with_production_environment<S: Into<String>>(mut self, name: S) -> Self {
        self.production_environment = name.into();
        self
    }

    pub fn vault_key(&self) -> &str {
        &self.vault_key
    }

    pub fn production_environment(&self) -> &str {
        &self.production_environment
    }

    /// Fetch `key` from the vault named by the resolver's vault key.
    ///
    /// Checks run in order: environment gate, vault identifier, secret name.
    /// No store is created and nothing is sent until all of them pass.
    pub async fn fetch(&self, resolver: &Resolver, key: &str) -> Result<Option<String>> {
        if resolver.environment() != self.production_environment {
            return Err(StrataError::permission_denied(format!(
                "vault access is only allowed in the '{}' environment (current: '{}')",
                self.production_environment,
                resolver.environment()
            )));
        }

        let identifier = resolver
            .get(&self.vault_key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| StrataError::missing_vault_identifier(self.vault_key.as_str()))?;
        let vault_name = vault_name_from_identifier(&identifier)?;

        if !is_valid_secret_name(key) {
            return Err(StrataError::invalid_secret_name(key));
        }

        let store = self.store()?;
        debug!("Fetching secret '{}' from vault '{}'", key, vault_name);
        let value = store.fetch_secret(&vault_name, key).await?;

        if value.is_none() {
            info!("Secret '{}' not found in vault '{}'", key, vault_name);
        }
        Ok(value)
    }

    fn store(&self) -> Result<Arc<dyn SecretStore>> {
        match &self.store {
            Some(store) => Ok(store.clone()),
            None => Ok(Arc::new(AzureKeyVaultStore::with_default_credential()?)),
        }
    }
}
