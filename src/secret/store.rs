//! Secret store collaborator
//!
//! [`SecretStore`] is the single capability the secret fetcher needs:
//! look up a named secret in a named vault. [`AzureKeyVaultStore`] answers
//! it with the Key Vault REST API.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::auth::provider::{AzureAuthProvider, DefaultAzureCredentialProvider, KEY_VAULT_SCOPE};
use crate::error::{Result, StrataError};
use crate::utils::network::{classify_network_error, create_http_client, NetworkConfig};

/// Key Vault REST API version
pub const KEY_VAULT_API_VERSION: &str = "7.4";

/// Trait for secret lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the current value of `secret_name` from `vault_name`.
    /// A secret the vault does not hold is `Ok(None)`.
    async fn fetch_secret(&self, vault_name: &str, secret_name: &str) -> Result<Option<String>>;
}

/// Azure Key Vault secret store
pub struct AzureKeyVaultStore {
    auth_provider: Arc<dyn AzureAuthProvider>,
    network_config: NetworkConfig,
}

impl AzureKeyVaultStore {
    pub fn new(auth_provider: Arc<dyn AzureAuthProvider>) -> Self {
        Self {
            auth_provider,
            network_config: NetworkConfig::default(),
        }
    }

    /// Store authenticated through the default Azure credential chain
    pub fn with_default_credential() -> Result<Self> {
        Ok(Self::new(Arc::new(DefaultAzureCredentialProvider::new()?)))
    }

    pub fn with_network_config(mut self, network_config: NetworkConfig) -> Self {
        self.network_config = network_config;
        self
    }

    fn secret_url(vault_name: &str, secret_name: &str) -> String {
        format!(
            "https://{}.vault.azure.net/secrets/{}?api-version={}",
            vault_name, secret_name, KEY_VAULT_API_VERSION
        )
    }
}

#[async_trait]
impl SecretStore for AzureKeyVaultStore {
    async fn fetch_secret(&self, vault_name: &str, secret_name: &str) -> Result<Option<String>> {
        let secret_url = Self::secret_url(vault_name, secret_name);

        let token = self.auth_provider.get_token(&[KEY_VAULT_SCOPE]).await?;

        let client = create_http_client(&self.network_config)?;
        let response = client
            .get(&secret_url)
            .bearer_auth(token.token.secret())
            .send()
            .await
            .map_err(|e| classify_network_error(&e, &secret_url))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("Secret '{}' not found in vault '{}'", secret_name, vault_name);
            return Ok(None);
        }
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StrataError::authentication(format!(
                "Access to secret '{}' in vault '{}' was denied: HTTP {}",
                secret_name, vault_name, status
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StrataError::azure_api(format!(
                "Failed to get secret: HTTP {} - {}",
                status, error_text
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            StrataError::serialization(format!("Failed to parse secret response: {}", e))
        })?;

        Ok(json
            .get("value")
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }
}
