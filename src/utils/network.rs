use crate::error::{Result, StrataError};
use reqwest::Client;
use std::time::Duration;

/// Configuration for HTTP client with proper timeouts and user-friendly error handling
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent: format!("strata/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a properly configured HTTP client with timeouts
pub fn create_http_client(config: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| StrataError::network(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure to a user-facing error naming the vault
pub fn classify_network_error(error: &reqwest::Error, url: &str) -> StrataError {
    let vault_name = extract_vault_name_from_url(url);
    let message = error.to_string().to_lowercase();

    if error.is_timeout() {
        return StrataError::connection_timeout(format!(
            "Connection to Azure Key Vault '{}' timed out",
            vault_name
        ));
    }

    if error.is_connect() {
        if is_dns_resolution_error(&message) {
            return StrataError::dns_resolution(
                vault_name.clone(),
                format!(
                    "Unable to resolve vault hostname. Check that the vault '{}' exists.",
                    vault_name
                ),
            );
        }

        if message.contains("connection refused") {
            return StrataError::connection_refused(format!(
                "Connection to Azure Key Vault '{}' was refused",
                vault_name
            ));
        }

        return StrataError::network(format!(
            "Failed to connect to Azure Key Vault '{}'",
            vault_name
        ));
    }

    if let Some(status) = error.status() {
        match status.as_u16() {
            503 => {
                return StrataError::network(format!(
                    "Azure Key Vault '{}' is temporarily unavailable (503)",
                    vault_name
                ))
            }
            502 | 504 => {
                return StrataError::network(format!(
                    "Gateway error ({}) when accessing vault '{}'",
                    status.as_u16(),
                    vault_name
                ))
            }
            _ => {}
        }
    }

    StrataError::network(format!(
        "Network error when accessing vault '{}': {}",
        vault_name, error
    ))
}

fn is_dns_resolution_error(message: &str) -> bool {
    const DNS_INDICATORS: [&str; 8] = [
        "dns",
        "name resolution",
        "name or service not known",
        "nodename nor servname provided",
        "no such host",
        "host not found",
        "getaddrinfo failed",
        "could not resolve host",
    ];

    DNS_INDICATORS
        .iter()
        .any(|indicator| message.contains(indicator))
}

/// Extract vault name from Azure Key Vault URL
fn extract_vault_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .and_then(|host| host.strip_suffix(".vault.azure.net"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown-vault".to_string())
}

/// Check if an error is worth retrying
pub fn is_retryable_error(error: &StrataError) -> bool {
    match error {
        StrataError::ConnectionTimeout(_) => true,
        StrataError::NetworkError(msg) | StrataError::AzureApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            msg_lower.contains("timeout")
                || msg_lower.contains("temporarily")
                || msg_lower.contains("throttled")
                || msg_lower.contains("429")
                || msg_lower.contains("503")
                || msg_lower.contains("502")
                || msg_lower.contains("504")
        }
        _ => false,
    }
}
