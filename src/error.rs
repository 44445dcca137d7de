use std::path::PathBuf;
use thiserror::Error;

/// Main error type for strata operations
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("Configuration file not found in any search location: {name}")]
    FileNotFound { name: String },

    #[error("Invalid JSON settings file {}: {message}", path.display())]
    InvalidJson { path: PathBuf, message: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Vault identifier '{key}' is not configured; set it in .env or a settings file")]
    MissingVaultIdentifier { key: String },

    #[error("Invalid secret name: {name}")]
    InvalidSecretName { name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Azure API error: {0}")]
    AzureApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("DNS resolution failed for vault '{vault_name}': {details}")]
    DnsResolutionError {
        vault_name: String,
        details: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl StrataError {
    pub fn file_not_found<S: Into<String>>(name: S) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    pub fn invalid_json<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::InvalidJson {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn missing_vault_identifier<S: Into<String>>(key: S) -> Self {
        Self::MissingVaultIdentifier { key: key.into() }
    }

    pub fn invalid_secret_name<S: Into<String>>(name: S) -> Self {
        Self::InvalidSecretName { name: name.into() }
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::AuthenticationError(msg.into())
    }

    pub fn azure_api<S: Into<String>>(msg: S) -> Self {
        Self::AzureApiError(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn connection_timeout<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionTimeout(msg.into())
    }

    pub fn connection_refused<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionRefused(msg.into())
    }

    pub fn dns_resolution<S: Into<String>>(vault_name: S, details: S) -> Self {
        Self::DnsResolutionError {
            vault_name: vault_name.into(),
            details: details.into(),
        }
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn unknown<S: Into<String>>(msg: S) -> Self {
        Self::Unknown(msg.into())
    }
}

/// Result type alias for strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Convert Azure Core errors to StrataError
impl From<azure_core::Error> for StrataError {
    fn from(error: azure_core::Error) -> Self {
        Self::AzureApiError(error.to_string())
    }
}
