//! Authentication module for Azure services
//!
//! This module provides the bearer tokens used for Azure Key Vault
//! requests made by the secret fetcher.

pub mod provider;

pub use provider::*;
