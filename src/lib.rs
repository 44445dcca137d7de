//! strata - Layered Configuration Resolver
//!
//! Merges defaults, JSON settings files, `.env` files, environment variables
//! and Azure Key Vault secrets into a single key-value view with a fixed
//! precedence order.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod secret;
pub mod utils;

// Re-export commonly used types
pub use config::{Resolver, ResolverOptions};
pub use error::{Result, StrataError};
