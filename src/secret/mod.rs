//! Secret vault access
//!
//! This module provides the secret store collaborator and the
//! environment-gated fetcher used by `Resolver::from_vault`.

pub mod fetcher;
pub mod store;

pub use fetcher::*;
pub use store::*;
