//! Utility functions module
//!
//! This module contains vault naming helpers, HTTP client setup and error
//! classification, retry logic, and output formatting.

pub mod format;
pub mod helpers;
pub mod network;
pub mod retry;

pub use format::*;
pub use helpers::*;
pub use network::*;
pub use retry::*;
