//! Configuration resolution module
//!
//! This module discovers configuration files, loads defaults, JSON settings,
//! `.env` files and environment variables, and merges them into a single
//! queryable view with a fixed precedence order.

pub mod dotenv;
pub mod environment;
pub mod json;
pub mod locator;
pub mod mirror;
pub mod resolver;
pub mod settings;
pub mod table;

pub use environment::{detect_environment, EnvironmentVars};
pub use locator::SearchPath;
pub use mirror::{EnvMirror, MemoryEnv, ProcessEnv};
pub use resolver::Resolver;
pub use settings::*;
pub use table::{ConfigTable, Layer, ResolvedEntry, Source};
