//! Environment mirror
//!
//! Every resolved value is written through to an environment-variable store
//! so that code reading raw variables sees the same outcome as the resolver.
//! The store is abstracted behind [`EnvMirror`]: [`ProcessEnv`] targets the
//! real process environment, [`MemoryEnv`] keeps everything in a private map.
//!
//! The process environment is global, mutable and lives as long as the
//! process. Resolvers constructed concurrently in one process race on it;
//! nothing here serializes those writes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An environment-variable store the resolver reads live values from and
/// mirrors resolved values into.
pub trait EnvMirror: Send + Sync {
    /// Read a variable. Unset and non-unicode variables are `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a variable, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove a variable.
    fn remove(&self, key: &str);

    /// Snapshot of every variable currently visible.
    fn vars(&self) -> Vec<(String, String)>;
}

/// Read a variable through the mirror, treating empty and whitespace-only
/// values as unset.
pub fn non_blank(mirror: &dyn EnvMirror, key: &str) -> Option<String> {
    mirror.get(key).filter(|value| !value.trim().is_empty())
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvMirror for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return None;
        }
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        // set_var panics on these
        if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
            tracing::debug!("Skipping environment write for unrepresentable key '{}'", key);
            return;
        }
        std::env::set_var(key, value);
    }

    fn remove(&self, key: &str) {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return;
        }
        std::env::remove_var(key);
    }

    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars().collect()
    }
}

/// An isolated in-memory environment.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
    vars: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given variables.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = Self::new();
        for (key, value) in vars {
            env.set(&key.into(), &value.into());
        }
        env
    }

    /// Drop every variable.
    pub fn clear(&self) {
        if let Ok(mut vars) = self.vars.write() {
            vars.clear();
        }
    }
}

impl EnvMirror for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut vars) = self.vars.write() {
            vars.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut vars) = self.vars.write() {
            vars.remove(key);
        }
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .map(|vars| vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}
