//! Active environment detection
//!
//! The environment name selects which JSON overlays are loaded and gates
//! access to the secret vault.

use super::mirror::{non_blank, EnvMirror};

/// Primary variable naming the active environment
pub const PRIMARY_ENV_VAR: &str = "STRATA_ENV";
/// Secondary variable, consulted when the primary is unset or blank
pub const SECONDARY_ENV_VAR: &str = "APP_ENV";

pub const DEVELOPMENT: &str = "development";
pub const PRODUCTION: &str = "production";
pub const STAGING: &str = "staging";
pub const TEST: &str = "test";

/// Fallback when nothing names an environment
pub const DEFAULT_ENVIRONMENT: &str = DEVELOPMENT;

/// Names of the variables consulted during detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVars {
    pub primary: String,
    pub secondary: String,
}

impl Default for EnvironmentVars {
    fn default() -> Self {
        Self {
            primary: PRIMARY_ENV_VAR.to_string(),
            secondary: SECONDARY_ENV_VAR.to_string(),
        }
    }
}

impl EnvironmentVars {
    pub fn new<P: Into<String>, S: Into<String>>(primary: P, secondary: S) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Resolve the environment name.
    /// Priority: explicit name > primary variable > secondary variable > "development"
    ///
    /// Blank values count as absent at every step.
    pub fn resolve(&self, explicit: Option<&str>, mirror: &dyn EnvMirror) -> String {
        explicit
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| non_blank(mirror, &self.primary).map(|v| v.trim().to_string()))
            .or_else(|| non_blank(mirror, &self.secondary).map(|v| v.trim().to_string()))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// Announce `name` in both variables so raw environment readers agree
    /// with the resolver.
    pub fn publish(&self, name: &str, mirror: &dyn EnvMirror) {
        mirror.set(&self.primary, name);
        mirror.set(&self.secondary, name);
    }
}

/// Detect the active environment from the process environment using the
/// default variable names.
pub fn detect_environment() -> String {
    EnvironmentVars::default().resolve(None, &super::mirror::ProcessEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mirror::{EnvMirror, MemoryEnv, ProcessEnv};
    use serial_test::serial;

    #[test]
    fn test_defaults_to_development() {
        let env = MemoryEnv::new();
        assert_eq!(EnvironmentVars::default().resolve(None, &env), "development");
    }

    #[test]
    fn test_blank_variables_are_absent() {
        let env = MemoryEnv::with_vars([(PRIMARY_ENV_VAR, ""), (SECONDARY_ENV_VAR, "  \t")]);
        assert_eq!(EnvironmentVars::default().resolve(None, &env), "development");
    }

    #[test]
    fn test_primary_beats_secondary() {
        let env = MemoryEnv::with_vars([(PRIMARY_ENV_VAR, "staging"), (SECONDARY_ENV_VAR, "test")]);
        assert_eq!(EnvironmentVars::default().resolve(None, &env), "staging");
    }

    #[test]
    fn test_secondary_used_when_primary_blank() {
        let env = MemoryEnv::with_vars([(PRIMARY_ENV_VAR, " "), (SECONDARY_ENV_VAR, "production")]);
        assert_eq!(EnvironmentVars::default().resolve(None, &env), "production");
    }

    #[test]
    fn test_explicit_name_wins() {
        let env = MemoryEnv::with_vars([(PRIMARY_ENV_VAR, "staging")]);
        let vars = EnvironmentVars::default();

        assert_eq!(vars.resolve(Some("test"), &env), "test");
        assert_eq!(vars.resolve(Some("   "), &env), "staging");
    }

    #[test]
    fn test_custom_variable_names() {
        let env = MemoryEnv::with_vars([("ASPNETCORE_ENVIRONMENT", "production")]);
        let vars = EnvironmentVars::new("ASPNETCORE_ENVIRONMENT", "DOTNETCORE_ENVIRONMENT");
        assert_eq!(vars.resolve(None, &env), "production");
    }

    #[test]
    fn test_publish_writes_both_variables() {
        let env = MemoryEnv::new();
        EnvironmentVars::default().publish("staging", &env);

        assert_eq!(env.get(PRIMARY_ENV_VAR), Some("staging".to_string()));
        assert_eq!(env.get(SECONDARY_ENV_VAR), Some("staging".to_string()));
    }

    #[test]
    #[serial]
    fn test_detect_environment_with_cleared_process_vars() {
        let env = ProcessEnv;
        env.set(PRIMARY_ENV_VAR, "");
        env.set(SECONDARY_ENV_VAR, "");

        assert_eq!(detect_environment(), "development");

        env.remove(PRIMARY_ENV_VAR);
        env.remove(SECONDARY_ENV_VAR);
    }
}
