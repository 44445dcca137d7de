//! Tests against the real process environment.
//!
//! These change the working directory and process-wide variables, so every
//! test is `#[serial]` and restores what it touched on drop.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use strata::config::detect_environment;
use strata::Resolver;
use tempfile::TempDir;

/// Switches into a temp directory and back again on drop.
struct CwdGuard {
    original_dir: PathBuf,
}

impl CwdGuard {
    fn new(temp_dir: &TempDir) -> Self {
        let original_dir = std::env::current_dir().expect("Failed to get current directory");
        std::env::set_current_dir(temp_dir.path()).expect("Failed to set current directory");
        Self { original_dir }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}

/// Removes the named variables on creation and again on drop.
struct VarGuard {
    keys: Vec<&'static str>,
}

impl VarGuard {
    fn new(keys: &[&'static str]) -> Self {
        for key in keys {
            std::env::remove_var(key);
        }
        Self {
            keys: keys.to_vec(),
        }
    }
}

impl Drop for VarGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}

const ENV_VARS: [&str; 2] = ["STRATA_ENV", "APP_ENV"];

fn project() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("appsettings.json"),
        r#"{"STRATA_PROCESS_BASE": "base"}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("staging.json"),
        r#"{"STRATA_PROCESS_STAGED": "staged"}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join(".env"),
        "# process test\nSTRATA_PROCESS_DOTENV=\"from dotenv\"\n",
    )
    .unwrap();
    dir
}

#[test]
#[serial]
fn test_from_env_uses_secondary_variable() {
    let _vars = VarGuard::new(&[
        "STRATA_ENV",
        "APP_ENV",
        "STRATA_PROCESS_BASE",
        "STRATA_PROCESS_STAGED",
        "STRATA_PROCESS_DOTENV",
    ]);
    let dir = project();
    let _cwd = CwdGuard::new(&dir);
    std::env::set_var("APP_ENV", "staging");

    let resolver = Resolver::from_env().unwrap();

    assert_eq!(resolver.environment(), "staging");
    assert_eq!(resolver.get("STRATA_PROCESS_BASE"), Some("base".to_string()));
    assert_eq!(resolver.get("STRATA_PROCESS_STAGED"), Some("staged".to_string()));
    assert_eq!(
        resolver.get("STRATA_PROCESS_DOTENV"),
        Some("from dotenv".to_string())
    );
}

#[test]
#[serial]
fn test_resolved_values_are_mirrored_into_process() {
    let _vars = VarGuard::new(&[
        "STRATA_ENV",
        "APP_ENV",
        "STRATA_PROCESS_BASE",
        "STRATA_PROCESS_STAGED",
        "STRATA_PROCESS_DOTENV",
    ]);
    let dir = project();
    let _cwd = CwdGuard::new(&dir);

    let _resolver = Resolver::staging().unwrap();

    assert_eq!(std::env::var("STRATA_PROCESS_BASE").unwrap(), "base");
    assert_eq!(std::env::var("STRATA_PROCESS_STAGED").unwrap(), "staged");
    assert_eq!(std::env::var("STRATA_PROCESS_DOTENV").unwrap(), "from dotenv");
}

#[test]
#[serial]
fn test_named_factories_publish_environment() {
    let _vars = VarGuard::new(&ENV_VARS);
    let dir = TempDir::new().unwrap();
    let _cwd = CwdGuard::new(&dir);

    for (resolver, expected) in [
        (Resolver::development(), "development"),
        (Resolver::test(), "test"),
        (Resolver::production(), "production"),
    ] {
        let resolver = resolver.unwrap();
        assert_eq!(resolver.environment(), expected);
        assert_eq!(std::env::var("STRATA_ENV").unwrap(), expected);
        assert_eq!(std::env::var("APP_ENV").unwrap(), expected);
    }
}

#[test]
#[serial]
fn test_with_defaults_and_live_exports() {
    let _vars = VarGuard::new(&["STRATA_ENV", "APP_ENV", "STRATA_PROCESS_DEFAULT", "zzzz"]);
    let dir = TempDir::new().unwrap();
    let _cwd = CwdGuard::new(&dir);

    let resolver = Resolver::with_defaults([("STRATA_PROCESS_DEFAULT", "first")]).unwrap();
    assert_eq!(
        resolver.get("STRATA_PROCESS_DEFAULT"),
        Some("first".to_string())
    );

    std::env::set_var("zzzz", "TEST");
    assert_eq!(resolver.get("zzzz"), Some("TEST".to_string()));
}

#[test]
#[serial]
fn test_set_writes_process_variable() {
    let _vars = VarGuard::new(&["STRATA_ENV", "APP_ENV", "STRATA_PROCESS_SET"]);
    let dir = TempDir::new().unwrap();
    let _cwd = CwdGuard::new(&dir);

    let resolver = Resolver::from_env().unwrap();
    resolver.set("STRATA_PROCESS_SET", "\"v1\"");

    assert_eq!(std::env::var("STRATA_PROCESS_SET").unwrap(), "v1");
    assert_eq!(resolver.get("STRATA_PROCESS_SET"), Some("v1".to_string()));
}

#[test]
#[serial]
fn test_detect_environment_priority() {
    let _vars = VarGuard::new(&ENV_VARS);
    assert_eq!(detect_environment(), "development");

    std::env::set_var("APP_ENV", "staging");
    assert_eq!(detect_environment(), "staging");

    std::env::set_var("STRATA_ENV", "production");
    assert_eq!(detect_environment(), "production");

    std::env::set_var("STRATA_ENV", "  ");
    assert_eq!(detect_environment(), "staging");
}
