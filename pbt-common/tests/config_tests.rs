//! Configuration resolution tests
//!
//! Root folder priority: CLI argument > PBT_ROOT_FOLDER > TOML > default.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate PBT_ROOT_FOLDER are marked with #[serial].

use pbt_common::config::{
    default_root_folder, resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn toml_with_root(root: &str) -> TomlConfig {
    TomlConfig {
        root_folder: Some(PathBuf::from(root)),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(root, default_root_folder());
    assert!(!root.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/pbt-env");

    let root = resolve_root_folder(Some(Path::new("/tmp/pbt-cli")), &toml_with_root("/tmp/pbt-toml"));
    assert_eq!(root, PathBuf::from("/tmp/pbt-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/pbt-env");

    let root = resolve_root_folder(None, &toml_with_root("/tmp/pbt-toml"));
    assert_eq!(root, PathBuf::from("/tmp/pbt-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = resolve_root_folder(None, &toml_with_root("/tmp/pbt-toml"));
    assert_eq!(root, PathBuf::from("/tmp/pbt-toml"));
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_broken_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(TomlConfig::load(&path).is_err());
    let config = TomlConfig::load_or_default(Some(&path));
    assert!(config.port.is_none());
}

#[test]
fn test_config_file_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/data/pbt"
port = 8080
operator_token = "s3cret"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/data/pbt")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.operator_token.as_deref(), Some("s3cret"));
}
