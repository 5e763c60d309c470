//! Integration tests for bridge configuration files
//!
//! Tests cover:
//! - Loading from disk, partial files and defaults
//! - Save/load round-trip through the TOML form
//! - Error reporting for missing, malformed and invalid files

use std::fs;

use tempfile::TempDir;
use tether_bridge::{Bridge, BridgeConfig, ConfigError};

#[test]
fn test_load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tether.toml");
    fs::write(
        &path,
        r#"
[types]
unknown_user = "app.errors.Unexpected"

[lookup]
default_module = "app"
"#,
    )
    .unwrap();

    let config = BridgeConfig::from_file(&path).unwrap();
    assert_eq!(config.types.unknown_user, "app.errors.Unexpected");
    assert_eq!(config.types.unknown, "Rpc.UnknownException");
    assert_eq!(config.lookup.default_module, "app");
    assert_eq!(config.exit.fallback_status, 1);

    let bridge = Bridge::new(config.clone()).unwrap();
    assert_eq!(bridge.config(), &config);
}

#[test]
fn test_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tether.toml");

    let mut config = BridgeConfig::default();
    config.exit.fallback_status = 2;
    config.types.identity = "app.Identity".to_string();
    fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(BridgeConfig::from_file(&path).unwrap(), config);
}

#[test]
fn test_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = BridgeConfig::from_file(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_malformed_and_invalid_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tether.toml");

    fs::write(&path, "[types\nunknown = ").unwrap();
    assert!(matches!(
        BridgeConfig::from_file(&path).unwrap_err(),
        ConfigError::Parse(_)
    ));

    fs::write(&path, "[lookup]\ndefault_module = \"not a module\"\n").unwrap();
    let err = BridgeConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("default_module")));
}
