//! Unit tests for configuration module
//!
//! Tests configuration parsing, validation, serialization/deserialization,
//! and edge cases in configuration handling.

use super::*;
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_configuration_is_valid() {
    let config = ClientConfig::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.connection.socket, None);
    assert_eq!(config.connection.global_retry_budget, 10);
    assert_eq!(config.logging.filter, "info");
    assert_eq!(config.hit_test.plane_z, 0.0);
}

#[test]
fn test_configuration_serialization_roundtrip() -> Result<()> {
    let mut original_config = ClientConfig::default();
    original_config.connection.socket = Some("z11-0".to_string());
    original_config.hit_test.plane_z = -1.5;

    let toml_string = toml::to_string(&original_config)?;
    let deserialized_config: ClientConfig = toml::from_str(&toml_string)?;

    assert_eq!(original_config, deserialized_config);

    Ok(())
}

#[test]
fn test_configuration_from_file() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("test_config.toml");

    let test_config = r#"
[connection]
socket = "/run/user/1000/z11-0"
global_retry_budget = 25

[logging]
filter = "zsurface=debug"
timestamps = false

[hit_test]
plane_z = 2.0
"#;

    fs::write(&file_path, test_config)?;

    let config = ClientConfig::load(&file_path)?;

    assert_eq!(
        config.connection.socket.as_deref(),
        Some("/run/user/1000/z11-0")
    );
    assert_eq!(config.connection.global_retry_budget, 25);
    assert_eq!(config.logging.filter, "zsurface=debug");
    assert!(!config.logging.timestamps);
    assert_eq!(config.hit_test.plane_z, 2.0);

    Ok(())
}

#[test]
fn test_partial_configuration_uses_defaults() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("partial_config.toml");

    fs::write(&file_path, "[connection]\nsocket = \"z11-1\"\n")?;

    let config = ClientConfig::load(&file_path)?;

    assert_eq!(config.connection.socket.as_deref(), Some("z11-1"));
    assert_eq!(config.connection.global_retry_budget, 10);
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.hit_test, HitTestConfig::default());

    Ok(())
}

#[test]
fn test_malformed_toml_handling() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("malformed_config.toml");

    let malformed_config = r#"
[connection
socket =
global_retry_budget = "many"
"#;

    fs::write(&file_path, malformed_config).unwrap();

    let result = ClientConfig::load(&file_path);
    assert!(result.is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(ClientConfig::load(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_configuration_validation() {
    let config = ClientConfig::default();

    let mut invalid_config = config.clone();
    invalid_config.connection.global_retry_budget = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.connection.socket = Some("  ".to_string());
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.logging.filter = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.hit_test.plane_z = f32::NAN;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn test_save_then_load() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("saved.toml");

    let mut config = ClientConfig::default();
    config.connection.global_retry_budget = 3;
    config.save(&file_path)?;

    let loaded = ClientConfig::load(&file_path)?;
    assert_eq!(loaded, config);

    Ok(())
}
