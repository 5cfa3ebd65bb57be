//! Config module tests

use crate::config::Config;
use crate::infrastructure::bridge::client::DEFAULT_BRIDGE_URL;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.storage.backend, "file");
    assert_eq!(config.storage.namespace, "keyward");
    assert_eq!(config.bridge.url, DEFAULT_BRIDGE_URL);
    assert_eq!(config.bridge.timeout_secs, 30);
    assert!(!config.lifecycle.clear_on_not_found);
    config.validate().unwrap();
}

#[test]
fn test_set_and_get() {
    let mut config = Config::default();

    config.set("storage.backend", "keyring").unwrap();
    config.set("bridge.url", "http://localhost:6382").unwrap();
    config.set("bridge.timeout_secs", "5").unwrap();
    config.set("lifecycle.clear_on_not_found", "true").unwrap();

    assert_eq!(config.get("storage.backend").unwrap(), "keyring");
    assert_eq!(config.get("bridge.url").unwrap(), "http://localhost:6382");
    assert_eq!(config.get("bridge.timeout_secs").unwrap(), "5");
    assert!(config.lifecycle.options().clear_on_not_found);
}

#[test]
fn test_set_rejects_invalid_values() {
    let mut config = Config::default();

    assert!(config.set("storage.backend", "sqlite").is_err());
    assert!(config.set("storage.namespace", "  ").is_err());
    assert!(config.set("bridge.url", "ftp://bridge").is_err());
    assert!(config.set("bridge.timeout_secs", "0").is_err());
    assert!(config.set("lifecycle.clear_on_not_found", "maybe").is_err());
    assert!(config.set("bridge.password", "hunter2").is_err());
    assert!(config.set("nope", "x").is_err());
}

#[test]
fn test_password_in_config_is_rejected() {
    let toml = r#"
        [bridge]
        email = "user@example.com"
        password = "hunter2"
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_partial_toml_fills_defaults() {
    let config: Config = toml::from_str("[lifecycle]\nclear_on_not_found = true\n").unwrap();
    assert!(config.lifecycle.clear_on_not_found);
    assert_eq!(config.storage.namespace, "keyward");
    assert_eq!(config.bridge.url, DEFAULT_BRIDGE_URL);
}

#[test]
fn test_list_covers_every_key() {
    let config = Config::default();
    let entries = config.list().unwrap();
    assert_eq!(entries.len(), 8);
    assert!(entries.iter().any(|(k, v)| k == "bridge.url" && v == DEFAULT_BRIDGE_URL));
}

#[test]
fn test_open_memory_backend() {
    let mut config = Config::default();
    config.storage.backend = "memory".to_string();
    assert!(config.storage.open().is_ok());

    config.storage.backend = "bogus".to_string();
    assert!(config.storage.open().is_err());
}
