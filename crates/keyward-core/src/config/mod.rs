//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::keys::{KeyValueStorage, LifecycleOptions};
use crate::infrastructure::bridge::client::{DEFAULT_BRIDGE_URL, DEFAULT_TIMEOUT_SECS};
use crate::infrastructure::bridge::{BridgeClient, BridgeCredentials};
use crate::infrastructure::storage::{FileStorage, InMemoryStorage, KeyringStorage};

/// Environment variable holding the bridge password
pub const BRIDGE_PASSWORD_ENV: &str = "KEYWARD_BRIDGE_PASSWORD";

const STORAGE_BACKENDS: [&str; 3] = ["file", "keyring", "memory"];

/// Keyward configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub bridge: BridgeConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// One of `file`, `keyring`, `memory`
    pub backend: String,
    pub namespace: String,
    /// Directory for the file backend; defaults to the platform data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub url: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub clear_on_not_found: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            namespace: "keyward".to_string(),
            path: None,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BRIDGE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            email: None,
            password: None,
        }
    }
}

impl StorageConfig {
    /// Directory used by the file backend
    pub fn resolved_path(&self) -> anyhow::Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(dirs::data_dir()
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join("keyward")),
        }
    }

    /// Instantiate the configured storage backend
    pub fn open(&self) -> anyhow::Result<Arc<dyn KeyValueStorage>> {
        let storage: Arc<dyn KeyValueStorage> = match self.backend.as_str() {
            "file" => Arc::new(FileStorage::new(self.resolved_path()?, &self.namespace)),
            "keyring" => Arc::new(KeyringStorage::new(&self.namespace)),
            "memory" => Arc::new(InMemoryStorage::new()),
            other => {
                return Err(anyhow!(
                    "Unknown storage backend: {}. Valid options: {}",
                    other,
                    STORAGE_BACKENDS.join(", ")
                ));
            }
        };
        Ok(storage)
    }
}

impl BridgeConfig {
    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.password.is_some() {
            return Err(anyhow!(
                "Bridge passwords must be provided via {}, not stored in configuration",
                BRIDGE_PASSWORD_ENV
            ));
        }
        Ok(())
    }

    /// Credentials from the configured email and the password env var
    pub fn resolved_credentials(&self) -> anyhow::Result<Option<BridgeCredentials>> {
        self.enforce_env_only()?;

        let password = env::var(BRIDGE_PASSWORD_ENV).ok();
        Ok(match (&self.email, password) {
            (Some(email), Some(password)) => Some(BridgeCredentials::new(email.clone(), &password)),
            _ => None,
        })
    }

    /// Build a bridge client from this configuration
    pub fn client(&self) -> anyhow::Result<BridgeClient> {
        let mut builder = BridgeClient::builder().config(self);
        if let Some(credentials) = self.resolved_credentials()? {
            builder = builder.credentials(credentials);
        }
        builder.build().context("Failed to build bridge client")
    }
}

impl LifecycleConfig {
    pub fn options(&self) -> LifecycleOptions {
        LifecycleOptions {
            clear_on_not_found: self.clear_on_not_found,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("KEYWARD_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("keyward")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or use defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.bridge.enforce_env_only()?;

        if !STORAGE_BACKENDS.contains(&self.storage.backend.as_str()) {
            return Err(anyhow!(
                "Invalid storage backend: {}. Valid options: {}",
                self.storage.backend,
                STORAGE_BACKENDS.join(", ")
            ));
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(anyhow!("Storage namespace must not be empty"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "storage.backend" => Ok(self.storage.backend.clone()),
            "storage.namespace" => Ok(self.storage.namespace.clone()),
            "storage.path" => Ok(self
                .storage
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),

            "bridge.url" => Ok(self.bridge.url.clone()),
            "bridge.timeout_secs" => Ok(self.bridge.timeout_secs.to_string()),
            "bridge.email" => Ok(self
                .bridge
                .email
                .clone()
                .unwrap_or_else(|| "(not set)".to_string())),

            // Password is never shown
            "bridge.password" => Ok(if env::var(BRIDGE_PASSWORD_ENV).is_ok() {
                "***".to_string()
            } else {
                format!("(not set - use {} env var)", BRIDGE_PASSWORD_ENV)
            }),

            "lifecycle.clear_on_not_found" => Ok(self.lifecycle.clear_on_not_found.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `keyward config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "storage.backend" => {
                if !STORAGE_BACKENDS.contains(&value) {
                    return Err(anyhow!(
                        "Invalid storage backend: {}. Valid options: {}",
                        value,
                        STORAGE_BACKENDS.join(", ")
                    ));
                }
                self.storage.backend = value.to_string();
            }
            "storage.namespace" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Storage namespace must not be empty"));
                }
                self.storage.namespace = value.to_string();
            }
            "storage.path" => {
                self.storage.path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            "bridge.url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(anyhow!("Bridge URL must start with http:// or https://"));
                }
                self.bridge.url = value.to_string();
            }
            "bridge.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be at least one second"));
                }
                self.bridge.timeout_secs = secs;
            }
            "bridge.email" => {
                self.bridge.email = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            "bridge.password" => {
                return Err(anyhow!(
                    "Bridge passwords cannot be stored in configuration for security. \
                     Set the {} environment variable instead.",
                    BRIDGE_PASSWORD_ENV
                ));
            }

            "lifecycle.clear_on_not_found" => {
                self.lifecycle.clear_on_not_found = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `keyward config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "storage.backend",
            "storage.namespace",
            "storage.path",
            "bridge.url",
            "bridge.timeout_secs",
            "bridge.email",
            "bridge.password",
            "lifecycle.clear_on_not_found",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
