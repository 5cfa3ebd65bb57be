//! OS keyring storage backend
//!
//! Stores each slot in the operating system's credential store (e.g., macOS
//! Keychain, Windows Credential Manager, Linux Secret Service), using the
//! namespace as the keyring service and the slot name as the user.

use ::keyring::Entry;
use async_trait::async_trait;

use crate::domain::keys::{KeyValueStorage, StorageError};

/// Default keyring service name
const KEYRING_SERVICE: &str = "keyward";

/// OS keyring-based key-value storage
///
/// # Platform Support
///
/// - **macOS**: Uses Keychain Services
/// - **Windows**: Uses Windows Credential Manager
/// - **Linux**: Uses Secret Service API (requires a secret service daemon)
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl KeyringStorage {
    /// Create a keyring storage scoped to the given namespace
    pub fn new(namespace: &str) -> Self {
        Self {
            service: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.service
    }

    fn entry(&self, name: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, name)
            .map_err(|e| StorageError::Keyring(format!("Failed to create keyring entry: {}", e)))
    }
}

#[async_trait]
impl KeyValueStorage for KeyringStorage {
    async fn retrieve(&self, name: &str) -> Result<Option<String>, StorageError> {
        let entry = self.entry(name)?;

        let result = tokio::task::spawn_blocking(move || entry.get_password())
            .await
            .map_err(|e| StorageError::Keyring(format!("Task join error: {}", e)))?;

        match result {
            Ok(value) => Ok(Some(value)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Keyring(format!(
                "Failed to read slot '{}': {}",
                name, e
            ))),
        }
    }

    async fn save(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let entry = self.entry(name)?;
        let value = value.to_string();
        let slot = name.to_string();

        // keyring operations are blocking
        tokio::task::spawn_blocking(move || {
            entry.set_password(&value).map_err(|e| {
                StorageError::Keyring(format!("Failed to write slot '{}': {}", slot, e))
            })
        })
        .await
        .map_err(|e| StorageError::Keyring(format!("Task join error: {}", e)))?
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let entry = self.entry(name)?;
        let slot = name.to_string();

        tokio::task::spawn_blocking(move || match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(::keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(StorageError::Keyring(format!(
                "Failed to delete slot '{}': {}",
                slot, e
            ))),
        })
        .await
        .map_err(|e| StorageError::Keyring(format!("Task join error: {}", e)))?
    }
}
