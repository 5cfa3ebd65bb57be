//! In-memory storage backend
//!
//! Holds slots for the lifetime of the process only. Used by tests and by the
//! `memory` backend for throwaway sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::keys::{KeyValueStorage, StorageError};

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no slot is currently held
    pub fn is_empty(&self) -> bool {
        self.slots.lock().map(|slots| slots.is_empty()).unwrap_or(true)
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn retrieve(&self, name: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(name).cloned())
    }

    async fn save(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.remove(name);
        Ok(())
    }
}
