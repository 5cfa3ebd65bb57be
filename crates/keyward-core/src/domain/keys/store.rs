//! In-memory key state mirrored into durable storage

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zeroize::Zeroize;

use super::entity::{KeyState, Keypair, PRIVATE_KEY_SLOT, PUBLIC_KEY_SLOT};
use super::repository::KeyValueStorage;
use crate::error::Result;

/// Holds the current key material and keeps durable storage identical to it
///
/// Every mutation writes the durable slot first and touches memory only once
/// that write succeeded, so a storage failure leaves both copies as they were.
/// The
/// store does not enforce pairing on its own; `commit` and `clear_keys` are the
/// paired entry points and the lifecycle service always goes through them or
/// through both setters in order.
pub struct KeyStore {
    state: RwLock<KeyState>,
    storage: Arc<dyn KeyValueStorage>,
}

impl KeyStore {
    /// Create a store with empty in-memory state
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            state: RwLock::new(KeyState::default()),
            storage,
        }
    }

    /// Create a store hydrated from whatever durable storage already holds
    pub async fn load(storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let store = Self::new(storage);
        let persisted = store.read_persisted().await?;
        *store.write_state() = persisted;
        Ok(store)
    }

    /// Overwrite the private key in storage, then in memory
    pub async fn set_private_key(&self, key: &str) -> Result<()> {
        self.storage.save(PRIVATE_KEY_SLOT, key).await?;
        self.write_state().private_key = key.to_string();
        tracing::debug!(slot = PRIVATE_KEY_SLOT, "Saved key slot");
        Ok(())
    }

    /// Overwrite the public key in storage, then in memory
    pub async fn set_public_key(&self, key: &str) -> Result<()> {
        self.storage.save(PUBLIC_KEY_SLOT, key).await?;
        self.write_state().public_key = key.to_string();
        tracing::debug!(slot = PUBLIC_KEY_SLOT, "Saved key slot");
        Ok(())
    }

    /// Set both halves of a keypair, private first
    pub async fn commit(&self, keypair: &Keypair) -> Result<()> {
        self.set_private_key(keypair.private_key()).await?;
        self.set_public_key(keypair.public_key()).await
    }

    /// Delete both durable slots and blank each half once its slot is gone
    pub async fn clear_keys(&self) -> Result<()> {
        self.storage.remove(PRIVATE_KEY_SLOT).await?;
        self.write_state().private_key.zeroize();
        self.storage.remove(PUBLIC_KEY_SLOT).await?;
        self.write_state().public_key.zeroize();
        tracing::debug!("Removed both key slots");
        Ok(())
    }

    /// Read both slots straight from durable storage, bypassing memory
    pub async fn read_persisted(&self) -> Result<KeyState> {
        let private_key = self.storage.retrieve(PRIVATE_KEY_SLOT).await?;
        let public_key = self.storage.retrieve(PUBLIC_KEY_SLOT).await?;
        Ok(KeyState {
            private_key: private_key.unwrap_or_default(),
            public_key: public_key.unwrap_or_default(),
        })
    }

    pub fn private_key(&self) -> String {
        self.read_state().private_key.clone()
    }

    pub fn public_key(&self) -> String {
        self.read_state().public_key.clone()
    }

    /// Snapshot of the in-memory state
    pub fn state(&self) -> KeyState {
        self.read_state().clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, KeyState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, KeyState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("state", &*self.read_state())
            .finish_non_exhaustive()
    }
}
