//! Capability traits consumed by the keypair lifecycle
//!
//! Defines the durable storage and remote network-service interfaces.

use super::entity::{Keypair, NetworkError, StorageError};
use async_trait::async_trait;

/// Durable key-value storage with independently addressable string slots
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read a slot, `None` when absent
    async fn retrieve(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Write a slot, replacing any previous value
    async fn save(&self, name: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot; deleting an absent slot succeeds
    async fn remove(&self, name: &str) -> Result<(), StorageError>;
}

/// Remote network service that issues, registers, and revokes keypairs
///
/// Each async operation completes exactly once. The lifecycle layer adds no
/// retries, timeouts, or cancellation on top.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// Derive a fresh keypair locally without contacting the service
    fn generate_key_pair(&self) -> Keypair;

    /// Register a public key so it is accepted as an authenticator
    async fn register_key(&self, public_key: &str) -> Result<(), NetworkError>;

    /// Revoke a previously registered public key
    async fn remove_key(&self, public_key: &str) -> Result<(), NetworkError>;
}
