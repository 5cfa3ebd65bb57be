//! Keypair lifecycle domain module
//!
//! Manages the keypair a client uses to authenticate against a bridge:
//! generate it, stage it locally, register the public half, and later revoke
//! it while clearing local state.
//!
//! # Architecture
//!
//! - **Entities**: `Keypair`, `KeyState`, `SecureString`
//! - **Capability Traits**: `KeyValueStorage`, `NetworkService`
//! - **State Holder**: `KeyStore` mirrors key state into durable storage
//! - **Services**: `KeyLifecycleService` orchestrates generate/register/unregister
//!
//! # Lifecycle
//!
//! ```text
//! ABSENT --generate--> GENERATED_LOCAL --register--> REGISTERED
//! GENERATED_LOCAL | REGISTERED --unregister (removed)--> ABSENT
//! GENERATED_LOCAL | REGISTERED --unregister (not found)--> unchanged
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyward_core::domain::keys::{KeyLifecycleService, KeyStore, RegisterKeyRequest};
//! use keyward_core::infrastructure::storage::FileStorage;
//!
//! let store = Arc::new(KeyStore::load(Arc::new(FileStorage::new(dir, "keyward"))).await?);
//! let service = KeyLifecycleService::new(store);
//!
//! let keypair = service.generate_keypair(Some(&bridge)).await?;
//! service
//!     .register_key(RegisterKeyRequest::new(Some(&bridge), keypair.public_key()))
//!     .await?;
//!
//! let outcome = service.unregister_key(&bridge).await?;
//! ```

pub mod entity;
pub mod repository;
pub mod service;
pub mod store;

pub use entity::{
    KeyState, KeyStatus, Keypair, NetworkError, PRIVATE_KEY_SLOT, PUBLIC_KEY_NOT_FOUND,
    PUBLIC_KEY_SLOT, SecureString, StorageError,
};
pub use repository::{KeyValueStorage, NetworkService};
pub use service::{KeyLifecycleService, LifecycleOptions, RegisterKeyRequest, UnregisterOutcome};
pub use store::KeyStore;
