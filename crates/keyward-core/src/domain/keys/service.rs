//! Keypair lifecycle service
//!
//! Orchestrates generate, register, and unregister against a network-service
//! capability, keeping the `KeyStore` in step with the outcome.

use std::sync::Arc;

use super::entity::{KeyStatus, Keypair, key_preview};
use super::repository::NetworkService;
use super::store::KeyStore;
use crate::error::{Error, Result};

const MISSING_NETWORK_SERVICE: &str = "No network-service instance";

/// Tunables for the lifecycle service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleOptions {
    /// Clear local keys when the bridge reports the public key as already absent
    pub clear_on_not_found: bool,
}

/// Input to `KeyLifecycleService::register_key`
pub struct RegisterKeyRequest<'a> {
    pub network: Option<&'a dyn NetworkService>,
    pub public_key: String,
}

impl<'a> RegisterKeyRequest<'a> {
    pub fn new(network: Option<&'a dyn NetworkService>, public_key: impl Into<String>) -> Self {
        Self {
            network,
            public_key: public_key.into(),
        }
    }
}

/// Successful result of `KeyLifecycleService::unregister_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// Durable storage held no complete keypair; nothing was sent
    NothingToRemove,
    /// The bridge revoked the key and local state was cleared
    Removed,
    /// The bridge did not know the key
    NotFound,
}

impl UnregisterOutcome {
    /// Human-readable status, `None` when nothing happened
    pub fn status(&self) -> Option<&'static str> {
        match self {
            Self::NothingToRemove => None,
            Self::Removed => Some("Private key removed"),
            Self::NotFound => Some("Private key not found"),
        }
    }
}

/// Service driving a single keypair through its lifecycle
///
/// # Example
///
/// ```ignore
/// let service = KeyLifecycleService::new(store);
///
/// let keypair = service.generate_keypair(Some(&bridge)).await?;
/// service
///     .register_key(RegisterKeyRequest::new(Some(&bridge), keypair.public_key()))
///     .await?;
/// ```
pub struct KeyLifecycleService {
    store: Arc<KeyStore>,
    options: LifecycleOptions,
}

impl KeyLifecycleService {
    /// Create a new KeyLifecycleService with default options
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self::with_options(store, LifecycleOptions::default())
    }

    pub fn with_options(store: Arc<KeyStore>, options: LifecycleOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.store
    }

    /// Generate a fresh keypair and stage it locally
    ///
    /// Nothing is sent to the bridge; registration is a separate step.
    /// Returns the keypair exactly as the capability produced it.
    pub async fn generate_keypair(&self, network: Option<&dyn NetworkService>) -> Result<Keypair> {
        let network = network.ok_or_else(|| Error::BadRequest(MISSING_NETWORK_SERVICE.to_string()))?;

        let keypair = network.generate_key_pair();

        self.store.commit(&keypair).await?;

        tracing::info!(public_key = %key_preview(keypair.public_key()), "Generated and staged new keypair");
        Ok(keypair)
    }

    /// Register a public key with the bridge
    ///
    /// Failure leaves locally held keys in place so the caller can retry.
    pub async fn register_key(&self, request: RegisterKeyRequest<'_>) -> Result<()> {
        let network = request
            .network
            .ok_or_else(|| Error::BadRequest(MISSING_NETWORK_SERVICE.to_string()))?;

        match network.register_key(&request.public_key).await {
            Ok(()) => {
                tracing::info!(public_key = %key_preview(&request.public_key), "Registered public key");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    public_key = %key_preview(&request.public_key),
                    error = %e,
                    "Public key registration failed"
                );
                Err(Error::Internal(e.to_string()))
            }
        }
    }

    /// Revoke the persisted public key and clear local key material
    ///
    /// Reads the keypair from durable storage rather than memory, so it works
    /// even when this process never loaded the keys.
    pub async fn unregister_key(&self, network: &dyn NetworkService) -> Result<UnregisterOutcome> {
        let persisted = self.store.read_persisted().await?;

        if !persisted.is_complete() {
            tracing::debug!("No persisted keypair, nothing to unregister");
            return Ok(UnregisterOutcome::NothingToRemove);
        }

        match network.remove_key(&persisted.public_key).await {
            Ok(()) => {
                if let Err(e) = self.store.clear_keys().await {
                    tracing::warn!(
                        public_key = %key_preview(&persisted.public_key),
                        error = %e,
                        "Public key revoked on the bridge but local keys could not be cleared"
                    );
                    return Err(e);
                }
                tracing::info!(public_key = %key_preview(&persisted.public_key), "Removed public key and cleared local keys");
                Ok(UnregisterOutcome::Removed)
            }
            Err(e) if e.is_key_not_found() => {
                if self.options.clear_on_not_found {
                    self.store.clear_keys().await?;
                }
                tracing::warn!(
                    public_key = %key_preview(&persisted.public_key),
                    cleared = self.options.clear_on_not_found,
                    "Bridge reported public key as not found"
                );
                Ok(UnregisterOutcome::NotFound)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Public key removal failed");
                Err(Error::Internal(e.to_string()))
            }
        }
    }

    /// Compare in-memory key state with durable storage
    pub async fn status(&self) -> Result<KeyStatus> {
        let memory = self.store.state();
        let persisted = self.store.read_persisted().await?;

        let status = if memory != persisted {
            KeyStatus::Diverged
        } else if persisted.is_empty() {
            KeyStatus::Absent
        } else if persisted.is_complete() {
            KeyStatus::Present {
                public_key: persisted.public_key.clone(),
            }
        } else {
            KeyStatus::Diverged
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::keys::{
        KeyValueStorage, NetworkError, PRIVATE_KEY_SLOT, PUBLIC_KEY_SLOT, StorageError,
    };
    use crate::error::ErrorKind;
    use crate::infrastructure::storage::InMemoryStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type NetResult = std::result::Result<(), NetworkError>;

    // Mock NetworkService that records every call it receives
    struct MockNetworkService {
        keypair: Keypair,
        register_result: NetResult,
        remove_result: NetResult,
        calls: Mutex<Vec<String>>,
    }

    impl MockNetworkService {
        fn new(private_key: &str, public_key: &str) -> Self {
            Self {
                keypair: Keypair::new(private_key, public_key),
                register_result: Ok(()),
                remove_result: Ok(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_register(mut self, message: &str) -> Self {
            self.register_result = Err(NetworkError::Remote(message.to_string()));
            self
        }

        fn failing_remove(mut self, message: &str) -> Self {
            self.remove_result = Err(NetworkError::Remote(message.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NetworkService for MockNetworkService {
        fn generate_key_pair(&self) -> Keypair {
            self.calls.lock().unwrap().push("generate".to_string());
            self.keypair.clone()
        }

        async fn register_key(&self, public_key: &str) -> NetResult {
            self.calls.lock().unwrap().push(format!("register:{}", public_key));
            self.register_result.clone()
        }

        async fn remove_key(&self, public_key: &str) -> NetResult {
            self.calls.lock().unwrap().push(format!("remove:{}", public_key));
            self.remove_result.clone()
        }
    }

    fn service() -> (Arc<InMemoryStorage>, KeyLifecycleService) {
        let storage = Arc::new(InMemoryStorage::new());
        let store = Arc::new(KeyStore::new(storage.clone()));
        (storage, KeyLifecycleService::new(store))
    }

    async fn seed(storage: &InMemoryStorage, private_key: &str, public_key: &str) {
        storage.save(PRIVATE_KEY_SLOT, private_key).await.unwrap();
        storage.save(PUBLIC_KEY_SLOT, public_key).await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_keypair_commits_both_halves() {
        let (storage, service) = service();
        let network = MockNetworkService::new("PK", "PUB");

        let keypair = service.generate_keypair(Some(&network)).await.unwrap();

        assert_eq!(keypair, network.keypair);
        assert_eq!(service.store().private_key(), "PK");
        assert_eq!(service.store().public_key(), "PUB");
        assert_eq!(storage.retrieve(PRIVATE_KEY_SLOT).await.unwrap().as_deref(), Some("PK"));
        assert_eq!(storage.retrieve(PUBLIC_KEY_SLOT).await.unwrap().as_deref(), Some("PUB"));
        assert_eq!(network.calls(), vec!["generate"]);
    }

    #[tokio::test]
    async fn test_generate_keypair_without_network_is_bad_request() {
        let (storage, service) = service();

        let err = service.generate_keypair(None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.to_string().contains("No network-service instance"));
        assert!(service.store().state().is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_register_key_without_network_is_bad_request() {
        let (_storage, service) = service();

        let err = service
            .register_key(RegisterKeyRequest::new(None, "x"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_register_key_success_leaves_store_alone() {
        let (_storage, service) = service();
        let network = MockNetworkService::new("PK", "PUB");

        service
            .register_key(RegisterKeyRequest::new(Some(&network), "PUB"))
            .await
            .unwrap();

        assert_eq!(network.calls(), vec!["register:PUB"]);
        assert!(service.store().state().is_empty());
    }

    #[tokio::test]
    async fn test_register_failure_keeps_local_keys() {
        let (storage, service) = service();
        let network = MockNetworkService::new("PK", "PUB").failing_register("bridge unavailable");

        let keypair = service.generate_keypair(Some(&network)).await.unwrap();
        let err = service
            .register_key(RegisterKeyRequest::new(Some(&network), keypair.public_key()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(&err, Error::Internal(msg) if msg == "bridge unavailable"));
        assert_eq!(service.store().private_key(), "PK");
        assert_eq!(service.store().public_key(), "PUB");
        assert_eq!(storage.retrieve(PUBLIC_KEY_SLOT).await.unwrap().as_deref(), Some("PUB"));
    }

    #[tokio::test]
    async fn test_unregister_with_empty_storage_is_noop() {
        let (_storage, service) = service();
        let network = MockNetworkService::new("PK", "PUB");

        let outcome = service.unregister_key(&network).await.unwrap();

        assert_eq!(outcome, UnregisterOutcome::NothingToRemove);
        assert_eq!(outcome.status(), None);
        assert!(network.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unregister_with_half_keypair_is_noop() {
        let (storage, service) = service();
        storage.save(PUBLIC_KEY_SLOT, "pub1").await.unwrap();
        let network = MockNetworkService::new("PK", "PUB");

        let outcome = service.unregister_key(&network).await.unwrap();

        assert_eq!(outcome, UnregisterOutcome::NothingToRemove);
        assert!(network.calls().is_empty());
        assert_eq!(storage.retrieve(PUBLIC_KEY_SLOT).await.unwrap().as_deref(), Some("pub1"));
    }

    #[tokio::test]
    async fn test_unregister_removes_and_clears() {
        let (storage, service) = service();
        seed(&storage, "priv1", "pub1").await;
        let network = MockNetworkService::new("PK", "PUB");

        let outcome = service.unregister_key(&network).await.unwrap();

        assert_eq!(outcome, UnregisterOutcome::Removed);
        assert_eq!(outcome.status(), Some("Private key removed"));
        assert_eq!(network.calls(), vec!["remove:pub1"]);
        assert!(service.store().state().is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_not_found_keeps_local_keys() {
        let (storage, service) = service();
        let store_keys = Keypair::new("priv1", "pub1");
        service.store().commit(&store_keys).await.unwrap();
        let network = MockNetworkService::new("PK", "PUB").failing_remove("Error: Public key was not found");

        let outcome = service.unregister_key(&network).await.unwrap();

        assert_eq!(outcome, UnregisterOutcome::NotFound);
        assert_eq!(outcome.status(), Some("Private key not found"));
        assert_eq!(service.store().public_key(), "pub1");
        assert_eq!(storage.retrieve(PRIVATE_KEY_SLOT).await.unwrap().as_deref(), Some("priv1"));
    }

    #[tokio::test]
    async fn test_unregister_not_found_clears_when_configured() {
        let storage = Arc::new(InMemoryStorage::new());
        let store = Arc::new(KeyStore::new(storage.clone()));
        let service = KeyLifecycleService::with_options(
            store,
            LifecycleOptions {
                clear_on_not_found: true,
            },
        );
        service.store().commit(&Keypair::new("priv1", "pub1")).await.unwrap();
        let network = MockNetworkService::new("PK", "PUB").failing_remove("Public key was not found");

        let outcome = service.unregister_key(&network).await.unwrap();

        assert_eq!(outcome, UnregisterOutcome::NotFound);
        assert!(service.store().state().is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_other_error_is_internal_and_keeps_keys() {
        let (storage, service) = service();
        seed(&storage, "priv1", "pub1").await;
        let network = MockNetworkService::new("PK", "PUB").failing_remove("Unauthorized");

        let err = service.unregister_key(&network).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("Unauthorized"));
        assert_eq!(storage.retrieve(PRIVATE_KEY_SLOT).await.unwrap().as_deref(), Some("priv1"));
        assert_eq!(storage.retrieve(PUBLIC_KEY_SLOT).await.unwrap().as_deref(), Some("pub1"));
    }

    // Storage whose remove always fails
    struct UnremovableStorage {
        inner: InMemoryStorage,
    }

    #[async_trait]
    impl KeyValueStorage for UnremovableStorage {
        async fn retrieve(&self, name: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.retrieve(name).await
        }

        async fn save(&self, name: &str, value: &str) -> std::result::Result<(), StorageError> {
            self.inner.save(name, value).await
        }

        async fn remove(&self, _name: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Keyring("locked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_generate_keypair_storage_failure_stages_nothing() {
        let service = KeyLifecycleService::new(Arc::new(KeyStore::new(Arc::new(FailingSaveStorage))));
        let network = MockNetworkService::new("PK", "PUB");

        let err = service.generate_keypair(Some(&network)).await.unwrap_err();

        assert_eq!(err.code(), "E600");
        assert!(service.store().state().is_empty());
    }

    struct FailingSaveStorage;

    #[async_trait]
    impl KeyValueStorage for FailingSaveStorage {
        async fn retrieve(&self, _name: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn save(&self, _name: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Serialization("disk full".to_string()))
        }

        async fn remove(&self, _name: &str) -> std::result::Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unregister_clear_failure_after_remote_removal() {
        let storage = Arc::new(UnremovableStorage {
            inner: InMemoryStorage::new(),
        });
        let store = Arc::new(KeyStore::new(storage.clone()));
        store.commit(&Keypair::new("priv1", "pub1")).await.unwrap();
        let service = KeyLifecycleService::new(store);
        let network = MockNetworkService::new("PK", "PUB");

        let err = service.unregister_key(&network).await.unwrap_err();

        assert!(matches!(err, Error::Storage(StorageError::Keyring(_))));
        assert_eq!(network.calls(), vec!["remove:pub1"]);
        assert_eq!(service.store().state(), service.store().read_persisted().await.unwrap());
        assert_eq!(service.store().public_key(), "pub1");
    }

    #[tokio::test]
    async fn test_status_tracks_lifecycle() {
        let (storage, service) = service();
        let network = MockNetworkService::new("PK", "PUB");

        assert_eq!(service.status().await.unwrap(), KeyStatus::Absent);

        service.generate_keypair(Some(&network)).await.unwrap();
        assert_eq!(
            service.status().await.unwrap(),
            KeyStatus::Present {
                public_key: "PUB".to_string()
            }
        );

        // Another session rewrote storage behind this store's back
        storage.save(PUBLIC_KEY_SLOT, "other").await.unwrap();
        assert_eq!(service.status().await.unwrap(), KeyStatus::Diverged);
    }
}
