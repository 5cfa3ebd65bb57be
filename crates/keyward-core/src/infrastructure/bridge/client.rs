//! Bridge HTTP client implementation
//!
//! Provides the `NetworkService` capability over a bridge's REST API:
//! - Local Ed25519 keypair generation
//! - Public key registration (`POST /keys`)
//! - Public key removal (`DELETE /keys/{key}`)

use std::time::Duration;

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use rand::RngCore;
use rand::rngs::OsRng;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use super::credentials::BridgeCredentials;
use crate::config::BridgeConfig;
use crate::domain::keys::{Keypair, NetworkError, NetworkService, PUBLIC_KEY_NOT_FOUND};
use crate::error::{Error, Result};

/// Default bridge base URL
pub const DEFAULT_BRIDGE_URL: &str = "https://api.storj.io";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct RegisterKeyBody<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Bridge API client
#[derive(Clone)]
pub struct BridgeClient {
    http_client: HttpClient,
    base_url: String,
    credentials: Option<BridgeCredentials>,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Builder for creating a BridgeClient
pub struct BridgeClientBuilder {
    base_url: Option<String>,
    credentials: Option<BridgeCredentials>,
    timeout_secs: Option<u64>,
}

impl Default for BridgeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            timeout_secs: None,
        }
    }

    /// Apply the url and timeout from a bridge configuration
    pub fn config(mut self, config: &BridgeConfig) -> Self {
        self.base_url = Some(config.url.clone());
        self.timeout_secs = Some(config.timeout_secs);
        self
    }

    /// Set the base URL (defaults to the public bridge)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Authenticate requests with basic auth
    pub fn credentials(mut self, credentials: BridgeCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the BridgeClient
    pub fn build(self) -> Result<BridgeClient> {
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(BridgeClient {
            http_client,
            base_url,
            credentials: self.credentials,
        })
    }
}

impl BridgeClient {
    /// Create a new builder for BridgeClient
    pub fn builder() -> BridgeClientBuilder {
        BridgeClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(creds.email(), Some(creds.password_hash())),
            None => request,
        }
    }

    /// Extract the `error` field from a failed response body, if any
    async fn error_message(response: Response) -> Option<String> {
        let text = response.text().await.ok()?;
        serde_json::from_str::<ErrorBody>(&text).ok()?.error
    }
}

fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn transport_error(e: reqwest::Error) -> NetworkError {
    NetworkError::Transport(e.to_string())
}

#[async_trait]
impl NetworkService for BridgeClient {
    fn generate_key_pair(&self) -> Keypair {
        let mut secret_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut secret_bytes);
        let signing_key = SigningKey::from_bytes(&secret_bytes);
        secret_bytes.zeroize();

        let mut private_bytes = signing_key.to_bytes();
        let keypair = Keypair::new(
            hex::encode(private_bytes),
            hex::encode(signing_key.verifying_key().to_bytes()),
        );
        private_bytes.zeroize();
        keypair
    }

    async fn register_key(&self, public_key: &str) -> std::result::Result<(), NetworkError> {
        let url = format!("{}/keys", self.base_url);
        debug!(url = %url, "Registering public key with bridge");

        let response = self
            .authorize(self.http_client.post(&url))
            .json(&RegisterKeyBody { key: public_key })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = Self::error_message(response)
            .await
            .unwrap_or_else(|| status_message(status));
        Err(NetworkError::Remote(message))
    }

    async fn remove_key(&self, public_key: &str) -> std::result::Result<(), NetworkError> {
        let url = format!("{}/keys/{}", self.base_url, public_key);
        debug!(url = %url, "Removing public key from bridge");

        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match Self::error_message(response).await {
            Some(message) => message,
            None if status == StatusCode::NOT_FOUND => PUBLIC_KEY_NOT_FOUND.to_string(),
            None => status_message(status),
        };
        Err(NetworkError::Remote(message))
    }
}
