//! Keypair domain entities

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Durable slot holding the private key
pub const PRIVATE_KEY_SLOT: &str = "privateKey";

/// Durable slot holding the public key
pub const PUBLIC_KEY_SLOT: &str = "publicKey";

/// Message the bridge reports when removing a key it does not know about
pub const PUBLIC_KEY_NOT_FOUND: &str = "Public key was not found";

/// Errors raised by a durable storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Errors reported by a network-service capability
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// The remote service answered with a failure message
    #[error("{0}")]
    Remote(String),

    /// The remote service could not be reached
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl NetworkError {
    /// Whether this is the bridge's "already absent" sentinel
    ///
    /// Matches the bare message or its `Error: `-prefixed rendering, exactly.
    pub fn is_key_not_found(&self) -> bool {
        match self {
            Self::Remote(msg) => {
                msg == PUBLIC_KEY_NOT_FOUND || msg.strip_prefix("Error: ") == Some(PUBLIC_KEY_NOT_FOUND)
            }
            Self::Transport(_) => false,
        }
    }
}

/// A string that is securely zeroed on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Matched private/public key material issued as a unit
///
/// Both halves are produced together by a network-service capability and are
/// never regenerated independently.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    private_key: SecureString,
    public_key: String,
}

impl Keypair {
    pub fn new(private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            private_key: SecureString::new(private_key),
            public_key: public_key.into(),
        }
    }

    pub fn private_key(&self) -> &str {
        self.private_key.as_str()
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("private_key", &self.private_key)
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Current key material; an empty string means "no key present"
#[derive(Clone, Default, PartialEq, Eq, Zeroize)]
pub struct KeyState {
    pub private_key: String,
    pub public_key: String,
}

impl KeyState {
    /// Neither half is present
    pub fn is_empty(&self) -> bool {
        self.private_key.is_empty() && self.public_key.is_empty()
    }

    /// Both halves are present
    pub fn is_complete(&self) -> bool {
        !self.private_key.is_empty() && !self.public_key.is_empty()
    }
}

impl std::fmt::Debug for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let private = if self.private_key.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("KeyState")
            .field("private_key", &private)
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Local key status, comparing memory against durable storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    /// No key material in memory or storage
    Absent,
    /// A complete keypair present and identical in memory and storage
    Present { public_key: String },
    /// Memory and storage disagree, or only one half is present
    Diverged,
}

/// Shorten a public key for log output
pub(crate) fn key_preview(key: &str) -> &str {
    let end = key.char_indices().nth(12).map(|(i, _)| i).unwrap_or(key.len());
    &key[..end]
}
