//! Bridge basic-auth credentials
//!
//! The bridge expects the password as the hex SHA-256 digest of the
//! plaintext, never the plaintext itself.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Hex-encoded SHA-256 digest of `input`
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BridgeCredentials {
    email: String,
    password_hash: String,
}

impl BridgeCredentials {
    /// Build credentials from a plaintext password, hashing it immediately
    pub fn new(email: impl Into<String>, password: &str) -> Self {
        Self {
            email: email.into(),
            password_hash: sha256_hex(password),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for BridgeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeCredentials")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
